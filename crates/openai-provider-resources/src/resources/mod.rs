//! Built-in resources.

use std::collections::BTreeMap;

use openai_provider_client::ClientError;
use openai_provider_core::RetrySettings;

use crate::errors::ResourceError;

mod assistant;
mod file;
mod invite;
mod moderation;
mod project;
mod project_user;
mod vector_store;
mod vector_store_file;

pub use assistant::{AssistantConfig, AssistantResource, AssistantState};
pub use file::{FileConfig, FileResource, FileState};
pub use invite::{InviteConfig, InviteResource, InviteState};
pub use moderation::{
    DEFAULT_MODERATION_MODEL, ModerationConfig, ModerationResource, ModerationState, model_family,
    models_equivalent, normalize_model,
};
pub use project::{ProjectConfig, ProjectResource, ProjectState};
pub use project_user::{
    ProjectUserConfig, ProjectUserResource, ProjectUserState, RoleDecision, reconcile_role,
};
pub use vector_store::{VectorStoreConfig, VectorStoreResource, VectorStoreState};
pub use vector_store_file::{VectorStoreFileConfig, VectorStoreFileResource, VectorStoreFileState};

const MAX_METADATA_PAIRS: usize = 16;
const MAX_METADATA_KEY_LEN: usize = 64;
const MAX_METADATA_VALUE_LEN: usize = 512;

/// Metadata limits shared by vector stores and assistants.
pub(crate) fn validate_metadata(metadata: &BTreeMap<String, String>) -> Result<(), ResourceError> {
    if metadata.len() > MAX_METADATA_PAIRS {
        return Err(ResourceError::validation(format!(
            "metadata accepts at most {MAX_METADATA_PAIRS} pairs (got {})",
            metadata.len()
        )));
    }
    for (key, value) in metadata {
        if key.chars().count() > MAX_METADATA_KEY_LEN {
            return Err(ResourceError::validation(format!(
                "metadata key `{key}` is longer than {MAX_METADATA_KEY_LEN} characters"
            )));
        }
        if value.chars().count() > MAX_METADATA_VALUE_LEN {
            return Err(ResourceError::validation(format!(
                "metadata value for `{key}` is longer than {MAX_METADATA_VALUE_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Per-resource retry budgets must allow at least one read.
pub(crate) fn validate_retry(retry: Option<RetrySettings>) -> Result<(), ResourceError> {
    match retry {
        Some(retry) if retry.max_attempts < 1 => {
            Err(ResourceError::validation("retry.max_attempts must be at least 1"))
        }
        _ => Ok(()),
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ResourceError> {
    if value.trim().is_empty() {
        return Err(ResourceError::validation(format!("`{field}` must not be empty")));
    }
    Ok(())
}

/// Maps a 404 to `None` so reads can report a deleted object as gone.
pub(crate) fn found<T>(result: Result<T, ClientError>) -> Result<Option<T>, ClientError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Deletes that hit an already-missing object succeed.
pub(crate) fn ignore_not_found<T>(result: Result<T, ClientError>) -> Result<(), ClientError> {
    found(result).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_limits_are_enforced() {
        let mut metadata: BTreeMap<String, String> =
            (0..16).map(|i| (format!("k{i}"), "v".to_string())).collect();
        assert!(validate_metadata(&metadata).is_ok());
        metadata.insert("k16".into(), "v".into());
        assert!(validate_metadata(&metadata).is_err());

        let long_key = BTreeMap::from([("k".repeat(65), "v".to_string())]);
        assert!(validate_metadata(&long_key).is_err());
        let long_value = BTreeMap::from([("k".to_string(), "v".repeat(513))]);
        assert!(validate_metadata(&long_value).is_err());
    }

    #[test]
    fn found_maps_only_404_to_none() {
        assert_eq!(found::<u8>(Err(ClientError::api(404, "gone"))), Ok(None));
        assert_eq!(found(Ok(1)), Ok(Some(1)));
        assert!(found::<u8>(Err(ClientError::api(401, "Unauthorized"))).is_err());
    }
}
