use std::collections::BTreeMap;

use openai_provider_client::{
    ChunkingStrategy, ClientError, CreateVectorStoreFileRequest, VectorStoreFile,
};
use openai_provider_core::{RetryError, RetrySettings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;
use crate::resources::{ignore_not_found, require_non_empty, validate_retry};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VectorStoreFileConfig {
    pub vector_store_id: String,
    pub file_id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub chunking_strategy: Option<ChunkingStrategy>,
    /// Overrides the provider-wide budget for the visibility wait.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreFileState {
    pub vector_store_id: String,
    pub file_id: String,
    /// `in_progress`, `completed`, `cancelled` or `failed`.
    pub status: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub chunking_strategy: Option<ChunkingStrategy>,
    pub usage_bytes: u64,
    pub created_at: i64,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

impl VectorStoreFileState {
    fn from_api(
        file: VectorStoreFile,
        vector_store_id: &str,
        chunking_strategy: Option<ChunkingStrategy>,
        retry: Option<RetrySettings>,
    ) -> Self {
        Self {
            vector_store_id: vector_store_id.to_string(),
            file_id: file.id,
            status: file.status,
            attributes: file.attributes.unwrap_or_default(),
            chunking_strategy,
            usage_bytes: file.usage_bytes,
            created_at: file.created_at,
            last_error: file.last_error.map(|e| format!("{}: {}", e.code, e.message)),
            retry,
        }
    }
}

/// `openai_vector_store_file`: attaches an uploaded file to a vector store.
///
/// A freshly attached file can answer 404 for a while, so both the
/// post-create confirmation and refreshes go through a retrying reader.
pub struct VectorStoreFileResource;

impl VectorStoreFileResource {
    fn get_visible(
        &self,
        ctx: &ResourceContext,
        retry: Option<RetrySettings>,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<VectorStoreFile, RetryError<ClientError>> {
        let settings = retry.unwrap_or_else(|| ctx.retry_settings());
        ctx.reader_with(settings, "vector_store_file")
            .read(|| ctx.client().get_vector_store_file(vector_store_id, file_id))
    }
}

fn warn_if_failed(state: &VectorStoreFileState, diags: &mut Diagnostics) {
    if state.status == "failed" {
        diags.warning(
            format!(
                "file {} failed to process in vector store {}",
                state.file_id, state.vector_store_id
            ),
            state.last_error.clone().unwrap_or_default(),
        );
    }
}

impl Resource for VectorStoreFileResource {
    type Config = VectorStoreFileConfig;
    type State = VectorStoreFileState;

    fn type_name(&self) -> &'static str {
        "openai_vector_store_file"
    }

    fn validate(&self, config: &VectorStoreFileConfig) -> Result<(), ResourceError> {
        require_non_empty("vector_store_id", &config.vector_store_id)?;
        require_non_empty("file_id", &config.file_id)?;
        if config.attributes.len() > 16 {
            return Err(ResourceError::validation(
                "attributes accepts at most 16 pairs",
            ));
        }
        validate_retry(config.retry)
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &VectorStoreFileConfig,
        diags: &mut Diagnostics,
    ) -> Result<VectorStoreFileState, ResourceError> {
        ctx.client().create_vector_store_file(
            &config.vector_store_id,
            &CreateVectorStoreFileRequest {
                file_id: config.file_id.clone(),
                attributes: config.attributes.clone(),
                chunking_strategy: config.chunking_strategy,
            },
        )?;
        let file = self.get_visible(ctx, config.retry, &config.vector_store_id, &config.file_id)?;
        info!(
            event = "vector_store_file.visible",
            vector_store_id = %config.vector_store_id,
            file_id = %config.file_id,
            status = %file.status
        );
        let state = VectorStoreFileState::from_api(
            file,
            &config.vector_store_id,
            config.chunking_strategy,
            config.retry,
        );
        warn_if_failed(&state, diags);
        Ok(state)
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &VectorStoreFileState,
        diags: &mut Diagnostics,
    ) -> Result<Option<VectorStoreFileState>, ResourceError> {
        match self.get_visible(ctx, state.retry, &state.vector_store_id, &state.file_id) {
            Ok(file) => {
                let refreshed = VectorStoreFileState::from_api(
                    file,
                    &state.vector_store_id,
                    state.chunking_strategy,
                    state.retry,
                );
                warn_if_failed(&refreshed, diags);
                Ok(Some(refreshed))
            }
            Err(RetryError::Exhausted { last, .. }) if last.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn update(
        &self,
        ctx: &ResourceContext,
        config: &VectorStoreFileConfig,
        state: &VectorStoreFileState,
        _diags: &mut Diagnostics,
    ) -> Result<VectorStoreFileState, ResourceError> {
        let file = ctx.client().update_vector_store_file_attributes(
            &state.vector_store_id,
            &state.file_id,
            &config.attributes,
        )?;
        Ok(VectorStoreFileState::from_api(
            file,
            &state.vector_store_id,
            state.chunking_strategy,
            config.retry,
        ))
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &VectorStoreFileState,
        _diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        Ok(ignore_not_found(
            ctx.client()
                .delete_vector_store_file(&state.vector_store_id, &state.file_id),
        )?)
    }

    fn requires_replace(&self, config: &VectorStoreFileConfig, state: &VectorStoreFileState) -> bool {
        config.vector_store_id != state.vector_store_id
            || config.file_id != state.file_id
            || config.chunking_strategy != state.chunking_strategy
    }

    fn needs_update(&self, config: &VectorStoreFileConfig, state: &VectorStoreFileState) -> bool {
        config.attributes != state.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{PlanAction, reconcile};
    use crate::testing::harness;
    use openai_provider_client::Method;
    use serde_json::json;
    use std::time::Duration;

    const FILE_PATH: &str = "/vector_stores/vs_1/files/file-1";

    fn attached(status: &str) -> Value {
        json!({"id": "file-1", "vector_store_id": "vs_1", "status": status, "usage_bytes": 42})
    }

    fn config() -> VectorStoreFileConfig {
        VectorStoreFileConfig {
            vector_store_id: "vs_1".into(),
            file_id: "file-1".into(),
            ..Default::default()
        }
    }

    fn not_found() -> Result<Value, ClientError> {
        Err(ClientError::api(404, "No file found with id 'file-1'."))
    }

    #[test]
    fn create_waits_until_attachment_is_visible() {
        let h = harness();
        h.transport
            .on(Method::Post, "/vector_stores/vs_1/files", Ok(attached("in_progress")));
        h.transport
            .on(Method::Get, FILE_PATH, not_found())
            .on(Method::Get, FILE_PATH, not_found())
            .on(Method::Get, FILE_PATH, Ok(attached("completed")));

        let mut diags = Diagnostics::new();
        let state = VectorStoreFileResource
            .create(&h.ctx, &config(), &mut diags)
            .unwrap();

        assert_eq!(state.status, "completed");
        assert_eq!(state.usage_bytes, 42);
        assert_eq!(h.transport.calls(Method::Get, FILE_PATH), 3);
        assert_eq!(
            h.sleeper.slept(),
            vec![Duration::from_millis(1), Duration::from_millis(2)]
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn create_fails_when_attachment_never_appears() {
        let h = harness();
        h.transport
            .on(Method::Post, "/vector_stores/vs_1/files", Ok(attached("in_progress")));
        h.transport.on(Method::Get, FILE_PATH, not_found());

        let err = VectorStoreFileResource
            .create(&h.ctx, &config(), &mut Diagnostics::new())
            .unwrap_err();

        match err {
            ResourceError::Retry(retry) => {
                assert!(retry.is_exhausted());
                assert_eq!(retry.attempts(), 5);
            }
            other => panic!("expected exhausted retry, got {other:?}"),
        }
        assert_eq!(h.transport.calls(Method::Get, FILE_PATH), 5);
        let total: Duration = h.sleeper.slept().into_iter().sum();
        assert_eq!(total, Duration::from_millis(15));
    }

    #[test]
    fn per_resource_retry_budget_overrides_provider_default() {
        let h = harness();
        h.transport
            .on(Method::Post, "/vector_stores/vs_1/files", Ok(attached("in_progress")));
        h.transport.on(Method::Get, FILE_PATH, not_found());
        let config = VectorStoreFileConfig {
            retry: Some(RetrySettings::new(2, 1)),
            ..config()
        };
        assert!(
            VectorStoreFileResource
                .create(&h.ctx, &config, &mut Diagnostics::new())
                .is_err()
        );
        assert_eq!(h.transport.calls(Method::Get, FILE_PATH), 2);
    }

    #[test]
    fn cancelled_read_is_an_error() {
        let h = harness();
        h.transport.on(Method::Get, FILE_PATH, not_found());
        h.sleeper.cancel_on_sleep(h.ctx.cancel_flag());
        let state = VectorStoreFileState::from_api(
            serde_json::from_value(attached("completed")).unwrap(),
            "vs_1",
            None,
            None,
        );

        let err = VectorStoreFileResource
            .read(&h.ctx, &state, &mut Diagnostics::new())
            .unwrap_err();

        match err {
            ResourceError::Retry(RetryError::Cancelled { attempts, last }) => {
                assert_eq!(attempts, 2);
                assert!(last.is_some_and(|e| e.is_not_found()));
            }
            other => panic!("expected cancelled read, got {other:?}"),
        }
        assert_eq!(h.transport.calls(Method::Get, FILE_PATH), 2);
    }

    #[test]
    fn unauthorized_confirmation_is_not_retried() {
        let h = harness();
        h.transport
            .on(Method::Post, "/vector_stores/vs_1/files", Ok(attached("in_progress")));
        h.transport
            .on(Method::Get, FILE_PATH, Err(ClientError::api(401, "Unauthorized")));
        let err = VectorStoreFileResource
            .create(&h.ctx, &config(), &mut Diagnostics::new())
            .unwrap_err();
        assert!(matches!(err, ResourceError::Retry(RetryError::Failed { attempts: 1, .. })));
        assert!(h.sleeper.slept().is_empty());
    }

    #[test]
    fn failed_processing_is_reported_as_warning() {
        let h = harness();
        h.transport
            .on(Method::Post, "/vector_stores/vs_1/files", Ok(attached("in_progress")));
        h.transport.on(
            Method::Get,
            FILE_PATH,
            Ok(json!({
                "id": "file-1",
                "status": "failed",
                "last_error": {"code": "unsupported_file", "message": "cannot parse"}
            })),
        );
        let mut diags = Diagnostics::new();
        let state = VectorStoreFileResource
            .create(&h.ctx, &config(), &mut diags)
            .unwrap();
        assert_eq!(state.last_error.as_deref(), Some("unsupported_file: cannot parse"));
        assert_eq!(diags.warnings().count(), 1);
        assert!(!diags.has_errors());
    }

    #[test]
    fn detached_file_reads_as_gone_after_retries() {
        let h = harness();
        h.transport.on(Method::Get, FILE_PATH, not_found());
        let state = VectorStoreFileState::from_api(
            serde_json::from_value(attached("completed")).unwrap(),
            "vs_1",
            None,
            None,
        );
        let read = VectorStoreFileResource
            .read(&h.ctx, &state, &mut Diagnostics::new())
            .unwrap();
        assert_eq!(read, None);
        assert_eq!(h.transport.calls(Method::Get, FILE_PATH), 5);
    }

    #[test]
    fn attribute_change_updates_and_store_change_replaces() {
        let state = VectorStoreFileState::from_api(
            serde_json::from_value(attached("completed")).unwrap(),
            "vs_1",
            None,
            None,
        );
        let tagged = VectorStoreFileConfig {
            attributes: BTreeMap::from([("lang".to_string(), json!("en"))]),
            ..config()
        };
        assert!(VectorStoreFileResource.needs_update(&tagged, &state));
        assert!(!VectorStoreFileResource.requires_replace(&tagged, &state));

        let moved = VectorStoreFileConfig {
            vector_store_id: "vs_2".into(),
            ..config()
        };
        assert!(VectorStoreFileResource.requires_replace(&moved, &state));
    }

    #[test]
    fn reapply_with_same_config_is_a_no_op() {
        let h = harness();
        h.transport.on(Method::Get, FILE_PATH, Ok(attached("completed")));
        let prior = VectorStoreFileState::from_api(
            serde_json::from_value(attached("completed")).unwrap(),
            "vs_1",
            None,
            None,
        );
        let (action, _) = reconcile(
            &VectorStoreFileResource,
            &h.ctx,
            &config(),
            Some(&prior),
            &mut Diagnostics::new(),
        )
        .unwrap();
        assert_eq!(action, PlanAction::NoOp);
        assert_eq!(h.transport.calls(Method::Post, "/vector_stores/vs_1/files"), 0);
    }
}
