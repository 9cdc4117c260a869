use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;
use crate::resources::{found, ignore_not_found};

const PURPOSES: &[&str] = &["assistants", "batch", "fine-tune", "vision", "user_data", "evals"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    /// Local file to upload.
    pub path: PathBuf,
    #[serde(default = "default_purpose")]
    pub purpose: String,
}

fn default_purpose() -> String {
    "assistants".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    pub id: String,
    pub path: PathBuf,
    pub purpose: String,
    pub filename: String,
    pub bytes: u64,
    pub created_at: i64,
}

/// `openai_file`: a file uploaded from the local filesystem.
pub struct FileResource;

impl Resource for FileResource {
    type Config = FileConfig;
    type State = FileState;

    fn type_name(&self) -> &'static str {
        "openai_file"
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ResourceError> {
        if !PURPOSES.contains(&config.purpose.as_str()) {
            return Err(ResourceError::validation(format!(
                "unsupported file purpose `{}` (expected one of: {})",
                config.purpose,
                PURPOSES.join(", ")
            )));
        }
        if config.path.as_os_str().is_empty() {
            return Err(ResourceError::validation("`path` must not be empty"));
        }
        Ok(())
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &FileConfig,
        _diags: &mut Diagnostics,
    ) -> Result<FileState, ResourceError> {
        let file = ctx.client().upload_file(&config.path, &config.purpose)?;
        Ok(FileState {
            id: file.id,
            path: config.path.clone(),
            purpose: file.purpose,
            filename: file.filename,
            bytes: file.bytes,
            created_at: file.created_at,
        })
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &FileState,
        _diags: &mut Diagnostics,
    ) -> Result<Option<FileState>, ResourceError> {
        let Some(file) = found(ctx.client().get_file(&state.id))? else {
            return Ok(None);
        };
        Ok(Some(FileState {
            id: file.id,
            path: state.path.clone(),
            purpose: file.purpose,
            filename: file.filename,
            bytes: file.bytes,
            created_at: file.created_at,
        }))
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &FileState,
        _diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        Ok(ignore_not_found(ctx.client().delete_file(&state.id))?)
    }

    fn requires_replace(&self, config: &FileConfig, state: &FileState) -> bool {
        config.path != state.path || config.purpose != state.purpose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{PlanAction, reconcile};
    use crate::testing::harness;
    use openai_provider_client::{ClientError, Method, RequestBody};
    use serde_json::json;
    use std::io::Write;

    fn uploaded(id: &str) -> serde_json::Value {
        json!({"id": id, "bytes": 5, "created_at": 1, "filename": "notes.txt", "purpose": "assistants"})
    }

    #[test]
    fn create_uploads_with_purpose_field() {
        let h = harness();
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "hello").unwrap();
        h.transport.on(Method::Post, "/files", Ok(uploaded("file-1")));

        let config = FileConfig {
            path: tmp.path().to_path_buf(),
            purpose: "assistants".into(),
        };
        let mut diags = Diagnostics::new();
        let (action, state) = reconcile(&FileResource, &h.ctx, &config, None, &mut diags).unwrap();

        assert_eq!(action, PlanAction::Create);
        assert_eq!(state.id, "file-1");
        assert_eq!(state.path, tmp.path());
        match &h.transport.requests()[0].body {
            RequestBody::File { field, fields, .. } => {
                assert_eq!(field, "file");
                assert_eq!(fields, &vec![("purpose".to_string(), "assistants".to_string())]);
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn unknown_purpose_is_rejected_before_any_call() {
        let h = harness();
        let config = FileConfig {
            path: "notes.txt".into(),
            purpose: "training".into(),
        };
        let err = reconcile(&FileResource, &h.ctx, &config, None, &mut Diagnostics::new())
            .unwrap_err();
        assert!(matches!(err, ResourceError::Validation(_)));
        assert!(h.transport.requests().is_empty());
    }

    #[test]
    fn missing_file_reads_as_gone() {
        let h = harness();
        h.transport.on(
            Method::Get,
            "/files/file-1",
            Err(ClientError::api(404, "No such File object: file-1")),
        );
        let state = FileState {
            id: "file-1".into(),
            path: "notes.txt".into(),
            purpose: "assistants".into(),
            filename: "notes.txt".into(),
            bytes: 5,
            created_at: 1,
        };
        let read = FileResource
            .read(&h.ctx, &state, &mut Diagnostics::new())
            .unwrap();
        assert_eq!(read, None);
    }

    #[test]
    fn changing_purpose_requires_replacement() {
        let state = FileState {
            id: "file-1".into(),
            path: "notes.txt".into(),
            purpose: "assistants".into(),
            filename: "notes.txt".into(),
            bytes: 5,
            created_at: 1,
        };
        let same = FileConfig {
            path: "notes.txt".into(),
            purpose: "assistants".into(),
        };
        let changed = FileConfig {
            purpose: "batch".into(),
            ..same.clone()
        };
        assert!(!FileResource.requires_replace(&same, &state));
        assert!(FileResource.requires_replace(&changed, &state));
    }

    #[test]
    fn delete_of_missing_file_succeeds() {
        let h = harness();
        h.transport.on(
            Method::Delete,
            "/files/file-1",
            Err(ClientError::api(404, "not found")),
        );
        let state = FileState {
            id: "file-1".into(),
            path: "notes.txt".into(),
            purpose: "assistants".into(),
            filename: "notes.txt".into(),
            bytes: 5,
            created_at: 1,
        };
        assert!(FileResource.delete(&h.ctx, &state, &mut Diagnostics::new()).is_ok());
    }
}
