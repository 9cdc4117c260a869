use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::DataSource;
use crate::resources::require_non_empty;

const STATUSES: &[&str] = &["in_progress", "completed", "failed", "cancelled"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VectorStoreFilesConfig {
    pub vector_store_id: String,
    /// Only files in this processing state.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorStoreFileSummary {
    pub file_id: String,
    pub status: String,
    pub usage_bytes: u64,
    pub created_at: i64,
    pub attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorStoreFilesState {
    pub vector_store_id: String,
    pub files: Vec<VectorStoreFileSummary>,
}

/// `openai_vector_store_files`: files attached to one vector store.
pub struct VectorStoreFilesDataSource;

impl DataSource for VectorStoreFilesDataSource {
    type Config = VectorStoreFilesConfig;
    type State = VectorStoreFilesState;

    fn type_name(&self) -> &'static str {
        "openai_vector_store_files"
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        config: &VectorStoreFilesConfig,
        diags: &mut Diagnostics,
    ) -> Result<VectorStoreFilesState, ResourceError> {
        require_non_empty("vector_store_id", &config.vector_store_id)?;
        if let Some(status) = config.status.as_deref()
            && !STATUSES.contains(&status)
        {
            return Err(ResourceError::validation(format!(
                "status must be one of {} (got `{status}`)",
                STATUSES.join(", ")
            )));
        }
        let files = ctx
            .client()
            .list_vector_store_files(&config.vector_store_id, config.status.as_deref())?;
        let failed = files.iter().filter(|f| f.status == "failed").count();
        if failed > 0 && config.status.is_none() {
            diags.warning(
                format!("{failed} file(s) in {} failed processing", config.vector_store_id),
                "",
            );
        }
        Ok(VectorStoreFilesState {
            vector_store_id: config.vector_store_id.clone(),
            files: files
                .into_iter()
                .map(|f| VectorStoreFileSummary {
                    file_id: f.id,
                    status: f.status,
                    usage_bytes: f.usage_bytes,
                    created_at: f.created_at,
                    attributes: f.attributes.unwrap_or_default(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::harness;
    use openai_provider_client::Method;
    use serde_json::json;

    #[test]
    fn status_filter_is_forwarded() {
        let h = harness();
        h.transport.on(
            Method::Get,
            "/vector_stores/vs_1/files",
            Ok(json!({
                "data": [{"id": "file-1", "status": "completed", "usage_bytes": 10}],
                "has_more": false
            })),
        );
        let config = VectorStoreFilesConfig {
            vector_store_id: "vs_1".into(),
            status: Some("completed".into()),
        };
        let state = VectorStoreFilesDataSource
            .read(&h.ctx, &config, &mut Diagnostics::new())
            .unwrap();
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.files[0].file_id, "file-1");
        assert!(
            h.transport.requests()[0]
                .query
                .contains(&("filter".to_string(), "completed".to_string()))
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let h = harness();
        let config = VectorStoreFilesConfig {
            vector_store_id: "vs_1".into(),
            status: Some("done".into()),
        };
        assert!(matches!(
            VectorStoreFilesDataSource.read(&h.ctx, &config, &mut Diagnostics::new()),
            Err(ResourceError::Validation(_))
        ));
        assert!(h.transport.requests().is_empty());
    }

    #[test]
    fn failed_files_produce_a_warning() {
        let h = harness();
        h.transport.on(
            Method::Get,
            "/vector_stores/vs_1/files",
            Ok(json!({
                "data": [
                    {"id": "file-1", "status": "completed"},
                    {"id": "file-2", "status": "failed"}
                ],
                "has_more": false
            })),
        );
        let mut diags = Diagnostics::new();
        let config = VectorStoreFilesConfig {
            vector_store_id: "vs_1".into(),
            status: None,
        };
        VectorStoreFilesDataSource.read(&h.ctx, &config, &mut diags).unwrap();
        assert_eq!(diags.warnings().count(), 1);
    }
}
