use std::collections::BTreeMap;

use openai_provider_client::{
    ChunkingStrategy, CreateVectorStoreRequest, ExpiresAfter, FileCounts, UpdateVectorStoreRequest,
    VectorStore,
};
use serde::{Deserialize, Serialize};

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;
use crate::resources::{found, ignore_not_found, validate_metadata};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Files attached at creation time only.
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub expires_after: Option<ExpiresAfter>,
    #[serde(default)]
    pub chunking_strategy: Option<ChunkingStrategy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStoreState {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub expires_after: Option<ExpiresAfter>,
    #[serde(default)]
    pub chunking_strategy: Option<ChunkingStrategy>,
    pub status: String,
    pub usage_bytes: u64,
    pub file_counts: FileCounts,
    pub created_at: i64,
}

impl VectorStoreState {
    /// Merges an API response with the create-only fields kept from config or prior state.
    fn from_api(
        store: VectorStore,
        file_ids: Vec<String>,
        chunking_strategy: Option<ChunkingStrategy>,
    ) -> Self {
        Self {
            id: store.id,
            name: store.name,
            file_ids,
            metadata: store.metadata.unwrap_or_default(),
            expires_after: store.expires_after,
            chunking_strategy,
            status: store.status,
            usage_bytes: store.usage_bytes,
            file_counts: store.file_counts,
            created_at: store.created_at,
        }
    }
}

/// `openai_vector_store`.
pub struct VectorStoreResource;

impl Resource for VectorStoreResource {
    type Config = VectorStoreConfig;
    type State = VectorStoreState;

    fn type_name(&self) -> &'static str {
        "openai_vector_store"
    }

    fn validate(&self, config: &VectorStoreConfig) -> Result<(), ResourceError> {
        validate_metadata(&config.metadata)?;
        if let Some(expiry) = &config.expires_after {
            if expiry.anchor != "last_active_at" {
                return Err(ResourceError::validation(format!(
                    "expires_after.anchor must be `last_active_at` (got `{}`)",
                    expiry.anchor
                )));
            }
            if !(1..=365).contains(&expiry.days) {
                return Err(ResourceError::validation(
                    "expires_after.days must be between 1 and 365",
                ));
            }
        }
        Ok(())
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &VectorStoreConfig,
        _diags: &mut Diagnostics,
    ) -> Result<VectorStoreState, ResourceError> {
        let store = ctx.client().create_vector_store(&CreateVectorStoreRequest {
            name: config.name.clone(),
            file_ids: config.file_ids.clone(),
            metadata: config.metadata.clone(),
            expires_after: config.expires_after.clone(),
            chunking_strategy: config.chunking_strategy,
        })?;
        Ok(VectorStoreState::from_api(
            store,
            config.file_ids.clone(),
            config.chunking_strategy,
        ))
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &VectorStoreState,
        diags: &mut Diagnostics,
    ) -> Result<Option<VectorStoreState>, ResourceError> {
        let Some(store) = found(ctx.client().get_vector_store(&state.id))? else {
            return Ok(None);
        };
        if store.status == "expired" {
            diags.warning(
                format!("vector store {} has expired", state.id),
                "Expired vector stores can no longer be used and will be recreated.",
            );
            return Ok(None);
        }
        Ok(Some(VectorStoreState::from_api(
            store,
            state.file_ids.clone(),
            state.chunking_strategy,
        )))
    }

    fn update(
        &self,
        ctx: &ResourceContext,
        config: &VectorStoreConfig,
        state: &VectorStoreState,
        _diags: &mut Diagnostics,
    ) -> Result<VectorStoreState, ResourceError> {
        let store = ctx.client().update_vector_store(
            &state.id,
            &UpdateVectorStoreRequest {
                name: config.name.clone(),
                metadata: Some(config.metadata.clone()),
                expires_after: config.expires_after.clone(),
            },
        )?;
        Ok(VectorStoreState::from_api(
            store,
            state.file_ids.clone(),
            state.chunking_strategy,
        ))
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &VectorStoreState,
        _diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        Ok(ignore_not_found(ctx.client().delete_vector_store(&state.id))?)
    }

    fn requires_replace(&self, config: &VectorStoreConfig, state: &VectorStoreState) -> bool {
        config.file_ids != state.file_ids || config.chunking_strategy != state.chunking_strategy
    }

    fn needs_update(&self, config: &VectorStoreConfig, state: &VectorStoreState) -> bool {
        config.name != state.name
            || config.metadata != state.metadata
            || config.expires_after != state.expires_after
    }
}
