use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::segment;
use crate::client::{ASSISTANTS_BETA, DeletionStatus, OpenAiClient, json_body};
use crate::errors::ClientError;
use crate::transport::ApiRequest;

/// Expiration policy for a vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiresAfter {
    /// Currently only `last_active_at`.
    pub anchor: String,
    pub days: u32,
}

/// Static chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticChunking {
    pub max_chunk_size_tokens: u32,
    pub chunk_overlap_tokens: u32,
}

/// How files are split before embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkingStrategy {
    Auto,
    Static {
        #[serde(rename = "static")]
        config: StaticChunking,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub cancelled: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStore {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub usage_bytes: u64,
    #[serde(default)]
    pub file_counts: FileCounts,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub expires_after: Option<ExpiresAfter>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateVectorStoreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<ExpiresAfter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunking_strategy: Option<ChunkingStrategy>,
}

/// Fields left as `None` are not sent and keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateVectorStoreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<ExpiresAfter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStoreFileError {
    pub code: String,
    pub message: String,
}

/// A file attached to a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreFile {
    pub id: String,
    #[serde(default)]
    pub vector_store_id: String,
    /// `in_progress`, `completed`, `cancelled` or `failed`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub usage_bytes: u64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub last_error: Option<VectorStoreFileError>,
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub chunking_strategy: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateVectorStoreFileRequest {
    pub file_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunking_strategy: Option<ChunkingStrategy>,
}

fn store_path(vector_store_id: &str) -> String {
    format!("/vector_stores/{}", segment(vector_store_id))
}

fn store_file_path(vector_store_id: &str, file_id: &str) -> String {
    format!("{}/files/{}", store_path(vector_store_id), segment(file_id))
}

impl OpenAiClient {
    pub fn create_vector_store(
        &self,
        request: &CreateVectorStoreRequest,
    ) -> Result<VectorStore, ClientError> {
        self.call(ApiRequest::post("/vector_stores", json_body(request)?).beta(ASSISTANTS_BETA))
    }

    pub fn get_vector_store(&self, vector_store_id: &str) -> Result<VectorStore, ClientError> {
        self.call(ApiRequest::get(store_path(vector_store_id)).beta(ASSISTANTS_BETA))
    }

    pub fn update_vector_store(
        &self,
        vector_store_id: &str,
        request: &UpdateVectorStoreRequest,
    ) -> Result<VectorStore, ClientError> {
        self.call(
            ApiRequest::post(store_path(vector_store_id), json_body(request)?)
                .beta(ASSISTANTS_BETA),
        )
    }

    pub fn delete_vector_store(
        &self,
        vector_store_id: &str,
    ) -> Result<DeletionStatus, ClientError> {
        self.call(ApiRequest::delete(store_path(vector_store_id)).beta(ASSISTANTS_BETA))
    }

    pub fn list_vector_stores(&self) -> Result<Vec<VectorStore>, ClientError> {
        self.list_all(ApiRequest::get("/vector_stores").beta(ASSISTANTS_BETA))
    }

    /// Attaches an uploaded file to a vector store.
    ///
    /// The attachment is not always readable immediately afterwards; callers
    /// confirm it with a retrying read.
    pub fn create_vector_store_file(
        &self,
        vector_store_id: &str,
        request: &CreateVectorStoreFileRequest,
    ) -> Result<VectorStoreFile, ClientError> {
        self.call(
            ApiRequest::post(format!("{}/files", store_path(vector_store_id)), json_body(request)?)
                .beta(ASSISTANTS_BETA),
        )
    }

    pub fn get_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<VectorStoreFile, ClientError> {
        self.call(ApiRequest::get(store_file_path(vector_store_id, file_id)).beta(ASSISTANTS_BETA))
    }

    pub fn update_vector_store_file_attributes(
        &self,
        vector_store_id: &str,
        file_id: &str,
        attributes: &BTreeMap<String, Value>,
    ) -> Result<VectorStoreFile, ClientError> {
        self.call(
            ApiRequest::post(
                store_file_path(vector_store_id, file_id),
                serde_json::json!({ "attributes": attributes }),
            )
            .beta(ASSISTANTS_BETA),
        )
    }

    /// Detaches the file from the store; the file itself is kept.
    pub fn delete_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<DeletionStatus, ClientError> {
        self.call(
            ApiRequest::delete(store_file_path(vector_store_id, file_id))
                .beta(ASSISTANTS_BETA),
        )
    }

    pub fn list_vector_store_files(
        &self,
        vector_store_id: &str,
        status: Option<&str>,
    ) -> Result<Vec<VectorStoreFile>, ClientError> {
        let mut request = ApiRequest::get(format!("{}/files", store_path(vector_store_id)))
            .beta(ASSISTANTS_BETA);
        if let Some(status) = status {
            request = request.query("filter", status);
        }
        self.list_all(request)
    }
}
