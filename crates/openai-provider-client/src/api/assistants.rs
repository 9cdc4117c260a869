use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::segment;
use crate::client::{ASSISTANTS_BETA, DeletionStatus, OpenAiClient, json_body};
use crate::errors::ClientError;
use crate::transport::ApiRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub tool_resources: Option<Value>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
}

/// Body for both create and modify; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssistantRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

fn assistant_path(assistant_id: &str) -> String {
    format!("/assistants/{}", segment(assistant_id))
}

impl OpenAiClient {
    pub fn create_assistant(&self, request: &AssistantRequest) -> Result<Assistant, ClientError> {
        self.call(ApiRequest::post("/assistants", json_body(request)?).beta(ASSISTANTS_BETA))
    }

    pub fn get_assistant(&self, assistant_id: &str) -> Result<Assistant, ClientError> {
        self.call(ApiRequest::get(assistant_path(assistant_id)).beta(ASSISTANTS_BETA))
    }

    pub fn update_assistant(
        &self,
        assistant_id: &str,
        request: &AssistantRequest,
    ) -> Result<Assistant, ClientError> {
        self.call(
            ApiRequest::post(assistant_path(assistant_id), json_body(request)?)
                .beta(ASSISTANTS_BETA),
        )
    }

    pub fn delete_assistant(&self, assistant_id: &str) -> Result<DeletionStatus, ClientError> {
        self.call(ApiRequest::delete(assistant_path(assistant_id)).beta(ASSISTANTS_BETA))
    }
}
