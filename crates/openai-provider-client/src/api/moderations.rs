use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::{OpenAiClient, json_body};
use crate::errors::ClientError;
use crate::transport::ApiRequest;

/// Single string or a batch of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModerationInput {
    Text(String),
    Batch(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationRequest {
    pub input: ModerationInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub id: String,
    /// Concrete model that served the request, e.g. `omni-moderation-2024-09-26`.
    pub model: String,
    #[serde(default)]
    pub results: Vec<ModerationResult>,
}

impl OpenAiClient {
    pub fn create_moderation(
        &self,
        request: &ModerationRequest,
    ) -> Result<ModerationResponse, ClientError> {
        self.call(ApiRequest::post("/moderations", json_body(request)?))
    }
}
