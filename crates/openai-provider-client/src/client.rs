use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::errors::ClientError;
use crate::transport::{ApiRequest, ApiTransport, ReqwestTransport};

/// Page size requested when walking list endpoints.
pub const PAGE_LIMIT: u32 = 100;

/// Header value required by the Assistants v2 family of endpoints.
pub(crate) const ASSISTANTS_BETA: &str = "assistants=v2";

/// One page of a cursor-paginated list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Response of DELETE endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeletionStatus {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

/// OpenAI REST client shared by every resource and data source.
///
/// Cheap to clone; all clones share one transport.
#[derive(Clone)]
pub struct OpenAiClient {
    transport: Arc<dyn ApiTransport>,
}

impl OpenAiClient {
    /// Creates a client backed by reqwest from explicit configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new(config)?)))
    }

    /// Creates a client from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ProviderConfig::from_env()?)
    }

    pub fn with_transport(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    pub(crate) fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let value = self.transport.send(&request)?;
        decode(value, &request)
    }

    /// Follows `after` cursors until the API reports no more pages.
    pub(crate) fn list_all<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Vec<T>, ClientError> {
        let base = request.set_query("limit", PAGE_LIMIT.to_string());
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page_request = match cursor.as_deref() {
                Some(after) => base.clone().set_query("after", after),
                None => base.clone(),
            };
            let page: ListPage<T> = self.call(page_request)?;
            let next = page.last_id.clone();
            items.extend(page.data);
            if !page.has_more || next.is_none() || next == cursor {
                return Ok(items);
            }
            cursor = next;
        }
    }
}

pub(crate) fn json_body<T: Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Decode(format!("invalid request body: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value, request: &ApiRequest) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| {
        ClientError::Decode(format!(
            "unexpected response for {} {}: {e}",
            request.method, request.path
        ))
    })
}
