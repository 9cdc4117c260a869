use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::errors::ClientError;

/// HTTP verbs used by the OpenAI REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

/// Which credential an endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    /// Regular project-scoped endpoints (files, vector stores, assistants).
    Project,
    /// Organization administration endpoints (projects, users, invites).
    Admin,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Multipart upload of a local file plus plain text fields.
    File {
        field: String,
        path: PathBuf,
        fields: Vec<(String, String)>,
    },
}

/// Transport-agnostic description of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL (for example `/files/file-1`).
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub auth: AuthScope,
    /// Value for the `OpenAI-Beta` header.
    pub beta: Option<&'static str>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            auth: AuthScope::Project,
            beta: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut req = Self::new(Method::Post, path);
        req.body = RequestBody::Json(body);
        req
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn upload(
        path: impl Into<String>,
        field: impl Into<String>,
        file: impl Into<PathBuf>,
        fields: Vec<(String, String)>,
    ) -> Self {
        let mut req = Self::new(Method::Post, path);
        req.body = RequestBody::File {
            field: field.into(),
            path: file.into(),
            fields,
        };
        req
    }

    pub fn admin(mut self) -> Self {
        self.auth = AuthScope::Admin;
        self
    }

    pub fn beta(mut self, value: &'static str) -> Self {
        self.beta = Some(value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Replaces any existing value for `key`.
    pub fn set_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.into()));
        self
    }
}

/// Sends [`ApiRequest`]s and returns the decoded JSON body.
///
/// The client talks to the API only through this trait so tests can swap in
/// a scripted transport.
pub trait ApiTransport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<Value, ClientError>;
}

/// Default transport using a blocking reqwest client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    config: ProviderConfig,
}

impl ReqwestTransport {
    pub fn new(config: ProviderConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("openai-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build OpenAI client: {e}")))?;
        Ok(Self { client, config })
    }
}

impl ApiTransport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> Result<Value, ClientError> {
        let url = self.config.endpoint_url(&request.path);
        let key = self.config.key_for(request.auth)?;
        let request_id = uuid::Uuid::new_v4();

        let mut http = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        }
        .bearer_auth(key)
        .header("X-Client-Request-Id", request_id.to_string());
        if let Some(org) = self.config.organization_id.as_deref() {
            http = http.header("OpenAI-Organization", org);
        }
        if let Some(beta) = request.beta {
            http = http.header("OpenAI-Beta", beta);
        }
        if !request.query.is_empty() {
            http = http.query(&request.query);
        }
        http = match &request.body {
            RequestBody::Empty => http,
            RequestBody::Json(body) => http.json(body),
            RequestBody::File {
                field,
                path,
                fields,
            } => {
                let mut form = reqwest::blocking::multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                let form = form.file(field.clone(), path).map_err(|e| {
                    ClientError::Io(format!("failed to read {}: {e}", path.display()))
                })?;
                http.multipart(form)
            }
        };

        debug!(
            event = "api.request",
            method = %request.method,
            path = %request.path,
            request_id = %request_id
        );
        let response = http.send().map_err(|e| {
            ClientError::Transport(format!("{} {} failed: {e}", request.method, request.path))
        })?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ClientError::Transport(format!("failed to read response body: {e}")))?;
        debug!(
            event = "api.response",
            method = %request.method,
            path = %request.path,
            request_id = %request_id,
            status = status.as_u16(),
            response_bytes = text.len() as u64
        );
        if !status.is_success() {
            return Err(ClientError::api(
                status.as_u16(),
                error_message(&text, status.canonical_reason()),
            ));
        }
        decode_body(&text)
    }
}

/// Extracts `error.message` from an OpenAI error body, falling back to the raw text.
pub(crate) fn error_message(body: &str, reason: Option<&str>) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|m| m.as_str())
        .filter(|m| !m.trim().is_empty())
    {
        return message.to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("<empty body>").to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn decode_body(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ClientError::Decode(format!("invalid JSON body: {e}")))
}
