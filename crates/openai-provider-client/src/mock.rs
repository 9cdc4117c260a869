//! Scripted in-memory transport.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use crate::errors::ClientError;
use crate::transport::{ApiRequest, ApiTransport, Method};

type Route = (Method, String);

/// Replays queued responses per `(method, path)` and records every request.
///
/// The last queued response for a route is sticky: it is returned again for
/// every further call, so "always fails" needs a single entry.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<Route, VecDeque<Result<Value, ClientError>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `method` + `path` (query string ignored).
    pub fn on(&self, method: Method, path: &str, response: Result<Value, ClientError>) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of calls made to `method` + `path`.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

impl ApiTransport for MockTransport {
    fn send(&self, request: &ApiRequest) -> Result<Value, ClientError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let Some(queue) = routes.get_mut(&(request.method, request.path.clone())) else {
            return Err(ClientError::api(
                501,
                format!("no mock response for {} {}", request.method, request.path),
            ));
        };
        if queue.len() > 1
            && let Some(response) = queue.pop_front()
        {
            return response;
        }
        queue.front().cloned().unwrap_or_else(|| {
            Err(ClientError::api(
                501,
                format!("no mock response for {} {}", request.method, request.path),
            ))
        })
    }
}
