//! Typed endpoint groups. Each file adds methods to [`OpenAiClient`](crate::OpenAiClient).

pub mod assistants;
pub mod files;
pub mod invites;
pub mod moderations;
pub mod projects;
pub mod users;
pub mod vector_stores;

use std::borrow::Cow;

/// Percent-encodes an id for use as one URL path segment.
pub(crate) fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

#[cfg(test)]
pub(crate) fn mock_client() -> (
    std::sync::Arc<crate::mock::MockTransport>,
    crate::OpenAiClient,
) {
    let transport = std::sync::Arc::new(crate::mock::MockTransport::new());
    let client = crate::OpenAiClient::with_transport(transport.clone());
    (transport, client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;
    use serde_json::json;

    #[test]
    fn ids_cannot_escape_their_path_segment() {
        assert_eq!(segment("vs_abc123"), "vs_abc123");
        assert_eq!(segment("vs_1/files"), "vs_1%2Ffiles");
        assert_eq!(segment("file-1?limit=1"), "file-1%3Flimit%3D1");
    }

    #[test]
    fn encoded_ids_reach_the_intended_endpoint() {
        let (transport, client) = mock_client();
        transport.on(
            Method::Get,
            "/vector_stores/vs_1%2Fx/files/file%3F1",
            Ok(json!({"id": "file?1", "status": "completed"})),
        );
        let file = client.get_vector_store_file("vs_1/x", "file?1").unwrap();
        assert_eq!(file.status, "completed");
        assert_eq!(transport.calls(Method::Get, "/vector_stores/vs_1/x/files/file?1"), 0);
    }
}
