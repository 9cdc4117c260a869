use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::segment;
use crate::client::{DeletionStatus, OpenAiClient};
use crate::errors::ClientError;
use crate::transport::ApiRequest;

/// Uploaded file metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl OpenAiClient {
    /// Uploads a local file with the given purpose (`assistants`, `batch`, ...).
    pub fn upload_file(&self, path: &Path, purpose: &str) -> Result<FileObject, ClientError> {
        if !path.is_file() {
            return Err(ClientError::Io(format!(
                "file to upload does not exist: {}",
                path.display()
            )));
        }
        self.call(ApiRequest::upload(
            "/files",
            "file",
            path,
            vec![("purpose".to_string(), purpose.to_string())],
        ))
    }

    pub fn get_file(&self, file_id: &str) -> Result<FileObject, ClientError> {
        self.call(ApiRequest::get(format!("/files/{}", segment(file_id))))
    }

    pub fn delete_file(&self, file_id: &str) -> Result<DeletionStatus, ClientError> {
        self.call(ApiRequest::delete(format!("/files/{}", segment(file_id))))
    }

    pub fn list_files(&self, purpose: Option<&str>) -> Result<Vec<FileObject>, ClientError> {
        let mut request = ApiRequest::get("/files");
        if let Some(purpose) = purpose {
            request = request.query("purpose", purpose);
        }
        self.list_all(request)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::mock_client;
    use crate::transport::{Method, RequestBody};

    #[test]
    fn upload_sends_multipart_with_purpose() {
        let (transport, client) = mock_client();
        transport.on(
            Method::Post,
            "/files",
            Ok(json!({"id":"file-1","bytes":5,"created_at":1,"filename":"a.txt","purpose":"assistants"})),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let file = client.upload_file(&path, "assistants").unwrap();
        assert_eq!(file.id, "file-1");
        let request = &transport.requests()[0];
        match &request.body {
            RequestBody::File { field, fields, .. } => {
                assert_eq!(field, "file");
                assert_eq!(fields[0], ("purpose".to_string(), "assistants".to_string()));
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn upload_of_missing_path_fails_locally() {
        let (transport, client) = mock_client();
        let err = client
            .upload_file(std::path::Path::new("/definitely/missing.jsonl"), "batch")
            .unwrap_err();
        assert!(matches!(err, crate::ClientError::Io(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn list_files_follows_cursor() {
        let (transport, client) = mock_client();
        transport
            .on(
                Method::Get,
                "/files",
                Ok(json!({"data":[{"id":"file-1"}],"last_id":"file-1","has_more":true})),
            )
            .on(
                Method::Get,
                "/files",
                Ok(json!({"data":[{"id":"file-2"}],"last_id":"file-2","has_more":false})),
            );
        let files = client.list_files(Some("assistants")).unwrap();
        let ids: Vec<_> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["file-1", "file-2"]);
        let second = &transport.requests()[1];
        assert!(
            second
                .query
                .contains(&("after".to_string(), "file-1".to_string()))
        );
        assert!(
            second
                .query
                .contains(&("purpose".to_string(), "assistants".to_string()))
        );
    }
}
