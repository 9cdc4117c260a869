use serde::{Deserialize, Serialize};

use crate::api::segment;
use crate::client::{DeletionStatus, OpenAiClient, json_body};
use crate::errors::ClientError;
use crate::transport::ApiRequest;

/// Project granted to the invitee once the invite is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteProject {
    pub id: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: String,
    pub email: String,
    pub role: String,
    /// `pending`, `accepted` or `expired`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub invited_at: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub accepted_at: Option<i64>,
    #[serde(default)]
    pub projects: Vec<InviteProject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateInviteRequest {
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<InviteProject>,
}

fn invite_path(invite_id: &str) -> String {
    format!("/organization/invites/{}", segment(invite_id))
}

impl OpenAiClient {
    pub fn create_invite(&self, request: &CreateInviteRequest) -> Result<Invite, ClientError> {
        self.call(ApiRequest::post("/organization/invites", json_body(request)?).admin())
    }

    pub fn get_invite(&self, invite_id: &str) -> Result<Invite, ClientError> {
        self.call(ApiRequest::get(invite_path(invite_id)).admin())
    }

    pub fn delete_invite(&self, invite_id: &str) -> Result<DeletionStatus, ClientError> {
        self.call(ApiRequest::delete(invite_path(invite_id)).admin())
    }

    pub fn list_invites(&self) -> Result<Vec<Invite>, ClientError> {
        self.list_all(ApiRequest::get("/organization/invites").admin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_client;
    use crate::transport::{Method, RequestBody};
    use serde_json::json;

    #[test]
    fn create_invite_sends_project_assignments() {
        let (transport, client) = mock_client();
        transport.on(
            Method::Post,
            "/organization/invites",
            Ok(json!({"id":"invite-1","email":"a@example.com","role":"reader","status":"pending",
                "projects":[{"id":"proj_1","role":"member"}]})),
        );
        let invite = client
            .create_invite(&CreateInviteRequest {
                email: "a@example.com".into(),
                role: "reader".into(),
                projects: vec![InviteProject {
                    id: "proj_1".into(),
                    role: "member".into(),
                }],
            })
            .unwrap();
        assert_eq!(invite.status, "pending");
        assert_eq!(
            transport.requests()[0].body,
            RequestBody::Json(json!({"email":"a@example.com","role":"reader",
                "projects":[{"id":"proj_1","role":"member"}]}))
        );
    }
}
