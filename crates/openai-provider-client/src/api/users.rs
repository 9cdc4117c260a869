use serde::{Deserialize, Serialize};

use crate::api::segment;
use crate::client::OpenAiClient;
use crate::errors::ClientError;
use crate::transport::ApiRequest;

/// Member of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// `owner` or `reader`.
    pub role: String,
    #[serde(default)]
    pub added_at: i64,
}

impl OpenAiClient {
    pub fn get_user(&self, user_id: &str) -> Result<OrganizationUser, ClientError> {
        self.call(ApiRequest::get(format!("/organization/users/{}", segment(user_id))).admin())
    }

    pub fn list_users(&self) -> Result<Vec<OrganizationUser>, ClientError> {
        self.list_all(ApiRequest::get("/organization/users").admin())
    }

    /// Case-insensitive lookup by email over all organization users.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<OrganizationUser>, ClientError> {
        let users = self.list_users()?;
        Ok(users.into_iter().find(|u| {
            u.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email.trim()))
        }))
    }
}
