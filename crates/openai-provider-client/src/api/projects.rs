use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::segment;
use crate::client::{DeletionStatus, OpenAiClient};
use crate::errors::ClientError;
use crate::transport::ApiRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub archived_at: Option<i64>,
    /// `active` or `archived`.
    #[serde(default)]
    pub status: String,
}

/// Membership of an organization user in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// `owner` or `member`.
    pub role: String,
    #[serde(default)]
    pub added_at: i64,
}

fn project_path(project_id: &str) -> String {
    format!("/organization/projects/{}", segment(project_id))
}

fn member_path(project_id: &str, user_id: &str) -> String {
    format!("{}/users/{}", project_path(project_id), segment(user_id))
}

impl OpenAiClient {
    pub fn create_project(&self, name: &str) -> Result<Project, ClientError> {
        self.call(ApiRequest::post("/organization/projects", json!({ "name": name })).admin())
    }

    pub fn get_project(&self, project_id: &str) -> Result<Project, ClientError> {
        self.call(ApiRequest::get(project_path(project_id)).admin())
    }

    pub fn update_project(&self, project_id: &str, name: &str) -> Result<Project, ClientError> {
        self.call(ApiRequest::post(project_path(project_id), json!({ "name": name })).admin())
    }

    /// Projects cannot be deleted, only archived.
    pub fn archive_project(&self, project_id: &str) -> Result<Project, ClientError> {
        self.call(
            ApiRequest::post(format!("{}/archive", project_path(project_id)), json!({})).admin(),
        )
    }

    pub fn list_projects(&self, include_archived: bool) -> Result<Vec<Project>, ClientError> {
        self.list_all(
            ApiRequest::get("/organization/projects")
                .query("include_archived", include_archived.to_string())
                .admin(),
        )
    }

    pub fn add_project_user(
        &self,
        project_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<ProjectUser, ClientError> {
        self.call(
            ApiRequest::post(
                format!("{}/users", project_path(project_id)),
                json!({ "user_id": user_id, "role": role }),
            )
            .admin(),
        )
    }

    pub fn get_project_user(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> Result<ProjectUser, ClientError> {
        self.call(ApiRequest::get(member_path(project_id, user_id)).admin())
    }

    pub fn update_project_user(
        &self,
        project_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<ProjectUser, ClientError> {
        self.call(
            ApiRequest::post(member_path(project_id, user_id), json!({ "role": role })).admin(),
        )
    }

    pub fn remove_project_user(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> Result<DeletionStatus, ClientError> {
        self.call(ApiRequest::delete(member_path(project_id, user_id)).admin())
    }

    pub fn list_project_users(&self, project_id: &str) -> Result<Vec<ProjectUser>, ClientError> {
        self.list_all(ApiRequest::get(format!("{}/users", project_path(project_id))).admin())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::mock_client;
    use crate::transport::{AuthScope, Method};
    use serde_json::json;

    #[test]
    fn project_endpoints_use_admin_scope() {
        let (transport, client) = mock_client();
        transport.on(
            Method::Post,
            "/organization/projects/proj_1/archive",
            Ok(json!({"id":"proj_1","name":"p","status":"archived","archived_at":10})),
        );
        let project = client.archive_project("proj_1").unwrap();
        assert_eq!(project.status, "archived");
        assert_eq!(transport.requests()[0].auth, AuthScope::Admin);
    }

    #[test]
    fn list_projects_passes_archived_flag() {
        let (transport, client) = mock_client();
        transport.on(
            Method::Get,
            "/organization/projects",
            Ok(json!({"data":[{"id":"proj_1","name":"a"}],"has_more":false})),
        );
        let projects = client.list_projects(true).unwrap();
        assert_eq!(projects.len(), 1);
        assert!(
            transport.requests()[0]
                .query
                .contains(&("include_archived".to_string(), "true".to_string()))
        );
    }
}
