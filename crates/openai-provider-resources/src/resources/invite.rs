use openai_provider_client::{CreateInviteRequest, Invite, InviteProject};
use serde::{Deserialize, Serialize};

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;
use crate::resources::{found, ignore_not_found, require_non_empty};

const ORG_ROLES: &[&str] = &["reader", "owner"];
const PROJECT_ROLES: &[&str] = &["member", "owner"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InviteConfig {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    /// Projects the invitee joins on acceptance.
    #[serde(default)]
    pub projects: Vec<InviteProject>,
}

fn default_role() -> String {
    "reader".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteState {
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub projects: Vec<InviteProject>,
    /// `pending`, `accepted` or `expired`.
    pub status: String,
    pub invited_at: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl From<Invite> for InviteState {
    fn from(i: Invite) -> Self {
        Self {
            id: i.id,
            email: i.email,
            role: i.role,
            projects: i.projects,
            status: i.status,
            invited_at: i.invited_at,
            expires_at: i.expires_at,
        }
    }
}

/// `openai_invite`: invitation of an email address to the organization.
pub struct InviteResource;

impl Resource for InviteResource {
    type Config = InviteConfig;
    type State = InviteState;

    fn type_name(&self) -> &'static str {
        "openai_invite"
    }

    fn validate(&self, config: &InviteConfig) -> Result<(), ResourceError> {
        require_non_empty("email", &config.email)?;
        if !config.email.contains('@') {
            return Err(ResourceError::validation(format!(
                "`{}` is not an email address",
                config.email
            )));
        }
        if !ORG_ROLES.contains(&config.role.as_str()) {
            return Err(ResourceError::validation(format!(
                "role must be one of {} (got `{}`)",
                ORG_ROLES.join(", "),
                config.role
            )));
        }
        for project in &config.projects {
            require_non_empty("projects.id", &project.id)?;
            if !PROJECT_ROLES.contains(&project.role.as_str()) {
                return Err(ResourceError::validation(format!(
                    "project role must be one of {} (got `{}`)",
                    PROJECT_ROLES.join(", "),
                    project.role
                )));
            }
        }
        Ok(())
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &InviteConfig,
        _diags: &mut Diagnostics,
    ) -> Result<InviteState, ResourceError> {
        let invite = ctx.client().create_invite(&CreateInviteRequest {
            email: config.email.clone(),
            role: config.role.clone(),
            projects: config.projects.clone(),
        })?;
        let mut state = InviteState::from(invite);
        // Some responses omit the project list; keep what was requested.
        if state.projects.is_empty() {
            state.projects = config.projects.clone();
        }
        Ok(state)
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &InviteState,
        diags: &mut Diagnostics,
    ) -> Result<Option<InviteState>, ResourceError> {
        let Some(invite) = found(ctx.client().get_invite(&state.id))? else {
            return Ok(None);
        };
        if invite.status == "expired" {
            diags.warning(
                format!("invite for {} has expired", state.email),
                "A new invite will be sent.",
            );
            return Ok(None);
        }
        let mut refreshed = InviteState::from(invite);
        if refreshed.projects.is_empty() {
            refreshed.projects = state.projects.clone();
        }
        Ok(Some(refreshed))
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &InviteState,
        diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        if state.status == "accepted" {
            diags.warning(
                format!("invite for {} was already accepted", state.email),
                "Accepted invites cannot be revoked; remove the user from the organization instead.",
            );
            return Ok(());
        }
        Ok(ignore_not_found(ctx.client().delete_invite(&state.id))?)
    }

    fn requires_replace(&self, config: &InviteConfig, state: &InviteState) -> bool {
        !config.email.eq_ignore_ascii_case(&state.email)
            || config.role != state.role
            || config.projects != state.projects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{PlanAction, reconcile};
    use crate::testing::harness;
    use openai_provider_client::{Method, RequestBody};
    use serde_json::json;

    fn config() -> InviteConfig {
        InviteConfig {
            email: "ada@example.com".into(),
            role: "reader".into(),
            projects: vec![InviteProject {
                id: "proj_1".into(),
                role: "member".into(),
            }],
        }
    }

    fn api_invite(status: &str) -> serde_json::Value {
        json!({
            "id": "invite-1",
            "email": "ada@example.com",
            "role": "reader",
            "status": status,
            "invited_at": 100,
            "projects": [{"id": "proj_1", "role": "member"}]
        })
    }

    #[test]
    fn create_sends_project_assignments() {
        let h = harness();
        h.transport
            .on(Method::Post, "/organization/invites", Ok(api_invite("pending")));
        let state = InviteResource
            .create(&h.ctx, &config(), &mut Diagnostics::new())
            .unwrap();
        assert_eq!(state.status, "pending");
        assert_eq!(
            h.transport.requests()[0].body,
            RequestBody::Json(json!({
                "email": "ada@example.com",
                "role": "reader",
                "projects": [{"id": "proj_1", "role": "member"}]
            }))
        );
    }

    #[test]
    fn role_change_replaces_the_invite() {
        let h = harness();
        h.transport
            .on(Method::Get, "/organization/invites/invite-1", Ok(api_invite("pending")));
        h.transport.on(
            Method::Delete,
            "/organization/invites/invite-1",
            Ok(json!({"id": "invite-1", "deleted": true})),
        );
        h.transport
            .on(Method::Post, "/organization/invites", Ok(api_invite("pending")));
        let prior: InviteState = serde_json::from_value::<Invite>(api_invite("pending"))
            .unwrap()
            .into();
        let owner = InviteConfig {
            role: "owner".into(),
            ..config()
        };
        let (action, _) = reconcile(
            &InviteResource,
            &h.ctx,
            &owner,
            Some(&prior),
            &mut Diagnostics::new(),
        )
        .unwrap();
        assert_eq!(action, PlanAction::Replace);
        assert_eq!(
            h.transport.calls(Method::Delete, "/organization/invites/invite-1"),
            1
        );
    }

    #[test]
    fn expired_invite_reads_as_gone() {
        let h = harness();
        h.transport
            .on(Method::Get, "/organization/invites/invite-1", Ok(api_invite("expired")));
        let prior: InviteState = serde_json::from_value::<Invite>(api_invite("pending"))
            .unwrap()
            .into();
        let mut diags = Diagnostics::new();
        assert_eq!(InviteResource.read(&h.ctx, &prior, &mut diags).unwrap(), None);
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn accepted_invite_is_not_revoked() {
        let h = harness();
        let accepted: InviteState = serde_json::from_value::<Invite>(api_invite("accepted"))
            .unwrap()
            .into();
        let mut diags = Diagnostics::new();
        InviteResource.delete(&h.ctx, &accepted, &mut diags).unwrap();
        assert!(h.transport.requests().is_empty());
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn project_roles_are_validated() {
        let bad = InviteConfig {
            projects: vec![InviteProject {
                id: "proj_1".into(),
                role: "admin".into(),
            }],
            ..config()
        };
        assert!(InviteResource.validate(&bad).is_err());
    }
}
