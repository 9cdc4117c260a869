use openai_provider_client::{ClientError, ProjectUser};
use openai_provider_core::{RetryError, RetrySettings};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;
use crate::resources::{found, ignore_not_found, require_non_empty, validate_retry};

const ROLES: &[&str] = &["owner", "member"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectUserConfig {
    pub project_id: String,
    /// Exactly one of `user_id` and `email` identifies the organization user.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    /// Budget for the membership propagation wait.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

fn default_role() -> String {
    "member".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUserState {
    pub project_id: String,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Role the provider manages; stays at the configured value when the API
    /// reports an organization owner as project owner.
    pub role: String,
    /// Role last reported by the API, when known.
    #[serde(default)]
    pub observed_role: Option<String>,
    #[serde(default)]
    pub added_at: i64,
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

/// Outcome of comparing the configured role with the role the API reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleDecision {
    Matches,
    /// Organization owners are listed as project owners regardless of the
    /// assigned role. The configured role is kept.
    OrganizationOwner,
    /// Role changed outside the provider. The observed role is adopted so the
    /// next apply corrects it.
    Drift(String),
}

/// Decides which role to keep in state.
pub fn reconcile_role(configured: &str, observed: &str, org_role: Option<&str>) -> RoleDecision {
    if configured.eq_ignore_ascii_case(observed) {
        return RoleDecision::Matches;
    }
    let org_owner = org_role.is_some_and(|r| r.eq_ignore_ascii_case("owner"));
    if org_owner && observed.eq_ignore_ascii_case("owner") {
        return RoleDecision::OrganizationOwner;
    }
    RoleDecision::Drift(observed.to_string())
}

/// `openai_project_user`: membership of an organization user in a project.
pub struct ProjectUserResource;

impl ProjectUserResource {
    fn resolve_user_id(
        &self,
        ctx: &ResourceContext,
        config: &ProjectUserConfig,
    ) -> Result<String, ResourceError> {
        if let Some(user_id) = &config.user_id {
            return Ok(user_id.clone());
        }
        let email = config.email.as_deref().unwrap_or_default();
        match ctx.client().find_user_by_email(email)? {
            Some(user) => Ok(user.id),
            None => Err(ResourceError::validation(format!(
                "no organization user with email `{email}`"
            ))),
        }
    }

    /// State from an API membership, applying the role policy.
    fn observe(
        &self,
        ctx: &ResourceContext,
        base: &ProjectUserState,
        member: ProjectUser,
        diags: &mut Diagnostics,
    ) -> Result<ProjectUserState, ResourceError> {
        let mut state = ProjectUserState {
            email: member.email.or_else(|| base.email.clone()),
            observed_role: Some(member.role.clone()),
            added_at: member.added_at,
            ..base.clone()
        };
        if member.role.eq_ignore_ascii_case(&base.role) {
            return Ok(state);
        }
        let org_role = found(ctx.client().get_user(&base.user_id))?.map(|u| u.role);
        match reconcile_role(&base.role, &member.role, org_role.as_deref()) {
            RoleDecision::Matches => {}
            RoleDecision::OrganizationOwner => diags.warning(
                format!(
                    "user {} is reported as project owner in {}",
                    base.user_id, base.project_id
                ),
                format!(
                    "The user is an organization owner, which the API always lists as project owner. Keeping the configured role `{}`.",
                    base.role
                ),
            ),
            RoleDecision::Drift(observed) => state.role = observed,
        }
        Ok(state)
    }
}

fn is_already_member(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Api { status: 400 | 409, message } if message.to_lowercase().contains("already")
    )
}

impl Resource for ProjectUserResource {
    type Config = ProjectUserConfig;
    type State = ProjectUserState;

    fn type_name(&self) -> &'static str {
        "openai_project_user"
    }

    fn validate(&self, config: &ProjectUserConfig) -> Result<(), ResourceError> {
        require_non_empty("project_id", &config.project_id)?;
        match (&config.user_id, &config.email) {
            (Some(id), None) => require_non_empty("user_id", id)?,
            (None, Some(email)) => require_non_empty("email", email)?,
            _ => {
                return Err(ResourceError::validation(
                    "exactly one of `user_id` or `email` must be set",
                ));
            }
        }
        if !ROLES.contains(&config.role.as_str()) {
            return Err(ResourceError::validation(format!(
                "role must be one of {} (got `{}`)",
                ROLES.join(", "),
                config.role
            )));
        }
        validate_retry(config.retry)
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &ProjectUserConfig,
        diags: &mut Diagnostics,
    ) -> Result<ProjectUserState, ResourceError> {
        let user_id = self.resolve_user_id(ctx, config)?;
        let client = ctx.client();

        match client.add_project_user(&config.project_id, &user_id, &config.role) {
            Ok(_) => {}
            Err(err) if is_already_member(&err) => {
                diags.warning(
                    format!("user {user_id} is already a member of {}", config.project_id),
                    "The existing membership is now managed by this provider.",
                );
                client.update_project_user(&config.project_id, &user_id, &config.role)?;
            }
            Err(err) => return Err(err.into()),
        }

        let configured = ProjectUserState {
            project_id: config.project_id.clone(),
            user_id: user_id.clone(),
            email: config.email.clone(),
            role: config.role.clone(),
            observed_role: None,
            added_at: 0,
            retry: config.retry,
        };

        let settings = config.retry.unwrap_or_else(|| ctx.retry_settings());
        let waited = ctx
            .reader_with(settings, "project_user")
            .read(|| client.get_project_user(&config.project_id, &user_id));
        match waited {
            Ok(member) => self.observe(ctx, &configured, member, diags),
            Err(err @ (RetryError::Exhausted { .. } | RetryError::Cancelled { .. })) => {
                info!(
                    event = "project_user.propagation_incomplete",
                    project_id = %config.project_id,
                    user_id = %user_id,
                    attempts = err.attempts()
                );
                diags.warning(
                    format!(
                        "membership of {user_id} in {} is not visible yet",
                        config.project_id
                    ),
                    format!("{err}. State was recorded from configuration."),
                );
                Ok(configured)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &ProjectUserState,
        diags: &mut Diagnostics,
    ) -> Result<Option<ProjectUserState>, ResourceError> {
        let Some(member) = found(
            ctx.client()
                .get_project_user(&state.project_id, &state.user_id),
        )?
        else {
            return Ok(None);
        };
        self.observe(ctx, state, member, diags).map(Some)
    }

    fn update(
        &self,
        ctx: &ResourceContext,
        config: &ProjectUserConfig,
        state: &ProjectUserState,
        _diags: &mut Diagnostics,
    ) -> Result<ProjectUserState, ResourceError> {
        let member = ctx
            .client()
            .update_project_user(&state.project_id, &state.user_id, &config.role)?;
        Ok(ProjectUserState {
            role: config.role.clone(),
            observed_role: Some(member.role),
            retry: config.retry,
            ..state.clone()
        })
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &ProjectUserState,
        _diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        Ok(ignore_not_found(
            ctx.client()
                .remove_project_user(&state.project_id, &state.user_id),
        )?)
    }

    fn requires_replace(&self, config: &ProjectUserConfig, state: &ProjectUserState) -> bool {
        if config.project_id != state.project_id {
            return true;
        }
        match (&config.user_id, &config.email) {
            (Some(id), _) => *id != state.user_id,
            (None, Some(email)) => !state
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email)),
            (None, None) => false,
        }
    }

    fn needs_update(&self, config: &ProjectUserConfig, state: &ProjectUserState) -> bool {
        config.role != state.role
    }
}
