use openai_provider_client::Project;
use serde::{Deserialize, Serialize};

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;
use crate::resources::{found, require_non_empty};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_at: i64,
}

impl From<Project> for ProjectState {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            status: p.status,
            created_at: p.created_at,
        }
    }
}

/// `openai_project`. Projects cannot be deleted; destroy archives them.
pub struct ProjectResource;

impl Resource for ProjectResource {
    type Config = ProjectConfig;
    type State = ProjectState;

    fn type_name(&self) -> &'static str {
        "openai_project"
    }

    fn validate(&self, config: &ProjectConfig) -> Result<(), ResourceError> {
        require_non_empty("name", &config.name)
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &ProjectConfig,
        _diags: &mut Diagnostics,
    ) -> Result<ProjectState, ResourceError> {
        Ok(ctx.client().create_project(&config.name)?.into())
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &ProjectState,
        _diags: &mut Diagnostics,
    ) -> Result<Option<ProjectState>, ResourceError> {
        let project = found(ctx.client().get_project(&state.id))?;
        Ok(project
            .filter(|p| p.status != "archived" && p.archived_at.is_none())
            .map(ProjectState::from))
    }

    fn update(
        &self,
        ctx: &ResourceContext,
        config: &ProjectConfig,
        state: &ProjectState,
        _diags: &mut Diagnostics,
    ) -> Result<ProjectState, ResourceError> {
        Ok(ctx.client().update_project(&state.id, &config.name)?.into())
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &ProjectState,
        diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        if found(ctx.client().archive_project(&state.id))?.is_none() {
            diags.warning(
                format!("project {} was already gone", state.id),
                "Nothing was archived.",
            );
        }
        Ok(())
    }

    fn needs_update(&self, config: &ProjectConfig, state: &ProjectState) -> bool {
        config.name != state.name
    }
}
