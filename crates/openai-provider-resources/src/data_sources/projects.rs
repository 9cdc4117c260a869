use serde::{Deserialize, Serialize};

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::DataSource;
use crate::resources::ProjectState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectsConfig {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectsState {
    pub projects: Vec<ProjectState>,
}

/// `openai_projects`: every project in the organization.
pub struct ProjectsDataSource;

impl DataSource for ProjectsDataSource {
    type Config = ProjectsConfig;
    type State = ProjectsState;

    fn type_name(&self) -> &'static str {
        "openai_projects"
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        config: &ProjectsConfig,
        _diags: &mut Diagnostics,
    ) -> Result<ProjectsState, ResourceError> {
        let projects = ctx.client().list_projects(config.include_archived)?;
        Ok(ProjectsState {
            projects: projects.into_iter().map(ProjectState::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::harness;
    use openai_provider_client::Method;
    use serde_json::json;

    #[test]
    fn lists_every_page() {
        let h = harness();
        h.transport
            .on(
                Method::Get,
                "/organization/projects",
                Ok(json!({
                    "data": [{"id": "proj_1", "name": "a", "status": "active"}],
                    "last_id": "proj_1",
                    "has_more": true
                })),
            )
            .on(
                Method::Get,
                "/organization/projects",
                Ok(json!({
                    "data": [{"id": "proj_2", "name": "b", "status": "archived"}],
                    "last_id": "proj_2",
                    "has_more": false
                })),
            );
        let state = ProjectsDataSource
            .read(
                &h.ctx,
                &ProjectsConfig {
                    include_archived: true,
                },
                &mut Diagnostics::new(),
            )
            .unwrap();
        let ids: Vec<_> = state.projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["proj_1", "proj_2"]);

        let requests = h.transport.requests();
        assert!(
            requests[0]
                .query
                .contains(&("include_archived".to_string(), "true".to_string()))
        );
        assert!(
            requests[1]
                .query
                .contains(&("after".to_string(), "proj_1".to_string()))
        );
    }
}
