use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::context::ResourceContext;
use crate::data_sources::{ProjectsDataSource, VectorStoreFilesDataSource};
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::{DataSource, DynDataSource, DynResource, PlanAction, Resource};
use crate::resources::{
    AssistantResource, FileResource, InviteResource, ModerationResource, ProjectResource,
    ProjectUserResource, VectorStoreFileResource, VectorStoreResource,
};

/// Result of [`ResourceRegistry::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyOutcome {
    pub action: PlanAction,
    pub state: Value,
    pub diagnostics: Diagnostics,
}

/// Result of a refresh or data source read. `state` is `None` when a refreshed
/// resource no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadOutcome {
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

/// Registry: type name -> resource or data source.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: HashMap<&'static str, Box<dyn DynResource>>,
    data_sources: HashMap<&'static str, Box<dyn DynDataSource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in resource and data source registered.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        r.register_resource(FileResource);
        r.register_resource(VectorStoreResource);
        r.register_resource(VectorStoreFileResource);
        r.register_resource(AssistantResource);
        r.register_resource(ProjectResource);
        r.register_resource(ProjectUserResource);
        r.register_resource(InviteResource);
        r.register_resource(ModerationResource);
        r.register_data_source(ProjectsDataSource);
        r.register_data_source(VectorStoreFilesDataSource);
        r
    }

    /// Registers a resource under its `type_name`, replacing any previous one.
    pub fn register_resource<R: Resource + 'static>(&mut self, resource: R) {
        self.resources
            .insert(resource.type_name(), Box::new(resource));
    }

    pub fn register_data_source<D: DataSource + 'static>(&mut self, data_source: D) {
        self.data_sources
            .insert(data_source.type_name(), Box::new(data_source));
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.resources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn data_source_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.data_sources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn resource(&self, type_name: &str) -> Result<&dyn DynResource, ResourceError> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ResourceError::UnknownType(type_name.to_string()))
    }

    /// Creates, updates, replaces or keeps a resource so it matches `config`.
    ///
    /// Warnings recorded before a failure travel with the error, see
    /// [`ResourceError::diagnostics`].
    pub fn apply(
        &self,
        ctx: &ResourceContext,
        type_name: &str,
        config: Value,
        prior_state: Option<Value>,
    ) -> Result<ApplyOutcome, ResourceError> {
        let resource = self.resource(type_name)?;
        let mut diagnostics = Diagnostics::new();
        let applied = resource.apply_json(ctx, config, prior_state, &mut diagnostics);
        let (action, state) = match applied {
            Ok(applied) => applied,
            Err(err) => return Err(err.with_diagnostics(diagnostics)),
        };
        Ok(ApplyOutcome {
            action,
            state,
            diagnostics,
        })
    }

    /// Refreshes stored state from the API.
    pub fn read(
        &self,
        ctx: &ResourceContext,
        type_name: &str,
        state: Value,
    ) -> Result<ReadOutcome, ResourceError> {
        let resource = self.resource(type_name)?;
        let mut diagnostics = Diagnostics::new();
        match resource.read_json(ctx, state, &mut diagnostics) {
            Ok(state) => Ok(ReadOutcome { state, diagnostics }),
            Err(err) => Err(err.with_diagnostics(diagnostics)),
        }
    }

    pub fn destroy(
        &self,
        ctx: &ResourceContext,
        type_name: &str,
        state: Value,
    ) -> Result<Diagnostics, ResourceError> {
        let resource = self.resource(type_name)?;
        let mut diagnostics = Diagnostics::new();
        match resource.delete_json(ctx, state, &mut diagnostics) {
            Ok(()) => Ok(diagnostics),
            Err(err) => Err(err.with_diagnostics(diagnostics)),
        }
    }

    pub fn read_data_source(
        &self,
        ctx: &ResourceContext,
        type_name: &str,
        config: Value,
    ) -> Result<ReadOutcome, ResourceError> {
        let data_source = self
            .data_sources
            .get(type_name)
            .ok_or_else(|| ResourceError::UnknownType(type_name.to_string()))?;
        let mut diagnostics = Diagnostics::new();
        match data_source.read_json(ctx, config, &mut diagnostics) {
            Ok(state) => Ok(ReadOutcome {
                state: Some(state),
                diagnostics,
            }),
            Err(err) => Err(err.with_diagnostics(diagnostics)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_every_resource_family() {
        let registry = ResourceRegistry::with_builtins();
        assert_eq!(
            registry.resource_types(),
            vec![
                "openai_assistant",
                "openai_file",
                "openai_invite",
                "openai_moderation",
                "openai_project",
                "openai_project_user",
                "openai_vector_store",
                "openai_vector_store_file",
            ]
        );
        assert_eq!(
            registry.data_source_types(),
            vec!["openai_projects", "openai_vector_store_files"]
        );
    }

    #[test]
    fn empty_registry_rejects_unknown_types() {
        let registry = ResourceRegistry::new();
        assert!(matches!(
            registry.resource("openai_file"),
            Err(ResourceError::UnknownType(name)) if name == "openai_file"
        ));
    }
}
