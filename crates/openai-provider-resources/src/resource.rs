//! # Resource SDK
//!
//! A resource maps one OpenAI object onto a create/read/update/delete
//! lifecycle. Implementations work on typed config and state; the registry
//! erases them behind [`DynResource`] and moves JSON in and out.
//!
//! ## Lifecycle contract
//!
//! - `create` returns the state to persist.
//! - `read` refreshes state; `Ok(None)` means the object is gone and will be
//!   created again on the next apply.
//! - `update` is only called when [`Resource::needs_update`] reports drift and
//!   [`Resource::requires_replace`] does not. Resources that cannot update in
//!   place keep the default, which makes the registry replace instead.
//! - Warnings go to the [`Diagnostics`] passed to every call; errors are
//!   returned.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;

/// What an apply did to reach the configured state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Create,
    Update,
    Replace,
    NoOp,
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::NoOp => "no-op",
        })
    }
}

pub trait Resource: Send + Sync {
    type Config: DeserializeOwned;
    type State: Serialize + DeserializeOwned;

    /// Registry key, e.g. `openai_vector_store_file`.
    fn type_name(&self) -> &'static str;

    fn validate(&self, _config: &Self::Config) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &Self::Config,
        diags: &mut Diagnostics,
    ) -> Result<Self::State, ResourceError>;

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &Self::State,
        diags: &mut Diagnostics,
    ) -> Result<Option<Self::State>, ResourceError>;

    fn update(
        &self,
        _ctx: &ResourceContext,
        _config: &Self::Config,
        _state: &Self::State,
        _diags: &mut Diagnostics,
    ) -> Result<Self::State, ResourceError> {
        Err(ResourceError::Unsupported(format!(
            "in-place update of {}",
            self.type_name()
        )))
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &Self::State,
        diags: &mut Diagnostics,
    ) -> Result<(), ResourceError>;

    /// Config differs from state in a field that cannot change after creation.
    fn requires_replace(&self, _config: &Self::Config, _state: &Self::State) -> bool {
        false
    }

    /// Config differs from state in a field that can be updated in place.
    fn needs_update(&self, _config: &Self::Config, _state: &Self::State) -> bool {
        false
    }
}

/// Brings a resource from `prior` state to `config`.
///
/// No prior state creates. Otherwise prior state is refreshed first: a gone
/// object is created again, a replace-only change deletes and creates, an
/// updatable change updates (or replaces if update is unsupported), and
/// anything else is a no-op returning the refreshed state.
pub fn reconcile<R: Resource + ?Sized>(
    resource: &R,
    ctx: &ResourceContext,
    config: &R::Config,
    prior: Option<&R::State>,
    diags: &mut Diagnostics,
) -> Result<(PlanAction, R::State), ResourceError> {
    resource.validate(config)?;
    let type_name = resource.type_name();

    let Some(prior) = prior else {
        info!(event = "resource.apply", resource_type = type_name, action = "create");
        return Ok((PlanAction::Create, resource.create(ctx, config, diags)?));
    };

    let Some(current) = resource.read(ctx, prior, diags)? else {
        diags.warning(
            format!("{type_name} no longer exists"),
            "The object was deleted outside of this provider and will be created again.",
        );
        info!(event = "resource.apply", resource_type = type_name, action = "create", reason = "gone");
        return Ok((PlanAction::Create, resource.create(ctx, config, diags)?));
    };

    if resource.requires_replace(config, &current) {
        return replace(resource, ctx, config, &current, diags);
    }
    if resource.needs_update(config, &current) {
        info!(event = "resource.apply", resource_type = type_name, action = "update");
        return match resource.update(ctx, config, &current, diags) {
            Ok(state) => Ok((PlanAction::Update, state)),
            Err(ResourceError::Unsupported(_)) => replace(resource, ctx, config, &current, diags),
            Err(err) => Err(err),
        };
    }
    info!(event = "resource.apply", resource_type = type_name, action = "no_op");
    Ok((PlanAction::NoOp, current))
}

fn replace<R: Resource + ?Sized>(
    resource: &R,
    ctx: &ResourceContext,
    config: &R::Config,
    current: &R::State,
    diags: &mut Diagnostics,
) -> Result<(PlanAction, R::State), ResourceError> {
    info!(
        event = "resource.apply",
        resource_type = resource.type_name(),
        action = "replace"
    );
    resource.delete(ctx, current, diags)?;
    Ok((PlanAction::Replace, resource.create(ctx, config, diags)?))
}

/// Object-safe, JSON-facing view of a [`Resource`].
pub trait DynResource: Send + Sync {
    fn resource_type(&self) -> &'static str;

    fn apply_json(
        &self,
        ctx: &ResourceContext,
        config: Value,
        prior: Option<Value>,
        diags: &mut Diagnostics,
    ) -> Result<(PlanAction, Value), ResourceError>;

    fn read_json(
        &self,
        ctx: &ResourceContext,
        state: Value,
        diags: &mut Diagnostics,
    ) -> Result<Option<Value>, ResourceError>;

    fn delete_json(
        &self,
        ctx: &ResourceContext,
        state: Value,
        diags: &mut Diagnostics,
    ) -> Result<(), ResourceError>;
}

impl<R: Resource> DynResource for R {
    fn resource_type(&self) -> &'static str {
        self.type_name()
    }

    fn apply_json(
        &self,
        ctx: &ResourceContext,
        config: Value,
        prior: Option<Value>,
        diags: &mut Diagnostics,
    ) -> Result<(PlanAction, Value), ResourceError> {
        let config: R::Config = parse_config(config)?;
        let prior: Option<R::State> = prior.map(parse_state).transpose()?;
        let (action, state) = reconcile(self, ctx, &config, prior.as_ref(), diags)?;
        Ok((action, to_json(&state)?))
    }

    fn read_json(
        &self,
        ctx: &ResourceContext,
        state: Value,
        diags: &mut Diagnostics,
    ) -> Result<Option<Value>, ResourceError> {
        let state: R::State = parse_state(state)?;
        self.read(ctx, &state, diags)?
            .map(|s| to_json(&s))
            .transpose()
    }

    fn delete_json(
        &self,
        ctx: &ResourceContext,
        state: Value,
        diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        let state: R::State = parse_state(state)?;
        info!(event = "resource.destroy", resource_type = self.type_name());
        self.delete(ctx, &state, diags)
    }
}

/// Read-only lookup exposed as a data source.
pub trait DataSource: Send + Sync {
    type Config: DeserializeOwned;
    type State: Serialize;

    fn type_name(&self) -> &'static str;

    fn read(
        &self,
        ctx: &ResourceContext,
        config: &Self::Config,
        diags: &mut Diagnostics,
    ) -> Result<Self::State, ResourceError>;
}

/// Object-safe, JSON-facing view of a [`DataSource`].
pub trait DynDataSource: Send + Sync {
    fn data_source_type(&self) -> &'static str;

    fn read_json(
        &self,
        ctx: &ResourceContext,
        config: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ResourceError>;
}

impl<D: DataSource> DynDataSource for D {
    fn data_source_type(&self) -> &'static str {
        self.type_name()
    }

    fn read_json(
        &self,
        ctx: &ResourceContext,
        config: Value,
        diags: &mut Diagnostics,
    ) -> Result<Value, ResourceError> {
        let config: D::Config = parse_config(config)?;
        to_json(&self.read(ctx, &config, diags)?)
    }
}

fn parse_config<T: DeserializeOwned>(value: Value) -> Result<T, ResourceError> {
    serde_json::from_value(value).map_err(|e| ResourceError::Validation(e.to_string()))
}

fn parse_state<T: DeserializeOwned>(value: Value) -> Result<T, ResourceError> {
    serde_json::from_value(value).map_err(|e| ResourceError::State(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ResourceError> {
    serde_json::to_value(value).map_err(|e| ResourceError::State(e.to_string()))
}
