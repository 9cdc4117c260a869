use std::collections::BTreeMap;

use openai_provider_client::{Assistant, AssistantRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;
use crate::resources::{found, ignore_not_found, require_non_empty, validate_metadata};

const MAX_NAME_LEN: usize = 256;
const MAX_DESCRIPTION_LEN: usize = 512;
const MAX_INSTRUCTIONS_LEN: usize = 256_000;
const MAX_TOOLS: usize = 128;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssistantConfig {
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    /// Tool definitions passed through as JSON (`{"type": "file_search"}`, ...).
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub tool_resources: Option<Value>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
}

impl AssistantConfig {
    fn request(&self) -> AssistantRequest {
        AssistantRequest {
            model: self.model.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            instructions: self.instructions.clone(),
            tools: self.tools.clone(),
            tool_resources: self.tool_resources.clone(),
            metadata: self.metadata.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantState {
    pub id: String,
    pub model: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub tool_resources: Option<Value>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub created_at: i64,
}

impl AssistantState {
    fn request(&self) -> AssistantRequest {
        AssistantRequest {
            model: self.model.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            instructions: self.instructions.clone(),
            tools: self.tools.clone(),
            tool_resources: self.tool_resources.clone(),
            metadata: self.metadata.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

impl From<Assistant> for AssistantState {
    fn from(a: Assistant) -> Self {
        Self {
            id: a.id,
            model: a.model,
            name: a.name,
            description: a.description,
            instructions: a.instructions,
            tools: a.tools,
            tool_resources: a.tool_resources,
            metadata: a.metadata.unwrap_or_default(),
            temperature: a.temperature,
            top_p: a.top_p,
            created_at: a.created_at,
        }
    }
}

/// `openai_assistant`.
pub struct AssistantResource;

impl Resource for AssistantResource {
    type Config = AssistantConfig;
    type State = AssistantState;

    fn type_name(&self) -> &'static str {
        "openai_assistant"
    }

    fn validate(&self, config: &AssistantConfig) -> Result<(), ResourceError> {
        require_non_empty("model", &config.model)?;
        validate_metadata(&config.metadata)?;
        check_len("name", config.name.as_deref(), MAX_NAME_LEN)?;
        check_len("description", config.description.as_deref(), MAX_DESCRIPTION_LEN)?;
        check_len("instructions", config.instructions.as_deref(), MAX_INSTRUCTIONS_LEN)?;
        if config.tools.len() > MAX_TOOLS {
            return Err(ResourceError::validation(format!(
                "at most {MAX_TOOLS} tools are allowed"
            )));
        }
        if let Some(t) = config.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(ResourceError::validation("temperature must be between 0 and 2"));
        }
        if let Some(p) = config.top_p
            && !(0.0..=1.0).contains(&p)
        {
            return Err(ResourceError::validation("top_p must be between 0 and 1"));
        }
        Ok(())
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &AssistantConfig,
        _diags: &mut Diagnostics,
    ) -> Result<AssistantState, ResourceError> {
        Ok(ctx.client().create_assistant(&config.request())?.into())
    }

    fn read(
        &self,
        ctx: &ResourceContext,
        state: &AssistantState,
        _diags: &mut Diagnostics,
    ) -> Result<Option<AssistantState>, ResourceError> {
        Ok(found(ctx.client().get_assistant(&state.id))?.map(AssistantState::from))
    }

    fn update(
        &self,
        ctx: &ResourceContext,
        config: &AssistantConfig,
        state: &AssistantState,
        _diags: &mut Diagnostics,
    ) -> Result<AssistantState, ResourceError> {
        Ok(ctx
            .client()
            .update_assistant(&state.id, &config.request())?
            .into())
    }

    fn delete(
        &self,
        ctx: &ResourceContext,
        state: &AssistantState,
        _diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        Ok(ignore_not_found(ctx.client().delete_assistant(&state.id))?)
    }

    fn needs_update(&self, config: &AssistantConfig, state: &AssistantState) -> bool {
        config.request() != state.request()
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), ResourceError> {
    match value {
        Some(v) if v.chars().count() > max => Err(ResourceError::validation(format!(
            "`{field}` is longer than {max} characters"
        ))),
        _ => Ok(()),
    }
}
