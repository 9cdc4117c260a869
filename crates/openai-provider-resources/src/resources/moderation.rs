use openai_provider_client::{ModerationInput, ModerationRequest, ModerationResult};
use serde::{Deserialize, Serialize};

use crate::context::ResourceContext;
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::resource::Resource;

pub const DEFAULT_MODERATION_MODEL: &str = "omni-moderation-latest";

const ALIAS_SUFFIXES: &[&str] = &["-latest", "-stable"];

/// Strips the version suffix from a model name.
///
/// `omni-moderation-latest`, `omni-moderation-2024-09-26` and
/// `text-moderation-007` map to `omni-moderation`, `omni-moderation` and
/// `text-moderation`.
pub fn model_family(model: &str) -> &str {
    let model = model.trim();
    for suffix in ALIAS_SUFFIXES {
        if let Some(family) = model.strip_suffix(suffix) {
            return family;
        }
    }
    if let Some(family) = strip_date_suffix(model) {
        return family;
    }
    match model.rsplit_once('-') {
        Some((family, version))
            if !family.is_empty()
                && !version.is_empty()
                && version.bytes().all(|b| b.is_ascii_digit()) =>
        {
            family
        }
        _ => model,
    }
}

/// `name-YYYY-MM-DD` -> `name`.
fn strip_date_suffix(model: &str) -> Option<&str> {
    const DATE_LEN: usize = "-0000-00-00".len();
    let split = model.len().checked_sub(DATE_LEN).filter(|&at| at > 0)?;
    let (family, date) = (model.get(..split)?, model.get(split..)?);
    let bytes = date.as_bytes();
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        0 | 5 | 8 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    shape_ok.then_some(family)
}

fn is_alias(model: &str) -> bool {
    let model = model.trim();
    ALIAS_SUFFIXES.iter().any(|s| model.ends_with(s)) || model == model_family(model)
}

/// Same model, or an alias and a concrete version of the same family.
///
/// Two different concrete versions are not equivalent.
pub fn models_equivalent(a: &str, b: &str) -> bool {
    if a.trim() == b.trim() {
        return true;
    }
    model_family(a) == model_family(b) && (is_alias(a) || is_alias(b))
}

/// Keeps the configured name when the API answered with an equivalent model.
pub fn normalize_model(configured: &str, served: &str) -> String {
    if models_equivalent(configured, served) {
        configured.to_string()
    } else {
        served.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModerationConfig {
    pub input: ModerationInput,
    #[serde(default)]
    pub model: Option<String>,
}

impl ModerationConfig {
    fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODERATION_MODEL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationState {
    pub id: String,
    pub input: ModerationInput,
    /// Configured model name, or the served model when they are not equivalent.
    pub model: String,
    /// Model that actually served the request.
    pub served_model: String,
    pub flagged: bool,
    #[serde(default)]
    pub results: Vec<ModerationResult>,
}

/// `openai_moderation`: classifies input once at create time.
///
/// Nothing is stored remotely, so read returns the recorded result and
/// delete only forgets it.
pub struct ModerationResource;

impl Resource for ModerationResource {
    type Config = ModerationConfig;
    type State = ModerationState;

    fn type_name(&self) -> &'static str {
        "openai_moderation"
    }

    fn validate(&self, config: &ModerationConfig) -> Result<(), ResourceError> {
        let empty = match &config.input {
            ModerationInput::Text(text) => text.trim().is_empty(),
            ModerationInput::Batch(items) => items.is_empty(),
        };
        if empty {
            return Err(ResourceError::validation("`input` must not be empty"));
        }
        Ok(())
    }

    fn create(
        &self,
        ctx: &ResourceContext,
        config: &ModerationConfig,
        _diags: &mut Diagnostics,
    ) -> Result<ModerationState, ResourceError> {
        let response = ctx.client().create_moderation(&ModerationRequest {
            input: config.input.clone(),
            model: config.model.clone(),
        })?;
        Ok(ModerationState {
            id: response.id,
            input: config.input.clone(),
            model: normalize_model(config.model(), &response.model),
            served_model: response.model,
            flagged: response.results.iter().any(|r| r.flagged),
            results: response.results,
        })
    }

    fn read(
        &self,
        _ctx: &ResourceContext,
        state: &ModerationState,
        _diags: &mut Diagnostics,
    ) -> Result<Option<ModerationState>, ResourceError> {
        Ok(Some(state.clone()))
    }

    fn delete(
        &self,
        _ctx: &ResourceContext,
        _state: &ModerationState,
        _diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn requires_replace(&self, config: &ModerationConfig, state: &ModerationState) -> bool {
        config.input != state.input || !models_equivalent(config.model(), &state.model)
    }
}
