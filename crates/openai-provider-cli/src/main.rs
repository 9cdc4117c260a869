//! `openai-provider`: drive the resource registry from JSON files.

mod cli;

use std::fs;
use std::path::Path;

use clap::Parser;
use openai_provider_client::ProviderConfig;
use openai_provider_core::init_observability;
use openai_provider_resources::{Diagnostics, ResourceContext, ResourceError, ResourceRegistry};
use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, Command};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_observability();
    let cli = Cli::parse();
    let registry = ResourceRegistry::with_builtins();

    if cli.command == Command::Types {
        println!("resources:");
        for name in registry.resource_types() {
            println!("  {name}");
        }
        println!("data sources:");
        for name in registry.data_source_types() {
            println!("  {name}");
        }
        return Ok(());
    }

    let ctx = ResourceContext::from_config(ProviderConfig::from_env()?)?;
    match cli.command {
        Command::Apply {
            type_name,
            config,
            state,
            out,
        } => {
            let prior = state.as_deref().map(read_json).transpose()?;
            let outcome = registry
                .apply(&ctx, &type_name, read_json(&config)?, prior)
                .map_err(surface)?;
            info!(event = "cli.apply", resource_type = %type_name, action = %outcome.action);
            eprintln!("{type_name}: {}", outcome.action);
            report(&outcome.diagnostics)?;
            match out {
                Some(path) => fs::write(&path, serde_json::to_string_pretty(&outcome.state)?)?,
                None => println!("{}", serde_json::to_string_pretty(&outcome.state)?),
            }
        }
        Command::Read { type_name, state } => {
            let outcome = registry
                .read(&ctx, &type_name, read_json(&state)?)
                .map_err(surface)?;
            report(&outcome.diagnostics)?;
            match outcome.state {
                Some(state) => println!("{}", serde_json::to_string_pretty(&state)?),
                None => eprintln!("{type_name}: no longer exists"),
            }
        }
        Command::Destroy { type_name, state } => {
            let diagnostics = registry
                .destroy(&ctx, &type_name, read_json(&state)?)
                .map_err(surface)?;
            report(&diagnostics)?;
            eprintln!("{type_name}: destroyed");
        }
        Command::Data { type_name, config } => {
            let config = match config {
                Some(path) => read_json(&path)?,
                None => Value::Object(Default::default()),
            };
            let outcome = registry
                .read_data_source(&ctx, &type_name, config)
                .map_err(surface)?;
            report(&outcome.diagnostics)?;
            if let Some(state) = outcome.state {
                println!("{}", serde_json::to_string_pretty(&state)?);
            }
        }
        Command::Types => {}
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("{} is not valid JSON: {e}", path.display()).into())
}

/// Prints the diagnostics a failed operation recorded before its error.
fn surface(err: ResourceError) -> ResourceError {
    if let Some(diagnostics) = err.diagnostics() {
        for diagnostic in diagnostics.iter() {
            eprintln!("{diagnostic}");
        }
    }
    err
}

/// Prints diagnostics to stderr; error diagnostics fail the command.
fn report(diagnostics: &Diagnostics) -> Result<(), Box<dyn std::error::Error>> {
    for diagnostic in diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    if diagnostics.has_errors() {
        return Err("operation reported errors".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_json_reports_path_on_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "{{not json").unwrap();
        let err = read_json(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("is not valid JSON"));
    }

    #[test]
    fn report_fails_only_on_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning("slow propagation", "");
        assert!(report(&diagnostics).is_ok());
        diagnostics.error("boom", "");
        assert!(report(&diagnostics).is_err());
    }

    #[test]
    fn surface_returns_the_error_unchanged() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning("already a member", "");
        let err = ResourceError::UnknownType("openai_thread".into()).with_diagnostics(diagnostics);
        let err = surface(err);
        assert!(matches!(err.root(), ResourceError::UnknownType(_)));
        assert_eq!(err.diagnostics().map(Diagnostics::len), Some(1));
    }
}
