use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Apply OpenAI resources described as JSON.
///
/// Credentials come from OPENAI_API_KEY / OPENAI_ADMIN_KEY (a `.env` file in
/// the working directory is loaded first).
#[derive(Parser, Debug)]
#[command(name = "openai-provider", version)]
#[command(about = "Create, refresh and destroy OpenAI resources from JSON configs", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Reconcile a resource with its configuration and print the new state
    Apply {
        /// Resource type, e.g. openai_vector_store_file
        #[arg(long = "type")]
        type_name: String,
        #[arg(long)]
        config: PathBuf,
        /// State written by a previous apply
        #[arg(long)]
        state: Option<PathBuf>,
        /// Write the resulting state here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Refresh stored state from the API
    Read {
        #[arg(long = "type")]
        type_name: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Delete the object behind stored state
    Destroy {
        #[arg(long = "type")]
        type_name: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Read a data source
    Data {
        #[arg(long = "type")]
        type_name: String,
        /// Data source arguments; defaults to `{}`
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List registered resource and data source types
    Types,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_apply_with_prior_state() {
        let cli = Cli::try_parse_from([
            "openai-provider",
            "apply",
            "--type",
            "openai_project",
            "--config",
            "project.json",
            "--state",
            "project.state.json",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Apply {
                type_name: "openai_project".into(),
                config: "project.json".into(),
                state: Some("project.state.json".into()),
                out: None,
            }
        );
    }

    #[test]
    fn destroy_requires_state() {
        assert!(
            Cli::try_parse_from(["openai-provider", "destroy", "--type", "openai_file"]).is_err()
        );
    }

    #[test]
    fn data_config_is_optional() {
        let cli =
            Cli::try_parse_from(["openai-provider", "data", "--type", "openai_projects"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Data {
                type_name: "openai_projects".into(),
                config: None,
            }
        );
    }
}
