//! CLI command definitions and dispatch for the `drydock` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped by
//! resource (e.g., `drydock character list`, `drydock skill set`).

pub mod catalog;
pub mod character;
pub mod eveapi;
pub mod implant;
pub mod import;
pub mod requirements;
pub mod skill;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

/// Plan the skills your pilots need for a ship fit.
#[derive(Parser)]
#[command(name = "drydock", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "DRYDOCK_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage characters (list, show, new, rename, copy, delete).
    #[command(alias = "char")]
    Character {
        #[command(subcommand)]
        action: character::CharacterCommand,
    },

    /// Browse skills and edit a character's skill levels.
    Skill {
        #[command(subcommand)]
        action: skill::SkillCommand,
    },

    /// Plug and unplug implants.
    Implant {
        #[command(subcommand)]
        action: implant::ImplantCommand,
    },

    /// Check which skills a character is missing for a fit.
    #[command(alias = "reqs")]
    Requirements(requirements::RequirementsArgs),

    /// Import characters from EVEMon or XML API character files.
    Import {
        /// Character files to import.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Link a character to the game-data XML API.
    Api {
        #[command(subcommand)]
        action: eveapi::ApiCommand,
    },

    /// Manage the static game-data catalogue.
    Catalog {
        #[command(subcommand)]
        action: catalog::CatalogCommand,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Host address to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Steady-ticking spinner used while a command waits on storage or the network.
pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_skill_set() {
        let cli = Cli::parse_from(["drydock", "skill", "set", "Pilot", "3300", "4"]);
        match cli.command {
            Commands::Skill {
                action: skill::SkillCommand::Set { character, skill, level, .. },
            } => {
                assert_eq!(character, "Pilot");
                assert_eq!(skill, 3300);
                assert_eq!(level, "4");
            }
            _ => panic!("expected skill set"),
        }
    }

    #[test]
    fn test_cli_skill_set_accepts_negative_level() {
        let cli = Cli::try_parse_from(["drydock", "skill", "set", "Pilot", "3300", "-1"]).unwrap();
        match cli.command {
            Commands::Skill {
                action: skill::SkillCommand::Set { level, .. },
            } => {
                assert_eq!(level, "-1");
                assert_eq!(skill::parse_level(&level), Some(-1));
            }
            _ => panic!("expected skill set"),
        }
    }

    #[test]
    fn test_cli_requirements_alias_and_globals() {
        let cli = Cli::parse_from([
            "drydock",
            "reqs",
            "--fit",
            "rifter.json",
            "--character",
            "All 0",
            "--json",
            "-vv",
        ]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Requirements(args) => {
                assert_eq!(args.fit, PathBuf::from("rifter.json"));
                assert_eq!(args.character.as_deref(), Some("All 0"));
                assert!(args.export.is_none());
            }
            _ => panic!("expected requirements"),
        }
    }

    #[test]
    fn test_cli_import_requires_paths() {
        assert!(Cli::try_parse_from(["drydock", "import"]).is_err());
    }

    #[test]
    fn test_cli_character_alias() {
        let cli = Cli::parse_from(["drydock", "char", "list"]);
        assert!(matches!(
            cli.command,
            Commands::Character {
                action: character::CharacterCommand::List { .. }
            }
        ));
    }
}
