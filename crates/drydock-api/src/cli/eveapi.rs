//! XML API CLI commands: show linked credentials, list account characters,
//! fetch a character sheet.

use anyhow::Result;
use clap::Subcommand;
use console::style;
use dialoguer::Password;
use secrecy::{ExposeSecret, SecretString};

use crate::cli::spinner;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum ApiCommand {
    /// Show the API settings of a character.
    Show {
        /// Character name or ID.
        character: String,
    },

    /// Store API credentials and list the characters on the account.
    Chars {
        /// Character name or ID.
        character: String,
        /// API key ID.
        #[arg(long)]
        key_id: String,
        /// Verification code (prompted when omitted).
        #[arg(long, env = "DRYDOCK_API_VCODE", hide_env_values = true)]
        v_code: Option<String>,
    },

    /// Replace a character's skills with the sheet of an account character.
    Fetch {
        /// Character name or ID.
        character: String,
        /// Name of the character on the API account.
        name: String,
    },
}

pub async fn handle_api_command(action: ApiCommand, state: &AppState, json: bool) -> Result<()> {
    let service = &state.character_service;
    match action {
        ApiCommand::Show { character } => {
            let character = service.resolve_character(&character).await?;
            let details = service.api_details(&character.id).await?;
            let has_v_code = !details.v_code.expose_secret().is_empty();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "key_id": details.key_id,
                        "has_v_code": has_v_code,
                        "default_char": details.default_char,
                        "characters": details.characters,
                    }))?
                );
                return Ok(());
            }

            println!();
            println!("  {}", style(&character.name).cyan().bold());
            println!("  {}  {}", style("Key ID:").bold(), details.key_id);
            println!(
                "  {}  {}",
                style("vCode:").bold(),
                if has_v_code { "••••••••" } else { "" }
            );
            println!("  {}  {}", style("Default:").bold(), details.default_char);
            for name in &details.characters {
                println!("    {} {name}", style("•").dim());
            }
            println!();
        }
        ApiCommand::Chars {
            character,
            key_id,
            v_code,
        } => {
            let character = service.resolve_character(&character).await?;
            let v_code = match v_code {
                Some(code) => code,
                None => Password::new().with_prompt("Verification code").interact()?,
            };

            let spinner = spinner("Contacting the API...");
            let names = service
                .api_char_list(&character.id, &key_id, SecretString::from(v_code))
                .await;
            spinner.finish_and_clear();
            let names = names?;

            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
                return Ok(());
            }
            println!(
                "  {} {} character{} on key {}",
                style("✓").green().bold(),
                names.len(),
                if names.len() == 1 { "" } else { "s" },
                style(&key_id).cyan()
            );
            for name in &names {
                println!("    {} {name}", style("•").dim());
            }
        }
        ApiCommand::Fetch { character, name } => {
            let character = service.resolve_character(&character).await?;

            let spinner = spinner(format!("Fetching {name}..."));
            let fetched = service.api_fetch(&character.id, &name).await;
            spinner.finish_and_clear();

            match fetched? {
                Some(updated) if json => {
                    println!("{}", serde_json::to_string_pretty(&updated)?);
                }
                Some(updated) => println!(
                    "  {} {} now has {} skills from {}.",
                    style("✓").green().bold(),
                    style(&updated.name).cyan(),
                    updated.skills.len(),
                    name
                ),
                None => anyhow::bail!("no character named '{name}' on the API account"),
            }
        }
    }
    Ok(())
}
