//! Character lifecycle CLI commands: list, show, new, rename, copy, delete.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use drydock_types::character::{Character, CharacterKind};

use crate::cli::spinner;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum CharacterCommand {
    /// List every character, built-ins first.
    #[command(alias = "ls")]
    List {
        /// Character to mark as active (name or ID).
        #[arg(long)]
        active: Option<String>,
    },

    /// Show a character's skills and implants.
    Show {
        /// Character name or ID.
        character: String,
    },

    /// Create a new, empty character.
    New {
        /// Name of the character (prompted when omitted).
        #[arg(long)]
        name: Option<String>,
    },

    /// Rename a character.
    Rename {
        /// Character name or ID.
        character: String,
        /// New name.
        name: String,
    },

    /// Copy a character, including built-ins.
    #[command(alias = "cp")]
    Copy {
        /// Character name or ID.
        character: String,
    },

    /// Delete a character.
    #[command(alias = "rm")]
    Delete {
        /// Character name or ID.
        character: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_character_command(
    action: CharacterCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match action {
        CharacterCommand::List { active } => list_characters(state, active.as_deref(), json).await,
        CharacterCommand::Show { character } => show_character(state, &character, json).await,
        CharacterCommand::New { name } => new_character(state, name, json).await,
        CharacterCommand::Rename { character, name } => {
            rename_character(state, &character, &name, json).await
        }
        CharacterCommand::Copy { character } => copy_character(state, &character, json).await,
        CharacterCommand::Delete { character, force } => {
            delete_character(state, &character, force, json).await
        }
    }
}

fn kind_label(kind: CharacterKind) -> String {
    match kind {
        CharacterKind::Custom => style("custom").green().to_string(),
        CharacterKind::AllZero | CharacterKind::AllFive => style("built-in").dim().to_string(),
    }
}

/// List all characters in a table.
pub async fn list_characters(state: &AppState, active: Option<&str>, json: bool) -> Result<()> {
    let service = &state.character_service;
    let active_id = match active {
        Some(reference) => Some(service.resolve_character(reference).await?.id),
        None => None,
    };
    let summaries = service.character_list(active_id.as_ref()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("").fg(Color::White),
            Cell::new("Name").fg(Color::White),
            Cell::new("ID").fg(Color::White),
        ]);

    for summary in &summaries {
        let marker = if summary.active { "▶" } else { "" };
        let name = if summary.dirty {
            Cell::new(&summary.display_name).fg(Color::Yellow)
        } else {
            Cell::new(&summary.display_name).fg(Color::Cyan)
        };
        table.add_row(vec![
            Cell::new(marker).fg(Color::Green),
            name,
            Cell::new(summary.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} character{}",
        style(summaries.len()).bold(),
        if summaries.len() == 1 { "" } else { "s" }
    );

    Ok(())
}

/// Show a character's learned skills and plugged implants.
pub async fn show_character(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let service = &state.character_service;
    let character = service.resolve_character(reference).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&character)?);
        return Ok(());
    }

    let api_enabled = service.api_enabled(&character.id).await?;
    let dirty = service.is_dirty(&character.id);

    println!();
    println!("  {}", style(&character.name).cyan().bold());
    println!();
    println!("  {}  {}", style("Kind:").bold(), kind_label(character.kind));
    println!(
        "  {}  {}",
        style("ID:").bold(),
        style(character.id.to_string()).dim()
    );
    println!(
        "  {}  {}",
        style("API:").bold(),
        if api_enabled {
            style("linked").green().to_string()
        } else {
            style("not linked").dim().to_string()
        }
    );
    if dirty {
        println!("  {}", style("Unsaved changes").yellow());
    }

    println!();
    println!("  {}", style("── Skills ──").dim());
    match character.kind {
        CharacterKind::AllZero => println!("  Every skill at level 0"),
        CharacterKind::AllFive => println!("  Every skill at level 5"),
        CharacterKind::Custom if character.skills.is_empty() => {
            println!("  {}", style("No skills learned").dim())
        }
        CharacterKind::Custom => {
            let mut table = Table::new();
            table
                .load_preset(presets::UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("Skill ID").fg(Color::White),
                    Cell::new("Level").fg(Color::White),
                ]);
            for (skill, level) in &character.skills {
                table.add_row(vec![Cell::new(skill), Cell::new(level).fg(Color::Green)]);
            }
            println!("{table}");
        }
    }

    println!();
    println!("  {}", style("── Implants ──").dim());
    if character.implants.is_empty() {
        println!("  {}", style("None").dim());
    }
    for implant in character.implants.values() {
        println!(
            "  {} {}  {}",
            style(format!("[{}]", implant.slot)).dim(),
            implant.name,
            style(format!("#{}", implant.item_id)).dim()
        );
    }

    println!();
    println!("  {}", style("── Timestamps ──").dim());
    println!(
        "  {}  {}",
        style("Created:").bold(),
        character.created_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "  {}  {}",
        style("Updated:").bold(),
        character.updated_at.format("%Y-%m-%d %H:%M")
    );
    println!();

    Ok(())
}

fn print_created(character: &Character, verb: &str) {
    println!();
    println!(
        "  {} Character {verb}: {}",
        style("✓").green().bold(),
        style(&character.name).cyan()
    );
    println!(
        "  {}  {}",
        style("ID:").bold(),
        style(character.id.to_string()).dim()
    );
    println!();
}

/// Create a character, prompting for a name when none is given.
pub async fn new_character(state: &AppState, name: Option<String>, json: bool) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None if json => Character::DEFAULT_NAME.to_string(),
        None => Input::<String>::new()
            .with_prompt("Character name")
            .default(Character::DEFAULT_NAME.to_string())
            .interact_text()?,
    };

    let character = state.character_service.create_named(&name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&character)?);
    } else {
        print_created(&character, "created");
    }
    Ok(())
}

pub async fn rename_character(
    state: &AppState,
    reference: &str,
    name: &str,
    json: bool,
) -> Result<()> {
    let service = &state.character_service;
    let character = service.resolve_character(reference).await?;
    let renamed = service.rename(&character.id, name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&renamed)?);
    } else {
        println!(
            "  {} Renamed '{}' to '{}'.",
            style("✓").green().bold(),
            character.name,
            style(&renamed.name).cyan()
        );
    }
    Ok(())
}

pub async fn copy_character(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let service = &state.character_service;
    let source = service.resolve_character(reference).await?;

    let spinner = spinner(format!("Copying {}...", source.name));
    let copy = service.copy(&source.id).await?;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&copy)?);
    } else {
        print_created(&copy, "copied");
    }
    Ok(())
}

pub async fn delete_character(
    state: &AppState,
    reference: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let service = &state.character_service;
    let character = service.resolve_character(reference).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete character '{}'?",
                style(&character.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    service.delete(&character.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "id": character.id})
        );
    } else {
        println!(
            "  {} Character '{}' deleted.",
            style("✓").red().bold(),
            character.name
        );
    }
    Ok(())
}
