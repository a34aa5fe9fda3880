//! Implant CLI commands: list, add, remove. Changes are saved immediately.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use drydock_types::gamedata::ItemTypeId;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum ImplantCommand {
    /// List a character's implants by slot.
    #[command(alias = "ls")]
    List {
        /// Character name or ID.
        character: String,
    },

    /// Plug an implant, replacing whatever occupies its slot.
    Add {
        /// Character name or ID.
        character: String,
        /// Implant type ID.
        item: ItemTypeId,
    },

    /// Unplug the implant in a slot.
    #[command(alias = "rm")]
    Remove {
        /// Character name or ID.
        character: String,
        /// Implant slot.
        slot: u8,
    },
}

pub async fn handle_implant_command(
    action: ImplantCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    let service = &state.character_service;
    match action {
        ImplantCommand::List { character } => {
            let character = service.resolve_character(&character).await?;
            let implants = service.implants(&character.id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&implants)?);
                return Ok(());
            }
            if implants.is_empty() {
                println!("  {} has no implants.", style(&character.name).cyan());
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(presets::UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("Slot").fg(Color::White),
                    Cell::new("Implant").fg(Color::White),
                    Cell::new("ID").fg(Color::White),
                ]);
            for implant in &implants {
                table.add_row(vec![
                    Cell::new(implant.slot),
                    Cell::new(&implant.name).fg(Color::Cyan),
                    Cell::new(implant.item_id).fg(Color::DarkGrey),
                ]);
            }
            println!("{table}");
        }
        ImplantCommand::Add { character, item } => {
            let character = service.resolve_character(&character).await?;
            let implant = service.add_implant(&character.id, item).await?;
            service.save_character(&character.id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&implant)?);
            } else {
                println!(
                    "  {} Plugged {} into slot {}.",
                    style("✓").green().bold(),
                    style(&implant.name).cyan(),
                    implant.slot
                );
            }
        }
        ImplantCommand::Remove { character, slot } => {
            let character = service.resolve_character(&character).await?;
            let removed = service.remove_implant(&character.id, slot).await?;
            service.save_character(&character.id).await?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({"slot": slot, "removed": removed})
                );
            } else {
                match removed {
                    Some(implant) => println!(
                        "  {} Removed {} from slot {slot}.",
                        style("✓").green().bold(),
                        implant.name
                    ),
                    None => println!("  Slot {slot} was already empty."),
                }
            }
        }
    }
    Ok(())
}
