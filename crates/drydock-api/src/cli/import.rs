//! `drydock import`: create characters from EVEMon or XML API character files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::cli::spinner;
use crate::state::AppState;

pub async fn import_characters(paths: Vec<PathBuf>, state: &AppState, json: bool) -> Result<()> {
    let count = paths.len();
    let spinner = spinner(format!(
        "Importing {count} file{}...",
        if count == 1 { "" } else { "s" }
    ));
    let report = state
        .character_service
        .spawn_import(paths)
        .await
        .context("import task panicked")?;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.imported.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Name").fg(Color::White),
                Cell::new("Skills").fg(Color::White),
                Cell::new("ID").fg(Color::White),
            ]);
        for character in &report.imported {
            table.add_row(vec![
                Cell::new(&character.name).fg(Color::Cyan),
                Cell::new(character.skills.len()),
                Cell::new(character.id.to_string()).fg(Color::DarkGrey),
            ]);
        }
        println!();
        println!("{table}");
    }

    for skipped in &report.skipped {
        println!(
            "  {} {}: {}",
            style("✗").red().bold(),
            skipped.path.display(),
            style(&skipped.reason).dim()
        );
    }

    println!();
    println!(
        "  {} imported, {} skipped",
        style(report.imported.len()).green().bold(),
        style(report.skipped.len()).bold()
    );
    Ok(())
}
