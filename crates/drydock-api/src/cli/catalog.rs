//! Game-data catalogue commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;

use drydock_types::gamedata::GameDataBundle;

use crate::cli::spinner;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Load a JSON catalogue bundle (market groups, groups, items).
    Import {
        /// Bundle file.
        path: PathBuf,
    },
}

pub async fn handle_catalog_command(
    action: CatalogCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match action {
        CatalogCommand::Import { path } => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading catalogue {}", path.display()))?;
            let bundle: GameDataBundle = serde_json::from_str(&raw)
                .with_context(|| format!("parsing catalogue {}", path.display()))?;

            let spinner = spinner("Importing catalogue...");
            let summary = state.character_service.import_catalog(&bundle).await;
            spinner.finish_and_clear();
            let summary = summary?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            println!(
                "  {} Imported {} items, {} groups, {} market groups, {} requirements.",
                style("✓").green().bold(),
                style(summary.items).bold(),
                summary.groups,
                summary.market_groups,
                summary.requirements
            );
        }
    }
    Ok(())
}
