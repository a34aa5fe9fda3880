//! `drydock requirements`: missing-skill trees for a fit, with optional plan export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use drydock_types::character::CharacterId;
use drydock_types::fit::FitLoadout;
use drydock_types::plan::ExportFormat;
use drydock_types::requirement::{ItemRequirements, RequirementTree};

use crate::cli::spinner;
use crate::state::AppState;

#[derive(Args)]
pub struct RequirementsArgs {
    /// Fit loadout as JSON (`{"ship": 587, "modules": [{"item": 484}], "drones": []}`).
    #[arg(long)]
    pub fit: PathBuf,

    /// Character name or ID. Without one every requirement counts as unmet.
    #[arg(long, short)]
    pub character: Option<String>,

    /// Write the resulting skill plan to this file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Plan format: txt, xml, or emp (defaults to the configured format).
    #[arg(long)]
    pub format: Option<ExportFormat>,
}

pub async fn check_requirements(args: RequirementsArgs, state: &AppState, json: bool) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.fit)
        .await
        .with_context(|| format!("reading fit {}", args.fit.display()))?;
    let fit: FitLoadout = serde_json::from_str(&raw)
        .with_context(|| format!("parsing fit {}", args.fit.display()))?;

    let service = &state.character_service;
    let character: Option<CharacterId> = match &args.character {
        Some(reference) => Some(service.resolve_character(reference).await?.id),
        None => None,
    };

    let requirements = service
        .check_requirements(&fit, character.as_ref())
        .await?;

    if let Some(path) = &args.export {
        let format = args.format.unwrap_or(state.config.default_export_format);
        let plan = service.skill_plan(&fit, character.as_ref()).await?;

        let spinner = spinner(format!("Writing {}...", path.display()));
        let written = service
            .backup_skills(path.clone(), format, plan)
            .await
            .context("backup task panicked")?;
        spinner.finish_and_clear();
        written?;

        if !json {
            println!(
                "  {} Plan written to {} ({format})",
                style("✓").green().bold(),
                style(path.display()).cyan()
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&requirements)?);
        return Ok(());
    }

    print_requirements(&requirements);
    Ok(())
}

fn print_requirements(requirements: &[ItemRequirements]) {
    println!();
    let mut clean = true;
    for item in requirements {
        if item.requirements.is_empty() {
            continue;
        }
        clean = false;
        println!("  {}", style(&item.item_name).cyan().bold());
        print_tree(&item.requirements, 1);
        println!();
    }
    if clean {
        println!(
            "  {} All skill requirements met.",
            style("✓").green().bold()
        );
        println!();
    }
}

fn print_tree(tree: &RequirementTree, depth: usize) {
    for (skill, node) in tree {
        println!(
            "{}{} {} {}",
            "  ".repeat(depth + 1),
            style("•").dim(),
            skill,
            style(format!("level {}", node.level)).yellow()
        );
        print_tree(&node.sub_requirements, depth + 1);
    }
}
