//! Skill browsing and level editing.
//!
//! Edits made from the CLI are saved immediately; pending edits only live
//! as long as the process that made them.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use drydock_types::character::SkillLevel;
use drydock_types::gamedata::ItemTypeId;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum SkillCommand {
    /// List the published skill groups.
    Groups,

    /// List the published skills of a group.
    #[command(alias = "ls")]
    List {
        /// Skill group ID.
        group: i64,
    },

    /// Show a skill's description.
    Describe {
        /// Skill type ID.
        skill: ItemTypeId,
    },

    /// Show a character's level in a skill.
    Level {
        /// Character name or ID.
        character: String,
        /// Skill type ID.
        skill: ItemTypeId,
    },

    /// Set a character's level in a skill and save.
    Set {
        /// Character name or ID.
        character: String,
        /// Skill type ID.
        skill: ItemTypeId,
        /// Level 0-5, or anything else to mark the skill not learned.
        #[arg(allow_hyphen_values = true)]
        level: String,
    },
}

pub async fn handle_skill_command(action: SkillCommand, state: &AppState, json: bool) -> Result<()> {
    match action {
        SkillCommand::Groups => list_groups(state, json).await,
        SkillCommand::List { group } => list_skills(state, group, json).await,
        SkillCommand::Describe { skill } => describe_skill(state, skill, json).await,
        SkillCommand::Level { character, skill } => show_level(state, &character, skill, json).await,
        SkillCommand::Set {
            character,
            skill,
            level,
        } => set_level(state, &character, skill, &level, json).await,
    }
}

/// Parse a CLI level argument. Anything that is not a number means "not learned".
pub(crate) fn parse_level(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn level_cell(level: SkillLevel) -> Cell {
    match level {
        SkillLevel::NotLearned => Cell::new(level).fg(Color::DarkGrey),
        SkillLevel::Level(5) => Cell::new(level).fg(Color::Green),
        SkillLevel::Level(_) => Cell::new(level).fg(Color::Yellow),
    }
}

async fn list_groups(state: &AppState, json: bool) -> Result<()> {
    let groups = state.character_service.skill_groups().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!();
        println!(
            "  {} No skill groups yet. Load a catalogue with: {}",
            style("i").blue().bold(),
            style("drydock catalog import <file>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("Group").fg(Color::White),
        ]);
    for group in &groups {
        table.add_row(vec![
            Cell::new(group.id).fg(Color::DarkGrey),
            Cell::new(&group.name).fg(Color::Cyan),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

async fn list_skills(state: &AppState, group: i64, json: bool) -> Result<()> {
    let skills = state.character_service.skills(group).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&skills)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("Skill").fg(Color::White),
            Cell::new("Prerequisites").fg(Color::White),
        ]);
    for skill in &skills {
        table.add_row(vec![
            Cell::new(skill.id).fg(Color::DarkGrey),
            Cell::new(&skill.name).fg(Color::Cyan),
            Cell::new(skill.required_skills.len()),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} skill{}",
        style(skills.len()).bold(),
        if skills.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

async fn describe_skill(state: &AppState, skill: ItemTypeId, json: bool) -> Result<()> {
    let description = state.character_service.skill_description(skill).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"skill_id": skill, "description": description})
        );
    } else {
        println!();
        println!("  {description}");
        println!();
    }
    Ok(())
}

async fn show_level(state: &AppState, reference: &str, skill: ItemTypeId, json: bool) -> Result<()> {
    let service = &state.character_service;
    let character = service.resolve_character(reference).await?;
    let level = service.skill_level(&character.id, skill).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"character": character.name, "skill_id": skill, "level": level})
        );
    } else {
        println!(
            "  {}  skill {}: {}",
            style(&character.name).cyan(),
            skill,
            style(level).bold()
        );
    }
    Ok(())
}

async fn set_level(
    state: &AppState,
    reference: &str,
    skill: ItemTypeId,
    raw_level: &str,
    json: bool,
) -> Result<()> {
    let service = &state.character_service;
    let character = service.resolve_character(reference).await?;

    let level = service
        .change_level(&character.id, skill, parse_level(raw_level))
        .await?;
    service.save_character(&character.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"character": character.name, "skill_id": skill, "level": level})
        );
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_header(vec![
            Cell::new("Character").fg(Color::White),
            Cell::new("Skill").fg(Color::White),
            Cell::new("Level").fg(Color::White),
        ])
        .add_row(vec![
            Cell::new(&character.name).fg(Color::Cyan),
            Cell::new(skill),
            level_cell(level),
        ]);
    println!("  {} Saved.", style("✓").green().bold());
    println!("{table}");
    Ok(())
}
