//! Skill plan export in three formats.
//!
//! - Text: indented listing grouped by item
//! - XML: EVEMon plan document, duplicates removed
//! - EMP: the EVEMon plan gzip-compressed

use std::collections::HashSet;
use std::io::Write as _;

use flate2::Compression;
use flate2::write::GzEncoder;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use drydock_types::plan::{ExportFormat, SkillPlan};

/// Width of the rules drawn by the text export.
const RULE_WIDTH: usize = 79;

/// Priority EVEMon assigns to prerequisite entries.
const ENTRY_PRIORITY: &str = "3";

/// Errors while rendering a plan.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("xml write failed: {0}")]
    Xml(String),

    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

fn xml_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

fn plan_title(plan: &SkillPlan) -> String {
    format!("Drydock exported plan for {}", plan.character_name)
}

/// Render a plan as indented plain text.
pub fn export_text(plan: &SkillPlan) -> String {
    let rule = |c: &str| c.repeat(RULE_WIDTH);

    let mut out = format!("Drydock exported plan for \"{}\"\n", plan.character_name);
    out.push_str(&rule("="));
    out.push_str("\n\n");

    let mut current_item: Option<&str> = None;
    for entry in &plan.entries {
        if current_item != Some(entry.item.as_str()) {
            current_item = Some(entry.item.as_str());
            out.push_str(&rule("-"));
            out.push('\n');
            out.push_str(&format!("Skills required for {}:\n", entry.item));
        }
        out.push_str(&format!(
            "{}{}: {}\n",
            "    ".repeat(entry.indent),
            entry.skill,
            entry.level
        ));
    }
    out.push_str(&rule("-"));
    out.push('\n');
    out
}

/// Render a plan as an EVEMon plan document.
///
/// Entries repeating an earlier `(skill id, skill, level)` are dropped;
/// EVEMon rejects plans with duplicate entries.
pub fn export_xml(plan: &SkillPlan, revision: &str) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;

    let title = plan_title(plan);
    let root = BytesStart::new("plan")
        .with_attributes([("name", title.as_str()), ("revision", revision)]);
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    let sorting = BytesStart::new("sorting").with_attributes([
        ("criteria", "None"),
        ("order", "None"),
        ("groupByPriority", "false"),
    ]);
    writer.write_event(Event::Empty(sorting)).map_err(xml_err)?;

    let mut seen = HashSet::new();
    for entry in &plan.entries {
        if !seen.insert((entry.skill_id, entry.skill.as_str(), entry.level)) {
            continue;
        }

        let skill_id = entry.skill_id.to_string();
        let level = entry.level.to_string();
        let element = BytesStart::new("entry").with_attributes([
            ("skillID", skill_id.as_str()),
            ("skill", entry.skill.as_str()),
            ("level", level.as_str()),
            ("priority", ENTRY_PRIORITY),
            ("type", "Prerequisite"),
        ]);
        writer.write_event(Event::Start(element)).map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("notes")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::Text(BytesText::new(&entry.skill)))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("notes")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("entry")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("plan")))
        .map_err(xml_err)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(xml_err)
}

/// Render a plan as a gzip'd EVEMon plan (`.emp`).
pub fn export_emp(plan: &SkillPlan, revision: &str) -> Result<Vec<u8>, ExportError> {
    let xml = export_xml(plan, revision)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(xml.as_bytes())?;
    Ok(encoder.finish()?)
}

/// Render a plan in the requested format, ready to be written to disk.
pub fn render(
    plan: &SkillPlan,
    format: ExportFormat,
    revision: &str,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Text => Ok(export_text(plan).into_bytes()),
        ExportFormat::Xml => Ok(export_xml(plan, revision)?.into_bytes()),
        ExportFormat::Emp => export_emp(plan, revision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    use drydock_types::plan::PlanEntry;

    fn entry(item: &str, skill: &str, skill_id: i64, level: u8, indent: usize) -> PlanEntry {
        PlanEntry {
            item: item.to_string(),
            skill: skill.to_string(),
            skill_id,
            level,
            indent,
        }
    }

    fn sample_plan() -> SkillPlan {
        SkillPlan {
            character_name: "Pilot".to_string(),
            entries: vec![
                entry("125mm Gatling AutoCannon I", "Small Projectile Turret", 3301, 3, 0),
                entry("125mm Gatling AutoCannon I", "Gunnery", 3300, 1, 1),
                entry("Rifter", "Minmatar Frigate", 3329, 1, 0),
                entry("Rifter", "Gunnery", 3300, 1, 1),
            ],
        }
    }

    #[test]
    fn test_text_export_layout() {
        let text = export_text(&sample_plan());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Drydock exported plan for \"Pilot\"");
        assert_eq!(lines[1], "=".repeat(79));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "-".repeat(79));
        assert_eq!(lines[4], "Skills required for 125mm Gatling AutoCannon I:");
        assert_eq!(lines[5], "Small Projectile Turret: 3");
        assert_eq!(lines[6], "    Gunnery: 1");
        assert_eq!(lines[7], "-".repeat(79));
        assert_eq!(lines[8], "Skills required for Rifter:");
        assert_eq!(*lines.last().unwrap(), "-".repeat(79));
    }

    #[test]
    fn test_text_export_empty_plan() {
        let plan = SkillPlan {
            character_name: "Nobody".to_string(),
            entries: Vec::new(),
        };
        let text = export_text(&plan);
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_xml_export_structure() {
        let xml = export_xml(&sample_plan(), "4081").unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<plan name=\"Drydock exported plan for Pilot\" revision=\"4081\">"));
        assert!(xml.contains("<sorting criteria=\"None\" order=\"None\" groupByPriority=\"false\"/>"));
        assert!(xml.contains(
            "<entry skillID=\"3301\" skill=\"Small Projectile Turret\" level=\"3\" priority=\"3\" type=\"Prerequisite\">"
        ));
        assert!(xml.contains("<notes>Gunnery</notes>"));
        assert!(xml.trim_end().ends_with("</plan>"));
    }

    #[test]
    fn test_xml_export_drops_duplicates() {
        let xml = export_xml(&sample_plan(), "4081").unwrap();
        assert_eq!(xml.matches("skillID=\"3300\"").count(), 1);
        assert_eq!(xml.matches("<entry ").count(), 3);
    }

    #[test]
    fn test_xml_export_escapes_names() {
        let plan = SkillPlan {
            character_name: "A \"quoted\" <pilot>".to_string(),
            entries: vec![entry("Item", "R&D", 1, 1, 0)],
        };
        let xml = export_xml(&plan, "4081").unwrap();
        assert!(xml.contains("R&amp;D"));
        assert!(!xml.contains("<pilot>"));
    }

    #[test]
    fn test_emp_is_gzipped_xml() {
        let bytes = export_emp(&sample_plan(), "4081").unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

        let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
        let mut xml = String::new();
        decoder.read_to_string(&mut xml).unwrap();
        assert_eq!(xml, export_xml(&sample_plan(), "4081").unwrap());
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let plan = sample_plan();
        let text = render(&plan, ExportFormat::Text, "4081").unwrap();
        assert!(String::from_utf8(text).unwrap().starts_with("Drydock exported plan"));
        let xml = render(&plan, ExportFormat::Xml, "4081").unwrap();
        assert!(String::from_utf8(xml).unwrap().contains("<plan "));
    }
}
