//! Skill plan rendering for backups.

pub mod export;

pub use export::{export_emp, export_text, export_xml, render};
