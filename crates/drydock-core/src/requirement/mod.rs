//! Skill requirement resolution for fits.
//!
//! `graph` holds the in-memory slice of the catalogue a check needs;
//! `walker` turns a fit plus a character into trees of unmet skills.

pub mod graph;
pub mod walker;

pub use graph::PrerequisiteGraph;
pub use walker::{check_requirements, resolve_item};
