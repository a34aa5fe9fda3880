//! Shared domain types for Drydock.
//!
//! This crate contains the core domain types used across the Drydock
//! character service: Character, item types from the game-data catalogue,
//! fit loadouts, requirement trees, skill plans, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod character;
pub mod config;
pub mod error;
pub mod fit;
pub mod gamedata;
pub mod plan;
pub mod requirement;
