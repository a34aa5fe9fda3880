//! Infrastructure layer for Drydock.
//!
//! Contains implementations of the ports defined in `drydock-core`:
//! SQLite storage for characters and the game-data catalogue, the local
//! filesystem adapter, the XML API HTTP client, and the config loader.

pub mod config;
pub mod eveapi;
pub mod filesystem;
pub mod sqlite;
