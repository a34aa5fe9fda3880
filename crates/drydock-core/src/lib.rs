//! Business logic and repository trait definitions for Drydock.
//!
//! This crate defines the "ports" (repository and API client traits) that the
//! infrastructure layer implements, plus the pure pieces of the character
//! service: the requirement walker, skill plan export, and XML import parsing.
//! It depends only on `drydock-types` -- never on `drydock-infra` or any
//! database/HTTP crate.

pub mod client;
pub mod import;
pub mod plan;
pub mod repository;
pub mod requirement;
pub mod service;
