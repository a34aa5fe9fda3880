//! Custom request extractors.

pub mod query;
