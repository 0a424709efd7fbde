//! Logic modules — translates a scenario into a concrete deployment plan.
//!
//! The logic layer resolves abstract selections (scenario, version, use case)
//! into specific script names, connections and token substitutions.
//!
//! # Modules
//!
//! - `resolver` — Declarative plan table and the generic resolver
//! - `catalog` — Directory listings for auto-discovered plans

pub mod catalog;
pub mod resolver;
