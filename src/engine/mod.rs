//! Engine modules — the value types a resolved deployment consists of.
//!
//! The engine layer sits between resolution (which scripts, which tokens) and
//! rendering (reading and rewriting templates). Plans are immutable once built.

pub mod plan;
