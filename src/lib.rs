//! DCR Assistant Library
//!
//! This library provides the core functionality for generating clean room
//! deployment scripts: plan resolution, template rendering and execution.

pub mod cli;
pub mod config_file;
pub mod engine;
pub mod error;
pub mod logic;
pub mod output;
pub mod renderer;
pub mod scenario;
pub mod script_runner;
pub mod script_traits;
pub mod types;

// Re-export main types for convenience
pub use config_file::DeploymentRequest;
pub use error::{DcrError, Result};
pub use scenario::{normalize_account, OnboardingSource, ScenarioDescriptor, TemplateDefinition};
pub use types::{AccountRole, DcrVersion, ScenarioKind, UseCase};

// Plan model and resolver
pub use engine::plan::{ConnectionTarget, DeploymentPlan, PlanStep, ScriptRef, Substitution};
pub use logic::catalog::{DirectoryCatalog, ScriptCatalog, StaticCatalog};
pub use logic::resolver::resolve;

// Rendering and execution
pub use renderer::{RenderOutcome, RenderedScripts, ScriptRenderer};
pub use script_runner::SnowSqlExecutor;
pub use script_traits::{ConnectionMap, ResultCursor, StatementExecutor};
