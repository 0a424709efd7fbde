//! Deployment Plan
//!
//! A `DeploymentPlan` is the resolver's output and the renderer's input:
//! an ordered list of script steps, each optionally bound to a connection,
//! plus an ordered list of token substitutions.
//!
//! # Ordering
//!
//! | List          | Why order matters |
//! |---------------|-------------------|
//! | steps         | Execution order: provider objects, then consumer objects, then cross grants |
//! | substitutions | Applied in sequence per line; an earlier rule's output can be matched by a later rule |
//!
//! Steps and substitutions are stored as pairs, so the script/connection and
//! token/replacement lists are index-aligned by construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::types::AccountRole;

// ============================================================================
// Step Types
// ============================================================================

/// Which configured connection a step executes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionTarget {
    Provider,
    Consumer,
    /// The single account named by an uninstall
    Account,
}

impl ConnectionTarget {
    /// Connection matching a participant role
    pub fn for_role(role: AccountRole) -> Self {
        match role {
            AccountRole::Provider => Self::Provider,
            AccountRole::Consumer => Self::Consumer,
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => write!(f, "provider"),
            Self::Consumer => write!(f, "consumer"),
            Self::Account => write!(f, "account"),
        }
    }
}

/// Template path relative to the template root, extension included
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptRef(PathBuf);

impl ScriptRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Relative path under the template root
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Base file name with directories stripped; the output key
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// One script in the plan and where (if anywhere) it runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub script: ScriptRef,
    /// `None` means render only, never execute
    pub connection: Option<ConnectionTarget>,
}

impl PlanStep {
    pub fn new(script: ScriptRef, connection: Option<ConnectionTarget>) -> Self {
        Self { script, connection }
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connection {
            Some(target) => write!(f, "{} @ {}", self.script, target),
            None => write!(f, "{} (render only)", self.script),
        }
    }
}

/// A literal match-and-replace rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub token: String,
    pub replacement: String,
}

impl Substitution {
    pub fn new(token: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            replacement: replacement.into(),
        }
    }

    /// Replace every occurrence of the token in `line`.
    ///
    /// An empty token would match between every character, so it is a no-op.
    pub fn apply(&self, line: &str) -> String {
        if self.token.is_empty() {
            line.to_string()
        } else {
            line.replace(&self.token, &self.replacement)
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// A fully resolved, immutable deployment plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    steps: Vec<PlanStep>,
    substitutions: Vec<Substitution>,
}

impl DeploymentPlan {
    pub fn new(steps: Vec<PlanStep>, substitutions: Vec<Substitution>) -> Self {
        Self {
            steps,
            substitutions,
        }
    }

    /// The plan for an unsupported version/scenario combination
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the plan has no scripts to render
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    pub fn scripts(&self) -> Vec<&ScriptRef> {
        self.steps.iter().map(|step| &step.script).collect()
    }

    pub fn connections(&self) -> Vec<Option<ConnectionTarget>> {
        self.steps.iter().map(|step| step.connection).collect()
    }

    pub fn match_tokens(&self) -> Vec<&str> {
        self.substitutions.iter().map(|s| s.token.as_str()).collect()
    }

    pub fn replacements(&self) -> Vec<&str> {
        self.substitutions
            .iter()
            .map(|s| s.replacement.as_str())
            .collect()
    }

    /// Apply every substitution to one line, in order, single pass
    pub fn substitute(&self, line: &str) -> String {
        self.substitutions
            .iter()
            .fold(line.to_string(), |acc, rule| rule.apply(&acc))
    }

    /// Returns a summary of the plan for logging/display.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Deployment Plan ({} scripts):", self.steps.len())];
        for (i, step) in self.steps.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, step));
        }
        lines.push(format!("  Substitutions ({}):", self.substitutions.len()));
        for rule in &self.substitutions {
            lines.push(format!("    {:?} -> {:?}", rule.token, rule.replacement));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> DeploymentPlan {
        DeploymentPlan::new(
            vec![
                PlanStep::new(ScriptRef::new("provider_init.sql"), Some(ConnectionTarget::Provider)),
                PlanStep::new(ScriptRef::new("consumer_request.sql"), None),
            ],
            vec![
                Substitution::new("SNOWCAT2", "ABC123"),
                Substitution::new("SNOWCAT", "XYZ789"),
            ],
        )
    }

    #[test]
    fn test_accessors_are_aligned() {
        let plan = sample_plan();
        assert_eq!(plan.scripts().len(), plan.connections().len());
        assert_eq!(plan.match_tokens().len(), plan.replacements().len());
        assert_eq!(plan.connections(), vec![Some(ConnectionTarget::Provider), None]);
        assert_eq!(plan.match_tokens(), vec!["SNOWCAT2", "SNOWCAT"]);
    }

    #[test]
    fn test_substitute_applies_rules_in_order() {
        let plan = sample_plan();
        assert_eq!(
            plan.substitute("grant to SNOWCAT2 and SNOWCAT;"),
            "grant to ABC123 and XYZ789;"
        );
    }

    #[test]
    fn test_substitute_single_pass_no_fixpoint() {
        let plan = DeploymentPlan::new(
            vec![],
            vec![Substitution::new("A", "AB"), Substitution::new("B", "C")],
        );
        // The second rule sees the first rule's output but rules never repeat
        assert_eq!(plan.substitute("A"), "AC");
    }

    #[test]
    fn test_empty_token_is_noop() {
        let rule = Substitution::new("", "X");
        assert_eq!(rule.apply("abc"), "abc");
    }

    #[test]
    fn test_script_ref_file_name_strips_directories() {
        let script = ScriptRef::new("customer_enrichment/customer_enrichment_provider_data.sql");
        assert_eq!(script.file_name(), "customer_enrichment_provider_data.sql");
        assert_eq!(ScriptRef::new("provider_init.sql").file_name(), "provider_init.sql");
    }

    #[test]
    fn test_empty_plan() {
        let plan = DeploymentPlan::empty();
        assert!(plan.is_empty());
        assert!(plan.scripts().is_empty());
        assert!(plan.substitutions().is_empty());
    }

    #[test]
    fn test_summary_lists_steps() {
        let summary = sample_plan().summary();
        assert!(summary.contains("Deployment Plan (2 scripts)"));
        assert!(summary.contains("1. provider_init.sql @ provider"));
        assert!(summary.contains("2. consumer_request.sql (render only)"));
    }
}
