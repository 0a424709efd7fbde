//! Scenario descriptors — the validated input to plan resolution.
//!
//! A `ScenarioDescriptor` carries everything the resolver needs to pick
//! scripts and substitutions. Free-text fields are kept as the caller typed
//! them; account identifiers are normalized by the resolver with
//! [`normalize_account`] before they become substitution values.
//!
//! # Preconditions
//!
//! The resolver does not re-validate descriptors. Callers reject identical
//! provider/consumer accounts (and the equivalent uninstall mistake) before
//! resolution; see `DeploymentRequest::validate`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{AccountRole, DcrVersion, ScenarioKind, UseCase};

/// Provider source table to onboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingSource {
    pub database: String,
    pub schema: String,
    pub table: String,
    /// Join/identity column exposed to the clean room
    pub column: String,
}

/// Query template to register with the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub name: String,
    pub text: String,
    /// Comma-separated dimension list; absent means no dimensions
    #[serde(default)]
    pub dimensions: Option<String>,
}

/// Everything that selects and parameterizes a deployment plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioDescriptor {
    pub kind: ScenarioKind,
    pub version: DcrVersion,

    // Participants
    pub provider_account: String,
    pub consumer_account: String,
    /// The account being removed (uninstall only)
    pub account: String,
    /// Role of `account` (uninstall only)
    pub account_role: Option<AccountRole>,
    /// Restrict a deployment to one side, or pick the ID resolution side
    pub deployment_role: Option<AccountRole>,

    // Naming
    pub abbreviation: String,
    /// Abbreviation of the deployment being upgraded
    pub old_abbreviation: String,
    /// Suffix distinguishing a second provider's application
    pub app_suffix: String,

    pub use_case: Option<UseCase>,
    pub onboarding: Option<OnboardingSource>,
    pub template: Option<TemplateDefinition>,
    /// ID resolution parameters, substituted as `&key` / `&KEY`
    pub options: IndexMap<String, String>,
}

impl ScenarioDescriptor {
    /// Create a descriptor for a scenario with every other field empty
    pub fn new(kind: ScenarioKind, version: DcrVersion) -> Self {
        Self {
            kind,
            version,
            ..Self::default()
        }
    }

    /// Set provider and consumer accounts
    pub fn with_accounts(
        mut self,
        provider: impl Into<String>,
        consumer: impl Into<String>,
    ) -> Self {
        self.provider_account = provider.into();
        self.consumer_account = consumer.into();
        self
    }

    /// Set the naming abbreviation
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = abbreviation.into();
        self
    }

    /// Abbreviation after applying the version default
    pub fn effective_abbreviation(&self) -> &str {
        or_default(&self.abbreviation, self.version.default_abbreviation())
    }

    /// Upgrade source abbreviation after applying the legacy default
    pub fn effective_old_abbreviation(&self) -> &str {
        or_default(&self.old_abbreviation, DcrVersion::SqlParam.default_abbreviation())
    }

    /// App suffix after applying the second-provider default
    pub fn effective_app_suffix(&self) -> &str {
        or_default(&self.app_suffix, DEFAULT_APP_SUFFIX)
    }
}

/// Suffix given to the second provider's application when none is supplied
pub const DEFAULT_APP_SUFFIX: &str = "two";

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { default } else { trimmed }
}

/// Normalize an account identifier for use as a substitution value.
///
/// Drops everything from the first `.` (region/cloud suffix) and uppercases
/// the locator. Idempotent.
///
/// ```
/// use dcr_assistant::scenario::normalize_account;
///
/// assert_eq!(normalize_account("abc123.west-2"), "ABC123");
/// assert_eq!(normalize_account("ABC123"), "ABC123");
/// ```
pub fn normalize_account(account: &str) -> String {
    account
        .split('.')
        .next()
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}
