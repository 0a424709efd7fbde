//! Request file handling for saving and loading deployment requests.
//!
//! A request is a scenario descriptor plus everything needed to carry it out:
//! connection names, template and output directories, and output options.
//! The scenario fields sit at the top level of the JSON document.
//!
//! ```json
//! {
//!   "kind": "deploy",
//!   "version": "5.5 SQL Param",
//!   "provider_account": "abc123.west-2",
//!   "consumer_account": "xyz789",
//!   "connections": { "provider": "prov_admin", "consumer": "cons_admin" },
//!   "templates_dir": "templates/5.5",
//!   "output_dir": "out"
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::plan::ConnectionTarget;
use crate::error::DcrError;
use crate::scenario::{normalize_account, ScenarioDescriptor};
use crate::script_runner::DEFAULT_SNOWSQL;
use crate::script_traits::ConnectionMap;
use crate::types::{AccountRole, DcrVersion, ScenarioKind};

/// Deployment request that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    #[serde(flatten)]
    pub scenario: ScenarioDescriptor,

    #[serde(default)]
    pub connections: ConnectionMap,

    /// Root of the template tree for the selected version
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Directory rendered scripts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Write the annotated texts instead of the cleaned ones
    #[serde(default = "default_include_comments")]
    pub include_comments: bool,
    #[serde(default)]
    pub dry_run: bool,
    /// Client binary used for execution
    #[serde(default = "default_snowsql")]
    pub snowsql: String,
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_include_comments() -> bool {
    true
}

fn default_snowsql() -> String {
    DEFAULT_SNOWSQL.to_string()
}

impl Default for DeploymentRequest {
    fn default() -> Self {
        Self::new(ScenarioDescriptor::default())
    }
}

impl DeploymentRequest {
    /// Wrap a scenario with default directories and no connections
    pub fn new(scenario: ScenarioDescriptor) -> Self {
        Self {
            scenario,
            connections: ConnectionMap::default(),
            templates_dir: default_templates_dir(),
            output_dir: default_output_dir(),
            include_comments: default_include_comments(),
            dry_run: false,
            snowsql: default_snowsql(),
        }
    }

    /// Save request to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize request to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write request to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load request from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read request from {:?}", path.as_ref()))?;

        let request: Self =
            serde_json::from_str(&content).context("Failed to parse request JSON")?;

        Ok(request)
    }

    /// Connections the resolved plan will need at execution time
    pub fn required_connections(&self) -> Vec<ConnectionTarget> {
        let s = &self.scenario;
        if s.version == DcrVersion::IdResolution {
            return s
                .deployment_role
                .map(ConnectionTarget::for_role)
                .into_iter()
                .collect();
        }
        match s.kind {
            ScenarioKind::Uninstall => vec![ConnectionTarget::Account],
            ScenarioKind::OnboardData | ScenarioKind::AddTemplate => {
                vec![ConnectionTarget::Provider]
            }
            _ => match s.deployment_role {
                Some(role) => vec![ConnectionTarget::for_role(role)],
                None => vec![ConnectionTarget::Provider, ConnectionTarget::Consumer],
            },
        }
    }

    /// Validate the request before any plan is resolved
    pub fn validate(&self) -> crate::error::Result<()> {
        let s = &self.scenario;

        if s.version == DcrVersion::IdResolution {
            if s.deployment_role.is_none() {
                return Err(DcrError::validation(
                    "ID resolution requires a deployment role (provider or consumer)",
                ));
            }
            if s.options.keys().any(|key| key.trim().is_empty()) {
                return Err(DcrError::validation("Option keys must not be empty"));
            }
        } else if s.kind == ScenarioKind::Uninstall {
            validate_uninstall(s)?;
        } else {
            validate_pair(s)?;
        }

        match s.kind {
            ScenarioKind::OnboardData => {
                let source = s.onboarding.as_ref().ok_or_else(|| {
                    DcrError::validation("Onboarding requires a source database, schema, table and column")
                })?;
                for (field, value) in [
                    ("database", &source.database),
                    ("schema", &source.schema),
                    ("table", &source.table),
                    ("column", &source.column),
                ] {
                    if value.trim().is_empty() {
                        return Err(DcrError::validation(format!(
                            "Onboarding source {} must be specified",
                            field
                        )));
                    }
                }
            }
            ScenarioKind::AddTemplate => {
                let template = s
                    .template
                    .as_ref()
                    .ok_or_else(|| DcrError::validation("A template name and text are required"))?;
                if template.name.trim().is_empty() {
                    return Err(DcrError::validation("Template name must be specified"));
                }
                if template.text.trim().is_empty() {
                    return Err(DcrError::validation("Template text must be specified"));
                }
            }
            _ => {}
        }

        let templates = absolute_path(&self.templates_dir);
        let output = absolute_path(&self.output_dir);
        if output.starts_with(&templates) {
            return Err(DcrError::validation(format!(
                "Output directory {:?} must not be the template directory {:?} or inside it",
                self.output_dir, self.templates_dir
            )));
        }

        if !self.dry_run {
            for target in self.required_connections() {
                if self.connections.name_for(target).is_none() {
                    return Err(DcrError::validation(format!(
                        "A {} connection name is required unless running with --dry-run",
                        target
                    )));
                }
            }
            if self.snowsql.trim().is_empty() {
                return Err(DcrError::validation("The snowsql program must be specified"));
            }
        }

        Ok(())
    }
}

/// Canonical form of `path`, resolving through its longest existing ancestor
fn absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

fn validate_pair(s: &ScenarioDescriptor) -> crate::error::Result<()> {
    let provider = normalize_account(&s.provider_account);
    let consumer = normalize_account(&s.consumer_account);

    if provider.is_empty() {
        return Err(DcrError::validation("Provider account must be specified"));
    }
    if consumer.is_empty() {
        return Err(DcrError::validation("Consumer account must be specified"));
    }
    if provider == consumer {
        return Err(DcrError::validation(format!(
            "Provider and consumer must be different accounts (both are {})",
            provider
        )));
    }
    Ok(())
}

fn validate_uninstall(s: &ScenarioDescriptor) -> crate::error::Result<()> {
    let account = normalize_account(&s.account);
    if account.is_empty() {
        return Err(DcrError::validation("The account to uninstall must be specified"));
    }
    let Some(role) = s.account_role else {
        return Err(DcrError::validation(
            "Uninstall requires the account's role (provider or consumer)",
        ));
    };
    if role == AccountRole::Provider && account == normalize_account(&s.consumer_account) {
        return Err(DcrError::validation(format!(
            "Provider account {} cannot also be the consumer account",
            account
        )));
    }
    Ok(())
}
