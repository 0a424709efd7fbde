//! Type-safe scenario vocabulary for the clean room assistant
//!
//! Versions, scenarios, roles and use cases are closed enumerations. The
//! strum serializations are the exact tags users type and request files carry.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Clean room release the scripts belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum DcrVersion {
    /// Legacy parameter-substitution release
    #[default]
    #[strum(serialize = "5.5 SQL Param")]
    #[serde(rename = "5.5 SQL Param")]
    SqlParam,
    /// Legacy release with Jinja-rendered templates
    #[strum(serialize = "5.5 Jinja")]
    #[serde(rename = "5.5 Jinja")]
    Jinja,
    /// Application-packaging release
    #[strum(serialize = "6.0 Native App")]
    #[serde(rename = "6.0 Native App")]
    NativeApp,
    /// ID resolution release with auto-discovered scripts
    #[strum(serialize = "ID Resolution Native App")]
    #[serde(rename = "ID Resolution Native App")]
    IdResolution,
}

impl DcrVersion {
    /// Abbreviation used when the caller leaves it blank
    pub fn default_abbreviation(&self) -> &'static str {
        match self {
            Self::SqlParam | Self::Jinja => "samp",
            Self::NativeApp | Self::IdResolution => "demo",
        }
    }
}

/// What the user wants to do to the clean room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScenarioKind {
    /// Initial two-party deployment
    #[default]
    Deploy,
    /// Add a consumer to an existing provider
    AddConsumer,
    /// Add a provider to an existing consumer
    AddProvider,
    /// Upgrade a legacy deployment to the packaged release
    Upgrade,
    /// Remove the clean room from one account
    Uninstall,
    /// Onboard a provider source table
    OnboardData,
    /// Register a new query template
    AddTemplate,
}

/// Participant role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum AccountRole {
    #[serde(alias = "provider")]
    Provider,
    #[serde(alias = "consumer")]
    Consumer,
}

impl AccountRole {
    /// Template subdirectory holding this role's auto-discovered scripts
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Consumer => "consumer",
        }
    }
}

/// Optional bundle of demo data and templates for a business scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UseCase {
    CustomerEnrichment,
    AudienceOverlap,
    Measurement,
}

impl UseCase {
    /// Template subdirectory and file-name prefix of this use case
    pub fn directory(&self) -> &'static str {
        match self {
            Self::CustomerEnrichment => "customer_enrichment",
            Self::AudienceOverlap => "audience_overlap",
            Self::Measurement => "measurement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_version_tags() {
        assert_eq!(DcrVersion::SqlParam.to_string(), "5.5 SQL Param");
        assert_eq!(DcrVersion::NativeApp.to_string(), "6.0 Native App");
        assert_eq!(
            DcrVersion::from_str("ID Resolution Native App").unwrap(),
            DcrVersion::IdResolution
        );
        assert!(DcrVersion::from_str("7.0 Hybrid").is_err());
    }

    #[test]
    fn test_version_serde_uses_tags() {
        let json = serde_json::to_string(&DcrVersion::Jinja).unwrap();
        assert_eq!(json, "\"5.5 Jinja\"");
        let parsed: DcrVersion = serde_json::from_str("\"6.0 Native App\"").unwrap();
        assert_eq!(parsed, DcrVersion::NativeApp);
    }

    #[test]
    fn test_default_abbreviation() {
        assert_eq!(DcrVersion::SqlParam.default_abbreviation(), "samp");
        assert_eq!(DcrVersion::Jinja.default_abbreviation(), "samp");
        assert_eq!(DcrVersion::NativeApp.default_abbreviation(), "demo");
    }

    #[test]
    fn test_scenario_kind_names() {
        assert_eq!(ScenarioKind::AddConsumer.to_string(), "add_consumer");
        assert_eq!(ScenarioKind::from_str("onboard_data").unwrap(), ScenarioKind::OnboardData);
        let json = serde_json::to_string(&ScenarioKind::AddTemplate).unwrap();
        assert_eq!(json, "\"add_template\"");
    }

    #[test]
    fn test_account_role_parsing_is_case_insensitive() {
        assert_eq!(AccountRole::from_str("Provider").unwrap(), AccountRole::Provider);
        assert_eq!(AccountRole::from_str("consumer").unwrap(), AccountRole::Consumer);
        let parsed: AccountRole = serde_json::from_str("\"provider\"").unwrap();
        assert_eq!(parsed, AccountRole::Provider);
    }

    #[test]
    fn test_use_case_directory_matches_display() {
        for use_case in UseCase::iter() {
            assert_eq!(use_case.directory(), use_case.to_string());
        }
    }
}
