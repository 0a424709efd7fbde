//! Property-Based Tests for DCR Assistant
//!
//! Uses proptest for testing invariants and edge cases
//!
//! These tests verify:
//! - Enum string round-trips (parse → to_string → parse)
//! - Plan alignment for every scenario/version combination
//! - Account normalization invariants
//! - Comment stripping never adds or rewrites characters

use proptest::prelude::*;

use dcr_assistant::renderer::{render_line, strip_trailing_comment};
use dcr_assistant::{
    normalize_account, resolve, AccountRole, DcrVersion, DeploymentPlan, ScenarioDescriptor,
    ScenarioKind, StaticCatalog, Substitution, UseCase,
};

// =============================================================================
// Strategies
// =============================================================================

fn version_strategy() -> impl Strategy<Value = DcrVersion> {
    prop_oneof![
        Just(DcrVersion::SqlParam),
        Just(DcrVersion::Jinja),
        Just(DcrVersion::NativeApp),
        Just(DcrVersion::IdResolution),
    ]
}

fn kind_strategy() -> impl Strategy<Value = ScenarioKind> {
    prop_oneof![
        Just(ScenarioKind::Deploy),
        Just(ScenarioKind::AddConsumer),
        Just(ScenarioKind::AddProvider),
        Just(ScenarioKind::Upgrade),
        Just(ScenarioKind::Uninstall),
        Just(ScenarioKind::OnboardData),
        Just(ScenarioKind::AddTemplate),
    ]
}

fn role_strategy() -> impl Strategy<Value = Option<AccountRole>> {
    prop_oneof![
        Just(None),
        Just(Some(AccountRole::Provider)),
        Just(Some(AccountRole::Consumer)),
    ]
}

fn use_case_strategy() -> impl Strategy<Value = Option<UseCase>> {
    prop_oneof![
        Just(None),
        Just(Some(UseCase::CustomerEnrichment)),
        Just(Some(UseCase::AudienceOverlap)),
        Just(Some(UseCase::Measurement)),
    ]
}

prop_compose! {
    fn descriptor_strategy()(
        kind in kind_strategy(),
        version in version_strategy(),
        provider in "[a-z0-9]{1,8}(\\.[a-z0-9-]{1,10})?",
        consumer in "[a-z0-9]{1,8}(\\.[a-z0-9-]{1,10})?",
        abbreviation in "[a-z]{0,6}",
        suffix in "[a-z]{0,5}",
        account_role in role_strategy(),
        deployment_role in role_strategy(),
        use_case in use_case_strategy(),
    ) -> ScenarioDescriptor {
        let mut d = ScenarioDescriptor::new(kind, version)
            .with_accounts(provider.clone(), consumer)
            .with_abbreviation(abbreviation);
        d.account = provider;
        d.app_suffix = suffix;
        d.account_role = account_role;
        d.deployment_role = deployment_role;
        d.use_case = use_case;
        d
    }
}

fn discovered_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_dir("provider", ["02_b.sql", "01_a.sql"])
        .with_dir("consumer", ["01_c.sql"])
}

// =============================================================================
// Enum Round-Trips
// =============================================================================

proptest! {
    /// DcrVersion: to_string → parse round-trip is identity
    #[test]
    fn version_roundtrip(version in version_strategy()) {
        let s = version.to_string();
        let parsed: DcrVersion = s.parse().expect("Should parse");
        prop_assert_eq!(version, parsed);
    }

    /// ScenarioKind: Display output is non-empty snake_case
    #[test]
    fn kind_display_is_snake_case(kind in kind_strategy()) {
        let s = kind.to_string();
        prop_assert!(!s.is_empty());
        prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        let parsed: ScenarioKind = s.parse().expect("Should parse");
        prop_assert_eq!(kind, parsed);
    }
}

// =============================================================================
// Plan Invariants
// =============================================================================

proptest! {
    /// Every plan keeps scripts/connections and tokens/replacements aligned
    #[test]
    fn plan_lists_are_aligned(descriptor in descriptor_strategy()) {
        let plan = resolve(&descriptor, &discovered_catalog()).expect("Should resolve");
        prop_assert_eq!(plan.scripts().len(), plan.connections().len());
        prop_assert_eq!(plan.match_tokens().len(), plan.replacements().len());
    }

    /// Resolution is a pure function of the descriptor
    #[test]
    fn resolution_is_deterministic(descriptor in descriptor_strategy()) {
        let first = resolve(&descriptor, &discovered_catalog()).expect("Should resolve");
        let second = resolve(&descriptor, &discovered_catalog()).expect("Should resolve");
        prop_assert_eq!(first, second);
    }

    /// Account replacements are always normalized
    #[test]
    fn account_replacements_are_normalized(descriptor in descriptor_strategy()) {
        let plan = resolve(&descriptor, &discovered_catalog()).expect("Should resolve");
        for rule in plan.substitutions() {
            if ["PROVIDER_ACCT", "CONSUMER_ACCT", "SNOWCAT2", "SNOWCAT"].contains(&rule.token.as_str()) {
                prop_assert!(!rule.replacement.contains('.'));
                prop_assert_eq!(rule.replacement.clone(), rule.replacement.to_uppercase());
            }
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

proptest! {
    /// normalize(normalize(x)) == normalize(x)
    #[test]
    fn normalization_is_idempotent(account in "[a-zA-Z0-9 ._-]{0,24}") {
        let once = normalize_account(&account);
        prop_assert_eq!(normalize_account(&once), once);
    }

    /// Normalized accounts never carry a region suffix
    #[test]
    fn normalization_drops_suffix(locator in "[a-z0-9]{1,10}", region in "[a-z0-9-]{1,12}") {
        let normalized = normalize_account(&format!("{}.{}", locator, region));
        prop_assert_eq!(normalized, locator.to_uppercase());
    }
}

// =============================================================================
// Line Rewriting
// =============================================================================

proptest! {
    /// Stripping comments only ever truncates
    #[test]
    fn stripped_line_is_prefix(line in "[ -~]{0,60}") {
        let stripped = strip_trailing_comment(&line);
        prop_assert!(line.starts_with(stripped));
    }

    /// Lines without comment markers are untouched
    #[test]
    fn clean_line_is_unchanged(line in "[a-zA-Z0-9 ;,'()=_.]{0,60}") {
        prop_assert_eq!(strip_trailing_comment(&line), line.as_str());
    }

    /// The cleaned line is a prefix of the annotated line, terminator aside
    #[test]
    fn cleaned_is_prefix_of_annotated(line in "[ -~]{0,60}") {
        let plan = DeploymentPlan::new(
            vec![],
            vec![Substitution::new("PROVIDER_ACCT", "ABC123")],
        );
        if let Some((annotated, cleaned)) = render_line(&plan, &format!("{}\n", line)) {
            prop_assert!(annotated.ends_with('\n'));
            prop_assert!(cleaned.ends_with('\n'));
            let a = annotated.trim_end_matches('\n');
            let c = cleaned.trim_end_matches('\n');
            prop_assert!(a.starts_with(c));
        }
    }
}
