//! Deployment Plan Resolver
//!
//! Translates a `ScenarioDescriptor` into a `DeploymentPlan`: which scripts
//! run, on which connection, in what order, and which placeholder tokens get
//! rewritten to what.
//!
//! # Design
//!
//! - **Table, not branches**: every supported `(ScenarioKind, DcrVersion)` pair
//!   maps to a static `PlanTemplate` of step and rule data. A new release or
//!   scenario is a new table entry.
//! - **One evaluator**: `resolve` applies conditions (use case, role,
//!   multi-provider) and defaults to a template in a single pass.
//! - **Pure logic**: no I/O. Auto-discovered plans get their listing from a
//!   caller-supplied `ScriptCatalog`.
//!
//! # Supported Plans
//!
//! | Scenario     | 5.5 SQL Param / 5.5 Jinja | 6.0 Native App | ID Resolution |
//! |--------------|---------------------------|----------------|---------------|
//! | Deploy       | 4 steps (+4 per use case) | 7 steps        | discovered    |
//! | AddConsumer  | 4 steps                   | 6 steps        | -             |
//! | AddProvider  | 4 steps                   | 7 steps        | -             |
//! | Upgrade      | -                         | 6 steps        | -             |
//! | Uninstall    | 1 step by role            | 1 step by role | -             |
//! | OnboardData  | 1 step                    | 1 step         | -             |
//! | AddTemplate  | 1 step                    | 1 step         | -             |
//!
//! Combinations marked `-` resolve to an empty plan. That is not an error.
//!
//! # Rule Ordering
//!
//! Rules run in listed order over each line, once. Longer tokens that
//! contain shorter ones (`SNOWCAT2` vs `SNOWCAT`, `dcr_samp_app_two` vs
//! `_samp_`) are always listed first.

use tracing::{debug, warn};

use crate::engine::plan::{ConnectionTarget, DeploymentPlan, PlanStep, ScriptRef, Substitution};
use crate::error::Result;
use crate::logic::catalog::ScriptCatalog;
use crate::scenario::{normalize_account, ScenarioDescriptor};
use crate::types::{AccountRole, DcrVersion, ScenarioKind};

// ============================================================================
// Template Vocabulary
// ============================================================================

/// When a step or rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Always,
    /// A use case is selected
    UseCase,
    /// The uninstall account has this role
    Role(AccountRole),
    /// Consumer uninstall for one of several providers (non-empty suffix)
    MultiProvider,
}

/// How a step names its template
#[derive(Debug, Clone, Copy)]
enum Script {
    /// `<name>.sql` at the template root
    Fixed(&'static str),
    /// `<use case>/<use case>_<name>.sql`
    UseCase(&'static str),
}

/// Where a rule's replacement text comes from
#[derive(Debug, Clone, Copy)]
enum Value {
    Literal(&'static str),
    ProviderAccount,
    ConsumerAccount,
    /// The single uninstall account
    Account,
    /// `_<abbreviation>_`
    Abbreviation,
    /// `_<old abbreviation>_`
    OldAbbreviation,
    /// Prefix followed by the app suffix (defaulted)
    AppName(&'static str),
    /// `_app_<suffix>` for multi-provider uninstalls
    SuffixedApp,
    SourceDatabase,
    SourceSchema,
    SourceTable,
    SourceColumn,
    TemplateName,
    TemplateText,
    TemplateDimensions,
}

#[derive(Debug, Clone, Copy)]
struct StepTemplate {
    script: Script,
    target: Option<ConnectionTarget>,
    when: Condition,
}

#[derive(Debug, Clone, Copy)]
struct RuleTemplate {
    token: &'static str,
    value: Value,
    when: Condition,
}

/// Declarative description of one (scenario, version) plan
#[derive(Debug)]
struct PlanTemplate {
    steps: &'static [StepTemplate],
    /// Rule groups, concatenated in order
    rules: &'static [&'static [RuleTemplate]],
}

const P: Option<ConnectionTarget> = Some(ConnectionTarget::Provider);
const C: Option<ConnectionTarget> = Some(ConnectionTarget::Consumer);
const A: Option<ConnectionTarget> = Some(ConnectionTarget::Account);

const fn step(name: &'static str, target: Option<ConnectionTarget>) -> StepTemplate {
    StepTemplate {
        script: Script::Fixed(name),
        target,
        when: Condition::Always,
    }
}

const fn use_case_step(name: &'static str, target: Option<ConnectionTarget>) -> StepTemplate {
    StepTemplate {
        script: Script::UseCase(name),
        target,
        when: Condition::UseCase,
    }
}

const fn role_step(
    name: &'static str,
    target: Option<ConnectionTarget>,
    role: AccountRole,
) -> StepTemplate {
    StepTemplate {
        script: Script::Fixed(name),
        target,
        when: Condition::Role(role),
    }
}

const fn rule(token: &'static str, value: Value) -> RuleTemplate {
    RuleTemplate {
        token,
        value,
        when: Condition::Always,
    }
}

// ============================================================================
// Rule Groups
// ============================================================================

const LEGACY_ACCOUNTS: &[RuleTemplate] = &[
    rule("PROVIDER_ACCT", Value::ProviderAccount),
    rule("provider_acct", Value::ProviderAccount),
    rule("CONSUMER_ACCT", Value::ConsumerAccount),
    rule("consumer_acct", Value::ConsumerAccount),
];

const LEGACY_SECOND_PROVIDER: &[RuleTemplate] = &[
    rule("PROVIDER2_ACCT", Value::ProviderAccount),
    rule("provider2_acct", Value::ProviderAccount),
];

const LEGACY_UNINSTALL_ACCOUNTS: &[RuleTemplate] = &[
    rule("PROVIDER_ACCT", Value::Account),
    rule("provider_acct", Value::Account),
    rule("CONSUMER_ACCT", Value::ConsumerAccount),
    rule("consumer_acct", Value::ConsumerAccount),
];

const LEGACY_ABBREVIATION: &[RuleTemplate] = &[
    rule("_SAMP_", Value::Abbreviation),
    rule("_samp_", Value::Abbreviation),
];

const LEGACY_APP_NAME: &[RuleTemplate] = &[
    rule("dcr_samp_app_two", Value::AppName("dcr_samp_app_")),
    rule("DCR_SAMP_APP_TWO", Value::AppName("dcr_samp_app_")),
];

const JINJA_REWRITES: &[RuleTemplate] = &[
    rule(
        "select dcr_samp_app.cleanroom.get_sql_js(",
        Value::Literal("select dcr_samp_consumer.util.get_sql_jinja("),
    ),
    rule(
        "select dcr_samp_provider_db.cleanroom.get_sql_js(",
        Value::Literal("select dcr_samp_provider_db.templates.get_sql_jinja("),
    ),
    rule(
        "dcr_samp_provider_db.cleanroom.get_sql_js(template, request_params) as valid_sql",
        Value::Literal(
            "dcr_samp_provider_db.templates.get_sql_jinja(template, request_params) as valid_sql",
        ),
    ),
];

const PACKAGED_ACCOUNTS: &[RuleTemplate] = &[
    rule("SNOWCAT2", Value::ProviderAccount),
    rule("snowcat2", Value::ProviderAccount),
    rule("SNOWCAT", Value::ConsumerAccount),
    rule("snowcat", Value::ConsumerAccount),
];

const PACKAGED_SECOND_PROVIDER: &[RuleTemplate] = &[
    rule("SNOWCAT3", Value::ProviderAccount),
    rule("snowcat3", Value::ProviderAccount),
];

const PACKAGED_NEW_CONSUMER: &[RuleTemplate] = &[
    rule("SNOWCAT4", Value::ConsumerAccount),
    rule("snowcat4", Value::ConsumerAccount),
];

const PACKAGED_UNINSTALL_ACCOUNTS: &[RuleTemplate] = &[
    rule("SNOWCAT2", Value::Account),
    rule("snowcat2", Value::Account),
    rule("SNOWCAT", Value::ConsumerAccount),
    rule("snowcat", Value::ConsumerAccount),
];

const PACKAGED_ABBREVIATION: &[RuleTemplate] = &[
    rule("_DEMO_", Value::Abbreviation),
    rule("_demo_", Value::Abbreviation),
];

const PACKAGED_APP_NAME: &[RuleTemplate] = &[
    rule("dcr_demo_app_two", Value::AppName("dcr_demo_app_")),
    rule("DCR_DEMO_APP_TWO", Value::AppName("dcr_demo_app_")),
];

const MULTI_PROVIDER_UNINSTALL: &[RuleTemplate] = &[
    RuleTemplate {
        token: "_app",
        value: Value::SuffixedApp,
        when: Condition::MultiProvider,
    },
    RuleTemplate {
        token: "_APP",
        value: Value::SuffixedApp,
        when: Condition::MultiProvider,
    },
];

const UPGRADE_OLD_ABBREVIATION: &[RuleTemplate] = &[
    rule("_SAMP_", Value::OldAbbreviation),
    rule("_samp_", Value::OldAbbreviation),
];

const ONBOARDING: &[RuleTemplate] = &[
    rule("SOURCE_DATABASE", Value::SourceDatabase),
    rule("SOURCE_SCHEMA", Value::SourceSchema),
    rule("SOURCE_TABLE", Value::SourceTable),
    rule("SOURCE_COLUMN", Value::SourceColumn),
];

const NEW_TEMPLATE: &[RuleTemplate] = &[
    rule("NEW_TEMPLATE_NAME", Value::TemplateName),
    rule("NEW_TEMPLATE_TEXT", Value::TemplateText),
    rule("NEW_TEMPLATE_DIMENSIONS", Value::TemplateDimensions),
];

// ============================================================================
// Step Lists
// ============================================================================

const LEGACY_DEPLOY_STEPS: &[StepTemplate] = &[
    step("provider_init", P),
    use_case_step("provider_data", P),
    use_case_step("provider_templates", P),
    step("provider_templates", P),
    use_case_step("consumer_data", C),
    step("consumer_init", C),
    step("provider_enable_consumer", P),
    use_case_step("consumer_request", C),
];

const PACKAGED_DEPLOY_STEPS: &[StepTemplate] = &[
    step("provider_init", P),
    step("provider_templates", P),
    step("consumer_init", C),
    step("provider_enable_consumer", P),
    step("provider_ml", P),
    step("consumer_ml", C),
    step("consumer_request", None),
];

const LEGACY_ADD_CONSUMER_STEPS: &[StepTemplate] = &[
    step("provider_templates", P),
    step("provider_add_consumer_to_share", P),
    step("consumer_init", C),
    step("provider_enable_consumer", P),
];

const PACKAGED_ADD_CONSUMER_STEPS: &[StepTemplate] = &[
    step("provider_init_new_consumer", P),
    step("consumer_init", C),
    step("provider_enable_consumer", P),
    step("provider_ml", P),
    step("consumer_ml", C),
    step("consumer_request", None),
];

const LEGACY_ADD_PROVIDER_STEPS: &[StepTemplate] = &[
    step("provider_init", P),
    step("provider_templates", P),
    step("consumer_init_new_provider", C),
    step("provider_enable_consumer", P),
];

const PACKAGED_ADD_PROVIDER_STEPS: &[StepTemplate] = &[
    step("provider_init", P),
    step("provider_templates", P),
    step("consumer_init_new_provider", C),
    step("provider_enable_consumer", P),
    step("provider_ml", P),
    step("consumer_ml", C),
    step("consumer_request", None),
];

const UPGRADE_STEPS: &[StepTemplate] = &[
    step("provider_init", P),
    step("provider_upgrade", P),
    step("consumer_init", C),
    step("provider_enable_consumer", P),
    step("provider_ml", P),
    step("consumer_ml", C),
];

const UNINSTALL_STEPS: &[StepTemplate] = &[
    role_step("provider_uninstall", A, AccountRole::Provider),
    role_step("consumer_uninstall", A, AccountRole::Consumer),
];

const ONBOARD_DATA_STEPS: &[StepTemplate] = &[step("provider_onboard_data", P)];

const ADD_TEMPLATE_STEPS: &[StepTemplate] = &[step("provider_add_template", P)];

// ============================================================================
// Plan Table
// ============================================================================

static SQL_PARAM_DEPLOY: PlanTemplate = PlanTemplate {
    steps: LEGACY_DEPLOY_STEPS,
    rules: &[LEGACY_ACCOUNTS, LEGACY_ABBREVIATION],
};

static JINJA_DEPLOY: PlanTemplate = PlanTemplate {
    steps: LEGACY_DEPLOY_STEPS,
    rules: &[JINJA_REWRITES, LEGACY_ACCOUNTS, LEGACY_ABBREVIATION],
};

static PACKAGED_DEPLOY: PlanTemplate = PlanTemplate {
    steps: PACKAGED_DEPLOY_STEPS,
    rules: &[PACKAGED_ACCOUNTS, PACKAGED_ABBREVIATION],
};

static SQL_PARAM_ADD_CONSUMER: PlanTemplate = PlanTemplate {
    steps: LEGACY_ADD_CONSUMER_STEPS,
    rules: &[LEGACY_ACCOUNTS, LEGACY_ABBREVIATION],
};

static JINJA_ADD_CONSUMER: PlanTemplate = PlanTemplate {
    steps: LEGACY_ADD_CONSUMER_STEPS,
    rules: &[JINJA_REWRITES, LEGACY_ACCOUNTS, LEGACY_ABBREVIATION],
};

static PACKAGED_ADD_CONSUMER: PlanTemplate = PlanTemplate {
    steps: PACKAGED_ADD_CONSUMER_STEPS,
    rules: &[PACKAGED_NEW_CONSUMER, PACKAGED_ACCOUNTS, PACKAGED_ABBREVIATION],
};

static SQL_PARAM_ADD_PROVIDER: PlanTemplate = PlanTemplate {
    steps: LEGACY_ADD_PROVIDER_STEPS,
    rules: &[
        LEGACY_APP_NAME,
        LEGACY_SECOND_PROVIDER,
        LEGACY_ACCOUNTS,
        LEGACY_ABBREVIATION,
    ],
};

static JINJA_ADD_PROVIDER: PlanTemplate = PlanTemplate {
    steps: LEGACY_ADD_PROVIDER_STEPS,
    rules: &[
        LEGACY_APP_NAME,
        JINJA_REWRITES,
        LEGACY_SECOND_PROVIDER,
        LEGACY_ACCOUNTS,
        LEGACY_ABBREVIATION,
    ],
};

static PACKAGED_ADD_PROVIDER: PlanTemplate = PlanTemplate {
    steps: PACKAGED_ADD_PROVIDER_STEPS,
    rules: &[
        PACKAGED_APP_NAME,
        PACKAGED_SECOND_PROVIDER,
        PACKAGED_ACCOUNTS,
        PACKAGED_ABBREVIATION,
    ],
};

static PACKAGED_UPGRADE: PlanTemplate = PlanTemplate {
    steps: UPGRADE_STEPS,
    rules: &[PACKAGED_ACCOUNTS, PACKAGED_ABBREVIATION, UPGRADE_OLD_ABBREVIATION],
};

static LEGACY_UNINSTALL: PlanTemplate = PlanTemplate {
    steps: UNINSTALL_STEPS,
    rules: &[LEGACY_UNINSTALL_ACCOUNTS, LEGACY_ABBREVIATION],
};

static PACKAGED_UNINSTALL: PlanTemplate = PlanTemplate {
    steps: UNINSTALL_STEPS,
    rules: &[
        PACKAGED_UNINSTALL_ACCOUNTS,
        PACKAGED_ABBREVIATION,
        MULTI_PROVIDER_UNINSTALL,
    ],
};

static LEGACY_ONBOARD_DATA: PlanTemplate = PlanTemplate {
    steps: ONBOARD_DATA_STEPS,
    rules: &[ONBOARDING, LEGACY_ACCOUNTS, LEGACY_ABBREVIATION],
};

static PACKAGED_ONBOARD_DATA: PlanTemplate = PlanTemplate {
    steps: ONBOARD_DATA_STEPS,
    rules: &[ONBOARDING, PACKAGED_ACCOUNTS, PACKAGED_ABBREVIATION],
};

static LEGACY_ADD_TEMPLATE: PlanTemplate = PlanTemplate {
    steps: ADD_TEMPLATE_STEPS,
    rules: &[NEW_TEMPLATE, LEGACY_ACCOUNTS, LEGACY_ABBREVIATION],
};

static PACKAGED_ADD_TEMPLATE: PlanTemplate = PlanTemplate {
    steps: ADD_TEMPLATE_STEPS,
    rules: &[NEW_TEMPLATE, PACKAGED_ACCOUNTS, PACKAGED_ABBREVIATION],
};

/// Look up the fixed plan template for a scenario/version pair
fn plan_template(kind: ScenarioKind, version: DcrVersion) -> Option<&'static PlanTemplate> {
    use DcrVersion::*;
    use ScenarioKind::*;

    match (kind, version) {
        (Deploy, SqlParam) => Some(&SQL_PARAM_DEPLOY),
        (Deploy, Jinja) => Some(&JINJA_DEPLOY),
        (Deploy, NativeApp) => Some(&PACKAGED_DEPLOY),
        (AddConsumer, SqlParam) => Some(&SQL_PARAM_ADD_CONSUMER),
        (AddConsumer, Jinja) => Some(&JINJA_ADD_CONSUMER),
        (AddConsumer, NativeApp) => Some(&PACKAGED_ADD_CONSUMER),
        (AddProvider, SqlParam) => Some(&SQL_PARAM_ADD_PROVIDER),
        (AddProvider, Jinja) => Some(&JINJA_ADD_PROVIDER),
        (AddProvider, NativeApp) => Some(&PACKAGED_ADD_PROVIDER),
        (Upgrade, NativeApp) => Some(&PACKAGED_UPGRADE),
        (Uninstall, SqlParam | Jinja) => Some(&LEGACY_UNINSTALL),
        (Uninstall, NativeApp) => Some(&PACKAGED_UNINSTALL),
        (OnboardData, SqlParam | Jinja) => Some(&LEGACY_ONBOARD_DATA),
        (OnboardData, NativeApp) => Some(&PACKAGED_ONBOARD_DATA),
        (AddTemplate, SqlParam | Jinja) => Some(&LEGACY_ADD_TEMPLATE),
        (AddTemplate, NativeApp) => Some(&PACKAGED_ADD_TEMPLATE),
        _ => None,
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a scenario into its deployment plan.
///
/// Fixed plans come from the plan table. The ID resolution release discovers
/// its scripts through `catalog`; that listing is the only fallible step.
///
/// # Returns
///
/// - `Ok(plan)` — possibly empty when the scenario/version pair is unsupported
/// - `Err` — the catalog could not list the discovered directory
///
/// # What This Explicitly Refuses To Do
///
/// - Validate accounts: identical provider/consumer must be rejected upstream
/// - Read templates: rendering is the renderer's job
pub fn resolve(
    descriptor: &ScenarioDescriptor,
    catalog: &dyn ScriptCatalog,
) -> Result<DeploymentPlan> {
    if descriptor.version == DcrVersion::IdResolution {
        return resolve_discovered(descriptor, catalog);
    }

    let Some(template) = plan_template(descriptor.kind, descriptor.version) else {
        warn!(
            "No plan for scenario '{}' on version '{}'; resolving to an empty plan",
            descriptor.kind, descriptor.version
        );
        return Ok(DeploymentPlan::empty());
    };

    let plan = evaluate(template, descriptor);
    debug!(
        "Resolved {} on {}: {} scripts, {} substitutions",
        descriptor.kind,
        descriptor.version,
        plan.steps().len(),
        plan.substitutions().len()
    );
    Ok(plan)
}

/// Normalized values a template's conditions and rules read from
struct Bindings<'a> {
    descriptor: &'a ScenarioDescriptor,
    provider: String,
    consumer: String,
    account: String,
}

impl<'a> Bindings<'a> {
    fn new(descriptor: &'a ScenarioDescriptor) -> Self {
        Self {
            descriptor,
            provider: normalize_account(&descriptor.provider_account),
            consumer: normalize_account(&descriptor.consumer_account),
            account: normalize_account(&descriptor.account),
        }
    }

    fn holds(&self, condition: Condition) -> bool {
        match condition {
            Condition::Always => true,
            Condition::UseCase => self.descriptor.use_case.is_some(),
            Condition::Role(role) => self.descriptor.account_role == Some(role),
            Condition::MultiProvider => {
                self.descriptor.account_role == Some(AccountRole::Consumer)
                    && !self.descriptor.app_suffix.trim().is_empty()
            }
        }
    }

    fn script(&self, script: Script) -> Option<ScriptRef> {
        match script {
            Script::Fixed(name) => Some(ScriptRef::new(format!("{name}.sql"))),
            Script::UseCase(name) => self.descriptor.use_case.map(|use_case| {
                let dir = use_case.directory();
                ScriptRef::new(format!("{dir}/{dir}_{name}.sql"))
            }),
        }
    }

    fn value(&self, value: Value) -> String {
        let d = self.descriptor;
        match value {
            Value::Literal(text) => text.to_string(),
            Value::ProviderAccount => self.provider.clone(),
            Value::ConsumerAccount => self.consumer.clone(),
            Value::Account => self.account.clone(),
            Value::Abbreviation => format!("_{}_", d.effective_abbreviation()),
            Value::OldAbbreviation => format!("_{}_", d.effective_old_abbreviation()),
            Value::AppName(prefix) => format!("{prefix}{}", d.effective_app_suffix()),
            Value::SuffixedApp => format!("_app_{}", d.app_suffix.trim()),
            Value::SourceDatabase => onboarding_field(d, |s| &s.database),
            Value::SourceSchema => onboarding_field(d, |s| &s.schema),
            Value::SourceTable => onboarding_field(d, |s| &s.table),
            Value::SourceColumn => onboarding_field(d, |s| &s.column),
            Value::TemplateName => d
                .template
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            Value::TemplateText => d
                .template
                .as_ref()
                .map(|t| t.text.clone())
                .unwrap_or_default(),
            Value::TemplateDimensions => d
                .template
                .as_ref()
                .and_then(|t| t.dimensions.as_deref())
                .map(str::trim)
                .filter(|dims| !dims.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| "''".to_string()),
        }
    }
}

fn onboarding_field(
    descriptor: &ScenarioDescriptor,
    field: impl Fn(&crate::scenario::OnboardingSource) -> &String,
) -> String {
    descriptor
        .onboarding
        .as_ref()
        .map(|source| field(source).clone())
        .unwrap_or_default()
}

/// Evaluate a fixed template against a descriptor
fn evaluate(template: &PlanTemplate, descriptor: &ScenarioDescriptor) -> DeploymentPlan {
    let bindings = Bindings::new(descriptor);

    let restriction = match descriptor.kind {
        ScenarioKind::Uninstall => None,
        _ => descriptor.deployment_role.map(ConnectionTarget::for_role),
    };

    let steps: Vec<PlanStep> = template
        .steps
        .iter()
        .filter(|step| bindings.holds(step.when))
        .filter(|step| restriction.is_none() || step.target == restriction)
        .filter_map(|step| {
            bindings
                .script(step.script)
                .map(|script| PlanStep::new(script, step.target))
        })
        .collect();

    let substitutions: Vec<Substitution> = template
        .rules
        .iter()
        .flat_map(|group| group.iter())
        .filter(|rule| bindings.holds(rule.when))
        .map(|rule| Substitution::new(rule.token, bindings.value(rule.value)))
        .collect();

    DeploymentPlan::new(steps, substitutions)
}

/// Resolve an auto-discovered ID resolution plan
fn resolve_discovered(
    descriptor: &ScenarioDescriptor,
    catalog: &dyn ScriptCatalog,
) -> Result<DeploymentPlan> {
    if descriptor.kind != ScenarioKind::Deploy {
        warn!(
            "Scenario '{}' is not available on '{}'; resolving to an empty plan",
            descriptor.kind, descriptor.version
        );
        return Ok(DeploymentPlan::empty());
    }
    let Some(role) = descriptor.deployment_role else {
        warn!("ID resolution needs a deployment role; resolving to an empty plan");
        return Ok(DeploymentPlan::empty());
    };

    let dir = role.directory();
    let mut files = catalog.list(dir)?;
    files.sort();

    let target = Some(ConnectionTarget::for_role(role));
    let steps: Vec<PlanStep> = files
        .iter()
        .map(|file| PlanStep::new(ScriptRef::new(format!("{dir}/{file}")), target))
        .collect();

    // Longest keys first so `&db` cannot eat the front of `&db_name`
    let mut options: Vec<(&String, &String)> = descriptor.options.iter().collect();
    options.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let substitutions: Vec<Substitution> = options
        .into_iter()
        .flat_map(|(key, value)| {
            let value = value.to_uppercase();
            let upper = key.to_uppercase();
            let mut rules = vec![Substitution::new(format!("&{key}"), value.clone())];
            if upper != *key {
                rules.push(Substitution::new(format!("&{upper}"), value));
            }
            rules
        })
        .collect();

    debug!(
        "Discovered {} {} scripts for ID resolution",
        steps.len(),
        role.directory()
    );
    Ok(DeploymentPlan::new(steps, substitutions))
}

// ============================================================================
// Tests
// ============================================================================
