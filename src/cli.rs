use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config_file::DeploymentRequest;
use crate::scenario::{OnboardingSource, ScenarioDescriptor, TemplateDefinition};
use crate::types::{AccountRole, DcrVersion, ScenarioKind, UseCase};

/// DCR Assistant - Generate and run clean room deployment scripts
#[derive(Parser, Debug)]
#[command(name = "dcr-assistant")]
#[command(about = "Generates clean room SQL scripts from templates and optionally runs them")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: render every script but execute nothing.
    ///
    /// Rendered scripts are still written to the output directory, so the
    /// result can be reviewed and run by hand.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Template root for the selected version
    #[arg(long, global = true, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Directory rendered scripts are written to
    #[arg(long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Write scripts with trailing comments stripped
    #[arg(long, global = true)]
    pub no_comments: bool,

    /// snowsql connection name for the provider account
    #[arg(long, global = true, value_name = "NAME")]
    pub provider_connection: Option<String>,

    /// snowsql connection name for the consumer account
    #[arg(long, global = true, value_name = "NAME")]
    pub consumer_connection: Option<String>,

    /// snowsql connection name for the account being uninstalled
    #[arg(long, global = true, value_name = "NAME")]
    pub account_connection: Option<String>,

    /// snowsql executable to run scripts with
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub snowsql: Option<String>,

    /// Save the request built from the command line to a file and exit
    #[arg(long, global = true, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Provider/consumer pair, version and naming shared by most scenarios
#[derive(Args, Debug, Clone)]
pub struct PairArgs {
    /// Provider account locator (region suffix allowed)
    #[arg(short, long)]
    pub provider: String,

    /// Consumer account locator (region suffix allowed)
    #[arg(short, long)]
    pub consumer: String,

    /// Clean room version
    #[arg(short, long, default_value = "5.5 SQL Param")]
    pub version: DcrVersion,

    /// Naming abbreviation (defaults to the version's)
    #[arg(short, long)]
    pub abbreviation: Option<String>,
}

impl PairArgs {
    fn descriptor(&self, kind: ScenarioKind) -> ScenarioDescriptor {
        let mut descriptor = ScenarioDescriptor::new(kind, self.version)
            .with_accounts(&self.provider, &self.consumer);
        if let Some(abbreviation) = &self.abbreviation {
            descriptor.abbreviation = abbreviation.clone();
        }
        descriptor
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initial provider + consumer deployment
    Deploy {
        #[command(flatten)]
        pair: PairArgs,
        /// Add a demo use case's data and templates
        #[arg(short, long)]
        use_case: Option<UseCase>,
        /// Only generate one side of the deployment
        #[arg(short, long)]
        role: Option<AccountRole>,
    },
    /// Add a new consumer to an existing provider
    AddConsumer {
        #[command(flatten)]
        pair: PairArgs,
    },
    /// Add a new provider to an existing consumer
    AddProvider {
        #[command(flatten)]
        pair: PairArgs,
        /// Suffix of the new provider's application name
        #[arg(short, long)]
        suffix: Option<String>,
    },
    /// Upgrade a 5.5 deployment to the 6.0 Native App release
    Upgrade {
        /// Provider account locator
        #[arg(short, long)]
        provider: String,
        /// Consumer account locator
        #[arg(short, long)]
        consumer: String,
        /// Abbreviation of the new deployment
        #[arg(short, long)]
        abbreviation: Option<String>,
        /// Abbreviation of the deployment being upgraded
        #[arg(long)]
        old_abbreviation: Option<String>,
    },
    /// Remove the clean room from one account
    Uninstall {
        /// Account locator to uninstall
        #[arg(long)]
        account: String,
        /// Role of the account being removed
        #[arg(short, long)]
        role: AccountRole,
        /// Consumer account locator
        #[arg(short, long, default_value = "")]
        consumer: String,
        /// Clean room version
        #[arg(short, long, default_value = "5.5 SQL Param")]
        version: DcrVersion,
        /// Naming abbreviation (defaults to the version's)
        #[arg(short, long)]
        abbreviation: Option<String>,
        /// Application suffix when the consumer has several providers
        #[arg(short, long)]
        suffix: Option<String>,
    },
    /// Onboard a provider source table into the clean room
    OnboardData {
        #[command(flatten)]
        pair: PairArgs,
        #[arg(long)]
        database: String,
        #[arg(long)]
        schema: String,
        #[arg(long)]
        table: String,
        /// Identity column to join on
        #[arg(long)]
        column: String,
    },
    /// Register a new query template with the provider
    AddTemplate {
        #[command(flatten)]
        pair: PairArgs,
        /// Template name
        #[arg(long)]
        name: String,
        /// Jinja template text
        #[arg(long)]
        text: String,
        /// Comma-separated dimension list
        #[arg(long)]
        dimensions: Option<String>,
    },
    /// Deploy the ID resolution application on one side
    IdResolution {
        /// Side to deploy
        #[arg(short, long)]
        role: AccountRole,
        /// Template parameter as KEY=VALUE (repeatable)
        #[arg(short, long = "option", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        options: Vec<(String, String)>,
    },
    /// Run a saved request file
    Run {
        /// Path to request file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a request file
    Validate {
        /// Path to request file to validate
        config: PathBuf,
    },
    /// Print the resolved plan of a request file without rendering
    Plan {
        /// Path to request file
        config: PathBuf,
    },
}

/// Parse a `KEY=VALUE` pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    Ok((key.to_string(), value.to_string()))
}

impl Commands {
    /// Scenario described on the command line; `None` for file-based commands
    pub fn scenario(&self) -> Option<ScenarioDescriptor> {
        let descriptor = match self {
            Self::Deploy {
                pair,
                use_case,
                role,
            } => {
                let mut d = pair.descriptor(ScenarioKind::Deploy);
                d.use_case = *use_case;
                d.deployment_role = *role;
                d
            }
            Self::AddConsumer { pair } => pair.descriptor(ScenarioKind::AddConsumer),
            Self::AddProvider { pair, suffix } => {
                let mut d = pair.descriptor(ScenarioKind::AddProvider);
                d.app_suffix = suffix.clone().unwrap_or_default();
                d
            }
            Self::Upgrade {
                provider,
                consumer,
                abbreviation,
                old_abbreviation,
            } => {
                let mut d = ScenarioDescriptor::new(ScenarioKind::Upgrade, DcrVersion::NativeApp)
                    .with_accounts(provider, consumer);
                d.abbreviation = abbreviation.clone().unwrap_or_default();
                d.old_abbreviation = old_abbreviation.clone().unwrap_or_default();
                d
            }
            Self::Uninstall {
                account,
                role,
                consumer,
                version,
                abbreviation,
                suffix,
            } => {
                let mut d = ScenarioDescriptor::new(ScenarioKind::Uninstall, *version);
                d.account = account.clone();
                d.account_role = Some(*role);
                d.consumer_account = consumer.clone();
                d.abbreviation = abbreviation.clone().unwrap_or_default();
                d.app_suffix = suffix.clone().unwrap_or_default();
                d
            }
            Self::OnboardData {
                pair,
                database,
                schema,
                table,
                column,
            } => {
                let mut d = pair.descriptor(ScenarioKind::OnboardData);
                d.onboarding = Some(OnboardingSource {
                    database: database.clone(),
                    schema: schema.clone(),
                    table: table.clone(),
                    column: column.clone(),
                });
                d
            }
            Self::AddTemplate {
                pair,
                name,
                text,
                dimensions,
            } => {
                let mut d = pair.descriptor(ScenarioKind::AddTemplate);
                d.template = Some(TemplateDefinition {
                    name: name.clone(),
                    text: text.clone(),
                    dimensions: dimensions.clone(),
                });
                d
            }
            Self::IdResolution { role, options } => {
                let mut d = ScenarioDescriptor::new(ScenarioKind::Deploy, DcrVersion::IdResolution);
                d.deployment_role = Some(*role);
                d.options = options.iter().cloned().collect();
                d
            }
            Self::Run { .. } | Self::Validate { .. } | Self::Plan { .. } => return None,
        };
        Some(descriptor)
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Overlay the global flags that were given onto a request
    pub fn apply_to(&self, request: &mut DeploymentRequest) {
        if self.dry_run {
            request.dry_run = true;
        }
        if self.no_comments {
            request.include_comments = false;
        }
        if let Some(templates) = &self.templates {
            request.templates_dir = templates.clone();
        }
        if let Some(output) = &self.output {
            request.output_dir = output.clone();
        }
        if let Some(name) = &self.provider_connection {
            request.connections.provider = Some(name.clone());
        }
        if let Some(name) = &self.consumer_connection {
            request.connections.consumer = Some(name.clone());
        }
        if let Some(name) = &self.account_connection {
            request.connections.account = Some(name.clone());
        }
        if let Some(program) = &self.snowsql {
            request.snowsql = program.clone();
        }
    }

    /// Request described entirely by the command line
    pub fn request(&self) -> Option<DeploymentRequest> {
        let mut request = DeploymentRequest::new(self.command.scenario()?);
        self.apply_to(&mut request);
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_requires_command() {
        let result = Cli::try_parse_from(["dcr-assistant"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_deploy_with_use_case() {
        let cli = Cli::try_parse_from([
            "dcr-assistant",
            "deploy",
            "--provider",
            "abc123.west-2",
            "--consumer",
            "xyz789",
            "--use-case",
            "audience_overlap",
            "--dry-run",
        ])
        .unwrap();
        assert!(cli.dry_run);

        let scenario = cli.command.scenario().unwrap();
        assert_eq!(scenario.kind, ScenarioKind::Deploy);
        assert_eq!(scenario.version, DcrVersion::SqlParam);
        assert_eq!(scenario.use_case, Some(UseCase::AudienceOverlap));
        assert_eq!(scenario.provider_account, "abc123.west-2");
    }

    #[test]
    fn test_cli_version_tag() {
        let cli = Cli::try_parse_from([
            "dcr-assistant",
            "add-consumer",
            "-p",
            "abc",
            "-c",
            "xyz",
            "--version",
            "6.0 Native App",
        ])
        .unwrap();
        let scenario = cli.command.scenario().unwrap();
        assert_eq!(scenario.kind, ScenarioKind::AddConsumer);
        assert_eq!(scenario.version, DcrVersion::NativeApp);
    }

    #[test]
    fn test_cli_unknown_version_rejected() {
        let result = Cli::try_parse_from([
            "dcr-assistant",
            "deploy",
            "-p",
            "abc",
            "-c",
            "xyz",
            "--version",
            "7.0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_uninstall_role_case_insensitive() {
        let cli = Cli::try_parse_from([
            "dcr-assistant",
            "uninstall",
            "--account",
            "abc123",
            "--role",
            "consumer",
            "--suffix",
            "two",
        ])
        .unwrap();
        let scenario = cli.command.scenario().unwrap();
        assert_eq!(scenario.account_role, Some(AccountRole::Consumer));
        assert_eq!(scenario.app_suffix, "two");
        assert_eq!(scenario.consumer_account, "");
    }

    #[test]
    fn test_cli_id_resolution_options() {
        let cli = Cli::try_parse_from([
            "dcr-assistant",
            "id-resolution",
            "--role",
            "Provider",
            "-o",
            "db=sales",
            "-o",
            "db_name=crm",
        ])
        .unwrap();
        let scenario = cli.command.scenario().unwrap();
        assert_eq!(scenario.version, DcrVersion::IdResolution);
        assert_eq!(scenario.deployment_role, Some(AccountRole::Provider));
        assert_eq!(scenario.options.get("db_name").map(String::as_str), Some("crm"));
    }

    #[test]
    fn test_cli_bad_option_rejected() {
        let result = Cli::try_parse_from([
            "dcr-assistant",
            "id-resolution",
            "--role",
            "provider",
            "-o",
            "novalue",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_validate_command() {
        let cli = Cli::try_parse_from(["dcr-assistant", "validate", "/path/to/request.json"]).unwrap();
        match &cli.command {
            Commands::Validate { config } => {
                assert_eq!(config, &PathBuf::from("/path/to/request.json"));
            }
            _ => panic!("Expected Validate command"),
        }
        assert!(cli.command.scenario().is_none());
    }

    #[test]
    fn test_cli_globals_applied_to_request() {
        let cli = Cli::try_parse_from([
            "dcr-assistant",
            "onboard-data",
            "-p",
            "abc",
            "-c",
            "xyz",
            "--database",
            "SALES",
            "--schema",
            "PUBLIC",
            "--table",
            "CUSTOMERS",
            "--column",
            "EMAIL",
            "--no-comments",
            "--output",
            "out",
            "--provider-connection",
            "prov_admin",
        ])
        .unwrap();
        let request = cli.request().unwrap();
        assert!(!request.include_comments);
        assert_eq!(request.output_dir, PathBuf::from("out"));
        assert_eq!(request.connections.provider.as_deref(), Some("prov_admin"));
        assert_eq!(
            request.scenario.onboarding.as_ref().map(|s| s.table.as_str()),
            Some("CUSTOMERS")
        );
    }
}
