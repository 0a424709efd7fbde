//! DCR Assistant - Main entry point
//!
//! Builds or loads a deployment request, resolves it into a plan, renders
//! the plan's templates and, unless dry-running, executes them.

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use dcr_assistant::cli::{Cli, Commands};
use dcr_assistant::config_file::DeploymentRequest;
use dcr_assistant::logic::catalog::DirectoryCatalog;
use dcr_assistant::logic::resolver::resolve;
use dcr_assistant::output;
use dcr_assistant::renderer::ScriptRenderer;
use dcr_assistant::script_runner::SnowSqlExecutor;
use dcr_assistant::DeploymentPlan;

/// Initialize the logger with appropriate settings
fn init_logger() {
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logger();
    info!("DCR Assistant starting up");

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Validate { config } => {
            info!("Validating request file: {:?}", config);
            let request = load_request(cli, config)?;
            request.validate()?;
            println!("✓ Request file is valid: {:?}", config);
            Ok(())
        }
        Commands::Plan { config } => {
            let request = load_request(cli, config)?;
            request.validate()?;
            let plan = resolve_plan(&request)?;
            println!("{}", plan.summary());
            Ok(())
        }
        Commands::Run { config } => {
            let request = load_request(cli, config)?;
            execute_request(&request)
        }
        _ => {
            let request = cli
                .request()
                .context("Command does not describe a deployment")?;

            if let Some(save_path) = &cli.save_config {
                request.validate()?;
                request.save_to_file(save_path)?;
                info!("Request saved to {:?}", save_path);
                println!("✓ Request saved to {:?}", save_path);
                return Ok(());
            }

            execute_request(&request)
        }
    }
}

/// Load a request file, letting explicit command line flags win
fn load_request(cli: &Cli, path: &std::path::Path) -> Result<DeploymentRequest> {
    let mut request = DeploymentRequest::load_from_file(path)?;
    cli.apply_to(&mut request);
    Ok(request)
}

fn resolve_plan(request: &DeploymentRequest) -> Result<DeploymentPlan> {
    let catalog = DirectoryCatalog::new(&request.templates_dir);
    let plan = resolve(&request.scenario, &catalog)?;
    Ok(plan)
}

/// Validate, resolve, render, execute and write one request
fn execute_request(request: &DeploymentRequest) -> Result<()> {
    request.validate()?;

    let plan = resolve_plan(request)?;
    if plan.is_empty() {
        warn!(
            "No scripts for {} on {}",
            request.scenario.kind, request.scenario.version
        );
        println!(
            "Nothing to generate: '{}' is not available for '{}'",
            request.scenario.kind, request.scenario.version
        );
        return Ok(());
    }
    info!("{}", plan.summary());

    let mut executor = SnowSqlExecutor::new(request.snowsql.clone());
    let mut renderer = ScriptRenderer::new(&request.templates_dir);
    if !request.dry_run {
        renderer = renderer.with_executor(&mut executor, &request.connections);
    }
    let dry_run = renderer.is_dry_run();
    if dry_run {
        info!("Dry run: scripts will be generated but not run");
    }

    let outcome = renderer.render(&plan);
    let written = output::write_outcome(&request.output_dir, &outcome, request.include_comments)?;
    println!("✓ Generated {} scripts in {:?}", written.len(), request.output_dir);

    if let Some(err) = outcome.error {
        return Err(err.into());
    }
    if !dry_run {
        println!("✓ Executed {} scripts", outcome.batches.len());
    }
    Ok(())
}
