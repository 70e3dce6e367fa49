//! Workcycle CLI: Azure DevOps work-item workflows.
//!
//! Usage:
//!
//! ```text
//! workcycle start  <workItemId> [--org <org>] [--repo <path-or-url>] [--base <branch>] [--reauth]
//! workcycle finish <workItemId> [--org <org>] [--repo <path-or-url>] [--target <branch>] [--draft] [--reauth]
//! workcycle repo   set <path-or-url> | show | clear
//! ```
//!
//! `start` creates a deterministic branch for a work item, links it, and
//! moves the work item to `Committed`. `finish` creates or reuses a pull
//! request for the work-item branch, links it, and moves the work item to
//! `In Review`. Both exit 0 on success and on partial reports (a durable
//! artifact exists but a trailing step failed), nonzero on unrecovered
//! failures. Logging goes to stderr, controlled by `WORKCYCLE_LOG`.

use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use workcycle::auth::adapters::{ProcessEnvironment, StdConsole};
use workcycle::auth::services::{CredentialError, CredentialRequest, CredentialResolver};
use workcycle::config::{ConfigError, StoredConfig, config_file_path};
use workcycle::repo::adapters::GitProcess;
use workcycle::repo::domain::{RepoMode, RepoTargetError, looks_like_url, parse_remote_identifier};
use workcycle::workflow::adapters::azdo::AzureDevOpsClient;
use workcycle::workflow::domain::{ExecutionResult, STATE_COMMITTED, STATE_IN_REVIEW};
use workcycle::workflow::services::{
    AuthRetry, FinishReport, FinishRequest, FinishService, StartReport, StartRequest,
    StartService, WorkflowError,
};

#[cfg(test)]
#[path = "workcycle/tests.rs"]
mod tests;

/// Environment variable controlling the log filter.
const LOG_ENV: &str = "WORKCYCLE_LOG";

/// CLI for Azure DevOps work-item workflows.
#[derive(Debug, Parser)]
#[command(name = "workcycle", version, about = "CLI for Azure DevOps work item workflows")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Start work on a work item: create a branch, link it, and set the
    /// state to Committed.
    Start(StartArgs),
    /// Finish work on a work item: prepare the PR handoff and set the
    /// state to In Review.
    Finish(FinishArgs),
    /// Manage the default repository path/URL.
    #[command(subcommand)]
    Repo(RepoCommand),
}

/// Arguments of the `start` subcommand.
#[derive(Debug, Args)]
struct StartArgs {
    /// Work item ID (positive integer).
    work_item_id: u64,

    /// Organization name or URL, e.g. myorg or <https://dev.azure.com/myorg>.
    #[arg(long)]
    org: Option<String>,

    /// Repository path or Azure Repos URL.
    #[arg(long)]
    repo: Option<String>,

    /// Base branch name or ref (default: repository default branch).
    #[arg(long)]
    base: Option<String>,

    /// Prompt for a new PAT before executing.
    #[arg(long)]
    reauth: bool,
}

/// Arguments of the `finish` subcommand.
#[derive(Debug, Args)]
struct FinishArgs {
    /// Work item ID (positive integer).
    work_item_id: u64,

    /// Organization name or URL, e.g. myorg or <https://dev.azure.com/myorg>.
    #[arg(long)]
    org: Option<String>,

    /// Repository path or Azure Repos URL.
    #[arg(long)]
    repo: Option<String>,

    /// Target branch name or ref (default: repository default branch).
    #[arg(long)]
    target: Option<String>,

    /// Create the pull request as a draft when a new PR is created.
    #[arg(long)]
    draft: bool,

    /// Prompt for a new PAT before executing.
    #[arg(long)]
    reauth: bool,
}

/// Subcommands of `repo`.
#[derive(Debug, Subcommand)]
enum RepoCommand {
    /// Set the default repository path or Azure Repos URL.
    Set {
        /// Local git repository path or Azure Repos URL.
        path_or_url: String,
    },
    /// Show the default repository path/URL.
    Show,
    /// Clear the default repository path/URL.
    Clear,
}

/// Fatal command errors.
#[derive(Debug, Error)]
enum CliError {
    /// Workflow orchestration failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Credential resolution failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Config file access failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A repository identifier failed validation.
    #[error(transparent)]
    RepoTarget(#[from] RepoTargetError),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr tracing subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches the parsed command.
async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Start(args) => run_start(args).await,
        Command::Finish(args) => run_finish(args).await,
        Command::Repo(command) => run_repo(&command),
    }
}

/// Builds the credential resolver rooted at the platform config file.
fn credential_resolver(
    config_path: Utf8PathBuf,
) -> CredentialResolver<StdConsole, ProcessEnvironment> {
    CredentialResolver::new(
        Arc::new(StdConsole),
        Arc::new(ProcessEnvironment),
        config_path,
    )
}

/// Runs the `start` subcommand.
async fn run_start(args: StartArgs) -> Result<(), CliError> {
    let config_path = config_file_path()?;
    let resolver = credential_resolver(config_path.clone());
    let credentials = resolver.resolve(&CredentialRequest {
        org_flag: args.org.clone(),
        reauth: args.reauth,
    })?;
    let stored = StoredConfig::load(&config_path)?;

    let request = StartRequest {
        work_item_id: args.work_item_id,
        repo: args.repo.clone(),
        default_repo: stored.default_repo.clone(),
        base: args.base.clone(),
    };

    let retry = AuthRetry::new(resolver);
    let outcome = retry
        .run(credentials, |creds| {
            let attempt_request = request.clone();
            async move { start_attempt(creds, attempt_request).await }
        })
        .await?;

    match outcome {
        ExecutionResult::Completed(report) => render_start_report(&report),
        ExecutionResult::Partial { artifact, reason } => render_partial(&artifact.describe(), &reason),
    }
    Ok(())
}

/// One full start attempt with freshly built remote adapters.
async fn start_attempt(
    credentials: workcycle::auth::domain::ResolvedCredentials,
    request: StartRequest,
) -> Result<ExecutionResult<StartReport>, WorkflowError> {
    let client = Arc::new(AzureDevOpsClient::new(&credentials)?);
    let service = StartService::new(Arc::clone(&client), Arc::clone(&client), Arc::new(GitProcess));
    service.execute(&credentials, &request).await
}

/// Runs the `finish` subcommand.
async fn run_finish(args: FinishArgs) -> Result<(), CliError> {
    let config_path = config_file_path()?;
    let resolver = credential_resolver(config_path.clone());
    let credentials = resolver.resolve(&CredentialRequest {
        org_flag: args.org.clone(),
        reauth: args.reauth,
    })?;
    let stored = StoredConfig::load(&config_path)?;

    let request = FinishRequest {
        work_item_id: args.work_item_id,
        repo: args.repo.clone(),
        default_repo: stored.default_repo.clone(),
        target: args.target.clone(),
        draft: args.draft,
    };

    let retry = AuthRetry::new(resolver);
    let outcome = retry
        .run(credentials, |creds| {
            let attempt_request = request.clone();
            async move { finish_attempt(creds, attempt_request).await }
        })
        .await?;

    match outcome {
        ExecutionResult::Completed(report) => render_finish_report(&report),
        ExecutionResult::Partial { artifact, reason } => render_partial(&artifact.describe(), &reason),
    }
    Ok(())
}

/// One full finish attempt with freshly built remote adapters.
async fn finish_attempt(
    credentials: workcycle::auth::domain::ResolvedCredentials,
    request: FinishRequest,
) -> Result<ExecutionResult<FinishReport>, WorkflowError> {
    let client = Arc::new(AzureDevOpsClient::new(&credentials)?);
    let service =
        FinishService::new(Arc::clone(&client), Arc::clone(&client), Arc::new(GitProcess));
    service.execute(&credentials, &request).await
}

/// Runs the `repo` subcommands.
fn run_repo(command: &RepoCommand) -> Result<(), CliError> {
    let config_path = config_file_path()?;
    match command {
        RepoCommand::Set { path_or_url } => {
            let validated = validate_repo_value(path_or_url)?;
            StoredConfig::merge_into(
                &config_path,
                StoredConfig {
                    default_repo: Some(validated.clone()),
                    ..StoredConfig::default()
                },
            )?;
            println!("Default repository saved in {config_path}");
            println!("Default repo: {validated}");
        }
        RepoCommand::Show => {
            let stored = StoredConfig::load(&config_path)?;
            match stored.default_repo {
                Some(default_repo) => println!("{default_repo}"),
                None => println!("No default repository is configured."),
            }
        }
        RepoCommand::Clear => {
            let mut stored = StoredConfig::load(&config_path)?;
            if stored.default_repo.is_none() {
                println!("Default repository is already empty.");
                return Ok(());
            }
            stored.default_repo = None;
            stored.store(&config_path)?;
            println!("Default repository cleared.");
        }
    }
    Ok(())
}

/// Validates a `repo set` value; URL inputs are parsed eagerly, local paths
/// are validated when `start`/`finish` runs.
fn validate_repo_value(value: &str) -> Result<String, RepoTargetError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepoTargetError::EmptyIdentifier);
    }
    if looks_like_url(trimmed) {
        parse_remote_identifier(trimmed)?;
    }
    Ok(trimmed.to_owned())
}

/// Prints the start report and next git commands.
fn render_start_report(report: &StartReport) {
    println!(
        "Started work item {}: {}",
        report.work_item_id, report.work_item_title
    );
    println!("Branch: {}", report.branch_name);
    println!("Repository: {}", report.repository_path);
    println!("Work item state: {STATE_COMMITTED}");

    if let Some(warning) = &report.link_warning {
        eprintln!("Warning: {warning}");
    }

    println!();
    println!("Next git command:");
    for line in start_next_steps(report) {
        println!("{line}");
    }
}

/// Builds the next-step git commands suggested after `start`.
fn start_next_steps(report: &StartReport) -> Vec<String> {
    match report.repo_target.mode() {
        RepoMode::Url => vec![format!(
            "git clone --single-branch --branch {} \"{}\"",
            report.branch_name, report.clone_url
        )],
        RepoMode::Path => {
            let local_path = report
                .repo_target
                .local_path()
                .map_or_else(String::new, ToString::to_string);
            vec![
                format!("git -C \"{local_path}\" fetch origin"),
                format!(
                    "git -C \"{local_path}\" checkout -b \"{}\" --track \"origin/{}\"",
                    report.branch_name, report.branch_name
                ),
            ]
        }
    }
}

/// Prints the finish report and follow-up actions.
fn render_finish_report(report: &FinishReport) {
    println!(
        "Finished work item {}: {}",
        report.work_item_id, report.work_item_title
    );
    println!("Repository: {}", report.repository_path);
    println!("Source branch: {}", report.source_ref.short_name());
    println!("Target branch: {}", report.target_ref.short_name());
    println!(
        "Pull request: #{} ({})",
        report.pull_request.id(),
        report.action
    );
    println!("Pull request URL: {}", report.pull_request.url());
    println!(
        "Draft: {}",
        if report.pull_request.is_draft() {
            "yes"
        } else {
            "no"
        }
    );
    println!("Work item state: {STATE_IN_REVIEW}");

    if report.source_was_pushed
        && let Some(local_path) = report.repo_target.local_path()
    {
        println!("Source branch was pushed to origin from {local_path}.");
    }

    if let Some(warning) = &report.relation_warning {
        eprintln!("Warning: {warning}");
    }

    println!();
    println!("Next actions:");
    println!("Open PR: {}", report.pull_request.url());
    println!("Add reviewers and complete your team review checklist.");
}

/// Prints a partial outcome; the durable artifact is always identified.
fn render_partial(artifact: &str, reason: &str) {
    println!("Completed with a caveat: {artifact} exists.");
    println!("{reason}");
    println!("Finish the remaining step manually, then rerun if needed.");
}
