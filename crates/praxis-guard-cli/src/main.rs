//! Praxis Guard CLI
//!
//! The `praxis-guard` command runs the deterministic pull request checks
//! outside of a GitHub App deployment.
//!
//! ## Commands
//!
//! - `check`: Evaluate a pull request on GitHub and publish a check run
//! - `scan`: Evaluate a local JSON list of changed files offline
//! - `webhook`: Dispatch a recorded webhook delivery
//! - `trace`: Render traceability docs from the ledger directory

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use praxis_guard_core::fakes::MemorySourceHost;
use praxis_guard_core::{
    dispatch, trace_docs_for, CheckContext, CheckRunReporter, CheckRunResult, Conclusion,
    Dispatch, FileChange, GuardConfig, RuleEngine, SourceHost, WebhookEvent,
};
use praxis_guard_github::{GithubClient, GithubConfig, DEFAULT_API_URL};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

/// Head revision used for offline scans.
const SCAN_HEAD_SHA: &str = "HEAD";

#[derive(Parser)]
#[command(name = "praxis-guard")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic pull request policy checks", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct GithubArgs {
    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Installation or personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Title and Markdown summary
    Markdown,
    /// The full check run result as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a pull request and publish the verdict as a check run
    Check {
        #[command(flatten)]
        github: GithubArgs,

        /// Repository owner
        #[arg(long)]
        owner: String,

        /// Repository name
        #[arg(long)]
        repo: String,

        /// Pull request number
        #[arg(long)]
        pr: u64,

        /// Head revision (resolved from the pull request if omitted)
        #[arg(long)]
        head_sha: Option<String>,

        /// Base revision (resolved from the pull request if omitted)
        #[arg(long)]
        base_sha: Option<String>,

        /// App installation the check runs under
        #[arg(long, default_value = "0")]
        installation_id: u64,

        /// Print the verdict without creating a check run
        #[arg(long)]
        no_report: bool,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "markdown")]
        format: OutputFormat,
    },

    /// Evaluate changed files from a JSON file without network access
    Scan {
        /// JSON array of changed files in the pull request files API shape
        #[arg(short, long)]
        files: PathBuf,

        /// Treat the ledger as containing an entry at the head revision
        #[arg(long)]
        ledger_present: bool,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "markdown")]
        format: OutputFormat,
    },

    /// Dispatch a recorded webhook delivery against GitHub
    Webhook {
        #[command(flatten)]
        github: GithubArgs,

        /// Event name as sent in the X-GitHub-Event header
        #[arg(short, long)]
        event: String,

        /// Path to the delivery body (JSON)
        #[arg(short, long)]
        payload: PathBuf,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate traceability docs from the ledger on the default branch
    Trace {
        #[command(flatten)]
        github: GithubArgs,

        /// Repository owner
        #[arg(long)]
        owner: String,

        /// Repository name
        #[arg(long)]
        repo: String,

        /// Output directory
        #[arg(short, long, default_value = "docs")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    praxis_guard_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Check {
            github,
            owner,
            repo,
            pr,
            head_sha,
            base_sha,
            installation_id,
            no_report,
            config,
            format,
        } => {
            let client = github_client(&github)?;
            let engine = RuleEngine::new(load_config(config.as_deref())?);
            let ctx = resolve_context(
                &client,
                &owner,
                &repo,
                pr,
                head_sha,
                base_sha,
                installation_id,
            )
            .await?;
            let result = cmd_check(&client, &engine, &ctx, !no_report).await?;
            print_result(&result, format)?;
            ensure_passed(&result)
        }
        Commands::Scan {
            files,
            ledger_present,
            config,
            format,
        } => {
            let engine = RuleEngine::new(load_config(config.as_deref())?);
            let result = cmd_scan(&engine, &files, ledger_present).await?;
            print_result(&result, format)?;
            ensure_passed(&result)
        }
        Commands::Webhook {
            github,
            event,
            payload,
            config,
        } => {
            let client = github_client(&github)?;
            client.require_token()?;
            let engine = RuleEngine::new(load_config(config.as_deref())?);
            let outcome = cmd_webhook(&client, &engine, &event, &payload).await?;
            match outcome {
                Dispatch::Completed {
                    check_run_id,
                    conclusion,
                } => println!("Check run {} completed: {}", check_run_id, conclusion),
                Dispatch::Skipped { reason } => println!("Skipped: {}", reason),
            }
            Ok(())
        }
        Commands::Trace {
            github,
            owner,
            repo,
            out,
        } => {
            let client = github_client(&github)?;
            cmd_trace(&client, &owner, &repo, &out).await
        }
    }
}

fn github_client(args: &GithubArgs) -> Result<GithubClient> {
    let mut config = GithubConfig::new(&args.api_url).with_timeout_secs(args.timeout_secs);
    if let Some(token) = args.token.as_deref().filter(|t| !t.is_empty()) {
        config = config.with_token(token);
    }
    GithubClient::new(config).context("Failed to build GitHub client")
}

/// Load the engine configuration, or the defaults when no file is given
fn load_config(path: Option<&Path>) -> Result<GuardConfig> {
    match path {
        Some(path) => GuardConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(GuardConfig::default()),
    }
}

/// Build the check context, asking GitHub for revisions not given explicitly
async fn resolve_context(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    pr: u64,
    head_sha: Option<String>,
    base_sha: Option<String>,
    installation_id: u64,
) -> Result<CheckContext> {
    let (head_sha, base_sha) = match (head_sha, base_sha) {
        (Some(head), Some(base)) => (head, base),
        (head, base) => {
            let refs = client
                .get_pull_request(owner, repo, pr)
                .await
                .with_context(|| format!("Failed to resolve {}/{}#{}", owner, repo, pr))?;
            (
                head.unwrap_or(refs.head_sha),
                base.unwrap_or(refs.base_sha),
            )
        }
    };

    Ok(CheckContext {
        installation_id,
        owner: owner.to_string(),
        repo: repo.to_string(),
        pull_number: pr,
        head_sha,
        base_sha,
    })
}

/// Evaluate a pull request, optionally publishing a check run around it
async fn cmd_check(
    host: &dyn SourceHost,
    engine: &RuleEngine,
    ctx: &CheckContext,
    report: bool,
) -> Result<CheckRunResult> {
    info!(
        "Checking {}#{} at {}",
        ctx.full_name(),
        ctx.pull_number,
        ctx.head_sha
    );

    if !report {
        return Ok(engine.run(host, ctx).await);
    }

    let reporter = CheckRunReporter::start(host, ctx, &engine.config().check_name)
        .await
        .context("Failed to create check run")?;
    let result = engine.run(host, ctx).await;
    reporter
        .complete(&result)
        .await
        .context("Failed to complete check run")?;
    info!("Published check run {}", reporter.id());

    Ok(result)
}

/// Evaluate changed files read from `files` against an in-memory host
async fn cmd_scan(engine: &RuleEngine, files: &Path, ledger_present: bool) -> Result<CheckRunResult> {
    let content = std::fs::read_to_string(files)
        .with_context(|| format!("Failed to read changed files from {:?}", files))?;
    let changes: Vec<FileChange> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid changed files JSON in {:?}", files))?;
    info!("Scanning {} changed file(s)", changes.len());

    let host = MemorySourceHost::with_files(changes);
    if ledger_present {
        host.set_ledger_entries(Some(SCAN_HEAD_SHA), vec!["local-scan.md".to_string()]);
    }

    let ctx = CheckContext {
        installation_id: 0,
        owner: "local".to_string(),
        repo: "scan".to_string(),
        pull_number: 0,
        head_sha: SCAN_HEAD_SHA.to_string(),
        base_sha: String::new(),
    };
    Ok(engine.run(&host, &ctx).await)
}

/// Parse a recorded delivery and dispatch it
async fn cmd_webhook(
    host: &dyn SourceHost,
    engine: &RuleEngine,
    event: &str,
    payload: &Path,
) -> Result<Dispatch> {
    let body = std::fs::read(payload)
        .with_context(|| format!("Failed to read payload from {:?}", payload))?;
    let event = WebhookEvent::parse(event, &body).context("Invalid webhook payload")?;
    dispatch(host, engine, &event)
        .await
        .context("Webhook dispatch failed")
}

/// Write `TRACEABILITY.md` and the decision-flow diagram under `out`
async fn cmd_trace(host: &dyn SourceHost, owner: &str, repo: &str, out: &Path) -> Result<()> {
    let docs = trace_docs_for(host, owner, repo, Utc::now())
        .await
        .with_context(|| format!("Failed to list ledger entries of {}/{}", owner, repo))?;
    docs.write_to(out)
        .with_context(|| format!("Failed to write trace docs to {:?}", out))?;

    println!("Wrote traceability docs to {:?}", out);
    Ok(())
}

fn print_result(result: &CheckRunResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Markdown => {
            println!("# {}", result.title);
            println!();
            println!("{}", result.summary);
            for annotation in &result.annotations {
                println!(
                    "{}:{}: {}",
                    annotation.path, annotation.start_line, annotation.message
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}

fn ensure_passed(result: &CheckRunResult) -> Result<()> {
    if result.conclusion == Conclusion::Failure {
        anyhow::bail!("Praxis Guard checks failed");
    }
    Ok(())
}
