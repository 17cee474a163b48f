//! `scout`: investigate a repository with an LLM agent.
//!
//! Reads the API key from `SCOUT_API_KEY` (or `OPENAI_API_KEY`). Progress goes
//! to stderr; the final output goes to stdout and to a report file.
//!
//! # Examples
//!
//! ```sh
//! scout --request "Where are prices rounded?"
//! scout --mode docs --no-readme --request "Document the CLI flags"
//! scout --mode testing --workdir ../shop --output-file gaps.md
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use scout_code::config::{API_URL_ENV, DEFAULT_REWRITE_MODEL, api_key_from_env};
use scout_code::logging::init_logging;
use scout_code::request::ask_stdin;
use scout_code::{
    Mode, ProgressHandler, ScoutConfig, UsageReport, default_output_path, finalize_with_rewrite,
    resolve_request,
};
use scout_rs::agent::events::{CompositeEventHandler, LoggingHandler};
use scout_rs::agent::harness::Harness;
use scout_rs::{ChatClient, DEFAULT_MODEL, OPENAI_CHAT_URL};
use tracing::info;

/// Investigate a repository with an LLM agent.
#[derive(Parser)]
#[command(name = "scout", version)]
struct Cli {
    /// What you want to know or produce.
    #[arg(long)]
    request: Option<String>,

    /// Kind of answer to produce.
    #[arg(long, value_enum, default_value_t = Mode::Code)]
    mode: Mode,

    /// Model for the agent.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Docs mode: do not ask for a README by default.
    #[arg(long)]
    no_readme: bool,

    /// Where to write the final output. Default: report_{mode}_{timestamp}.md.
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Rewrite the output in a friendlier tone with a second model.
    #[arg(long)]
    rewrite_output: bool,

    /// Model for the rewrite pass.
    #[arg(long, default_value = DEFAULT_REWRITE_MODEL)]
    rewrite_model: String,

    /// Repository to investigate.
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// Maximum agent round-trips.
    #[arg(long, default_value_t = scout_rs::agent::DEFAULT_MAX_ROUNDS)]
    max_turns: u32,

    /// Chat completions endpoint. Falls back to SCOUT_API_URL, then OpenAI.
    #[arg(long)]
    api_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let workdir = std::fs::canonicalize(&cli.workdir)
        .map_err(|e| format!("cannot access workdir {}: {e}", cli.workdir.display()))?;
    if !workdir.is_dir() {
        return Err(format!("workdir {} is not a directory", workdir.display()));
    }

    let request = resolve_request(cli.mode, cli.request.as_deref(), cli.no_readme, ask_stdin)?;
    let api_key = api_key_from_env()?;
    let endpoint = cli
        .api_url
        .or_else(|| std::env::var(API_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| OPENAI_CHAT_URL.to_string());
    let client = ChatClient::with_endpoint(api_key, endpoint)?;

    let config = ScoutConfig {
        mode: cli.mode,
        model: cli.model,
        max_rounds: cli.max_turns,
        workdir,
        ..Default::default()
    };
    let tools = config.build_tool_set();
    let harness_config = config.build_harness_config();
    let messages = harness_config.initial_messages(request);

    info!(
        "{} on {} (endpoint {})",
        config.mode.agent_name(),
        config.workdir.display(),
        client.endpoint()
    );
    eprintln!("- Starting agent using {}...", config.model);

    let handler = CompositeEventHandler::new()
        .with(LoggingHandler)
        .with(ProgressHandler);
    let started = Instant::now();
    let result = Harness::new(&client, &tools, harness_config)
        .with_event_handler(&handler)
        .run(messages)
        .await?;

    eprintln!("- Agent finished");
    eprintln!(
        "{}",
        UsageReport::from_result(&config.model, &result).with_elapsed(started.elapsed())
    );

    let rewrite_model = cli.rewrite_output.then_some(cli.rewrite_model.as_str());
    let output = finalize_with_rewrite(&client, config.mode, &result, rewrite_model).await?;
    if output.round_limit_hit {
        eprintln!(
            "Warning: the agent hit the round limit ({}) before finishing; keeping its last output",
            config.max_rounds
        );
    }
    if let (Some(model), Some(rewrite_result)) = (rewrite_model, &output.rewrite) {
        eprintln!("{}", UsageReport::from_result(model, rewrite_result));
    }
    let output = output.text;

    eprintln!("- Final output:");
    println!("{output}");

    let path = cli
        .output_file
        .unwrap_or_else(|| default_output_path(config.mode, chrono::Local::now().naive_local()));
    tokio::fs::write(&path, &output)
        .await
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    eprintln!("- Report written to {}", path.display());

    Ok(())
}
