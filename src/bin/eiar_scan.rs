use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eiar_scan::tools::{BatchSummary, parse_script, read_payload_lines, run_script};
use eiar_scan::{ScanConfig, ScanSession, Validator};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eiar-scan", version, about = "EIAR QR validation tools")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate one or more payloads
    Validate {
        #[arg(required = true)]
        payloads: Vec<String>,
    },
    /// Replay a session script (start / decode <payload> / fail / reset)
    Session {
        #[arg(long)]
        script: PathBuf,
    },
    /// Validate every line of a file in parallel and summarize
    Batch {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ScanConfig::from_env().context("reading EIAR_* environment")?;

    match cli.command {
        Command::Validate { payloads } => validate_cmd(&config, &payloads, cli.json),
        Command::Session { script } => session_cmd(&config, &script, cli.json),
        Command::Batch { input } => batch_cmd(&config, &input, cli.json),
        Command::Config => config_cmd(&config),
    }
}

fn validate_cmd(config: &ScanConfig, payloads: &[String], as_json: bool) -> Result<()> {
    let validator = Validator::from_config(config)?;
    for payload in payloads {
        let verdict = validator.validate(Some(payload.as_str()));
        if as_json {
            println!("{}", serde_json::to_string(&verdict)?);
        } else {
            match verdict.reason() {
                None => println!("ACCEPTED  {}", verdict.payload()),
                Some(reason) => println!("REJECTED  {:?}: {}", verdict.payload(), reason),
            }
        }
    }
    Ok(())
}

fn session_cmd(config: &ScanConfig, script: &Path, as_json: bool) -> Result<()> {
    let source = std::fs::read_to_string(script)
        .with_context(|| format!("reading script {}", script.display()))?;
    let steps = parse_script(&source)?;

    let mut session = ScanSession::from_config(config)?;
    let transitions = run_script(&mut session, &steps);

    if as_json {
        let report = json!({
            "steps": steps,
            "transitions": transitions,
            "state": session.kind(),
            "view": session.view(),
            "last_payload": session.last_payload(),
            "last_reason": session.last_reason().map(|r| r.message()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (step, transition) in steps.iter().zip(&transitions) {
        println!("{:<28} {}", format!("{step:?}"), transition);
    }
    println!("Final state: {}", session.kind());
    if let Some(payload) = session.last_payload() {
        println!("Last payload: {payload}");
    }
    if let Some(reason) = session.last_reason() {
        println!("Reason: {reason}");
    }
    Ok(())
}

fn batch_cmd(config: &ScanConfig, input: &Path, as_json: bool) -> Result<()> {
    let payloads = read_payload_lines(input)
        .with_context(|| format!("reading payloads from {}", input.display()))?;
    let validator = Validator::from_config(config)?;

    let start = Instant::now();
    let verdicts = validator.validate_batch(&payloads);
    let elapsed = start.elapsed();
    let summary = BatchSummary::from_verdicts(&verdicts);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Input: {}", input.display());
    println!("Total payloads:        {}", summary.total);
    println!("Accepted:              {}", summary.accepted);
    println!("Empty or unreadable:   {}", summary.empty_or_unreadable);
    println!("Not recognized:        {}", summary.not_recognized);
    println!(
        "Acceptance rate:       {:.2}%",
        summary.acceptance_rate() * 100.0
    );
    println!("Elapsed:               {:.3}ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

fn config_cmd(config: &ScanConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
