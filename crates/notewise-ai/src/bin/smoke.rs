//! Notewise AI smoke test
//!
//! Runs each AI operation once against the configured provider and prints the
//! results.
//!
//! Usage:
//!   cargo run --bin notewise-smoke
//!   cargo run --bin notewise-smoke -- --config notewise.toml
//!   NOTEWISE_AI_PROVIDER=openai OPENAI_API_KEY=sk-... cargo run --bin notewise-smoke
//!
//! Environment variables:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to log file (optional, enables file logging)
//!   RUST_LOG    - standard env filter (default: "notewise_ai=debug")

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notewise_ai::{create_ai_service, AiService, ServiceConfig};

const SAMPLE_PROMPT: &str = "Hello, can you help me organize my thoughts?";

const SAMPLE_NOTE: &str = "Today I finished the quarterly report and planned next week's research sprint. \
I need to review the reading list, block time for deep work, and follow up with the team about the launch.";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    result.config = Some(PathBuf::from(&args[i]));
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    result
}

fn print_help() {
    println!(
        r#"Notewise AI smoke test

USAGE:
    notewise-smoke [OPTIONS]

OPTIONS:
    -c, --config <PATH>   Read the [ai] table from a TOML file instead of the environment
    -h, --help            Print help

ENVIRONMENT:
    NOTEWISE_AI_PROVIDER      openai | mock (default: mock)
    NOTEWISE_AI_API_KEY       Provider credential (falls back to OPENAI_API_KEY)
    NOTEWISE_AI_BASE_URL      Chat-completion base URL
    NOTEWISE_AI_TIMEOUT_MS    Per-attempt deadline in milliseconds
    NOTEWISE_AI_MAX_RETRIES   Attempts per call
    NOTEWISE_AI_MODEL         Chat model name
"#
    );
}

fn init_logging() -> Option<WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notewise_ai=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let guard = if let Some(ref path) = log_file {
        let file_dir = Path::new(path).parent().unwrap_or(Path::new("."));
        let file_name = Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notewise-smoke.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        // Console output goes to stderr so stdout carries only results
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

async fn run_checks(service: &dyn AiService) -> usize {
    let mut failures = 0;

    println!("== generate_response");
    let start = Instant::now();
    match service.generate_response(SAMPLE_PROMPT, None).await {
        Ok(reply) => println!("{}\n({} ms)\n", reply, start.elapsed().as_millis()),
        Err(e) => {
            error!(op = "generate_response", error = %e, "Smoke check failed");
            println!("FAILED: {}\n", e);
            failures += 1;
        }
    }

    println!("== analyze_note");
    let start = Instant::now();
    match service.analyze_note(SAMPLE_NOTE).await {
        Ok(analysis) => {
            println!("summary:   {}", analysis.summary);
            for point in &analysis.key_points {
                println!("point:     {}", point);
            }
            println!("tags:      {}", analysis.suggested_tags.join(", "));
            println!("sentiment: {}", analysis.sentiment);
            println!("({} ms)\n", start.elapsed().as_millis());
        }
        Err(e) => {
            error!(op = "analyze_note", error = %e, "Smoke check failed");
            println!("FAILED: {}\n", e);
            failures += 1;
        }
    }

    println!("== summarize_text");
    let start = Instant::now();
    match service.summarize_text(SAMPLE_NOTE).await {
        Ok(summary) => println!("{}\n({} ms)\n", summary, start.elapsed().as_millis()),
        Err(e) => {
            error!(op = "summarize_text", error = %e, "Smoke check failed");
            println!("FAILED: {}\n", e);
            failures += 1;
        }
    }

    failures
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _guard = init_logging();
    let args = parse_args();

    let config = match &args.config {
        Some(path) => ServiceConfig::from_file(path),
        None => ServiceConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid AI configuration");
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = match create_ai_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!(provider = %config.provider, error = %e, "Failed to create AI service");
            eprintln!("Could not create {} provider: {}", config.provider, e);
            return ExitCode::FAILURE;
        }
    };

    println!("Provider: {}\n", service.provider_name());
    let failures = run_checks(service.as_ref()).await;

    let status = service.service_status();
    println!("== status");
    println!("available:  {}", status.available);
    if let Some(rate_limit) = &status.rate_limit {
        println!("rate limit: {}/{}", rate_limit.remaining, rate_limit.limit);
    }
    if let Some(last_error) = &status.last_error {
        println!("last error: {}", last_error);
    }

    if failures > 0 {
        eprintln!("{} of 3 checks failed", failures);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
