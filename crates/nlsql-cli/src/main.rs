//! nlsql CLI - inspect and query a database through the nlsql adapters.

use clap::{Parser, Subcommand};
use nlsql::{Config, NlsqlError, QueryService};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "nlsql")]
#[command(about = "Database adapter and dynamic result toolkit for natural-language SQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "nlsql.yaml")]
    config: PathBuf,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the configured database and report latency
    HealthCheck,

    /// Print the live schema as CREATE TABLE statements
    Schema,

    /// Execute SQL and print the result as JSON
    Query {
        /// SQL text to execute
        sql: String,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), NlsqlError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let service = QueryService::from_config(&config);
    let started = Instant::now();
    service.connect(&config.database).await?;
    let latency_ms = started.elapsed().as_millis();

    // Close the session on both success and failure paths.
    let result = execute(&service, cli.command, latency_ms).await;
    service.shutdown().await;
    result
}

async fn execute(
    service: &QueryService,
    command: Commands,
    latency_ms: u128,
) -> Result<(), NlsqlError> {
    match command {
        Commands::HealthCheck => {
            let dialect = service.dialect().await.unwrap_or_default();
            println!("Health Check Results:");
            println!("  Database ({}): OK ({}ms)", dialect, latency_ms);
        }
        Commands::Schema => {
            print!("{}", service.schema_text().await?);
        }
        Commands::Query { sql, pretty } => {
            let result = service.execute_query(&sql).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only command output.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
