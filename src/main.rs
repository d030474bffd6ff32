use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use postcheck::checks::Check;
use postcheck::{CsvSink, SuiteConfig};

#[derive(Parser)]
#[command(
    name = "postcheck",
    about = "Contract checks for a public posts REST API, logged to CSV",
    version,
    long_about = None
)]
struct Cli {
    /// Configuration file (TOML); falls back to $POSTCHECK_CONFIG, then ./postcheck.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the checks and append results to the CSV log
    Run {
        /// Root URL of the API under test
        #[arg(long)]
        base_url: Option<String>,

        /// JSON fixture file with post payloads
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// CSV result log
        #[arg(long)]
        results: Option<PathBuf>,

        /// Run only the named check (repeatable)
        #[arg(long = "only", value_name = "CHECK")]
        only: Vec<String>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// List available checks
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Run {
            base_url,
            fixtures,
            results,
            only,
            json,
        } => {
            let mut config = SuiteConfig::resolve(cli.config.as_deref())?;
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            if let Some(fixtures) = fixtures {
                config.fixtures_path = fixtures;
            }
            if let Some(results) = results {
                config.results_path = results;
            }

            let checks = select_checks(&only)?;
            tracing::info!(
                base_url = %config.base_url,
                results = %config.results_path.display(),
                "Running posts API checks"
            );

            let ctx = postcheck::suite::build_context(&config)?;
            let sink = CsvSink::new(&config.results_path);
            let report = postcheck::run_suite(&ctx, &checks, &sink).await;

            if json {
                let json_output = serde_json::to_string_pretty(&report)?;
                println!("{}", json_output);
            } else {
                println!("\nPosts API checks against {}", report.base_url);
                println!("{:<8} | {:<16} | {:<6} | Result", "Type", "Test", "Status");
                println!("{:-<8}-|-{:-<16}-|-{:-<6}-|-{:-<30}", "", "", "", "");
                for res in &report.results {
                    let mut line = format!(
                        "{:<8} | {:<16} | {:<6} | {}",
                        res.request_type, res.test_name, res.outcome.status, res.outcome.outcome
                    );
                    if let Some(detail) = &res.outcome.detail {
                        line.push_str(&format!(" ({})", detail));
                    }
                    println!("{}", line);
                }
                for err in &report.errored {
                    println!(
                        "{:<8} | {:<16} | {:<6} | ERROR: {}",
                        err.request_type, err.check, "-", err.error
                    );
                }
                println!(
                    "\n{} passed, {} failed, {} errored. Results appended to {}",
                    report.passed(),
                    report.failed(),
                    report.errored.len(),
                    sink.path().display()
                );
            }
        }
        Commands::List => {
            println!("{:<22} | {:<7} | Description", "Check", "Type");
            println!("{:-<22}-|-{:-<7}-|-{:-<40}", "", "", "");
            for check in Check::ALL {
                println!(
                    "{:<22} | {:<7} | {}",
                    check.id(),
                    check.request_type(),
                    check.description()
                );
            }
        }
    }

    Ok(())
}

fn select_checks(only: &[String]) -> Result<Vec<Check>> {
    if only.is_empty() {
        return Ok(Check::ALL.to_vec());
    }
    let mut checks = Vec::with_capacity(only.len());
    for id in only {
        match Check::from_id(id) {
            Some(check) => checks.push(check),
            None => bail!("unknown check '{}', see `postcheck list`", id),
        }
    }
    Ok(checks)
}
