use cfo_copilot::{agent::Copilot, config::CopilotConfig, CopilotResponse};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "copilot",
    version,
    about = "Answer finance questions from monthly actuals, budget, FX and cash tables",
    long_about = "Answer finance questions from monthly actuals, budget, FX and cash tables.\n\
                  \n\
                  Examples:\n\
                    copilot What was June 2025 revenue vs budget?\n\
                    copilot --json Show gross margin trend last 3 months\n\
                    echo 'What is our cash runway?' | copilot\n\
                  \n\
                  Environment Variables:\n\
                    CFO_FIXTURES_PATH                # Directory with actuals/budget/fx/cash CSVs\n\
                    CFO_STRICT                       # Report failures instead of sample figures\n\
                    RUST_LOG                         # Log filter (logs go to stderr)"
)]
struct Cli {
    /// Question to answer; reads one question per stdin line when omitted
    question: Vec<String>,

    /// Directory with actuals.csv, budget.csv, fx.csv and cash.csv
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Print the full response record as JSON
    #[arg(long)]
    json: bool,

    /// Report failed metrics instead of substituting sample figures
    #[arg(long)]
    strict: bool,
}

fn print_response(response: &CopilotResponse, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    println!("{}", response.text);
    if response.is_clean() {
        return Ok(());
    }
    if !response.errors.is_empty() {
        eprintln!("\n⚠️  {} metric(s) failed:", response.errors.len());
        for error in &response.errors {
            eprintln!("  - {}", error);
        }
    }
    if response.fallback_used {
        eprintln!("ℹ️  Some figures are sample values");
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so answers can be piped
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut config = CopilotConfig::from_env()?;
    if let Some(dir) = cli.fixtures {
        config.fixtures_dir = dir;
    }
    if cli.strict {
        config.strict_fallback = true;
    }

    let copilot = Copilot::from_config(&config);
    info!(
        source = copilot.data_source(),
        policy = ?copilot.fallback_policy(),
        "Copilot initialized"
    );

    if !cli.question.is_empty() {
        let response = copilot.answer(&cli.question.join(" "));
        return print_response(&response, cli.json);
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        print_response(&copilot.answer(&line), cli.json)?;
        if !cli.json {
            println!();
        }
    }

    Ok(())
}
