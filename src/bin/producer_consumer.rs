use std::process::ExitCode;

use colored::Colorize;
use producer_consumer::cli::{Cli, USAGE};
use producer_consumer::logging::init_tracing;
use producer_consumer::{AppError, Config, Orchestrator, RunSummary};
use tokio::signal;
use tracing::error;

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        // Without a handler the run can only be killed, so keep running.
        error!(%err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn print_summary(summary: &RunSummary, color: bool) {
    let heading = "=== Summary ===";
    if color {
        println!("\n{}", heading.bold());
    } else {
        println!("\n{heading}");
    }
    println!("Sent:        {}", summary.sent);
    println!("Received:    {}", summary.received);
    println!("Undelivered: {}", summary.undelivered.len());
    for report in &summary.tasks {
        println!("  {} {}: {}", report.role, report.id, report.processed);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse_from(std::env::args().skip(1))?;
    let Some(mode) = cli.command.mode() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = Config::load_or_default(cli.config.as_deref())?;

    let summary = Orchestrator::from_config(mode, &config)
        .run(shutdown_signal())
        .await?;
    print_summary(&summary, config.color);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            if matches!(err, AppError::Usage(_)) {
                eprintln!("\n{USAGE}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
