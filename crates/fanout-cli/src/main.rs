use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fanout_core::app::{measure_fan_out, measure_repeated};
use fanout_core::domain::{MeasureSummary, RunReport};
use fanout_core::{FanOut, FanOutConfig, MaxDelay};

#[derive(Debug, Parser)]
#[command(name = "fanout")]
#[command(about = "Spawn random delay tasks concurrently and time them.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one fan-out and print the delays in completion order.
    Run(RunArgs),
    /// Repeat the fan-out and report the mean elapsed time.
    Measure(MeasureArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(short, long, help = "number of delay tasks (default 5)")]
    tasks: Option<usize>,
    #[arg(
        short = 'd',
        long,
        allow_negative_numbers = true,
        help = "upper bound of each delay in seconds (default 10)"
    )]
    max_delay: Option<f64>,
    #[arg(short, long, help = "TOML file with `tasks` and `max_delay`")]
    config: Option<PathBuf>,
    #[arg(long, help = "print the report as JSON")]
    json: bool,
}

#[derive(Debug, Args)]
struct MeasureArgs {
    #[command(flatten)]
    run: RunArgs,
    #[arg(short, long, default_value = "3", help = "number of fan-outs to time")]
    repeat: usize,
}

/// Flags win over the config file, which wins over the defaults.
fn resolve(args: &RunArgs, file: Option<FanOutConfig>) -> Result<(usize, MaxDelay)> {
    let base = file.unwrap_or_default();
    let config = FanOutConfig {
        tasks: args.tasks.unwrap_or(base.tasks),
        max_delay: args.max_delay.unwrap_or(base.max_delay),
    };
    let max_delay = config.validate()?;
    Ok((config.tasks, max_delay))
}

fn load_settings(args: &RunArgs) -> Result<(usize, MaxDelay)> {
    let file = args
        .config
        .as_deref()
        .map(FanOutConfig::load)
        .transpose()
        .context("loading fan-out config")?;
    let (tasks, max_delay) = resolve(args, file)?;
    tracing::info!(tasks, %max_delay, config = ?args.config, "settings resolved");
    Ok((tasks, max_delay))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the results, logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn print_report(report: &RunReport) {
    let delays: Vec<String> = report.delays.iter().map(|d| format!("{d:.3}")).collect();
    println!(
        "{} tasks={} max_delay={} elapsed={:.3}s per_task={:.3}s",
        report.run_id, report.tasks, report.max_delay, report.elapsed_secs, report.per_task_secs
    );
    println!("  completion order: [{}]", delays.join(", "));
}

fn print_summary(summary: &MeasureSummary) {
    for report in &summary.runs {
        print_report(report);
    }
    println!(
        "mean elapsed over {} runs: {:.3}s",
        summary.runs.len(),
        summary.mean_elapsed_secs
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let fan_out = FanOut::default();

    match cli.command {
        Commands::Run(args) => {
            let (tasks, max_delay) = load_settings(&args)?;
            let report = measure_fan_out(&fan_out, tasks, max_delay).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Measure(args) => {
            let (tasks, max_delay) = load_settings(&args.run)?;
            let summary = measure_repeated(&fan_out, tasks, max_delay, args.repeat).await?;
            if args.run.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}
