use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fission::{AppConfig, RunOptions, ScenarioDefinition, ScenarioExecutor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file name, without extension (layered under FISSION_* env vars)
    #[arg(long, default_value = "fission")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario file and print the report
    Run {
        /// Path to the scenario RON file
        scenario: PathBuf,

        /// RNG seed (overrides the scenario)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of ticks (overrides the scenario)
        #[arg(long)]
        ticks: Option<u64>,

        /// Ticks between table rows
        #[arg(long)]
        interval: Option<u64>,

        /// Print the final reactor snapshot as RON
        #[arg(long)]
        snapshot: bool,

        /// Also write the full report to this RON file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let app = AppConfig::load_from(&args.config)?;

    match args.command {
        Command::Run {
            scenario,
            seed,
            ticks,
            interval,
            snapshot,
            report,
        } => {
            let definition = ScenarioDefinition::from_file(&scenario)?;

            let mut options = RunOptions::resolve(&app, &definition, seed, ticks);
            if let Some(interval) = interval {
                options.interval = interval.max(1);
            }

            let result = ScenarioExecutor::new(options).execute(&definition)?;
            println!("{}", result);

            if snapshot || app.report.print_snapshot {
                println!("{}", result.snapshot_ron()?);
            }
            if let Some(path) = report {
                result.to_file(&path)?;
                log::info!("Report written to {}", path.display());
            }

            if !result.passed {
                anyhow::bail!(
                    "Scenario '{}' failed {} check(s)",
                    definition.name,
                    result.verification_failures.len()
                );
            }
            Ok(())
        }
    }
}
