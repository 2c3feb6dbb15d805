use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jitlog_config::{ReportFormat, TimeLogConfig};
use jitlog_metrics::{FunctionSelector, SteppingClock, TimeSource};

use crate::driver::{CompilationDriver, CompileJob, SyntheticPipeline};

const DEFAULT_PASSES: [&str; 4] = [
    "SSAify",
    "Simplify",
    "DeadCodeElimination",
    "RefcountInsertion",
];

const MAX_STEP_MS: u64 = 3_600_000;

#[derive(Parser, Debug)]
#[command(
    name = "jitlog",
    version,
    about = "Per-function compilation phase timing for the JIT"
)]
pub struct Cli {
    /// TOML configuration file (environment variables still take precedence)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Test words against a single wildcard pattern
    Match {
        pattern: String,
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Show which qualified names would get a timing breakdown
    Select {
        /// Comma-separated patterns; defaults to the configured list
        #[arg(long)]
        capture_for: Option<String>,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Compile synthetic functions and log their phase reports
    Demo {
        /// Comma-separated patterns; defaults to the configured list
        #[arg(long)]
        capture_for: Option<String>,
        /// Clock step between phase boundaries, in milliseconds (at most an hour)
        #[arg(
            long,
            default_value_t = 20,
            value_parser = clap::value_parser!(u64).range(..=MAX_STEP_MS)
        )]
        step_ms: u64,
        #[arg(long)]
        format: Option<ReportFormat>,
        /// HIR passes each function runs
        #[arg(long, value_delimiter = ',')]
        passes: Option<Vec<String>>,
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn load_config(path: Option<&Path>) -> Result<TimeLogConfig> {
    Ok(match path {
        Some(path) => TimeLogConfig::from_file(path)?.merge_with_env(),
        None => TimeLogConfig::from_env(),
    })
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Match { pattern, words } => {
            for word in &words {
                let verdict = if jitlog_metrics::selector::matches(word, &pattern) {
                    "matched"
                } else {
                    "no match"
                };
                println!("{word}: {verdict}");
            }
        }
        Command::Select { capture_for, names } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(list) = capture_for {
                config.capture_compilation_times_for = list;
            }
            let selector = FunctionSelector::from_list(&config.capture_compilation_times_for);
            for name in &names {
                let verdict = if selector.is_selected(name) {
                    "selected"
                } else {
                    "not selected"
                };
                println!("{name}: {verdict}");
            }
        }
        Command::Demo {
            capture_for,
            step_ms,
            format,
            passes,
            names,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(list) = capture_for {
                config.capture_compilation_times_for = list;
            }
            if let Some(format) = format {
                config.report_format = format;
            }
            run_demo(&config, step_ms, passes, names)?;
        }
    }

    Ok(())
}

fn run_demo(
    config: &TimeLogConfig,
    step_ms: u64,
    passes: Option<Vec<String>>,
    names: Vec<String>,
) -> Result<()> {
    if !config.capture_enabled() {
        tracing::warn!("no capture patterns configured; no phase reports will be produced");
    }

    let passes: Vec<String> = passes
        .unwrap_or_else(|| DEFAULT_PASSES.iter().map(|pass| pass.to_string()).collect())
        .into_iter()
        .filter(|pass| !pass.is_empty())
        .collect();

    let step = Duration::from_millis(step_ms);
    let driver = CompilationDriver::from_config(config)
        .with_clock(move || Box::new(SteppingClock::new(step)) as Box<dyn TimeSource>);

    let mut jobs: Vec<_> = names
        .into_iter()
        .map(|name| CompileJob::new(name, SyntheticPipeline::new(passes.clone())))
        .collect();

    for result in driver.compile_batch(&mut jobs) {
        let compiled = result?;
        println!(
            "{}: {} bytes{}",
            compiled.qualified_name,
            compiled.code_size,
            if compiled.report.is_some() {
                ", timed"
            } else {
                ""
            }
        );
    }

    Ok(())
}
