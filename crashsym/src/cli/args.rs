//! CLI argument definitions

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::pipeline::PipelineConfig;

#[derive(Parser, Debug)]
#[command(
    name = "crashsym",
    version,
    about = "Symbolicate crash reports against a dSYM bundle",
    after_help = "\
EXAMPLES:
    crashsym -d App.app.dSYM App.crash                 Print the symbolicated report
    crashsym -d App.app.dSYM App.crash -o out.txt      Write it to a file
    crashsym -d App.app.dSYM App.crash --batch -j 4    One atos call per image, 4 workers"
)]
pub struct Args {
    /// Crash report to symbolicate (.crash or .txt)
    #[arg(value_name = "CRASH_FILE")]
    pub crash_file: PathBuf,

    /// dSYM bundle holding the debug symbols
    #[arg(short, long, value_name = "BUNDLE")]
    pub dsym: PathBuf,

    /// Write the symbolicated report to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a JSON report of every resolved address
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Path to the atos executable (tried before the standard locations)
    #[arg(long, value_name = "PATH")]
    pub tool: Option<PathBuf>,

    /// Architecture passed to atos with -arch (e.g. arm64)
    #[arg(long)]
    pub arch: Option<String>,

    /// Resolver worker threads (0 = available parallelism)
    #[arg(short, long, default_value = "0")]
    pub jobs: usize,

    /// Resolve all addresses of one image with a single atos call
    #[arg(long)]
    pub batch: bool,

    /// Suppress warnings and the summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity when RUST_LOG is unset (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig { jobs: self.jobs, batch: self.batch }
    }

    /// Default log filter derived from `-v`
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
