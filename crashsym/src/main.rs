//! # crashsym - Main Entry Point
//!
//! Reads a crash report, resolves every frame address with `atos` against
//! the given dSYM bundle and prints the symbolicated report.
//!
//! The pipeline runs on a blocking worker thread while the async runtime
//! watches for Ctrl+C; an interrupted run prints nothing.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use crashsym::cli::Args;
use crashsym::domain::CrashsymError;
use crashsym::export::ReportExporter;
use crashsym::pipeline::{Pipeline, Report};
use crashsym::preflight::run_preflight_checks;
use crashsym::symbolization::{
    AtosBackend, ExplicitToolLocator, FixedPathLocator, LocatorChain, SymbolResolver,
};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOINPUT: i32 = 66;
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let args = Args::parse();

    env_logger::Builder::new().filter_level(args.log_level()).parse_default_env().init();

    std::process::exit(match run_with_runtime(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CrashsymError>() {
        Some(
            CrashsymError::FileRead { .. }
            | CrashsymError::CrashFileNotFound(_)
            | CrashsymError::NotAFile(_)
            | CrashsymError::BundleNotFound(_),
        ) => EXIT_NOINPUT,
        Some(CrashsymError::Interrupted) => EXIT_INTERRUPTED,
        _ => EXIT_ERROR,
    }
}

fn run_with_runtime(args: Args) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(run(args));
    // Don't wait for an interrupted pipeline to drain
    runtime.shutdown_background();
    result
}

/// Explicit `--tool` first, then the standard install locations
fn tool_locator(args: &Args) -> LocatorChain {
    let chain = LocatorChain::new();
    let chain = match args.tool {
        Some(ref path) => chain.with(ExplicitToolLocator::new(path)),
        None => chain,
    };
    chain.with(FixedPathLocator::default())
}

async fn run(args: Args) -> Result<()> {
    let tools = tool_locator(&args);
    run_preflight_checks(&args.crash_file, &args.dsym, &tools, args.quiet)?;

    let backend = match args.arch {
        Some(ref arch) => AtosBackend::new().with_arch(arch),
        None => AtosBackend::new(),
    };
    let resolver =
        SymbolResolver::new(&args.dsym).with_tool_locator(tools).with_backend(backend);
    let pipeline = Pipeline::new(resolver, args.pipeline_config());

    info!("Symbolicating {} with {}", args.crash_file.display(), args.dsym.display());

    let crash_file = args.crash_file.clone();
    let task = tokio::task::spawn_blocking(move || pipeline.symbolicate(&crash_file));

    let report: Report = tokio::select! {
        joined = task => joined.context("Symbolication worker panicked")??,
        _ = tokio::signal::ctrl_c() => return Err(CrashsymError::Interrupted.into()),
    };

    if let Some(ref path) = args.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        ReportExporter::new(&args.crash_file, &args.dsym)
            .export(&report, BufWriter::new(file))
            .context("Failed to export report")?;
    }

    match args.output {
        Some(ref path) => fs::write(path, &report.text)
            .map_err(|source| CrashsymError::WriteFailed { path: path.clone(), source })?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report.text.as_bytes())?;
            stdout.flush()?;
        }
    }

    if !args.quiet {
        eprintln!(
            "symbolicated: {}/{} addresses ({} failed)",
            report.resolved_count(),
            report.records.len(),
            report.failed_count()
        );
        if let Some(ref path) = args.output {
            eprintln!("saved: {}", path.display());
        }
        if let Some(ref path) = args.report {
            eprintln!("report: {}", path.display());
        }
    }

    Ok(())
}
