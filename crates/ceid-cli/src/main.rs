//! ceid CLI
//!
//! Google Chrome extension ID generator that searches for a signing key
//! whose ID starts with the requested characters.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use ceid_core::difficulty::format_difficulty;
use ceid_core::{
    derive, possibility_percent, Artifacts, PemFileSink, ResultSink, RsaKeySource,
    SearchConfig, SearchOutcome, SearchReport, SearchResult, SinkError, VanitySearch,
    PROGRESS_INTERVAL,
};
use ceid_crypto::encoding::base64_unpadded;
use ceid_crypto::keypair::public_key_der_from_pem;
use clap::{Parser, Subcommand};
use tracing::warn;

/// Conventional exit status for termination by SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "ceid")]
#[command(version)]
#[command(about = "Generate Google Chrome Extension ID", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a key whose extension ID starts with a prefix
    Generate {
        /// Prefix to find (letters a-p)
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Number of threads to use (0 = all cores)
        #[arg(short, long, default_value = "1")]
        threads: usize,

        /// Directory for private.pem and public.pem
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the extension ID of an existing public key file
    Inspect {
        /// PEM file holding a SubjectPublicKeyInfo public key
        path: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prefix,
            threads,
            out_dir,
            json,
        } => cmd_generate(&prefix, threads, out_dir, json),
        Commands::Inspect { path } => {
            cmd_inspect(&path)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_threads(threads: usize) -> usize {
    if threads == 0 {
        num_cpus::get()
    } else {
        threads
    }
}

fn cmd_generate(
    prefix: &str,
    threads: usize,
    out_dir: PathBuf,
    json_output: bool,
) -> Result<ExitCode> {
    // Rejects bad prefixes before any worker exists
    let config = SearchConfig::parse(prefix, resolve_threads(threads))?;

    let search = VanitySearch::new(config.clone(), Box::new(RsaKeySource::default()));
    let difficulty = search.difficulty();

    if !json_output {
        println!("Possibility: {:.6}%", possibility_percent(config.prefix().len()));
        println!(
            "Estimated tries: {:.0} ({})",
            difficulty,
            format_difficulty(difficulty)
        );
        eprintln!("Threads: {}", config.threads());
    }

    let stats = search.stats();
    if let Err(e) = ctrlc::set_handler(move || stats.cancel()) {
        warn!(error = %e, "failed to install Ctrl-C handler");
    }

    let outcome = search.run_with_callback(PROGRESS_INTERVAL, |stats| {
        if !json_output {
            eprint!("\r{}", stats.format(difficulty));
        }
    })?;
    if !json_output {
        eprintln!();
    }

    let result = match outcome {
        SearchOutcome::Found(result) => result,
        SearchOutcome::Cancelled => {
            eprintln!("Search cancelled, nothing written.");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    let (report, committed) = commit_and_report(&PemFileSink::new(out_dir), &result);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_result(&result, &report);
    }

    committed.context("failed to write key files")?;
    Ok(ExitCode::SUCCESS)
}

/// Persist the winner and build its report
///
/// The key is already found, so the report is built even if writing fails.
fn commit_and_report(
    sink: &dyn ResultSink,
    result: &SearchResult,
) -> (SearchReport, Result<Artifacts, SinkError>) {
    let committed = sink.commit(result);
    if let Err(e) = &committed {
        warn!(error = %e, id = %result.candidate.id, "key found but not persisted");
    }
    let report = SearchReport::new(result, committed.as_ref().ok().cloned());
    (report, committed)
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let pem = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let der = public_key_der_from_pem(&pem)
        .with_context(|| format!("{} is not a public key file", path.display()))?;

    println!("ID: {}", derive(&der));
    println!("Public Key: {}", base64_unpadded(&der));
    Ok(())
}

fn print_result(result: &SearchResult, report: &SearchReport) {
    println!("ID: {}", report.id);
    println!("Public Key: {}", report.public_key);
    println!("{:-<60}", "");
    println!("Keys Tested: {}", result.keys_tested);
    println!("Time:        {:.2}s", result.time_secs);
    println!("Speed:       {:.2} key/s", result.keys_per_second);
    if let Some(artifacts) = &report.artifacts {
        println!("Private File: {}", artifacts.private_key_path.display());
        println!("Public File:  {}", artifacts.public_key_path.display());
    }
}
