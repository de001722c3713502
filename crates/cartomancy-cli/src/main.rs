mod logging;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use cartomancy_core::timestamp;
use cartomancy_generate::model::DEFAULT_REFERENCE_DATE;
use cartomancy_generate::{GenerateOptions, GenerationEngine, GenerationError};

#[derive(Debug, Error)]
enum CliError {
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "cartomancy",
    version,
    about = "Synthetic e-commerce dataset generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a full dataset into the output directory.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output directory for the dataset files.
    #[arg(long, default_value = ".")]
    out: PathBuf,
    /// Root random seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 10_000)]
    num_users: u64,
    #[arg(long, default_value_t = 5_000)]
    num_products: u64,
    #[arg(long, default_value_t = 25)]
    num_categories: u64,
    #[arg(long, default_value_t = 70_000)]
    num_transactions: u64,
    #[arg(long, default_value_t = 150_000)]
    num_sessions: u64,
    /// Length of the activity window in days.
    #[arg(long, default_value_t = 90)]
    timespan_days: u32,
    /// Sessions per chunk file.
    #[arg(long, default_value_t = 30_000)]
    sessions_chunk_size: u64,
    #[arg(long, default_value_t = 2)]
    subcats_min: u32,
    #[arg(long, default_value_t = 6)]
    subcats_max: u32,
    /// Log progress every N sessions (0 disables).
    #[arg(long, default_value_t = 20_000)]
    progress_every: u64,
    /// Fixed timeline anchor every generated timestamp leads up to.
    #[arg(long, default_value = DEFAULT_REFERENCE_DATE, value_parser = parse_reference_date)]
    reference_date: NaiveDateTime,
}

fn main() -> Result<(), CliError> {
    logging::init().map_err(CliError::Logging)?;
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        out,
        seed,
        num_users,
        num_products,
        num_categories,
        num_transactions,
        num_sessions,
        timespan_days,
        sessions_chunk_size,
        subcats_min,
        subcats_max,
        progress_every,
        reference_date,
    } = args;

    let options = GenerateOptions {
        out_dir: out,
        seed,
        users: num_users,
        products: num_products,
        categories: num_categories,
        transactions: num_transactions,
        sessions: num_sessions,
        timespan_days,
        chunk_size: sessions_chunk_size,
        subcategories_min: subcats_min,
        subcategories_max: subcats_max,
        progress_every,
        reference_date,
    };

    let engine = GenerationEngine::new(options);
    let result = engine.run()?;
    let report = &result.report;

    tracing::info!(
        event = "run_finished",
        status = "success",
        run_id = %report.run_id,
        sessions = report.sessions,
        transactions = report.transactions,
        transaction_shortfall = report.transaction_shortfall,
        bytes_written = report.bytes_written,
        duration_ms = report.duration_ms
    );
    println!("out_dir={}", result.out_dir.display());
    Ok(())
}

fn parse_reference_date(raw: &str) -> Result<NaiveDateTime, String> {
    timestamp::parse(raw).map_err(|err| format!("{err}; expected a value like 2025-01-01T00:00:00"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn generate_args_parse_with_overrides() {
        let cli = Cli::try_parse_from([
            "cartomancy",
            "generate",
            "--out",
            "/tmp/dataset",
            "--seed",
            "7",
            "--num-sessions",
            "500",
            "--reference-date",
            "2024-06-15T12:00:00",
        ])
        .expect("valid arguments parse");
        let Command::Generate(args) = cli.command;
        assert_eq!(args.out, PathBuf::from("/tmp/dataset"));
        assert_eq!(args.seed, 7);
        assert_eq!(args.num_sessions, 500);
        assert_eq!(
            args.reference_date,
            timestamp::parse("2024-06-15T12:00:00").unwrap()
        );
        // Untouched options keep the documented defaults.
        assert_eq!(args.num_users, 10_000);
        assert_eq!(args.sessions_chunk_size, 30_000);
    }

    #[test]
    fn malformed_reference_date_is_rejected() {
        let result = Cli::try_parse_from([
            "cartomancy",
            "generate",
            "--reference-date",
            "June 15th 2024",
        ]);
        assert!(result.is_err());
    }
}
