use std::any::Any;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use cartomancy_core::validation::validate_reference;
use cartomancy_core::{ConversionStatus, Transaction};

use crate::behavior::simulate_session;
use crate::checkout::{commit_cart, orphan_transaction};
use crate::errors::GenerationError;
use crate::factories::{build_categories, build_products, build_users};
use crate::inventory::InventoryLedger;
use crate::model::{GenerateOptions, GenerationReport};
use crate::output::json::{JsonArrayWriter, write_json_array};
use crate::sampling;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub report: GenerationReport,
}

/// Entry point for generating a dataset from options.
///
/// A run writes `categories.json`, `products.json`, `users.json`, the
/// `sessions_<n>.json` chunk files and `transactions.json` into the output
/// directory, then rewrites `products.json` with post-sale stock and
/// persists `generation_report.json` describing the run. The report is
/// written even when the run fails partway.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn run(&self) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        self.options.validate()?;
        let run_id = uuid::Uuid::new_v4().to_string();
        let out_dir = self.options.out_dir.clone();
        std::fs::create_dir_all(&out_dir)?;

        let mut report = GenerationReport::new(
            run_id.clone(),
            self.options.seed,
            self.options.reference_date,
        );

        info!(
            run_id = %run_id,
            seed = self.options.seed,
            sessions = self.options.sessions,
            transactions = self.options.transactions,
            out_dir = %out_dir.display(),
            "generation started"
        );

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
            || -> Result<(), GenerationError> { self.run_inner(&out_dir, &mut report) },
        ));

        let elapsed = start.elapsed();
        report.duration_ms = elapsed.as_millis() as u64;
        report.throughput_bytes_per_sec = if elapsed.as_secs_f64() > 0.0 {
            report.bytes_written as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let report_path = out_dir.join("generation_report.json");
        let write_report = |report: &GenerationReport| -> Result<(), GenerationError> {
            std::fs::write(&report_path, serde_json::to_vec_pretty(report)?)?;
            Ok(())
        };

        match outcome {
            Ok(Ok(())) => {
                write_report(&report)?;
                info!(
                    run_id = %run_id,
                    sessions = report.sessions,
                    transactions = report.transactions,
                    duration_ms = report.duration_ms,
                    bytes_written = report.bytes_written,
                    "generation completed"
                );
                Ok(GenerationResult { out_dir, report })
            }
            Ok(Err(err)) => {
                report.record_error("generation_failed", err.to_string());
                write_report(&report)?;
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
            Err(panic) => {
                report.record_error("generation_failed", panic_message(panic));
                write_report(&report)?;
                warn!(run_id = %run_id, "generation panicked");
                Err(GenerationError::Failed(report))
            }
        }
    }

    fn run_inner(
        &self,
        out_dir: &Path,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        let options = &self.options;

        let mut rng = sampling::stream_rng(options.seed, "categories");
        let categories = build_categories(options, &mut rng);
        report.categories = categories.len() as u64;

        let mut rng = sampling::stream_rng(options.seed, "products");
        let mut products = build_products(options, &categories, &mut rng);
        report.products = products.len() as u64;

        let mut rng = sampling::stream_rng(options.seed, "users");
        let users = build_users(options, &mut rng);
        report.users = users.len() as u64;

        validate_reference(&categories, &products, &users)?;
        info!(
            categories = report.categories,
            products = report.products,
            users = report.users,
            "reference entities built"
        );

        write_reference_file(out_dir, "categories.json", &categories, options, report)?;
        write_reference_file(out_dir, "products.json", &products, options, report)?;
        write_reference_file(out_dir, "users.json", &users, options, report)?;

        let mut ledger = InventoryLedger::from_products(&products);
        report.initial_stock_units = ledger.total_stock();

        let sessions_seed = sampling::hash_seed(options.seed, "sessions");
        let mut transactions_writer =
            JsonArrayWriter::create(&out_dir.join("transactions.json"))?;
        let mut session_transactions = 0_u64;
        let mut units_sold = 0_u64;
        let mut sessions_written = 0_u64;
        let mut chunk_index = 0_u64;

        while sessions_written < options.sessions {
            let chunk_len = options.chunk_size.min(options.sessions - sessions_written);
            let chunk_start = Instant::now();
            let file_name = format!("sessions_{chunk_index}.json");
            let mut chunk_transactions: Vec<Transaction> = Vec::new();

            let base = sessions_written;
            let records = (base..base + chunk_len).map(|index| {
                let mut rng = sampling::indexed_rng(sessions_seed, index);
                let user = sampling::pick(&mut rng, &users);
                let mut session =
                    simulate_session(user, &products, &categories, &ledger, options, &mut rng);
                if session.conversion_status == ConversionStatus::Converted
                    && let Some(transaction) = commit_cart(&mut session, &mut ledger, &mut rng)
                {
                    chunk_transactions.push(transaction);
                }
                report.record_conversion(session.conversion_status);
                session
            });
            let stats = write_json_array(&out_dir.join(&file_name), records, 0, |_| {})?;

            sessions_written += stats.records;
            report.sessions = sessions_written;
            report.session_files += 1;
            report.record_file(&file_name, stats);

            for transaction in chunk_transactions {
                units_sold += transaction.unit_count();
                transactions_writer.push(&transaction)?;
                session_transactions += 1;
            }

            info!(
                file = %file_name,
                sessions = stats.records,
                total_sessions = sessions_written,
                transactions = session_transactions,
                duration_ms = chunk_start.elapsed().as_millis() as u64,
                "session chunk written"
            );
            if options.progress_every > 0 && sessions_written % options.progress_every == 0 {
                info!(
                    sessions = sessions_written,
                    session_target = options.sessions,
                    transactions = session_transactions,
                    transaction_target = options.transactions,
                    "progress"
                );
            }
            chunk_index += 1;
        }
        report.session_transactions = session_transactions;

        // Orphan orders only ever top the stream up to the target; linked
        // transactions above it are kept so every converted session stays
        // backed by a transaction.
        let orphan_target = options.transactions.saturating_sub(session_transactions);
        let orphans_seed = sampling::hash_seed(options.seed, "orphans");
        let orphan_cadence = (options.progress_every / 2).max(1);
        let mut orphans_written = 0_u64;
        let mut attempt = 0_u64;
        while orphans_written < orphan_target {
            if ledger.active_products() == 0 {
                let shortfall = orphan_target - orphans_written;
                report.transaction_shortfall = shortfall;
                report.record_warning(
                    "inventory_exhausted",
                    format!("inventory exhausted {shortfall} transactions short of the target"),
                );
                warn!(
                    orphans = orphans_written,
                    shortfall, "inventory exhausted before the transaction target"
                );
                break;
            }
            let mut rng = sampling::indexed_rng(orphans_seed, attempt);
            attempt += 1;
            let user = sampling::pick(&mut rng, &users);
            let Some(transaction) =
                orphan_transaction(user, &products, &mut ledger, options, &mut rng)
            else {
                continue;
            };
            units_sold += transaction.unit_count();
            transactions_writer.push(&transaction)?;
            orphans_written += 1;
            if orphans_written % orphan_cadence == 0 {
                info!(
                    orphans = orphans_written,
                    orphan_target, "orphan transaction progress"
                );
            }
        }
        report.orphan_transactions = orphans_written;
        report.transactions = session_transactions + orphans_written;
        report.units_sold = units_sold;

        let stats = transactions_writer.finish()?;
        info!(
            file = "transactions.json",
            transactions = stats.records,
            bytes = stats.bytes,
            "transaction stream closed"
        );
        report.record_file("transactions.json", stats);

        // Second write of products.json, now carrying post-sale stock and
        // the deactivations that came with it.
        ledger.apply_final_state(&mut products);
        report.final_stock_units = ledger.total_stock();
        let stats = write_json_array(&out_dir.join("products.json"), &products, 0, |_| {})?;
        info!(
            file = "products.json",
            products = stats.records,
            units_sold = report.units_sold,
            final_stock_units = report.final_stock_units,
            "final product snapshot written"
        );
        report.record_file("products.json", stats);

        Ok(())
    }
}

fn write_reference_file<T: Serialize>(
    out_dir: &Path,
    name: &str,
    records: &[T],
    options: &GenerateOptions,
    report: &mut GenerationReport,
) -> Result<(), GenerationError> {
    let stats = write_json_array(
        &out_dir.join(name),
        records,
        options.progress_every,
        |count| info!(file = name, records = count, "writing reference file"),
    )?;
    info!(
        file = name,
        records = stats.records,
        bytes = stats.bytes,
        "reference file written"
    );
    report.record_file(name, stats);
    Ok(())
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during generation".to_string()
    }
}
