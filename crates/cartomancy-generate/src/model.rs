use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use cartomancy_core::ConversionStatus;

use crate::errors::GenerationError;
use crate::output::FileStats;

/// Anchor used when no reference date is configured.
///
/// Every time window in the dataset is computed backwards from the
/// reference date, so two runs with the same seed and options produce
/// identical files no matter when they execute.
pub const DEFAULT_REFERENCE_DATE: &str = "2025-01-01T00:00:00";

/// Options for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where the dataset files are written.
    pub out_dir: PathBuf,
    /// Root seed; every random stream is derived from it.
    pub seed: u64,
    pub users: u64,
    pub products: u64,
    pub categories: u64,
    /// Total transaction target, session-linked and orphan combined.
    pub transactions: u64,
    pub sessions: u64,
    /// Length of the activity window ending at `reference_date`.
    pub timespan_days: u32,
    /// Sessions per `sessions_<n>.json` chunk file.
    pub chunk_size: u64,
    pub subcategories_min: u32,
    pub subcategories_max: u32,
    /// Log progress every N sessions; 0 disables progress logging.
    pub progress_every: u64,
    /// Fixed "now" the generated timeline leads up to.
    #[serde(with = "cartomancy_core::timestamp")]
    pub reference_date: NaiveDateTime,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            seed: 42,
            users: 10_000,
            products: 5_000,
            categories: 25,
            transactions: 70_000,
            sessions: 150_000,
            timespan_days: 90,
            chunk_size: 30_000,
            subcategories_min: 2,
            subcategories_max: 6,
            progress_every: 20_000,
            reference_date: default_reference_date(),
        }
    }
}

impl GenerateOptions {
    /// Checks that every target is positive and the reference sets cannot
    /// come out empty. A zero-product or zero-category run could never
    /// select a candidate, so it is rejected up front.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let positive: [(&str, u64); 7] = [
            ("users", self.users),
            ("products", self.products),
            ("categories", self.categories),
            ("transactions", self.transactions),
            ("sessions", self.sessions),
            ("chunk_size", self.chunk_size),
            ("timespan_days", u64::from(self.timespan_days)),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(GenerationError::InvalidConfig(format!(
                    "{name} must be positive"
                )));
            }
        }
        if self.subcategories_min == 0 {
            return Err(GenerationError::InvalidConfig(
                "subcategories_min must be positive".to_string(),
            ));
        }
        if self.subcategories_min > self.subcategories_max {
            return Err(GenerationError::InvalidConfig(format!(
                "subcategory range {}..{} is inverted",
                self.subcategories_min, self.subcategories_max
            )));
        }
        Ok(())
    }

    /// Start of the session/transaction activity window.
    pub fn window_start(&self) -> NaiveDateTime {
        self.reference_date - Duration::days(i64::from(self.timespan_days))
    }
}

/// Parses [`DEFAULT_REFERENCE_DATE`].
pub fn default_reference_date() -> NaiveDateTime {
    cartomancy_core::timestamp::parse(DEFAULT_REFERENCE_DATE).unwrap_or_default()
}

/// Per-file output summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub records: u64,
    pub bytes: u64,
}

/// Structured issue recorded during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
}

/// Report for a generation run, persisted as `generation_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    #[serde(with = "cartomancy_core::timestamp")]
    pub reference_date: NaiveDateTime,
    pub categories: u64,
    pub products: u64,
    pub users: u64,
    pub sessions: u64,
    pub session_files: u64,
    pub transactions: u64,
    pub session_transactions: u64,
    pub orphan_transactions: u64,
    /// Transactions short of the target when the product pool ran dry.
    pub transaction_shortfall: u64,
    /// Session tally keyed by final conversion status.
    pub conversions: BTreeMap<String, u64>,
    /// Units reserved across all transaction lines.
    pub units_sold: u64,
    pub initial_stock_units: u64,
    pub final_stock_units: u64,
    pub files: Vec<FileReport>,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub throughput_bytes_per_sec: f64,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, reference_date: NaiveDateTime) -> Self {
        Self {
            run_id,
            seed,
            reference_date,
            categories: 0,
            products: 0,
            users: 0,
            sessions: 0,
            session_files: 0,
            transactions: 0,
            session_transactions: 0,
            orphan_transactions: 0,
            transaction_shortfall: 0,
            conversions: BTreeMap::new(),
            units_sold: 0,
            initial_stock_units: 0,
            final_stock_units: 0,
            files: Vec::new(),
            bytes_written: 0,
            duration_ms: 0,
            throughput_bytes_per_sec: 0.0,
            warnings: Vec::new(),
        }
    }

    /// Records a written file, replacing any earlier entry for the same
    /// name. `products.json` is written twice and only the final snapshot
    /// should be listed; total bytes still count both writes.
    pub fn record_file(&mut self, file: &str, stats: FileStats) {
        self.bytes_written += stats.bytes;
        let entry = FileReport {
            file: file.to_string(),
            records: stats.records,
            bytes: stats.bytes,
        };
        match self.files.iter_mut().find(|report| report.file == file) {
            Some(existing) => *existing = entry,
            None => self.files.push(entry),
        }
    }

    pub fn record_conversion(&mut self, status: ConversionStatus) {
        let key = match status {
            ConversionStatus::Converted => "converted",
            ConversionStatus::AbandonedCart => "abandoned_cart",
            ConversionStatus::Browsing => "browsing",
        };
        *self.conversions.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn record_warning(&mut self, code: &str, message: String) {
        self.warnings.push(GenerationIssue {
            level: "warning".to_string(),
            code: code.to_string(),
            message,
        });
    }

    pub fn record_error(&mut self, code: &str, message: String) {
        self.warnings.push(GenerationIssue {
            level: "error".to_string(),
            code: code.to_string(),
            message,
        });
    }
}
