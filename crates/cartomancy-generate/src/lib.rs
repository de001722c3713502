//! Behavioral e-commerce dataset generator for Cartomancy.
//!
//! This crate simulates browsing sessions against a shared inventory to
//! produce deterministic, referentially consistent JSON dataset files:
//! reference entities, chunked session logs and a transaction stream whose
//! every unit sold is backed by stock that existed.

pub mod behavior;
pub mod checkout;
pub mod engine;
pub mod errors;
pub mod factories;
pub mod inventory;
pub mod model;
pub mod output;
pub mod sampling;

pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use inventory::InventoryLedger;
pub use model::{FileReport, GenerateOptions, GenerationReport};
