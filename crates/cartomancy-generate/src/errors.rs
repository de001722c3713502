use thiserror::Error;

use crate::model::GenerationReport;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid dataset: {0}")]
    Dataset(#[from] cartomancy_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("generation failed")]
    Failed(GenerationReport),
}
