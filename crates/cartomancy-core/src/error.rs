use thiserror::Error;

/// Errors raised while checking record invariants.
#[derive(Debug, Error)]
pub enum Error {
    /// A record violates one of its own invariants.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A record points at an entity that does not exist.
    #[error("broken reference: {0}")]
    BrokenReference(String),
}

pub type Result<T> = std::result::Result<T, Error>;
