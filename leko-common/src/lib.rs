//! Common types shared across Leko crates.
//!
//! This crate defines the shared error type and the centralised tracing
//! setup. It is intentionally lightweight so that every crate can depend on
//! it without pulling in heavy transitive costs.

pub mod observability;

/// Error types used across the Leko service.
///
/// Provider failures deliberately have no variant: the answer pipeline
/// absorbs them before they can cross crate boundaries.
#[derive(thiserror::Error, Debug)]
pub enum LekoError {
    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything unexpected from lower layers.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`LekoError`].
pub type Result<T> = std::result::Result<T, LekoError>;
