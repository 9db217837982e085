//! Error type for the fallible surfaces: configuration and data loading.
//!
//! Component operations never fail; environmental faults degrade locally
//! and are only logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FolioError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("visibility threshold must be within 0.0..=1.0, got {0}")]
    InvalidThreshold(f32),
    #[error("invalid root margin {input:?}: {reason}")]
    InvalidRootMargin { input: String, reason: &'static str },
    #[error("reveal delay rank must be within 1..=4, got {0}")]
    InvalidDelay(u8),
    #[error("{name} period must be greater than zero")]
    InvalidPeriod { name: &'static str },
}

pub type Result<T> = std::result::Result<T, FolioError>;
