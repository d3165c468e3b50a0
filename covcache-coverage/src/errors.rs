use thiserror::Error;

use covcache_core::models::ContigInterval;

use crate::config::CoverageConfigError;

/// Failures of a reference sequence provider.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Unknown contig: {0}")]
    UnknownContig(String),

    #[error("Range {range} lies outside a contig of length {length}")]
    OutOfBounds { range: ContigInterval, length: usize },

    #[error("Reference fetch failed: {0}")]
    FetchFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Reference unavailable for {range}: {source}")]
    ReferenceUnavailable {
        range: ContigInterval,
        #[source]
        source: ReferenceError,
    },

    #[error("Reference for {range} has {found} bases, expected {expected}")]
    ReferenceLengthMismatch {
        range: ContigInterval,
        expected: u64,
        found: usize,
    },

    #[error(transparent)]
    Config(#[from] CoverageConfigError),
}

pub type CoverageResult<T> = std::result::Result<T, CoverageError>;
