use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum IntervalError {
    #[error("Invalid interval {contig}:{start}-{stop}: start must not exceed stop")]
    InvalidInterval { contig: String, start: u32, stop: u32 },

    #[error("Error parsing region: {0}")]
    RegionParseError(String),

    #[error("Error parsing CIGAR string: {0}")]
    CigarParseError(String),

    #[error("Invalid strand: {0}")]
    StrandParseError(String),
}

pub type IntervalResult<T> = std::result::Result<T, IntervalError>;
