//! # covcache-core
//!
//! Shared models for the covcache workspace.
//!
//! ## Main Components
//!
//! - **`ContigInterval`**: an immutable, closed span on a named contig. Used to key and bound
//!   every query against a coverage cache.
//! - **`Alignment`**: an aligned read with a strand, CIGAR operations and its bases.
//! - **`Feature`**: an annotation with an interval and a score but no base-level data.
//! - **`CoverageItem`**: the sum of the two item kinds a coverage cache consumes.
//!
//! ## Example
//!
//! ```rust
//! use covcache_core::models::{Alignment, ContigInterval, CoverageItem, Strand, parse_cigar};
//!
//! let interval: ContigInterval = "chr1:100-104".parse().unwrap();
//! let read = Alignment::new(
//!     "read1",
//!     interval,
//!     Strand::Forward,
//!     parse_cigar("3M2S").unwrap(),
//!     "ACGTT",
//! );
//! assert_eq!(read.is_consistent(), false);
//!
//! let item = CoverageItem::from(read);
//! assert_eq!(item.contig(), "chr1");
//! ```
//!
pub mod errors;
pub mod models;
pub mod utils;

pub use errors::*;
