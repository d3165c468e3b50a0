//! # covcache-coverage
//!
//! Incremental depth and mismatch aggregation for genome browser tracks.
//!
//! ## Purpose
//!
//! Reads and features arrive one at a time from some data source. For every
//! reference position they touch, the cache keeps a depth count; for reads it
//! also keeps the bases observed there, so that once a reference sequence is
//! available (often later, often asynchronously) the positions can be
//! annotated with the reference base and the disagreeing read bases. The
//! annotation can be redone against another reference at any time without
//! re-adding reads.
//!
//! Coordinates are sparse: only touched positions are stored, so contigs of
//! hundreds of megabases cost nothing until reads land on them.
//!
//! ## Main Components
//!
//! - **`CoverageCache`**: single-owner cache, the usual choice for a renderer.
//! - **`SharedCoverageCache`**: the same operations behind per-contig locks,
//!   plus an async mismatch update.
//! - **`Bin`**: per-position depth, reference base and mismatch counts.
//! - **`ReferenceSource` / `AsyncReferenceSource`**: where reference bases come
//!   from; `InMemoryReference` serves them from a FASTA file.
//!
//! ## Example
//!
//! ```rust
//! use covcache_core::models::Feature;
//! use covcache_coverage::CoverageCache;
//!
//! let mut cache = CoverageCache::new();
//! for (id, region) in [("a", "chr1:100-200"), ("b", "chr1:150-300")] {
//!     cache.add_feature(&Feature::new(id, "peak", region.parse().unwrap(), 1.0));
//! }
//!
//! assert_eq!(cache.max_coverage_for_ref("chr1"), 2);
//! assert_eq!(cache.bins_for_ref("chr1")[&120].count, 1);
//! assert_eq!(cache.bins_for_ref("chr1")[&180].count, 2);
//! ```
//!
pub mod bins;
pub mod cache;
pub mod config;
pub mod errors;
pub mod evidence;
pub mod mismatch;
pub mod reference;
pub mod shared;

mod contig;

// re-export things
pub use bins::{Bin, BinMap};
pub use cache::CoverageCache;
pub use config::{CoverageConfig, CoverageConfigError};
pub use errors::*;
pub use evidence::BaseTally;
pub use mismatch::{MismatchRequest, MismatchUpdate};
pub use reference::{AsyncReferenceSource, InMemoryReference, ReferenceSource};
pub use shared::SharedCoverageCache;
