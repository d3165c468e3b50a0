//! Reference sequence providers.
//!
//! A provider answers "which bases lie under this range", one uppercase
//! character per position, in order. The cache never asks for anything else.

use std::future::{self, Future};
use std::io::BufRead;
use std::path::Path;

use anyhow::Result;
use fxhash::FxHashMap;
use log::info;

use covcache_core::models::ContigInterval;
use covcache_core::utils::{get_dynamic_reader, normalize_contig_name};

use crate::errors::ReferenceError;

pub trait ReferenceSource {
    fn get_range_as_string(&self, range: &ContigInterval) -> Result<String, ReferenceError>;
}

impl<F> ReferenceSource for F
where
    F: Fn(&ContigInterval) -> Result<String, ReferenceError>,
{
    fn get_range_as_string(&self, range: &ContigInterval) -> Result<String, ReferenceError> {
        self(range)
    }
}

/// A provider that may have to wait for its bases (network, remote store, ...).
pub trait AsyncReferenceSource: Send + Sync {
    fn fetch_range(
        &self,
        range: ContigInterval,
    ) -> impl Future<Output = Result<String, ReferenceError>> + Send;
}

///
/// Whole contig sequences held in memory, keyed by normalized contig name.
///
/// Positions index the stored sequence directly: position `p` is the
/// `p`-th base (0-based) of the contig.
///
#[derive(Debug, Default, Clone)]
pub struct InMemoryReference {
    sequences: FxHashMap<String, Vec<u8>>,
}

impl InMemoryReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, contig: &str, sequence: impl AsRef<[u8]>) {
        self.sequences.insert(
            normalize_contig_name(contig).to_string(),
            sequence.as_ref().to_ascii_uppercase(),
        );
    }

    pub fn contig_length(&self, contig: &str) -> Option<usize> {
        self.sequences
            .get(normalize_contig_name(contig))
            .map(|s| s.len())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    ///
    /// Load every record of a FASTA file (plain or gzip'd).
    ///
    /// # Arguments
    ///
    /// - path: path to the FASTA file
    ///
    /// The record name is the header up to the first whitespace.
    ///
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading reference FASTA: {}", path.as_ref().display());

        let reader = get_dynamic_reader(path.as_ref())?;
        let mut reference = InMemoryReference::new();

        let mut current: Option<(String, Vec<u8>)> = None;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end();

            if let Some(header) = line.strip_prefix('>') {
                if let Some((name, sequence)) = current.take() {
                    reference.insert(&name, sequence);
                }
                let name = header.split_whitespace().next().unwrap_or_default();
                current = Some((name.to_string(), Vec::new()));
            } else if let Some((_, sequence)) = current.as_mut() {
                sequence.extend_from_slice(line.as_bytes());
            }
        }
        if let Some((name, sequence)) = current.take() {
            reference.insert(&name, sequence);
        }

        info!("Loaded {} reference sequences", reference.len());
        Ok(reference)
    }
}

impl ReferenceSource for InMemoryReference {
    fn get_range_as_string(&self, range: &ContigInterval) -> Result<String, ReferenceError> {
        let sequence = self
            .sequences
            .get(range.normalized_contig())
            .ok_or_else(|| ReferenceError::UnknownContig(range.contig().to_string()))?;

        let start = range.start() as usize;
        let stop = range.stop() as usize;
        if stop >= sequence.len() {
            return Err(ReferenceError::OutOfBounds {
                range: range.clone(),
                length: sequence.len(),
            });
        }

        String::from_utf8(sequence[start..=stop].to_vec())
            .map_err(|e| ReferenceError::FetchFailed(e.to_string()))
    }
}

impl AsyncReferenceSource for InMemoryReference {
    fn fetch_range(
        &self,
        range: ContigInterval,
    ) -> impl Future<Output = Result<String, ReferenceError>> + Send {
        future::ready(self.get_range_as_string(&range))
    }
}
