use log::warn;

use covcache_core::models::ContigInterval;

use crate::errors::{CoverageError, CoverageResult, ReferenceError};

///
/// A pending mismatch update: the range it was issued for and a ticket number.
///
/// Ticket numbers grow monotonically per cache. Responses may be applied in
/// any order; a response older than one already applied is still applied
/// (last writer wins) and reported as superseded.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchRequest {
    pub(crate) id: u64,
    pub(crate) range: ContigInterval,
}

impl MismatchRequest {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn range(&self) -> &ContigInterval {
        &self.range
    }
}

/// Outcome of applying one mismatch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchUpdate {
    pub request_id: u64,
    pub range: ContigInterval,
    /// Positions that received a reference base.
    pub positions_annotated: usize,
    /// A request issued later on the same contig had already been applied.
    pub superseded: bool,
}

impl MismatchUpdate {
    pub(crate) fn untouched(request: &MismatchRequest) -> Self {
        MismatchUpdate {
            request_id: request.id,
            range: request.range.clone(),
            positions_annotated: 0,
            superseded: false,
        }
    }
}

///
/// Check a provider's answer for `request` and turn it into one uppercase base
/// per position of the range.
///
pub(crate) fn resolve_reference(
    request: &MismatchRequest,
    reference: Result<String, ReferenceError>,
) -> CoverageResult<Vec<u8>> {
    let range = &request.range;
    let reference = reference.map_err(|source| {
        warn!("reference unavailable for {} (request {}): {}", range, request.id, source);
        CoverageError::ReferenceUnavailable {
            range: range.clone(),
            source,
        }
    })?;

    if reference.len() as u64 != range.length() {
        warn!(
            "reference for {} has {} bases, expected {}",
            range,
            reference.len(),
            range.length()
        );
        return Err(CoverageError::ReferenceLengthMismatch {
            range: range.clone(),
            expected: range.length(),
            found: reference.len(),
        });
    }

    Ok(reference.into_bytes().to_ascii_uppercase())
}
