use fxhash::FxHashMap;
use log::{trace, warn};

use covcache_core::models::{Alignment, ContigInterval, Feature};

use crate::bins::BinMap;
use crate::evidence::BaseTally;

///
/// Everything the cache knows about one contig: depth bins, the read bases
/// behind them and the running maximum depth.
///
#[derive(Debug, Default)]
pub(crate) struct ContigCoverage {
    bins: BinMap,
    evidence: FxHashMap<u32, BaseTally>,
    max_count: u32,
    last_applied_request: Option<u64>,
}

impl ContigCoverage {
    pub fn bins(&self) -> &BinMap {
        &self.bins
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn evidence_at(&self, position: u32) -> Option<&BaseTally> {
        self.evidence.get(&position)
    }

    #[inline]
    fn increment(&mut self, position: u32) {
        let bin = self.bins.entry(position).or_default();
        bin.count += 1;
        if bin.count > self.max_count {
            self.max_count = bin.count;
        }
    }

    pub fn add_feature(&mut self, feature: &Feature) {
        trace!("adding feature {} at {}", feature.id, feature.position);
        for position in feature.position.positions() {
            self.increment(position);
        }
    }

    ///
    /// Walk the CIGAR left to right with a reference and a query cursor.
    ///
    /// Only operations consuming both reference and query add depth (and,
    /// when `keep_bases` is set and the read has bases, evidence). Bytes
    /// outside ASCII still add depth but are never kept as evidence. An
    /// operation running past the interval or the sequence, or one with an
    /// unknown kind, just moves the cursors.
    ///
    pub fn add_alignment(&mut self, alignment: &Alignment, keep_bases: bool) {
        let interval = alignment.interval();
        let sequence = alignment.sequence().as_bytes();
        let has_bases = !sequence.is_empty();
        let stop = interval.stop() as u64;

        trace!("adding alignment {} at {}", alignment.name(), interval);

        let mut ref_cursor = interval.start() as u64;
        let mut query_cursor: usize = 0;

        for op in alignment.cigar_ops() {
            let length = op.length as u64;

            if op.kind.is_unknown() {
                warn!(
                    "alignment {}: unknown CIGAR operation {}, skipping",
                    alignment.name(),
                    op
                );
                ref_cursor += length;
                query_cursor += op.length as usize;
                continue;
            }

            match (op.kind.consumes_reference(), op.kind.consumes_query()) {
                (true, true) => {
                    let ref_overrun = length > 0 && ref_cursor + length - 1 > stop;
                    let query_overrun =
                        has_bases && query_cursor + op.length as usize > sequence.len();

                    if ref_overrun || query_overrun {
                        warn!(
                            "alignment {}: CIGAR operation {} overruns {} or its {} bases, skipping",
                            alignment.name(),
                            op,
                            interval,
                            sequence.len()
                        );
                    } else {
                        for offset in 0..op.length {
                            let position = (ref_cursor + offset as u64) as u32;
                            self.increment(position);
                            if keep_bases && has_bases {
                                let base = sequence[query_cursor + offset as usize];
                                if !base.is_ascii() {
                                    warn!(
                                        "alignment {}: non-ASCII base {:#04x} at {}, not kept",
                                        alignment.name(),
                                        base,
                                        position
                                    );
                                    continue;
                                }
                                self.evidence.entry(position).or_default().add(base);
                            }
                        }
                    }
                    ref_cursor += length;
                    query_cursor += op.length as usize;
                }
                (true, false) => ref_cursor += length,
                (false, true) => query_cursor += op.length as usize,
                (false, false) => {}
            }
        }
    }

    ///
    /// Recompute `ref_base`/`mismatches` for every position of `range` holding
    /// evidence. `reference` holds one uppercase base per position of `range`.
    ///
    /// Returns the number of annotated positions and whether a later request
    /// had already been applied to this contig.
    ///
    pub fn apply_reference(
        &mut self,
        range: &ContigInterval,
        reference: &[u8],
        request_id: u64,
    ) -> (usize, bool) {
        let superseded = self
            .last_applied_request
            .is_some_and(|last| last > request_id);
        self.last_applied_request = Some(
            self.last_applied_request
                .map_or(request_id, |last| last.max(request_id)),
        );

        let start = range.start();
        let Self { bins, evidence, .. } = self;

        let mut annotate = |position: u32, tally: &BaseTally| -> bool {
            let Some(bin) = bins.get_mut(&position) else {
                return false;
            };
            let ref_base = reference[(position - start) as usize];
            bin.ref_base = Some(ref_base as char);
            bin.mismatches = tally.mismatches_against(ref_base);
            true
        };

        // walk whichever side is smaller: the range or the evidence
        let annotated = if range.length() <= evidence.len() as u64 {
            range
                .positions()
                .filter_map(|p| evidence.get(&p).map(|tally| (p, tally)))
                .filter(|(p, tally)| annotate(*p, tally))
                .count()
        } else {
            evidence
                .iter()
                .filter(|(p, _)| range.start() <= **p && **p <= range.stop())
                .filter(|(p, tally)| annotate(**p, tally))
                .count()
        };

        (annotated, superseded)
    }

    ///
    /// Forget the bases of positions outside `window`. Depth bins and any
    /// existing annotations stay as they are; those positions simply stop
    /// being refreshed by later mismatch updates.
    ///
    pub fn prune_evidence_outside(&mut self, window: &ContigInterval) -> usize {
        let before = self.evidence.len();
        self.evidence
            .retain(|p, _| window.start() <= *p && *p <= window.stop());
        before - self.evidence.len()
    }
}
