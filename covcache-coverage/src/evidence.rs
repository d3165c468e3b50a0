use std::collections::BTreeMap;

const SLOT_BASES: [u8; 5] = *b"ACGTN";

///
/// Multiset of the read bases observed at one position.
///
/// Kept apart from the bin's mismatch map so the mismatches can be recomputed
/// against any reference, any number of times.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseTally {
    slots: [u32; 5],
    other: BTreeMap<u8, u32>,
}

#[inline]
fn slot(base: u8) -> Option<usize> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        b'N' => Some(4),
        _ => None,
    }
}

impl BaseTally {
    /// Record one base; lowercase (soft-masked) bases count as their uppercase form.
    #[inline]
    pub fn add(&mut self, base: u8) {
        let base = base.to_ascii_uppercase();
        match slot(base) {
            Some(i) => self.slots[i] += 1,
            None => *self.other.entry(base).or_insert(0) += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.slots.iter().sum::<u32>() + self.other.values().sum::<u32>()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Occurrences of `base` (case-insensitive).
    pub fn get(&self, base: u8) -> u32 {
        let base = base.to_ascii_uppercase();
        match slot(base) {
            Some(i) => self.slots[i],
            None => self.other.get(&base).copied().unwrap_or(0),
        }
    }

    /// Every observed base with its count, zero counts excluded.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        SLOT_BASES
            .iter()
            .copied()
            .zip(self.slots.iter().copied())
            .chain(self.other.iter().map(|(b, c)| (*b, *c)))
            .filter(|(_, count)| *count > 0)
    }

    ///
    /// Count the observed bases that differ from `reference`.
    /// Returns `None` when every base agrees.
    ///
    pub fn mismatches_against(&self, reference: u8) -> Option<BTreeMap<char, u32>> {
        let reference = reference.to_ascii_uppercase();
        let mismatches: BTreeMap<char, u32> = self
            .iter()
            .filter(|(base, _)| *base != reference)
            .map(|(base, count)| (base as char, count))
            .collect();

        match mismatches.is_empty() {
            true => None,
            false => Some(mismatches),
        }
    }
}
