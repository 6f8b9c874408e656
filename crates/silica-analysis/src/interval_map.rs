use smallvec::SmallVec;

use crate::driver::{DriverBitRange, ValueDriver};

#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    range: DriverBitRange,
    driver: &'a ValueDriver<'a>,
}

/// Ordered interval container for one symbol's drivers.
///
/// Entries are kept sorted by interval start; insertions at an equal
/// start land after existing entries, so overlap iteration observes
/// insertion order among equal intervals. Entries are never deleted.
///
/// Not thread-safe on its own; exclusive access comes from the
/// per-entry visitor of the concurrent map one level up.
#[derive(Debug, Default)]
pub struct DriverIntervalMap<'a> {
    entries: SmallVec<[Entry<'a>; 2]>,
}

impl<'a> DriverIntervalMap<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, range: DriverBitRange, driver: &'a ValueDriver<'a>) {
        debug_assert!(range.0 <= range.1);
        let idx = self.entries.partition_point(|e| e.range.0 <= range.0);
        self.entries.insert(idx, Entry { range, driver });
    }

    /// All stored entries whose closed interval overlaps `range`, in
    /// storage order.
    pub fn overlapping(
        &self,
        range: DriverBitRange,
    ) -> impl Iterator<Item = (DriverBitRange, &'a ValueDriver<'a>)> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.range.0 <= range.1 && e.range.1 >= range.0)
            .map(|e| (e.range, e.driver))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DriverBitRange, &'a ValueDriver<'a>)> + '_ {
        self.entries.iter().map(|e| (e.range, e.driver))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
