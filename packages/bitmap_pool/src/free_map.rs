use std::num::NonZero;

use bitvec::vec::BitVec;

/// Marker rendered for a slot that is handed out.
const USED_MARKER: char = '*';

/// Marker rendered for a slot that is available.
const FREE_MARKER: char = '_';

/// One flag per slot of a pool, set when the slot is free.
///
/// All run searches operate on contiguous ranges of slot indexes. The map knows nothing about
/// the storage the slots refer to.
#[derive(Debug)]
pub(crate) struct FreeMap {
    // Slot index to "is free" status.
    is_free: BitVec,
}

impl FreeMap {
    /// Creates a map with every slot free.
    #[must_use]
    pub(crate) fn new(capacity: NonZero<usize>) -> Self {
        Self {
            is_free: BitVec::repeat(true, capacity.get()),
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.is_free.len()
    }

    #[must_use]
    pub(crate) fn free_count(&self) -> usize {
        self.is_free.count_ones()
    }

    /// Index of the lowest slot of the lowest-index free run that is at least `count` slots long.
    ///
    /// `count` must be non-zero.
    #[must_use]
    pub(crate) fn find_first_fit(&self, count: usize) -> Option<usize> {
        debug_assert_ne!(count, 0);

        let mut candidate = self.is_free.first_one();

        while let Some(start) = candidate {
            // Cannot wrap because `start` is a valid index into the map.
            let remaining = self.len().wrapping_sub(start);

            if remaining < count {
                // No run starting here or later can be long enough.
                return None;
            }

            // Cannot overflow because `remaining >= count`, so the end is within the map.
            let end = start.wrapping_add(count);

            let run_length = self
                .is_free
                .get(start..end)
                .expect("guarded by remaining-length check above")
                .leading_ones();

            if run_length >= count {
                return Some(start);
            }

            // Every free slot inside the short run starts an even shorter run, so the next
            // candidate is the first free slot after the used slot that ended this run.
            // Cannot overflow because the run ended before `end`.
            let resume_from = start.wrapping_add(run_length);

            candidate = self
                .is_free
                .get(resume_from..)
                .and_then(|rest| rest.first_one())
                .map(|offset| resume_from.wrapping_add(offset));
        }

        None
    }

    /// Index of the lowest slot to take from the free run anchored at the highest index, if that
    /// run alone is at least `count` slots long.
    ///
    /// `count` must be non-zero.
    #[must_use]
    pub(crate) fn find_last_fit(&self, count: usize) -> Option<usize> {
        debug_assert_ne!(count, 0);

        let top_run_length = self.is_free.trailing_ones();

        // Cannot wrap because a run is never longer than the map.
        (top_run_length >= count).then(|| self.len().wrapping_sub(top_run_length))
    }

    /// Marks `count` slots starting at `start` as used. The range must lie within the map.
    pub(crate) fn mark_used(&mut self, start: usize, count: usize) {
        let end = start
            .checked_add(count)
            .expect("slot range end cannot overflow for a range inside the map");

        self.is_free
            .get_mut(start..end)
            .expect("callers only mark ranges returned by a placement search")
            .fill(false);
    }

    /// Marks up to `count` slots starting at `start` as free. The part of the range that extends
    /// past the end of the map is ignored.
    pub(crate) fn mark_free(&mut self, start: usize, count: usize) {
        let end = start.saturating_add(count).min(self.len());

        if let Some(range) = self.is_free.get_mut(start..end) {
            range.fill(true);
        }
    }

    /// Marks every slot as used.
    pub(crate) fn mark_all_used(&mut self) {
        self.is_free.fill(false);
    }

    /// One marker per slot, highest index first, so slot 0 is the rightmost character.
    #[must_use]
    pub(crate) fn render(&self) -> String {
        self.is_free
            .iter()
            .by_vals()
            .rev()
            .map(|is_free| if is_free { FREE_MARKER } else { USED_MARKER })
            .collect()
    }
}
