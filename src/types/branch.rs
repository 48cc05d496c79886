// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Branch map utilities

/// A record of conditional branch outcomes
///
/// The map mirrors the wire encoding of the `branch_map` packet field: the
/// lowest-valued bit belongs to the oldest branch, a set bit records a branch
/// that was not taken and a cleared bit one that was taken. This inverted
/// convention is kept for wire compatibility and is confined to this type and
/// the replay engine's internal map.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct Map {
    count: u8,
    bits: u64,
}

impl Map {
    /// Number of branches communicated by a `branches` field of `0`
    ///
    /// An encoder reports a full map of this many branches with a count of
    /// zero. The rule applies to format 1 payloads only.
    pub const FULL: u8 = 31;

    /// Create a new branch map from a raw count and raw bits
    pub const fn new(count: u8, bits: u64) -> Self {
        Self { count, bits }
    }

    /// Record another branch outcome, newer than all existing ones
    pub fn push_taken(&mut self, taken: bool) {
        let bit = 1u64.checked_shl(self.count.into()).unwrap_or_default();
        self.bits = if taken {
            self.bits & !bit
        } else {
            self.bits | bit
        };
        self.count = self.count.saturating_add(1);
    }

    /// Retrieve the number of branches in the map
    pub const fn count(&self) -> u8 {
        self.count
    }

    /// Retrieve the raw contents of the map
    ///
    /// A set bit records a branch not taken, a cleared bit a branch taken.
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    /// Check whether the map records no branches
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_records_inverted_bits() {
        let mut map = Map::default();
        map.push_taken(true);
        map.push_taken(false);
        map.push_taken(true);
        assert_eq!(map.count(), 3);
        assert_eq!(map.bits(), 0b010);
    }

    #[test]
    fn new_is_raw() {
        let map = Map::new(0, 0b101);
        assert!(map.is_empty());
        assert_eq!(map.bits(), 0b101);
    }
}
