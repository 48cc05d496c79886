// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Direct-mapped caches backing the replay engine
//!
//! Both caches are plain arrays indexed by a stable hash of an address;
//! colliding entries simply overwrite each other. Neither cache affects
//! correctness of the reconstruction: the decode cache is a performance
//! optimization, and jump target cache entries are only ever read at indices
//! the encoder guarantees were written before.

use crate::config;
use crate::instruction::Instruction;
use crate::types::BAD_ADDRESS;

/// Number of slots of the instruction decode cache
pub const DECODE_CACHE_SIZE: usize = 1 << 9;

/// Maximum number of entries of the jump target cache
pub const JUMP_CACHE_SIZE: usize = 1usize << config::JUMP_CACHE_INDEX_WIDTH;

/// Cache of decoded [`Instruction`]s
#[derive(Clone)]
pub(crate) struct DecodeCache {
    slots: [(u64, Instruction); DECODE_CACHE_SIZE],
}

impl DecodeCache {
    pub fn new() -> Self {
        Self {
            slots: [(BAD_ADDRESS, Instruction::default()); DECODE_CACHE_SIZE],
        }
    }

    /// Look up the [`Instruction`] at the given address
    pub fn get(&self, address: u64) -> Option<Instruction> {
        let (pc, insn) = self.slots[Self::slot(address)];
        (pc == address).then_some(insn)
    }

    /// Store the [`Instruction`] at the given address
    pub fn put(&mut self, address: u64, insn: Instruction) {
        self.slots[Self::slot(address)] = (address, insn);
    }

    fn slot(address: u64) -> usize {
        // instruction addresses are always even
        (address >> 1) as usize & (DECODE_CACHE_SIZE - 1)
    }
}

/// Cache of recent uninferable jump targets
///
/// Written whenever an address-bearing packet resolves an uninferable jump
/// while the `jump_target_cache` option is active; read when a packet
/// references a target by index. Entries are never invalidated.
#[derive(Clone)]
pub(crate) struct JumpTargetCache {
    targets: [u64; JUMP_CACHE_SIZE],
    mask: u64,
}

impl JumpTargetCache {
    /// Create a new jump target cache with `2^index_width` entries
    ///
    /// Returns `None` if the requested width exceeds what this build
    /// supports.
    pub fn new(index_width: u8) -> Option<Self> {
        (1..=config::JUMP_CACHE_INDEX_WIDTH)
            .contains(&index_width)
            .then(|| Self {
                targets: [BAD_ADDRESS; JUMP_CACHE_SIZE],
                mask: (1 << index_width) - 1,
            })
    }

    /// Compute the slot an address maps to
    pub fn slot(&self, address: u64, iaddress_lsb: u8) -> usize {
        ((address >> iaddress_lsb) & self.mask) as usize
    }

    /// Record a jump target in its slot
    pub fn insert(&mut self, slot: usize, target: u64) {
        self.targets[slot] = target;
    }

    /// Retrieve the jump target stored at the given index
    pub fn get(&self, index: usize) -> u64 {
        self.targets[index & self.mask as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Bits, Size};

    #[test]
    fn decode_cache_roundtrip() {
        let mut cache = DecodeCache::new();
        assert_eq!(cache.get(0x8000_0000), None);
        let insn = Instruction::from(Bits::Bit16(0x8082));
        cache.put(0x8000_0000, insn);
        assert_eq!(cache.get(0x8000_0000), Some(insn));
        assert_eq!(cache.get(0x8000_0002), None);
    }

    #[test]
    fn decode_cache_collision_overwrites() {
        let mut cache = DecodeCache::new();
        let insn = Instruction::from(Bits::Bit32(0x00000013));
        let colliding = 0x8000_0000 + ((DECODE_CACHE_SIZE as u64) << 1);
        cache.put(0x8000_0000, insn);
        cache.put(colliding, insn);
        assert_eq!(cache.get(0x8000_0000), None);
        assert_eq!(cache.get(colliding).map(|i| i.size), Some(Size::Normal));
    }

    #[test]
    fn jump_cache_slots() {
        let mut cache = JumpTargetCache::new(5).expect("could not create cache");
        let slot = cache.slot(0xdead00, 1);
        assert!(slot < 32);
        cache.insert(slot, 0xdead00);
        assert_eq!(cache.get(slot), 0xdead00);
    }

    #[test]
    fn jump_cache_width_bound() {
        assert!(JumpTargetCache::new(config::JUMP_CACHE_INDEX_WIDTH).is_some());
        assert!(JumpTargetCache::new(config::JUMP_CACHE_INDEX_WIDTH + 1).is_none());
    }
}
