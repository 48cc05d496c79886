// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Instruction oracles
//!
//! The replay engine does not manage the traced program's memory. Instead it
//! relies on an oracle implementing the [`Fetch`] trait, which produces the
//! raw [`Bits`] of the instruction at a given address. Disassembly and
//! caching of fetched instructions happen inside the engine.
//!
//! An oracle must be stable: the engine assumes the traced program's code is
//! immutable for the duration of the trace, and it will fetch the same
//! address any number of times.
//!
//! This module provides oracles over plain byte slices ([`from_bytes`]),
//! sorted address maps ([`from_sorted_map`]) and arbitrary fns
//! ([`from_fn`]), as well as the [`Empty`] oracle. With the `elf` feature
//! enabled, the [`elf`] module provides an oracle backed by an ELF image.

#[cfg(feature = "elf")]
pub mod elf;

use core::fmt;

use crate::instruction::Bits;

/// A source of raw instruction bits
pub trait Fetch {
    /// Error type returned by [`fetch`][Self::fetch]
    type Error;

    /// Retrieve the raw instruction [`Bits`] at the given address
    fn fetch(&mut self, address: u64) -> Result<Bits, Self::Error>;
}

/// Error of oracles that know of no instruction at the requested address
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NoInstruction;

impl core::error::Error for NoInstruction {}

impl fmt::Display for NoInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no instruction at the requested address")
    }
}

/// [`Fetch`] adapter for an [`FnMut`]
///
/// This forwards calls to [`Fetch::fetch`] to the wrapped [`FnMut`].
#[derive(Copy, Clone, Default, Debug)]
pub struct Func<F: FnMut(u64) -> Result<Bits, E>, E> {
    func: F,
    phantom: core::marker::PhantomData<E>,
}

impl<F: FnMut(u64) -> Result<Bits, E>, E> Fetch for Func<F, E> {
    type Error = E;

    fn fetch(&mut self, address: u64) -> Result<Bits, Self::Error> {
        (self.func)(address)
    }
}

/// Create a [`Fetch`] oracle from an [`FnMut`]
pub fn from_fn<F: FnMut(u64) -> Result<Bits, E>, E>(func: F) -> Func<F, E> {
    Func {
        func,
        phantom: Default::default(),
    }
}

/// [`Fetch`] oracle over a contiguous region of encoded instructions
///
/// Created via [`from_bytes`].
#[derive(Copy, Clone, Debug)]
pub struct Memory<'a> {
    base: u64,
    data: &'a [u8],
}

impl Fetch for Memory<'_> {
    type Error = NoInstruction;

    fn fetch(&mut self, address: u64) -> Result<Bits, Self::Error> {
        address
            .checked_sub(self.base)
            .and_then(|offset| self.data.split_at_checked(offset.try_into().ok()?))
            .and_then(|(_, data)| Bits::extract(data))
            .map(|(bits, _)| bits)
            .ok_or(NoInstruction)
    }
}

/// Create a [`Fetch`] oracle over raw instruction memory
///
/// The first instruction of `data` is assumed to reside at address `base`.
pub fn from_bytes(base: u64, data: &[u8]) -> Memory<'_> {
    Memory { base, data }
}

/// [`Fetch`] oracle over a slice of (address, bits) pairs
///
/// Created via [`from_sorted_map`].
#[derive(Copy, Clone, Debug)]
pub struct SortedMap<'a> {
    entries: &'a [(u64, Bits)],
}

impl Fetch for SortedMap<'_> {
    type Error = NoInstruction;

    fn fetch(&mut self, address: u64) -> Result<Bits, Self::Error> {
        self.entries
            .binary_search_by_key(&address, |(a, _)| *a)
            .map(|i| self.entries[i].1)
            .map_err(|_| NoInstruction)
    }
}

/// Create a [`Fetch`] oracle from a slice of (address, bits) pairs
///
/// The entries must be sorted by address.
pub fn from_sorted_map(entries: &[(u64, Bits)]) -> SortedMap<'_> {
    SortedMap { entries }
}

/// A [`Fetch`] oracle that does not contain any instructions
#[derive(Copy, Clone, Default, Debug)]
pub struct Empty;

impl Fetch for Empty {
    type Error = NoInstruction;

    fn fetch(&mut self, _: u64) -> Result<Bits, Self::Error> {
        Err(NoInstruction)
    }
}
