// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! PC transition sinks
//!
//! Every PC the engine reconstructs is published through a [`Sink`]. This is
//! the only output channel of the engine; disassembly dumpers, coverage
//! collectors and the like attach here.

use crate::instruction::Instruction;

/// Consumer of reconstructed PC transitions
pub trait Sink {
    /// Called for every retired instruction, in retirement order
    ///
    /// `new_pc` is the address of the retired instruction and `insn` its
    /// decoded form. `old_pc` is the previously retired address; it is
    /// [`BAD_ADDRESS`][crate::types::BAD_ADDRESS] only on the very first
    /// notification of a session.
    fn advance_pc(&mut self, old_pc: u64, new_pc: u64, insn: &Instruction);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn advance_pc(&mut self, old_pc: u64, new_pc: u64, insn: &Instruction) {
        (**self).advance_pc(old_pc, new_pc, insn)
    }
}

/// [`Sink`] adapter for an [`FnMut`]
///
/// This forwards calls to [`Sink::advance_pc`] to the wrapped [`FnMut`].
#[derive(Copy, Clone, Default, Debug)]
pub struct Func<F: FnMut(u64, u64, &Instruction)> {
    func: F,
}

impl<F: FnMut(u64, u64, &Instruction)> Sink for Func<F> {
    fn advance_pc(&mut self, old_pc: u64, new_pc: u64, insn: &Instruction) {
        (self.func)(old_pc, new_pc, insn)
    }
}

/// Create a [`Sink`] from an [`FnMut`]
pub fn from_fn<F: FnMut(u64, u64, &Instruction)>(func: F) -> Func<F> {
    Func { func }
}

/// A [`Sink`] that discards all notifications
#[derive(Copy, Clone, Default, Debug)]
pub struct Ignore;

impl Sink for Ignore {
    fn advance_pc(&mut self, _: u64, _: u64, _: &Instruction) {}
}
