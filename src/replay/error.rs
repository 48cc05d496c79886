// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

use crate::instruction::Instruction;

/// Replay specific errors
///
/// With the exception of [`UnsupportedTableSize`][Self::UnsupportedTableSize],
/// every error reported by the engine signals a contradiction between the
/// packet stream and the replayed program. There is no recovery: the
/// reconstruction is out of sync and the [`Decoder`][super::Decoder] must not
/// be fed further packets.
///
/// Errors identify the offending instruction where one exists, so a
/// diagnostic can name the address and its disassembly.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// A trace must begin with a synchronization packet
    StartOfTrace,
    /// A branch was encountered but the branch map is depleted
    UnresolvableBranch { pc: u64, insn: Instruction },
    /// The follower must stop at the final branch but none are pending
    DepletedBranchMap,
    /// Branches were left unresolved when the follower reached its stop
    UnprocessedBranches { pc: u64, count: u32 },
    /// An uninferable discontinuity appeared before all pending branches
    /// were resolved
    UnexpectedDiscontinuity { pc: u64, insn: Instruction },
    /// An instruction could not be fetched from the oracle
    CannotFetchInstruction { address: u64, source: E },
    /// A configured table dimension exceeds what this build supports
    UnsupportedTableSize {
        what: &'static str,
        requested: usize,
        supported: usize,
    },
}

impl<E> core::error::Error for Error<E>
where
    E: fmt::Debug + core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::CannotFetchInstruction { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl<E> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartOfTrace => write!(f, "expected a format 3 packet to start the trace"),
            Self::UnresolvableBranch { pc, insn } => write!(
                f,
                "cannot resolve branch (branch map depleted) at {pc:#x}: {insn}"
            ),
            Self::DepletedBranchMap => {
                write!(f, "no branches left to stop at before the final branch")
            }
            Self::UnprocessedBranches { pc, count } => {
                write!(f, "{count} unprocessed branches at {pc:#x}")
            }
            Self::UnexpectedDiscontinuity { pc, insn } => write!(
                f,
                "unexpected uninferable discontinuity at {pc:#x}: {insn}"
            ),
            Self::CannotFetchInstruction { address, .. } => {
                write!(f, "cannot fetch the instruction at {address:#x}")
            }
            Self::UnsupportedTableSize {
                what,
                requested,
                supported,
            } => write!(
                f,
                "requested {what} of {requested} entries, this build supports {supported}"
            ),
        }
    }
}
