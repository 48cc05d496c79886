// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Common types used across the crate

pub mod branch;

/// Sentinel for an address that is not (yet) known
///
/// The reconstruction state uses this value for the PC and related addresses
/// before the first synchronization packet was processed. It is never a valid
/// instruction address.
pub const BAD_ADDRESS: u64 = u64::MAX;

/// RISC-V privilege levels
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Privilege {
    #[default]
    User,
    Supervisor,
    Machine,
}

impl TryFrom<u8> for Privilege {
    type Error = u8;

    fn try_from(num: u8) -> Result<Self, Self::Error> {
        match num {
            0b00 => Ok(Self::User),
            0b01 => Ok(Self::Supervisor),
            0b11 => Ok(Self::Machine),
            err => Err(err),
        }
    }
}
