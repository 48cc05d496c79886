// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Structured `te_inst` payloads
//!
//! This module models the packet payloads the replay engine consumes.
//! De-serialization from wire bits is not a concern of this crate: a wire
//! decoder (or a test fixture) produces these structures and hands them to
//! [`Decoder::process_packet`][crate::replay::Decoder::process_packet] in
//! encoder emission order.
//!
//! Two wire conventions survive into this model and are worth calling out:
//! * branch maps record *not taken* as a set bit (see
//!   [`branch::Map`][crate::types::branch::Map]),
//! * address fields are transmitted without their lowest bits and are
//!   expanded by the engine (shifted left by the configured `iaddress_lsb`).
//!
//! The `updiscon` flag is a plain boolean here: the wire encodes it as an
//! XOR against the address MSB, which a de-serializer has already undone.

use core::fmt;

use crate::config::Options;
use crate::types::{branch, Privilege};

/// Payload of a single `te_inst` packet
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Payload {
    /// Format 0: optional efficiency extensions
    Extension(Extension),
    /// Format 1: branch information, optionally with an address
    Branch(Branch),
    /// Format 2: address only
    Address(AddressInfo),
    /// Format 3: synchronization
    Synchronization(Synchronization),
}

impl Payload {
    /// Retrieve the payload's [`Format`]
    pub fn format(&self) -> Format {
        match self {
            Self::Extension(_) => Format::Extension,
            Self::Branch(_) => Format::Branch,
            Self::Address(_) => Format::Address,
            Self::Synchronization(_) => Format::Synchronization,
        }
    }

    /// Retrieve the [`AddressInfo`] if the payload carries one
    pub fn address_info(&self) -> Option<&AddressInfo> {
        match self {
            Self::Address(addr) => Some(addr),
            Self::Branch(branch) => branch.address.as_ref(),
            Self::Extension(Extension::BranchPredictor(bp)) => bp.address.as_ref(),
            _ => None,
        }
    }

    /// Retrieve the payload's `updiscon` flag
    ///
    /// Payloads without address information never flag a discontinuity.
    pub fn updiscon(&self) -> bool {
        self.address_info().is_some_and(|a| a.updiscon)
    }
}

impl From<Extension> for Payload {
    fn from(ext: Extension) -> Self {
        Self::Extension(ext)
    }
}

impl From<BranchPredictor> for Payload {
    fn from(bp: BranchPredictor) -> Self {
        Self::Extension(Extension::BranchPredictor(bp))
    }
}

impl From<JumpTargetIndex> for Payload {
    fn from(jti: JumpTargetIndex) -> Self {
        Self::Extension(Extension::JumpTargetIndex(jti))
    }
}

impl From<Branch> for Payload {
    fn from(branch: Branch) -> Self {
        Self::Branch(branch)
    }
}

impl From<AddressInfo> for Payload {
    fn from(addr: AddressInfo) -> Self {
        Self::Address(addr)
    }
}

impl From<Synchronization> for Payload {
    fn from(sync: Synchronization) -> Self {
        Self::Synchronization(sync)
    }
}

impl From<Start> for Payload {
    fn from(start: Start) -> Self {
        Synchronization::Start(start).into()
    }
}

impl From<Exception> for Payload {
    fn from(exception: Exception) -> Self {
        Synchronization::Exception(exception).into()
    }
}

impl From<Context> for Payload {
    fn from(ctx: Context) -> Self {
        Synchronization::Context(ctx).into()
    }
}

impl From<Support> for Payload {
    fn from(support: Support) -> Self {
        Synchronization::Support(support).into()
    }
}

/// Packet format discriminator
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Format {
    Extension = 0,
    Branch = 1,
    Address = 2,
    Synchronization = 3,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format {}", *self as u8)
    }
}

/// Format 0 payloads
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Extension {
    BranchPredictor(BranchPredictor),
    JumpTargetIndex(JumpTargetIndex),
}

/// Format 0: a run of correctly predicted branches
///
/// Only emitted by encoders with the `branch_prediction` option active. A
/// payload without an address additionally reports that the branch following
/// the run failed its prediction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BranchPredictor {
    /// Number of correctly predicted branches
    pub correct_predictions: u32,
    pub address: Option<AddressInfo>,
}

/// Format 0: an uninferable jump target referenced by cache index
///
/// Only emitted by encoders with the `jump_target_cache` option active. The
/// index refers to an entry of the decoder's jump target cache, which the
/// encoder guarantees was populated by an earlier address-bearing packet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct JumpTargetIndex {
    /// Jump target cache index of the entry containing the target address
    pub index: usize,
    /// Branch outcomes accumulated since the previous packet
    ///
    /// Unlike for [`Branch`] payloads, a count of zero means no branches.
    pub branch_map: branch::Map,
}

/// Format 1: branch information
///
/// Emitted when branch information must be reported, either because the
/// branch map is full or because an address must be reported and branches
/// occurred since the previous packet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Branch {
    /// Outcomes of the branches since the previous packet
    ///
    /// A count of zero signals a full map of [`branch::Map::FULL`] branches;
    /// such payloads carry no address.
    pub branch_map: branch::Map,
    pub address: Option<AddressInfo>,
}

impl Branch {
    /// Number of branch outcomes this payload communicates
    ///
    /// Applies the full-map rule: a raw count of zero means
    /// [`branch::Map::FULL`] branches.
    pub fn branch_count(&self) -> u8 {
        if self.branch_map.is_empty() {
            branch::Map::FULL
        } else {
            self.branch_map.count()
        }
    }
}

/// Address information of format 0, 1 and 2 payloads
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct AddressInfo {
    /// Instruction address, without its `iaddress_lsb` lowest bits
    ///
    /// Differential unless the `full_address` option is active, in which
    /// case it is absolute. Differential addresses are sign-extended.
    pub address: u64,
    /// The reported instruction follows an uninferable discontinuity and
    /// precedes an exception, privilege change or resync
    ///
    /// The wire-level XOR against the address MSB has already been undone.
    pub updiscon: bool,
}

impl fmt::Debug for AddressInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AddressInfo {{ address: {:#0x}, updiscon: {:?} }}",
            self.address, self.updiscon
        )
    }
}

/// Format 3 payloads
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Synchronization {
    Start(Start),
    Exception(Exception),
    Context(Context),
    Support(Support),
}

/// Format 3, subformat 0: synchronization start
///
/// Sent for the first traced instruction and whenever resynchronization is
/// necessary.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Start {
    /// `false` if the instruction at `address` is a taken branch, `true` if
    /// it was not taken or is not a branch
    pub branch: bool,
    pub privilege: Privilege,
    /// Full instruction address, without its `iaddress_lsb` lowest bits
    pub address: u64,
}

impl fmt::Debug for Start {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Start {{ branch: {:?}, privilege: {:?}, address: {:#0x} }}",
            self.branch, self.privilege, self.address
        )
    }
}

/// Format 3, subformat 1: exception or interrupt
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Exception {
    /// `false` if the instruction at `address` is a taken branch, `true` if
    /// it was not taken or is not a branch
    pub branch: bool,
    pub privilege: Privilege,
    /// Full instruction address, without its `iaddress_lsb` lowest bits
    pub address: u64,
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exception {{ branch: {:?}, privilege: {:?}, address: {:#0x} }}",
            self.branch, self.privilege, self.address
        )
    }
}

/// Format 3, subformat 2: execution context
///
/// Context bookkeeping is not a concern of this engine; the payload exists
/// so a complete packet stream can be fed without filtering.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Context {
    pub privilege: Privilege,
}

/// Format 3, subformat 3: supporting information
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Support {
    pub qual_status: QualStatus,
    /// The complete set of runtime options now in effect
    pub options: Options,
}

/// Change of the filter qualification
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum QualStatus {
    /// No change to the filter qualification
    #[default]
    NoChange,
    /// Qualification ended; the preceding packet was sent explicitly to
    /// report the last qualified instruction
    EndedRep,
    /// Qualification ended; the preceding packet would have been sent anyway
    EndedUpd,
    /// One or more packets were lost
    Lost,
}
