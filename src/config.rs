// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Configuration of the replay engine
//!
//! This module defines the two configuration surfaces of the engine: the
//! fixed per-session [`Parameters`] a trace unit communicates through
//! discovery, and the runtime [`Options`] it communicates through support
//! packets. [`Parameters`] are set once when building a
//! [`Decoder`][crate::replay::Decoder]; [`Options`] change whenever a support
//! packet carries a new set.

#[cfg(feature = "serde")]
mod serde_utils;

/// Default number of index bits of the jump target cache
pub const JUMP_CACHE_INDEX_WIDTH: u8 = 9;

/// Default number of index bits of the branch predictor table
pub const BPRED_INDEX_WIDTH: u8 = 9;

/// Trace unit geometry communicated through discovery
///
/// These values size the engine's tables and define how packet address fields
/// are expanded. They are fixed for a tracing session.
///
/// # Serde
///
/// If the `serde` feature is enabled, this type supports (de)serialization,
/// e.g. for loading a discovery response stored alongside a trace dump.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameters {
    /// Width of the trace unit's nested call counter
    ///
    /// The return stack holds up to `2^(call_counter_width + 2)` entries.
    pub call_counter_width: u8,
    /// Number of low instruction address bits omitted from packets
    ///
    /// Packet address fields are shifted left by this amount. A value of `1`
    /// indicates support for compressed instructions.
    pub iaddress_lsb: u8,
    /// Number of index bits of the jump target cache
    pub jump_cache_index_width: u8,
    /// Number of index bits of the branch predictor table
    pub bpred_index_width: u8,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            call_counter_width: 7,
            iaddress_lsb: 1,
            jump_cache_index_width: JUMP_CACHE_INDEX_WIDTH,
            bpred_index_width: BPRED_INDEX_WIDTH,
        }
    }
}

/// Runtime feature options communicated through support packets
///
/// All options default to `false` until the first support packet arrives.
///
/// # Serde
///
/// If the `serde` feature is enabled, this type supports (de)serialization.
/// The flags are (de)serialized to/from the numerical values `0` and `1` to
/// be in line with the reference configuration format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
    /// Packet address fields are absolute rather than differential
    #[cfg_attr(feature = "serde", serde(with = "serde_utils"))]
    pub full_address: bool,
    /// Function return targets are inferred via the return stack
    #[cfg_attr(feature = "serde", serde(with = "serde_utils"))]
    pub implicit_return: bool,
    /// Uninferable jump targets may be referenced by cache index
    #[cfg_attr(feature = "serde", serde(with = "serde_utils"))]
    pub jump_target_cache: bool,
    /// Branch outcomes may be communicated as correct-prediction counts
    #[cfg_attr(feature = "serde", serde(with = "serde_utils"))]
    pub branch_prediction: bool,
}
