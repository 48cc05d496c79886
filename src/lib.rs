// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

//! # Execution path reconstruction for RISC-V `te_inst` branch traces
//!
//! A trace encoder compresses a hart's control flow into a stream of
//! `te_inst` packets that describe the path through program memory without
//! enumerating every instruction. This crate implements the other half of
//! that protocol: a [replay engine][replay] that consumes structured
//! [packets][packet], resolves every branch, jump and discontinuity against
//! the traced program, and publishes the exact sequence of retired program
//! counter values.
//!
//! The crate is deliberately not concerned with how packets reach the
//! decoder or how they are de-serialized from wire bits; it consumes the
//! [`Payload`][packet::Payload] structures a wire decoder produces. Access
//! to the traced program is likewise abstracted behind an instruction
//! [oracle].
//!
//! # Protocol features
//! - delta and full address modes
//! - implicit return inference via a bounded return stack
//! - the jump target cache efficiency extension
//! - the branch predictor efficiency extension, including miss-predict
//!   carries across packets
//! - runtime option changes through support packets
//!
//! # no_std
//! This crate is not dependent on the standard library and only uses the
//! Core Library. It can therefore even be used in bare metal environments.
//! All state is held in fixed-size tables; nothing is allocated.
//!
//! # Example
//!
//! The following example traces a short straight-line run: a start
//! synchronization, one address packet reporting the final qualified
//! instruction and a support packet ending the trace.
//!
//! ```
//! use riscv_te_replay::oracle;
//! use riscv_te_replay::packet::{AddressInfo, Payload, QualStatus, Start, Support};
//! use riscv_te_replay::replay::{self, sink};
//!
//! // two nops followed by a ret
//! let text = b"\x13\x00\x00\x00\x13\x00\x00\x00\x67\x80\x00\x00";
//!
//! let mut pcs = Vec::new();
//! let mut decoder = replay::builder()
//!     .with_oracle(oracle::from_bytes(0x8000_0000, text))
//!     .with_sink(sink::from_fn(|_, pc, _| pcs.push(pc)))
//!     .build()
//!     .unwrap();
//!
//! let packets = [
//!     Payload::from(Start {
//!         branch: true,
//!         privilege: Default::default(),
//!         address: 0x8000_0000 >> 1,
//!     }),
//!     AddressInfo { address: 0x8 >> 1, updiscon: false }.into(),
//!     Support { qual_status: QualStatus::EndedRep, ..Default::default() }.into(),
//! ];
//! for packet in packets {
//!     decoder.process_packet(&packet).unwrap();
//! }
//!
//! drop(decoder);
//! assert_eq!(pcs, [0x8000_0000, 0x8000_0004, 0x8000_0008]);
//! ```
#![no_std]

pub mod config;
pub mod instruction;
pub mod oracle;
pub mod packet;
pub mod replay;
pub mod types;

pub use instruction::Instruction;
pub use replay::Decoder;
