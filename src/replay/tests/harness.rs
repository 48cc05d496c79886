// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Harness for replay engine tests
//!
//! Provides a recording [`Sink`], fixture helpers for common payloads and a
//! small instruction encoder so test programs are built from genuine RISC-V
//! machine words.

use core::cell::RefCell;

use crate::config::Options;
use crate::instruction::{Bits, Instruction};
use crate::packet::{AddressInfo, Exception, QualStatus, Start, Support};
use crate::replay::sink::Sink;
use crate::types::BAD_ADDRESS;

/// Declarative replay engine test
///
/// Takes a test name, a sorted (address, bits) program and a sequence of
/// `payload => [expected PCs]` steps. Each step feeds one payload and
/// asserts the exact sequence of PCs reported for it.
macro_rules! replay_test {
    ($n:ident, $b:expr, $($p:expr => $e:tt)*) => {
        #[test]
        fn $n() {
            let program = $b;
            let recorder = harness::Recorder::new();
            let mut decoder = builder()
                .with_oracle(oracle::from_sorted_map(&program))
                .with_sink(&recorder)
                .build()
                .expect("could not build decoder");
            $(
                let payload: Payload = $p.into();
                decoder
                    .process_packet(&payload)
                    .expect("could not process packet");
                recorder.check(&$e);
            )*
        }
    };
}

/// A [`Sink`] recording reported PCs
///
/// Asserts on every notification that the transition chains onto the
/// previous one: `old_pc` must be the previously reported PC, or the
/// sentinel for the first notification of a session.
pub struct Recorder {
    log: RefCell<Log>,
}

struct Log {
    pcs: [u64; Recorder::CAPACITY],
    len: usize,
    last: u64,
}

impl Recorder {
    const CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self {
            log: RefCell::new(Log {
                pcs: [0; Self::CAPACITY],
                len: 0,
                last: BAD_ADDRESS,
            }),
        }
    }

    /// Assert the PCs recorded since the last check and clear the log
    pub fn check(&self, expected: &[u64]) {
        let mut log = self.log.borrow_mut();
        assert_eq!(&log.pcs[..log.len], expected, "unexpected PC sequence");
        log.len = 0;
    }
}

impl Sink for &Recorder {
    fn advance_pc(&mut self, old_pc: u64, new_pc: u64, _: &Instruction) {
        let mut log = self.log.borrow_mut();
        assert_eq!(old_pc, log.last, "transition does not chain");
        assert_ne!(new_pc, BAD_ADDRESS, "reported PC is the sentinel");
        assert!(log.len < log.pcs.len(), "recorder capacity exceeded");
        log.last = new_pc;
        let len = log.len;
        log.pcs[len] = new_pc;
        log.len += 1;
    }
}

/// Start payload for an address holding a non-branch (or a not-taken branch)
pub fn start(address: u64) -> Start {
    Start {
        branch: true,
        privilege: Default::default(),
        address: address >> 1,
    }
}

/// Start payload for an address holding a branch with the given outcome
pub fn start_on_branch(address: u64, taken: bool) -> Start {
    Start {
        branch: !taken,
        privilege: Default::default(),
        address: address >> 1,
    }
}

/// Exception payload reporting the given trap handler address
pub fn exception(address: u64) -> Exception {
    Exception {
        branch: true,
        privilege: Default::default(),
        address: address >> 1,
    }
}

/// Address payload with a differential address
pub fn addr(delta: i64) -> AddressInfo {
    AddressInfo {
        address: (delta >> 1) as u64,
        updiscon: false,
    }
}

/// Address payload with a differential address and the `updiscon` flag set
pub fn addr_updiscon(delta: i64) -> AddressInfo {
    AddressInfo {
        address: (delta >> 1) as u64,
        updiscon: true,
    }
}

/// Support payload activating the given options
pub fn support(options: Options) -> Support {
    Support {
        qual_status: QualStatus::NoChange,
        options,
    }
}

/// Support payload ending the trace
pub fn ended(qual_status: QualStatus) -> Support {
    Support {
        qual_status,
        options: Default::default(),
    }
}

pub fn nop() -> Bits {
    Bits::Bit32(0x0000_0013)
}

pub fn ebreak() -> Bits {
    Bits::Bit32(0x0010_0073)
}

pub fn wfi() -> Bits {
    Bits::Bit32(0x1050_0073)
}

pub fn beq(rs1: u32, rs2: u32, imm: i32) -> Bits {
    Bits::Bit32(b_type(0b000, rs1, rs2, imm))
}

pub fn bne(rs1: u32, rs2: u32, imm: i32) -> Bits {
    Bits::Bit32(b_type(0b001, rs1, rs2, imm))
}

pub fn jal(rd: u32, imm: i32) -> Bits {
    let imm = imm as u32;
    Bits::Bit32(
        0b1101111
            | rd << 7
            | (imm & 0xff000)
            | ((imm >> 11) & 1) << 20
            | ((imm >> 1) & 0x3ff) << 21
            | ((imm >> 20) & 1) << 31,
    )
}

pub fn jalr(rd: u32, rs1: u32, imm: i32) -> Bits {
    Bits::Bit32(0b1100111 | rd << 7 | rs1 << 15 | ((imm as u32) & 0xfff) << 20)
}

/// Encode an `auipc`; `imm` is the 20 bit field, not the effective value
pub fn auipc(rd: u32, imm: u32) -> Bits {
    Bits::Bit32(0b0010111 | rd << 7 | (imm & 0xfffff) << 12)
}

/// Encode a `lui`; `imm` is the 20 bit field, not the effective value
pub fn lui(rd: u32, imm: u32) -> Bits {
    Bits::Bit32(0b0110111 | rd << 7 | (imm & 0xfffff) << 12)
}

pub fn c_j(imm: i32) -> Bits {
    let imm = imm as u32;
    let insn = (0b101 << 13)
        | 0b01
        | ((imm >> 11) & 1) << 12
        | ((imm >> 4) & 1) << 11
        | ((imm >> 8) & 3) << 9
        | ((imm >> 10) & 1) << 8
        | ((imm >> 6) & 1) << 7
        | ((imm >> 7) & 1) << 6
        | ((imm >> 1) & 7) << 3
        | ((imm >> 5) & 1) << 2;
    Bits::Bit16(insn as u16)
}

pub fn c_jr(rs1: u16) -> Bits {
    Bits::Bit16((0b100 << 13) | rs1 << 7 | 0b10)
}

fn b_type(funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    let imm = imm as u32;
    0b1100011
        | funct3 << 12
        | rs1 << 15
        | rs2 << 20
        | ((imm >> 1) & 0xf) << 8
        | ((imm >> 5) & 0x3f) << 25
        | ((imm >> 11) & 1) << 7
        | ((imm >> 12) & 1) << 31
}
