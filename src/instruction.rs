// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Instruction representation, decoding and classification
//!
//! The replay engine only needs to understand instructions that affect
//! control flow, plus enough of everything else to know an instruction's
//! length. This module defines raw instruction [`Bits`], the decoded
//! [`Instruction`] and the opcode [`Kind`]s the engine distinguishes,
//! together with the classification fns driving the single-step logic.

pub mod format;

#[cfg(test)]
mod tests;

use core::fmt;

use format::{Register, TypeB, TypeI, TypeJ, TypeR, TypeU};

/// The bits from which an instruction is disassembled
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bits {
    Bit16(u16),
    Bit32(u32),
}

impl Bits {
    /// Extract [`Bits`] from the beginning of a raw byte slice
    ///
    /// Honors the base instruction-length encoding specified in The RISC-V
    /// Instruction Set Manual Volume I. Returns the [`Bits`] and the
    /// remaining part of the slice, or `None` if the beginning is neither a
    /// 16 nor a 32 bit instruction or the slice is too short.
    pub fn extract(data: &[u8]) -> Option<(Self, &[u8])> {
        match data {
            [a, b, r @ ..] if a & 0b11 != 0b11 => {
                Some((Self::Bit16(u16::from_le_bytes([*a, *b])), r))
            }
            [a, b, c, d, r @ ..] if a & 0b11100 != 0b11100 => {
                Some((Self::Bit32(u32::from_le_bytes([*a, *b, *c, *d])), r))
            }
            _ => None,
        }
    }

    /// Retrieve the [`Size`] of the encoded instruction
    pub const fn size(self) -> Size {
        match self {
            Self::Bit16(_) => Size::Compressed,
            Self::Bit32(_) => Size::Normal,
        }
    }
}

/// Byte length of a single RISC-V instruction
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Size {
    Compressed = 2,
    #[default]
    Normal = 4,
}

impl From<Size> for u64 {
    fn from(size: Size) -> Self {
        size as u64
    }
}

/// Major opcode field of 32bit instructions
#[repr(u32)]
#[derive(Eq, PartialEq)]
enum OpCode {
    MiscMem = 0b0001111,
    Auipc = 0b0010111,
    Lui = 0b0110111,
    Branch = 0b1100011,
    Jalr = 0b1100111,
    Jal = 0b1101111,
    System = 0b1110011,
    Ignored,
}

impl From<u32> for OpCode {
    fn from(insn: u32) -> Self {
        use OpCode::*;

        const MASK: u32 = 0x7f;
        match insn & MASK {
            x if x == MiscMem as u32 => MiscMem,
            x if x == Auipc as u32 => Auipc,
            x if x == Lui as u32 => Lui,
            x if x == Branch as u32 => Branch,
            x if x == Jalr as u32 => Jalr,
            x if x == Jal as u32 => Jal,
            x if x == System as u32 => System,
            _ => Ignored,
        }
    }
}

/// Opcodes the replay engine distinguishes
///
/// Everything not listed here advances the PC linearly and thus does not need
/// to be told apart.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    // branches
    beq(TypeB),
    bne(TypeB),
    blt(TypeB),
    bge(TypeB),
    bltu(TypeB),
    bgeu(TypeB),
    c_beqz(TypeB),
    c_bnez(TypeB),
    // direct jumps
    jal(TypeJ),
    c_jal(TypeJ),
    c_j(TypeJ),
    // register-indirect jumps
    jalr(TypeI),
    c_jalr(TypeR),
    c_jr(TypeR),
    // upper immediates
    auipc(TypeU),
    lui(TypeU),
    c_lui(TypeU),
    // trap returns
    uret,
    sret,
    mret,
    dret,
    // environment
    ecall,
    ebreak,
    c_ebreak,
    wfi,
    fence,
    fence_i,
}

impl Kind {
    /// Determine the branch target
    ///
    /// If [`Self`] refers to a branch instruction, this fn returns the
    /// immediate, which is the branch target relative to the instruction.
    /// Jump instructions are not considered branch instructions.
    pub fn branch_target(self) -> Option<i16> {
        match self {
            Self::beq(d) | Self::bne(d) | Self::blt(d) | Self::bge(d) | Self::bltu(d)
            | Self::bgeu(d) | Self::c_beqz(d) | Self::c_bnez(d) => Some(d.imm),
            _ => None,
        }
    }

    /// Determine the inferable jump target
    ///
    /// If [`Self`] refers to a jump whose target is determined by the
    /// instruction alone, this fn returns that target relative to the
    /// instruction. A `jalr` target is only considered inferable if the
    /// source register is the `zero` register. Branch instructions are not
    /// considered jump instructions.
    pub fn inferable_jump_target(self) -> Option<i32> {
        match self {
            Self::jal(d) | Self::c_jal(d) | Self::c_j(d) => Some(d.imm),
            Self::jalr(TypeI { rs1: 0, imm, .. }) => Some(imm.into()),
            _ => None,
        }
    }

    /// Determine the register dependency of an uninferable jump
    ///
    /// If [`Self`] refers to a jump whose target depends on a register, this
    /// fn returns that register together with the immediate offset added to
    /// its contents. Branch instructions are not considered jump
    /// instructions.
    pub fn uninferable_jump(self) -> Option<(Register, i16)> {
        match self {
            Self::jalr(d) => Some((d.rs1, d.imm)),
            Self::c_jalr(d) | Self::c_jr(d) => Some((d.rs1, 0)),
            _ => None,
        }
        .filter(|(r, _)| *r != 0)
    }

    /// Determine the upper immediate loaded by this instruction
    ///
    /// If [`Self`] refers to an `auipc`, `lui` or `c.lui`, this fn returns
    /// the register the immediate is stored to and its effective value after
    /// the instruction retired, under the assumption that the instruction's
    /// address is `pc`.
    pub fn upper_immediate(self, pc: u64) -> Option<(Register, u64)> {
        match self {
            Self::auipc(d) => Some((d.rd, pc.wrapping_add_signed(d.imm.into()))),
            Self::lui(d) | Self::c_lui(d) => Some((d.rd, d.imm as i64 as u64)),
            _ => None,
        }
    }

    /// Determine whether this instruction returns from a trap
    pub fn is_return_from_trap(self) -> bool {
        matches!(self, Self::uret | Self::sret | Self::mret | Self::dret)
    }

    /// Determine whether this instruction causes an uninferable discontinuity
    ///
    /// Returns `true` for [uninferable jumps][Self::uninferable_jump] and
    /// [trap returns][Self::is_return_from_trap]. `ecall` and `ebreak` are
    /// not included: their discontinuities are reported through the trace
    /// unit's exception mechanism rather than through address packets.
    pub fn is_uninferable_discon(self) -> bool {
        self.uninferable_jump().is_some() || self.is_return_from_trap()
    }

    /// Determine whether this instruction can be considered a function call
    ///
    /// Returns `true` for jump-and-link instructions with `ra` as link
    /// register. Tail calls are jumps, not calls: they do not record a return
    /// address.
    pub fn is_call(self) -> bool {
        matches!(
            self,
            Self::jalr(TypeI { rd: 1, .. })
                | Self::c_jalr(_)
                | Self::jal(TypeJ { rd: 1, .. })
                | Self::c_jal(_)
        )
    }

    /// Determine whether this instruction can be considered a function return
    ///
    /// Returns `true` for jump-register instructions through `ra` that do not
    /// link.
    pub fn is_return(self) -> bool {
        matches!(
            self,
            Self::jalr(TypeI { rd: 0, rs1: 1, .. }) | Self::c_jr(TypeR { rs1: 1, .. })
        )
    }

    /// Determine whether this instruction is a branch instruction
    pub fn is_branch(self) -> bool {
        self.branch_target().is_some()
    }

    /// Decode a 32bit ("normal") instruction
    ///
    /// Returns `None` for instructions the replay engine does not need to
    /// tell apart. Pseudo-instructions are never lifted, e.g. a `ret`
    /// decodes as `jalr` with `rd` = `zero` and `rs1` = `ra`.
    #[allow(clippy::unusual_byte_groupings)]
    pub fn decode_32(insn: u32) -> Option<Self> {
        let funct3 = (insn >> 12) & 0x7;

        match OpCode::from(insn) {
            OpCode::Lui => Some(Self::lui(insn.into())),
            OpCode::Auipc => Some(Self::auipc(insn.into())),
            OpCode::Jal => Some(Self::jal(insn.into())),
            OpCode::Jalr => Some(Self::jalr(insn.into())),
            OpCode::Branch => match funct3 {
                0b000 => Some(Self::beq(insn.into())),
                0b001 => Some(Self::bne(insn.into())),
                0b100 => Some(Self::blt(insn.into())),
                0b101 => Some(Self::bge(insn.into())),
                0b110 => Some(Self::bltu(insn.into())),
                0b111 => Some(Self::bgeu(insn.into())),
                _ => None,
            },
            OpCode::MiscMem => match funct3 {
                0b000 => Some(Self::fence),
                0b001 => Some(Self::fence_i),
                _ => None,
            },
            OpCode::System => match insn >> 7 {
                0b000000000000_00000_000_00000 => Some(Self::ecall),
                0b000000000001_00000_000_00000 => Some(Self::ebreak),
                0b000000000010_00000_000_00000 => Some(Self::uret),
                0b000100000010_00000_000_00000 => Some(Self::sret),
                0b001100000010_00000_000_00000 => Some(Self::mret),
                0b011110110010_00000_000_00000 => Some(Self::dret),
                0b000100000101_00000_000_00000 => Some(Self::wfi),
                _ => None,
            },
            OpCode::Ignored => None,
        }
    }

    /// Decode a 16bit ("compressed") instruction
    ///
    /// Returns `None` for instructions the replay engine does not need to
    /// tell apart.
    pub fn decode_16(insn: u16) -> Option<Self> {
        let op = insn & 0x3;
        let funct3 = insn >> 13;
        match (op, funct3) {
            (0b01, 0b001) => Some(Self::c_jal(insn.into())),
            (0b01, 0b011) => {
                let data = TypeU::from(insn);
                // rd == 2 is c.addi16sp, rd == 0 is reserved
                (data.rd != 0 && data.rd != 2).then_some(Self::c_lui(data))
            }
            (0b01, 0b101) => Some(Self::c_j(insn.into())),
            (0b01, 0b110) => Some(Self::c_beqz(insn.into())),
            (0b01, 0b111) => Some(Self::c_bnez(insn.into())),
            (0b10, 0b100) => {
                let data = TypeR::from(insn);
                let bit12 = (insn >> 12) & 0x1;
                match (bit12, data.rs1, data.rs2) {
                    (0, r, 0) if r != 0 => Some(Self::c_jr(data)),
                    (1, r, 0) if r != 0 => Some(Self::c_jalr(data)),
                    (1, 0, 0) => Some(Self::c_ebreak),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::beq(d) => write!(f, "beq x{},x{},{}", d.rs1, d.rs2, d.imm),
            Self::bne(d) => write!(f, "bne x{},x{},{}", d.rs1, d.rs2, d.imm),
            Self::blt(d) => write!(f, "blt x{},x{},{}", d.rs1, d.rs2, d.imm),
            Self::bge(d) => write!(f, "bge x{},x{},{}", d.rs1, d.rs2, d.imm),
            Self::bltu(d) => write!(f, "bltu x{},x{},{}", d.rs1, d.rs2, d.imm),
            Self::bgeu(d) => write!(f, "bgeu x{},x{},{}", d.rs1, d.rs2, d.imm),
            Self::c_beqz(d) => write!(f, "c.beqz x{},{}", d.rs1, d.imm),
            Self::c_bnez(d) => write!(f, "c.bnez x{},{}", d.rs1, d.imm),
            Self::jal(d) => write!(f, "jal x{},{}", d.rd, d.imm),
            Self::c_jal(d) => write!(f, "c.jal {}", d.imm),
            Self::c_j(d) => write!(f, "c.j {}", d.imm),
            Self::jalr(d) => write!(f, "jalr x{},{}(x{})", d.rd, d.imm, d.rs1),
            Self::c_jalr(d) => write!(f, "c.jalr x{}", d.rs1),
            Self::c_jr(d) => write!(f, "c.jr x{}", d.rs1),
            Self::auipc(d) => write!(f, "auipc x{},{:#x}", d.rd, (d.imm as u32) >> 12),
            Self::lui(d) => write!(f, "lui x{},{:#x}", d.rd, (d.imm as u32) >> 12),
            Self::c_lui(d) => write!(f, "c.lui x{},{:#x}", d.rd, (d.imm as u32) >> 12),
            Self::uret => write!(f, "uret"),
            Self::sret => write!(f, "sret"),
            Self::mret => write!(f, "mret"),
            Self::dret => write!(f, "dret"),
            Self::ecall => write!(f, "ecall"),
            Self::ebreak => write!(f, "ebreak"),
            Self::c_ebreak => write!(f, "c.ebreak"),
            Self::wfi => write!(f, "wfi"),
            Self::fence => write!(f, "fence"),
            Self::fence_i => write!(f, "fence.i"),
        }
    }
}

/// A single decoded RISC-V instruction
///
/// An instruction always has a [`Size`]; its [`Kind`] is only present for
/// the opcodes the replay engine distinguishes.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct Instruction {
    pub size: Size,
    pub kind: Option<Kind>,
}

impl Instruction {
    /// See [`Kind::branch_target`]
    pub fn branch_target(&self) -> Option<i16> {
        self.kind.and_then(Kind::branch_target)
    }

    /// See [`Kind::inferable_jump_target`]
    pub fn inferable_jump_target(&self) -> Option<i32> {
        self.kind.and_then(Kind::inferable_jump_target)
    }

    /// See [`Kind::uninferable_jump`]
    pub fn uninferable_jump(&self) -> Option<(Register, i16)> {
        self.kind.and_then(Kind::uninferable_jump)
    }

    /// See [`Kind::upper_immediate`]
    pub fn upper_immediate(&self, pc: u64) -> Option<(Register, u64)> {
        self.kind.and_then(|k| k.upper_immediate(pc))
    }

    /// See [`Kind::is_uninferable_discon`]
    pub fn is_uninferable_discon(&self) -> bool {
        self.kind.is_some_and(Kind::is_uninferable_discon)
    }

    /// See [`Kind::is_call`]
    pub fn is_call(&self) -> bool {
        self.kind.is_some_and(Kind::is_call)
    }

    /// See [`Kind::is_return`]
    pub fn is_return(&self) -> bool {
        self.kind.is_some_and(Kind::is_return)
    }

    /// See [`Kind::is_branch`]
    pub fn is_branch(&self) -> bool {
        self.kind.is_some_and(Kind::is_branch)
    }
}

impl From<Bits> for Instruction {
    fn from(bits: Bits) -> Self {
        match bits {
            Bits::Bit16(b) => Self {
                size: Size::Compressed,
                kind: Kind::decode_16(b),
            },
            Bits::Bit32(b) => Self {
                size: Size::Normal,
                kind: Kind::decode_32(b),
            },
        }
    }
}

impl From<Kind> for Instruction {
    fn from(kind: Kind) -> Self {
        let size = match kind {
            Kind::c_beqz(_) | Kind::c_bnez(_) | Kind::c_jal(_) | Kind::c_j(_)
            | Kind::c_jalr(_) | Kind::c_jr(_) | Kind::c_lui(_) | Kind::c_ebreak => {
                Size::Compressed
            }
            _ => Size::Normal,
        };
        Self {
            size,
            kind: Some(kind),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => kind.fmt(f),
            None => write!(f, "unknown"),
        }
    }
}
