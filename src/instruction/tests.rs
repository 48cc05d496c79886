// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

use super::format::{TypeB, TypeI, TypeR};
use super::{Bits, Instruction, Kind, Size};

#[test]
fn extract_bits() {
    // c.jr x1 followed by jalr x0,0(x5)
    let data = [0x82, 0x80, 0x67, 0x80, 0x02, 0x00];
    let (bits, rest) = Bits::extract(&data).expect("16 bit extraction failed");
    assert_eq!(bits, Bits::Bit16(0x8082));
    let (bits, rest) = Bits::extract(rest).expect("32 bit extraction failed");
    assert_eq!(bits, Bits::Bit32(0x00028067));
    assert!(rest.is_empty());
    assert_eq!(Bits::extract(rest), None);
}

#[test]
fn decode_well_known_words() {
    assert_eq!(Kind::decode_32(0x00000073), Some(Kind::ecall));
    assert_eq!(Kind::decode_32(0x00100073), Some(Kind::ebreak));
    assert_eq!(Kind::decode_32(0x10200073), Some(Kind::sret));
    assert_eq!(Kind::decode_32(0x30200073), Some(Kind::mret));
    assert_eq!(Kind::decode_32(0x7b200073), Some(Kind::dret));
    assert_eq!(Kind::decode_32(0x10500073), Some(Kind::wfi));
    // jal x0,0
    assert_eq!(
        Kind::decode_32(0x0000006f).and_then(Kind::inferable_jump_target),
        Some(0)
    );
    // ret, i.e. jalr x0,0(x1)
    let ret = Kind::decode_32(0x00008067).expect("cannot decode ret");
    assert!(ret.is_return());
    assert!(!ret.is_call());
    // addi x0,x0,0 is of no concern to the tracing logic
    assert_eq!(Kind::decode_32(0x00000013), None);
}

#[test]
fn decode_branches() {
    // beq x10,x11,-8
    let kind = Kind::decode_32(0xfeb50ce3).expect("cannot decode beq");
    assert_eq!(
        kind,
        Kind::beq(TypeB {
            rs1: 10,
            rs2: 11,
            imm: -8
        })
    );
    assert!(kind.is_branch());
    assert_eq!(kind.branch_target(), Some(-8));
    assert_eq!(kind.inferable_jump_target(), None);
    // bne x14,x15,-8
    assert_eq!(Kind::decode_32(0xfef71ce3).and_then(Kind::branch_target), Some(-8));
}

#[test]
fn decode_jumps() {
    // jal x1,0x14
    let jal = Kind::decode_32(0x014000ef).expect("cannot decode jal");
    assert_eq!(jal.inferable_jump_target(), Some(0x14));
    assert!(jal.is_call());
    // jalr x0,0(x5): uninferable, neither call nor return
    let jalr = Kind::decode_32(0x00028067).expect("cannot decode jalr");
    assert_eq!(jalr, Kind::jalr(TypeI { rd: 0, rs1: 5, imm: 0 }));
    assert_eq!(jalr.uninferable_jump(), Some((5, 0)));
    assert!(jalr.is_uninferable_discon());
    assert!(!jalr.is_call());
    assert!(!jalr.is_return());
    // jalr x0,0(x0) has an inferable target
    assert_eq!(
        Kind::decode_32(0x00000067).and_then(Kind::inferable_jump_target),
        Some(0)
    );
}

#[test]
fn decode_compressed() {
    // c.jr x1 is a function return
    let cjr = Kind::decode_16(0x8082).expect("cannot decode c.jr");
    assert_eq!(cjr, Kind::c_jr(TypeR { rd: 1, rs1: 1, rs2: 0 }));
    assert!(cjr.is_return());
    assert!(cjr.is_uninferable_discon());
    // c.jalr x1 is a call
    let cjalr = Kind::decode_16(0x9082).expect("cannot decode c.jalr");
    assert!(cjalr.is_call());
    assert_eq!(cjalr.uninferable_jump(), Some((1, 0)));
    // c.ebreak is neither
    assert_eq!(Kind::decode_16(0x9002), Some(Kind::c_ebreak));
    assert!(!Kind::c_ebreak.is_uninferable_discon());
    // c.j 0
    assert_eq!(
        Kind::decode_16(0xa001).and_then(Kind::inferable_jump_target),
        Some(0)
    );
    // c.beqz x8,0
    assert_eq!(Kind::decode_16(0xc001).and_then(Kind::branch_target), Some(0));
}

#[test]
fn upper_immediates() {
    // auipc x1,0
    assert_eq!(
        Kind::decode_32(0x00000097).and_then(|k| k.upper_immediate(0x8000_0000)),
        Some((1, 0x8000_0000))
    );
    // lui x1,0x1
    assert_eq!(
        Kind::decode_32(0x000010b7).and_then(|k| k.upper_immediate(0x8000_0000)),
        Some((1, 0x1000))
    );
    // branches load no upper immediate
    assert_eq!(
        Kind::decode_32(0xfeb50ce3).and_then(|k| k.upper_immediate(0)),
        None
    );
}

#[test]
fn trap_returns_are_discons() {
    for kind in [Kind::uret, Kind::sret, Kind::mret, Kind::dret] {
        assert!(kind.is_return_from_trap());
        assert!(kind.is_uninferable_discon());
        assert_eq!(kind.uninferable_jump(), None);
    }
    assert!(!Kind::ecall.is_uninferable_discon());
    assert!(!Kind::ebreak.is_uninferable_discon());
}

#[test]
fn instruction_from_bits() {
    let insn = Instruction::from(Bits::Bit32(0x00000013));
    assert_eq!(insn.size, Size::Normal);
    assert_eq!(insn.kind, None);

    let insn = Instruction::from(Bits::Bit16(0x8082));
    assert_eq!(insn.size, Size::Compressed);
    assert!(insn.is_return());
}
