//! Tests for the disassembly boundary: decode, instruction cap, and the
//! synthetic `db` record for undecodable input.

use entrymark::{disassemble, Arch};

#[test]
fn decodes_x64_ret() {
    let insns = disassemble(&[0xC3], 0x1000, Arch::X64, 4).unwrap();

    assert_eq!(insns.len(), 1);
    assert_eq!(insns[0].address, 0x1000);
    assert_eq!(insns[0].mnemonic, "ret");
    assert_eq!(insns[0].bytes, "C3");
    assert_eq!(insns[0].size, 1);
}

#[test]
fn decodes_x64_wide_immediate() {
    // mov rax, 0x1234567890ABCDEF; ret
    let code = [
        0x48, 0xB8, 0xEF, 0xCD, 0xAB, 0x90, 0x78, 0x56, 0x34, 0x12, 0xC3,
    ];
    let insns = disassemble(&code, 0, Arch::X64, 16).unwrap();

    assert_eq!(insns.len(), 2);
    assert!(insns[0].mnemonic.contains("mov"));
    assert_eq!(insns[0].size, 10);
    assert_eq!(insns[1].mnemonic, "ret");
    assert_eq!(insns[1].address, 10);
}

#[test]
fn decodes_arm64_ret() {
    let insns = disassemble(&[0xC0, 0x03, 0x5F, 0xD6], 0, Arch::Arm64, 1).unwrap();

    assert_eq!(insns.len(), 1);
    assert_eq!(insns[0].mnemonic, "ret");
    assert_eq!(insns[0].size, 4);
}

#[test]
fn caps_at_max_instructions() {
    let insns = disassemble(&[0x90, 0x90, 0x90, 0x90, 0x90], 0, Arch::X64, 2).unwrap();

    assert_eq!(insns.len(), 2);
    assert!(insns.iter().all(|i| i.mnemonic == "nop"));
}

#[test]
fn zero_max_instructions_yields_nothing() {
    let insns = disassemble(&[0x90], 0, Arch::X64, 0).unwrap();

    assert!(insns.is_empty());
}

#[test]
fn undecodable_first_byte_yields_db_record() {
    // 0x06 (push es) is not a valid instruction in 64-bit mode.
    let insns = disassemble(&[0x06], 0x2000, Arch::X64, 4).unwrap();

    assert_eq!(insns.len(), 1);
    assert_eq!(insns[0].address, 0x2000);
    assert_eq!(insns[0].mnemonic, "db");
    assert_eq!(insns[0].bytes, "06");
    assert_eq!(insns[0].operands, "0x06");
    assert_eq!(insns[0].size, 1);
}

#[test]
fn empty_input_yields_db_record() {
    let insns = disassemble(&[], 0, Arch::X64, 4).unwrap();

    assert_eq!(insns.len(), 1);
    assert_eq!(insns[0].mnemonic, "db");
    assert_eq!(insns[0].operands, "0x00");
    assert!(insns[0].bytes.is_empty());
}

#[test]
fn arch_names_parse_case_insensitively() {
    assert_eq!(Arch::from_name("ARM64"), Arch::Arm64);
    assert_eq!(Arch::from_name("thumb"), Arch::Thumb);
    assert_eq!(Arch::from_name("Mips64"), Arch::Mips64);
}

#[test]
fn unrecognized_arch_name_defaults_to_x64() {
    assert_eq!(Arch::from_name("sparc"), Arch::X64);
    assert_eq!(Arch::from_name(""), Arch::X64);
}
