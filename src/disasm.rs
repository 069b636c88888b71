//! Capstone-backed instruction decoding at a resolved buffer offset.
//!
//! This sits outside the bookmark pipeline; only the CLI drives it.

use anyhow::{anyhow, Result};
use capstone::{Arch as CsArch, Capstone, Mode, NO_EXTRA_MODE};

/// Architecture tag accepted by the disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X64,
    Arm,
    Arm64,
    Thumb,
    Mips,
    Mips64,
}

impl Arch {
    /// Parses a tag name. Unrecognized names select `X64`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "x86" => Arch::X86,
            "x64" => Arch::X64,
            "arm" => Arch::Arm,
            "arm64" => Arch::Arm64,
            "thumb" => Arch::Thumb,
            "mips" => Arch::Mips,
            "mips64" => Arch::Mips64,
            _ => Arch::X64,
        }
    }

    fn capstone_mode(self) -> (CsArch, Mode) {
        match self {
            Arch::X86 => (CsArch::X86, Mode::Mode32),
            Arch::X64 => (CsArch::X86, Mode::Mode64),
            Arch::Arm => (CsArch::ARM, Mode::Arm),
            Arch::Arm64 => (CsArch::ARM64, Mode::Arm),
            Arch::Thumb => (CsArch::ARM, Mode::Thumb),
            Arch::Mips => (CsArch::MIPS, Mode::Mips32),
            Arch::Mips64 => (CsArch::MIPS, Mode::Mips64),
        }
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: u64,
    /// Instruction bytes as uppercase hex, space-separated.
    pub bytes: String,
    pub mnemonic: String,
    pub operands: String,
    pub size: usize,
}

/// Decodes up to `max_instructions` instructions from `data`, reporting
/// addresses relative to `start_offset`.
///
/// When the first byte cannot be decoded for the given architecture, the
/// result is a single synthetic `db` record of size 1 rather than an
/// error. Only failure to construct the engine itself is an error.
pub fn disassemble(
    data: &[u8],
    start_offset: u64,
    arch: Arch,
    max_instructions: usize,
) -> Result<Vec<Instruction>> {
    if max_instructions == 0 {
        return Ok(Vec::new());
    }

    let (cs_arch, cs_mode) = arch.capstone_mode();
    let cs = Capstone::new_raw(cs_arch, cs_mode, NO_EXTRA_MODE, None)
        .map_err(|e| anyhow!("failed to initialize capstone for {:?}: {}", arch, e))?;

    let mut instructions = Vec::new();
    if let Ok(insns) = cs.disasm_count(data, start_offset, max_instructions) {
        for insn in insns.iter() {
            instructions.push(Instruction {
                address: insn.address(),
                bytes: hex_bytes(insn.bytes()),
                mnemonic: insn.mnemonic().unwrap_or("").to_string(),
                operands: insn.op_str().unwrap_or("").to_string(),
                size: insn.bytes().len(),
            });
        }
    }

    if instructions.is_empty() {
        instructions.push(undecodable(data, start_offset));
    }

    Ok(instructions)
}

/// Synthetic record for a first byte the engine cannot decode.
fn undecodable(data: &[u8], start_offset: u64) -> Instruction {
    let (bytes, operands) = match data.first() {
        Some(b) => (format!("{:02X}", b), format!("{:#04X}", b)),
        None => (String::new(), "0x00".to_string()),
    };

    Instruction {
        address: start_offset,
        bytes,
        mnemonic: "db".to_string(),
        operands,
        size: 1,
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
