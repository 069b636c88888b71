use anyhow::Result;
use clap::Parser;
use entrymark::{disassemble, generate_bookmarks, plugin_info, Arch};
use memmap2::Mmap;
use std::fs::File;

/// Per-instruction upper bound used to window the bytes handed to the
/// disassembler.
const MAX_INSTRUCTION_LEN: usize = 16;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to a PE file
    input: String,

    /// Disassemble this many instructions at the resolved entry point
    #[arg(long, value_name = "COUNT")]
    disasm: Option<usize>,

    /// Architecture tag for disassembly: x86, x64, arm, arm64, thumb,
    /// mips, mips64 (anything else falls back to x64)
    #[arg(long, default_value = "x64")]
    arch: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.input)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let info = plugin_info();
    println!("{} v{}", info.name, info.version);

    let bookmarks = generate_bookmarks(&mmap, mmap.len(), None);
    if bookmarks.is_empty() {
        anyhow::bail!("No entry point could be identified");
    }

    for bm in &bookmarks {
        println!(
            "Bookmark at file offset {:#X}: {} - {}",
            bm.offset, bm.label, bm.description
        );
    }

    if let Some(count) = args.disasm {
        let entry = bookmarks[0].offset;
        let end = mmap
            .len()
            .min(entry + count.saturating_mul(MAX_INSTRUCTION_LEN));

        println!();
        let arch = Arch::from_name(&args.arch);
        for insn in disassemble(&mmap[entry..end], entry as u64, arch, count)? {
            println!(
                "{:#010X}:  {:24}  {:8} {}",
                insn.address, insn.bytes, insn.mnemonic, insn.operands
            );
        }
    }

    Ok(())
}
