//! Bookmark records and the entry-point annotation pipeline.

use crate::pe::{self, PeHeaderInfo};
use crate::translate::{self, BufferSource, MemoryRegion};

/// 24-bit highlight color for a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A labeled byte range inside the input buffer.
///
/// `offset` always lies within the buffer the bookmark was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub offset: usize,
    pub label: String,
    pub description: String,
    pub color: Option<Rgb>,
}

/// Highlight for the entry-point bookmark; header bookmarks stay uncolored.
const ENTRY_COLOR: Rgb = Rgb { r: 255, g: 200, b: 0 };

/// Walks the PE headers of `data`, resolves the declared entry point, and
/// returns bookmarks for it and for the fixed DOS/PE headers.
///
/// `size` may be smaller than `data.len()` to simulate truncation; it is
/// clamped to the buffer length. `memory_map` describes the regions of a
/// live-process snapshot; absent (or empty), the buffer is treated as a
/// file on disk. An empty result means "no entry point could be
/// identified": not a recognizable PE, an entry RVA of zero, or an
/// address no translation strategy could map into bounds. The pipeline
/// never fails louder than that, whatever the input bytes.
pub fn generate_bookmarks(
    data: &[u8],
    size: usize,
    memory_map: Option<&[MemoryRegion]>,
) -> Vec<Bookmark> {
    let data = &data[..size.min(data.len())];

    let Some(info) = pe::walk(data, data.len()) else {
        return Vec::new();
    };

    let source = BufferSource::from_map(memory_map);
    let is_process_memory = matches!(source, BufferSource::MemoryMapped(_));

    let Some(entry_offset) = translate::resolve_entry(data, &info, source) else {
        log::debug!(
            "entry RVA {:#X} not resolvable within {} bytes",
            info.entry_rva,
            data.len()
        );
        return Vec::new();
    };

    emit(entry_offset, &info, data.len(), is_process_memory)
}

/// Assembles the bookmark list: entry point first, then the fixed DOS and
/// PE header bookmarks.
fn emit(
    entry_offset: usize,
    info: &PeHeaderInfo,
    size: usize,
    is_process_memory: bool,
) -> Vec<Bookmark> {
    // The resolver already guarantees this; re-check before emitting.
    if entry_offset >= size {
        return Vec::new();
    }

    let entry_va = info.image_base.wrapping_add(u64::from(info.entry_rva));

    let entry = if is_process_memory {
        Bookmark {
            offset: entry_offset,
            label: "OEP".to_string(),
            description: format!(
                "original entry point (VA {:#X}, RVA {:#X})",
                entry_va, info.entry_rva
            ),
            color: Some(ENTRY_COLOR),
        }
    } else {
        Bookmark {
            offset: entry_offset,
            label: "Entry Point".to_string(),
            description: format!(
                "entry point (RVA {:#X}, VA {:#X})",
                info.entry_rva, entry_va
            ),
            color: Some(ENTRY_COLOR),
        }
    };

    vec![
        entry,
        Bookmark {
            offset: 0,
            label: "DOS Header".to_string(),
            description: "IMAGE_DOS_HEADER".to_string(),
            color: None,
        },
        Bookmark {
            offset: info.pe_offset,
            label: "PE Header".to_string(),
            description: "IMAGE_NT_HEADERS".to_string(),
            color: None,
        },
    ]
}
