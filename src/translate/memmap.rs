//! RVA translation through a live-process memory map.

use super::MemoryRegion;
use crate::pe::PeHeaderInfo;

/// Maps the entry point's virtual address (`image_base + rva`) to a buffer
/// offset via the first region whose virtual range contains it.
///
/// When no region matches, or the matched region maps the address outside
/// the buffer, the RVA itself is tried as a direct buffer offset, valid
/// for snapshots laid out contiguously from RVA 0.
pub(super) fn resolve(data: &[u8], info: &PeHeaderInfo, regions: &[MemoryRegion]) -> Option<usize> {
    if let Some(entry_va) = info.image_base.checked_add(u64::from(info.entry_rva)) {
        for region in regions {
            if entry_va < region.virtual_address
                || entry_va - region.virtual_address >= region.size
            {
                continue;
            }

            let offset = region
                .buffer_offset
                .checked_add(entry_va - region.virtual_address);
            match offset {
                Some(offset) if offset < data.len() as u64 => return Some(offset as usize),
                _ => {
                    log::debug!(
                        "VA {:#X} maps outside the snapshot, trying direct offset",
                        entry_va
                    );
                    break;
                }
            }
        }
    }

    let direct = info.entry_rva as usize;
    if direct < data.len() {
        return Some(direct);
    }

    None
}
