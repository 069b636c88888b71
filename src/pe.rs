//! PE header walking: DOS header, NT headers, and the Optional Header
//! fields needed to locate the entry point.

/// Smallest buffer worth inspecting; real PE images are never shorter.
const MIN_IMAGE_SIZE: usize = 0x100;

/// DOS signature at offset 0.
const DOS_SIGNATURE: &[u8; 2] = b"MZ";

/// Offset of `e_lfanew`, the 32-bit pointer to the NT headers.
const PE_OFFSET_FIELD: usize = 0x3C;

/// NT signature at `e_lfanew`.
const PE_SIGNATURE: &[u8; 4] = b"PE\0\0";

/// Room required past `e_lfanew` for the PE signature, the COFF header,
/// and the fixed part of the Optional Header.
const NT_HEADERS_ROOM: usize = 0x100;

/// Optional Header magic selecting the 64-bit (PE32+) layout. Any other
/// value selects the 32-bit layout.
const PE32_PLUS_MAGIC: u16 = 0x20B;

/// Byte distance from the PE signature to the Optional Header.
const OPT_HEADER_DELTA: usize = 24;

/// Header fields extracted from one walk, valid only for the buffer they
/// were read from.
#[derive(Debug, Clone, Copy)]
pub struct PeHeaderInfo {
    pub pe_offset: usize,
    pub is_pe32_plus: bool,
    pub image_base: u64,
    pub entry_rva: u32,
    pub section_table_offset: usize,
    pub num_sections: u16,
    pub opt_header_size: u16,
}

/// Walks the DOS and NT headers of `data`, returning the fields needed for
/// entry-point resolution.
///
/// Returns `None` for anything that is not a plausible PE image: a buffer
/// shorter than the minimum image size, missing signatures, header fields
/// that do not fit inside `size`, or an entry-point RVA of zero (object
/// files and many DLLs declare no start routine). Reads never go past
/// `size` no matter how the header fields are manipulated.
pub fn walk(data: &[u8], size: usize) -> Option<PeHeaderInfo> {
    let data = &data[..size.min(data.len())];

    if data.len() < MIN_IMAGE_SIZE {
        log::debug!("buffer too small for a PE image: {} bytes", data.len());
        return None;
    }

    if &data[..2] != DOS_SIGNATURE {
        log::debug!("missing MZ signature");
        return None;
    }

    let pe_offset = read_u32(data, PE_OFFSET_FIELD)? as usize;

    // The NT headers and the fixed part of the Optional Header must fit
    // before any field arithmetic proceeds.
    let nt_end = pe_offset.checked_add(NT_HEADERS_ROOM)?;
    if nt_end > data.len() {
        log::debug!("e_lfanew {:#X} leaves no room for NT headers", pe_offset);
        return None;
    }

    if &data[pe_offset..pe_offset + 4] != PE_SIGNATURE {
        log::debug!("missing PE signature at {:#X}", pe_offset);
        return None;
    }

    let num_sections = read_u16(data, pe_offset + 6)?;
    let opt_header_size = read_u16(data, pe_offset + 20)?;

    let opt_offset = pe_offset + OPT_HEADER_DELTA;
    if opt_offset.checked_add(0x28)? > data.len() {
        return None;
    }

    let magic = read_u16(data, opt_offset)?;
    let is_pe32_plus = magic == PE32_PLUS_MAGIC;

    // PE32+ stores ImageBase as a QWORD at +0x18; PE32 as a DWORD at +0x1C.
    // The entry-point RVA sits at +0x10 in both layouts.
    let image_base = if is_pe32_plus {
        read_u64(data, opt_offset + 0x18)?
    } else {
        u64::from(read_u32(data, opt_offset + 0x1C)?)
    };

    let entry_rva = read_u32(data, opt_offset + 0x10)?;
    if entry_rva == 0 {
        log::debug!("entry-point RVA is zero, no start routine");
        return None;
    }

    let section_table_offset = opt_offset.checked_add(opt_header_size as usize)?;

    Some(PeHeaderInfo {
        pe_offset,
        is_pe32_plus,
        image_base,
        entry_rva,
        section_table_offset,
        num_sections,
        opt_header_size,
    })
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset.checked_add(8)?)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}
