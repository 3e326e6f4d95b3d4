//! Compiled binary blob records (shader IR and scripted-event binaries)
//!
//! Two kinds of precompiled blobs can ride along in an archive: shader
//! intermediate code (opaque to this layer, same as textures) and native
//! scripted-event binaries. Scripted-event blobs are ELF64 shared objects;
//! their exported function names are scanned out of the symbol table on
//! every load so the event subsystem can dispatch into them by name. The
//! export list is never stored in the archive.

use crate::pff::error::{Category, PffError, Result};
use crate::pff::reader::SliceReader;
use binrw::{BinRead, io::Cursor};

/// Kind of a compiled blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScriptKind {
    /// Precompiled shader intermediate (SPIR-V), opaque bytes
    ShaderIr = 0,
    /// Native scripted-event binary, ELF64 shared object
    ScriptBinary = 1,
}

impl ScriptKind {
    /// Decode the wire byte, `None` for unknown values
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ShaderIr),
            1 => Some(Self::ScriptBinary),
            _ => None,
        }
    }

    /// Conventional file extension for extracted blobs
    pub fn extension(self) -> &'static str {
        match self {
            Self::ShaderIr => "spv",
            Self::ScriptBinary => "so",
        }
    }
}

/// One compiled blob plus its load-time derived export list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRecord {
    /// Blob kind discriminator
    pub kind: ScriptKind,

    /// Raw compiled bytes, copied verbatim
    pub data: Vec<u8>,

    /// Exported global function names, sorted and deduplicated
    ///
    /// Recomputed on every load for [`ScriptKind::ScriptBinary`]; always
    /// empty for shader blobs.
    pub exports: Vec<String>,
}

impl ScriptRecord {
    /// Wrap a blob, scanning exports when it is a scripted-event binary
    pub fn new(kind: ScriptKind, data: Vec<u8>) -> Result<Self> {
        let exports = match kind {
            ScriptKind::ShaderIr => Vec::new(),
            ScriptKind::ScriptBinary => elf::scan_exports(&data)?,
        };
        Ok(Self {
            kind,
            data,
            exports,
        })
    }

    pub(crate) fn read(reader: &mut SliceReader<'_>) -> Result<Self> {
        let kind_offset = reader.position();
        let kind_byte = reader.read_u8(Category::Scripts)?;
        let kind = ScriptKind::from_u8(kind_byte).ok_or_else(|| PffError::Corrupt {
            category: Category::Scripts,
            offset: kind_offset,
            reason: format!("unknown blob kind byte {kind_byte:#04x}"),
        })?;

        let payload = reader.read_length_prefixed(Category::Scripts)?;
        Self::new(kind, payload.to_vec())
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.push(self.kind as u8);
        out.extend_from_slice(&(self.data.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.data);
    }
}

/// Minimal ELF64 reader, just enough to walk a symbol table
///
/// Only little-endian 64-bit objects are accepted, matching what the build
/// pipeline emits for scripted events. Anything else fails with
/// [`PffError::InvalidScriptBinary`] rather than being half-parsed.
mod elf {
    use super::{BinRead, Cursor, PffError, Result};

    const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
    const CLASS_64: u8 = 2;
    const DATA_LSB: u8 = 1;
    const IDENT_SIZE: usize = 16;
    const EHDR_SIZE: usize = 64;
    const SHDR_SIZE: u64 = 64;
    const SYM_SIZE: u64 = 24;

    const SHT_SYMTAB: u32 = 2;
    const SHT_STRTAB: u32 = 3;
    const SHT_DYNSYM: u32 = 11;

    const STT_FUNC: u8 = 2;
    const STB_GLOBAL: u8 = 1;
    const STB_WEAK: u8 = 2;
    const SHN_UNDEF: u16 = 0;

    /// ELF64 file header, minus the 16 identification bytes
    #[derive(Debug, BinRead)]
    #[br(little)]
    struct FileHeader {
        _e_type: u16,
        _e_machine: u16,
        _e_version: u32,
        _e_entry: u64,
        _e_phoff: u64,
        e_shoff: u64,
        _e_flags: u32,
        _e_ehsize: u16,
        _e_phentsize: u16,
        _e_phnum: u16,
        e_shentsize: u16,
        e_shnum: u16,
        _e_shstrndx: u16,
    }

    #[derive(Debug, BinRead)]
    #[br(little)]
    struct SectionHeader {
        _sh_name: u32,
        sh_type: u32,
        _sh_flags: u64,
        _sh_addr: u64,
        sh_offset: u64,
        sh_size: u64,
        sh_link: u32,
        _sh_info: u32,
        _sh_addralign: u64,
        sh_entsize: u64,
    }

    #[derive(Debug, BinRead)]
    #[br(little)]
    struct SymbolEntry {
        st_name: u32,
        st_info: u8,
        _st_other: u8,
        st_shndx: u16,
        _st_value: u64,
        _st_size: u64,
    }

    fn invalid(reason: impl Into<String>) -> PffError {
        PffError::InvalidScriptBinary {
            reason: reason.into(),
        }
    }

    /// Scan the exported global function names out of an ELF64 shared object
    ///
    /// Prefers `.dynsym` and falls back to `.symtab`. Names are returned
    /// sorted and deduplicated so the scan is deterministic.
    pub(super) fn scan_exports(data: &[u8]) -> Result<Vec<String>> {
        if data.len() < EHDR_SIZE {
            return Err(invalid(format!(
                "{} bytes is too short for an ELF header",
                data.len()
            )));
        }
        if data[..4] != ELF_MAGIC {
            return Err(invalid("missing ELF magic"));
        }
        if data[4] != CLASS_64 {
            return Err(invalid("not a 64-bit object"));
        }
        if data[5] != DATA_LSB {
            return Err(invalid("not little-endian"));
        }

        let mut cursor = Cursor::new(&data[IDENT_SIZE..]);
        let header = FileHeader::read(&mut cursor)
            .map_err(|e| invalid(format!("malformed ELF header: {e}")))?;

        if u64::from(header.e_shentsize) != SHDR_SIZE {
            return Err(invalid(format!(
                "unexpected section header entry size {}",
                header.e_shentsize
            )));
        }
        let shnum = u64::from(header.e_shnum);
        let table_end = header
            .e_shoff
            .checked_add(shnum * SHDR_SIZE)
            .ok_or_else(|| invalid("section header table offset overflows"))?;
        if header.e_shoff < EHDR_SIZE as u64 || table_end > data.len() as u64 {
            return Err(invalid("section header table out of bounds"));
        }

        let mut sections = Vec::with_capacity(header.e_shnum as usize);
        let mut section_cursor = Cursor::new(&data[header.e_shoff as usize..table_end as usize]);
        for _ in 0..header.e_shnum {
            let section = SectionHeader::read(&mut section_cursor)
                .map_err(|e| invalid(format!("malformed section header: {e}")))?;
            sections.push(section);
        }

        let symtab = sections
            .iter()
            .find(|section| section.sh_type == SHT_DYNSYM)
            .or_else(|| {
                sections
                    .iter()
                    .find(|section| section.sh_type == SHT_SYMTAB)
            })
            .ok_or_else(|| invalid("no symbol table section"))?;

        if symtab.sh_entsize != SYM_SIZE {
            return Err(invalid(format!(
                "unexpected symbol entry size {}",
                symtab.sh_entsize
            )));
        }
        let strtab = sections
            .get(symtab.sh_link as usize)
            .ok_or_else(|| invalid("symbol table links to a missing string table"))?;
        if strtab.sh_type != SHT_STRTAB {
            return Err(invalid("symbol table links to a non-string-table section"));
        }

        let symbols = section_bytes(data, symtab)?;
        let strings = section_bytes(data, strtab)?;

        let mut exports = Vec::new();
        let mut symbol_cursor = Cursor::new(symbols);
        for _ in 0..symbols.len() as u64 / SYM_SIZE {
            let symbol = SymbolEntry::read(&mut symbol_cursor)
                .map_err(|e| invalid(format!("malformed symbol entry: {e}")))?;

            let binding = symbol.st_info >> 4;
            let kind = symbol.st_info & 0x0f;
            if kind != STT_FUNC
                || !(binding == STB_GLOBAL || binding == STB_WEAK)
                || symbol.st_shndx == SHN_UNDEF
            {
                continue;
            }

            let name = read_name(strings, symbol.st_name)?;
            if !name.is_empty() {
                exports.push(name);
            }
        }

        exports.sort_unstable();
        exports.dedup();
        Ok(exports)
    }

    fn section_bytes<'a>(data: &'a [u8], section: &SectionHeader) -> Result<&'a [u8]> {
        let end = section
            .sh_offset
            .checked_add(section.sh_size)
            .ok_or_else(|| invalid("section extent overflows"))?;
        if end > data.len() as u64 {
            return Err(invalid("section extends past the end of the blob"));
        }
        Ok(&data[section.sh_offset as usize..end as usize])
    }

    fn read_name(strings: &[u8], offset: u32) -> Result<String> {
        let start = offset as usize;
        if start >= strings.len() {
            return Err(invalid("symbol name offset past the string table"));
        }
        let tail = &strings[start..];
        let end = tail
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| invalid("unterminated symbol name"))?;
        String::from_utf8(tail[..end].to_vec())
            .map_err(|e| invalid(format!("symbol name is not UTF-8: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Symbol description for [`build_test_elf`]: name, info byte, section index
    type TestSymbol<'a> = (&'a str, u8, u16);

    /// Assemble a minimal ELF64 shared object with a `.dynsym`/`.dynstr` pair
    fn build_test_elf(symbols: &[TestSymbol<'_>]) -> Vec<u8> {
        const SHOFF: u64 = 64;
        const SYMOFF: u64 = SHOFF + 3 * 64;

        // String table: leading NUL, then each name NUL-terminated
        let mut strtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for (name, _, _) in symbols {
            name_offsets.push(strtab.len() as u32);
            strtab.extend_from_slice(name.as_bytes());
            strtab.push(0);
        }

        let mut symtab = Vec::new();
        for ((_, info, shndx), name_offset) in symbols.iter().zip(&name_offsets) {
            symtab.extend_from_slice(&name_offset.to_le_bytes());
            symtab.push(*info);
            symtab.push(0); // st_other
            symtab.extend_from_slice(&shndx.to_le_bytes());
            symtab.extend_from_slice(&0u64.to_le_bytes()); // st_value
            symtab.extend_from_slice(&0u64.to_le_bytes()); // st_size
        }
        let stroff = SYMOFF + symtab.len() as u64;

        let mut elf = Vec::new();
        // e_ident
        elf.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1]);
        elf.resize(16, 0);
        elf.extend_from_slice(&3u16.to_le_bytes()); // e_type = ET_DYN
        elf.extend_from_slice(&0x3eu16.to_le_bytes()); // e_machine = x86-64
        elf.extend_from_slice(&1u32.to_le_bytes()); // e_version
        elf.extend_from_slice(&0u64.to_le_bytes()); // e_entry
        elf.extend_from_slice(&0u64.to_le_bytes()); // e_phoff
        elf.extend_from_slice(&SHOFF.to_le_bytes()); // e_shoff
        elf.extend_from_slice(&0u32.to_le_bytes()); // e_flags
        elf.extend_from_slice(&64u16.to_le_bytes()); // e_ehsize
        elf.extend_from_slice(&0u16.to_le_bytes()); // e_phentsize
        elf.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
        elf.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
        elf.extend_from_slice(&3u16.to_le_bytes()); // e_shnum
        elf.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
        assert_eq!(elf.len(), 64);

        let push_section =
            |elf: &mut Vec<u8>, sh_type: u32, offset: u64, size: u64, link: u32, entsize: u64| {
                elf.extend_from_slice(&0u32.to_le_bytes()); // sh_name
                elf.extend_from_slice(&sh_type.to_le_bytes());
                elf.extend_from_slice(&0u64.to_le_bytes()); // sh_flags
                elf.extend_from_slice(&0u64.to_le_bytes()); // sh_addr
                elf.extend_from_slice(&offset.to_le_bytes());
                elf.extend_from_slice(&size.to_le_bytes());
                elf.extend_from_slice(&link.to_le_bytes());
                elf.extend_from_slice(&0u32.to_le_bytes()); // sh_info
                elf.extend_from_slice(&0u64.to_le_bytes()); // sh_addralign
                elf.extend_from_slice(&entsize.to_le_bytes());
            };

        push_section(&mut elf, 0, 0, 0, 0, 0); // SHT_NULL
        push_section(&mut elf, 11, SYMOFF, symtab.len() as u64, 2, 24); // .dynsym
        push_section(&mut elf, 3, stroff, strtab.len() as u64, 0, 0); // .dynstr

        elf.extend_from_slice(&symtab);
        elf.extend_from_slice(&strtab);
        elf
    }

    const GLOBAL_FUNC: u8 = (1 << 4) | 2;
    const WEAK_FUNC: u8 = (2 << 4) | 2;
    const LOCAL_FUNC: u8 = 2;
    const GLOBAL_OBJECT: u8 = (1 << 4) | 1;

    #[test]
    fn test_export_scan_filters_and_sorts() {
        let blob = build_test_elf(&[
            ("zeta_event", GLOBAL_FUNC, 1),
            ("on_trigger", GLOBAL_FUNC, 1),
            ("helper", LOCAL_FUNC, 1),          // local, skipped
            ("imported", GLOBAL_FUNC, 0),       // undefined, skipped
            ("some_global", GLOBAL_OBJECT, 1),  // not a function, skipped
            ("weak_hook", WEAK_FUNC, 1),
        ]);

        let record =
            ScriptRecord::new(ScriptKind::ScriptBinary, blob).expect("Operation should succeed");
        assert_eq!(record.exports, vec!["on_trigger", "weak_hook", "zeta_event"]);
    }

    #[test]
    fn test_duplicate_exports_deduplicated() {
        let blob = build_test_elf(&[
            ("on_trigger", GLOBAL_FUNC, 1),
            ("on_trigger", WEAK_FUNC, 1),
        ]);
        let record =
            ScriptRecord::new(ScriptKind::ScriptBinary, blob).expect("Operation should succeed");
        assert_eq!(record.exports, vec!["on_trigger"]);
    }

    #[test]
    fn test_shader_blob_is_opaque() {
        // SPIR-V magic, not ELF; must pass through unscanned
        let record = ScriptRecord::new(ScriptKind::ShaderIr, vec![0x03, 0x02, 0x23, 0x07])
            .expect("Operation should succeed");
        assert!(record.exports.is_empty());
    }

    #[test]
    fn test_non_elf_script_rejected() {
        let err = ScriptRecord::new(ScriptKind::ScriptBinary, vec![0u8; 128]).unwrap_err();
        assert!(matches!(err, PffError::InvalidScriptBinary { .. }));
    }

    #[test]
    fn test_short_blob_rejected() {
        let err = ScriptRecord::new(ScriptKind::ScriptBinary, vec![0x7f, b'E', b'L', b'F'])
            .unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_32bit_elf_rejected() {
        let mut blob = build_test_elf(&[]);
        blob[4] = 1; // ELFCLASS32
        let err = ScriptRecord::new(ScriptKind::ScriptBinary, blob).unwrap_err();
        assert!(err.to_string().contains("64-bit"));
    }

    #[test]
    fn test_section_table_out_of_bounds_rejected() {
        let mut blob = build_test_elf(&[("f", GLOBAL_FUNC, 1)]);
        let past_eof = blob.len() as u64;
        blob[40..48].copy_from_slice(&past_eof.to_le_bytes()); // e_shoff past EOF
        let err = ScriptRecord::new(ScriptKind::ScriptBinary, blob).unwrap_err();
        assert!(matches!(err, PffError::InvalidScriptBinary { .. }));
    }

    #[test]
    fn test_record_round_trip() {
        let blob = build_test_elf(&[("on_load", GLOBAL_FUNC, 1)]);
        let original = ScriptRecord::new(ScriptKind::ScriptBinary, blob)
            .expect("Operation should succeed");

        let mut buffer = Vec::new();
        original.write(&mut buffer);

        let mut reader = SliceReader::new(&buffer);
        let parsed = ScriptRecord::read(&mut reader).expect("Operation should succeed");
        assert_eq!(original, parsed);
        assert_eq!(parsed.exports, vec!["on_load"]);
    }

    #[test]
    fn test_unknown_kind_byte_rejected() {
        let mut buffer = Vec::new();
        ScriptRecord::new(ScriptKind::ShaderIr, vec![1, 2])
            .expect("Operation should succeed")
            .write(&mut buffer);
        buffer[0] = 9;

        let mut reader = SliceReader::new(&buffer);
        let err = ScriptRecord::read(&mut reader).unwrap_err();
        assert!(matches!(err, PffError::Corrupt { .. }));
    }
}
