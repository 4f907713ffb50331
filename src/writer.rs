use std::collections::BTreeMap;
use std::io::{Result, Write};

use crate::encodings::unicode_sequence_to_hex;

/// Serialize a glyph id to Unicode table as a ToUnicode CMap using the
/// `Adobe-Identity-UCS` collection and a single two byte codespace.
pub fn serialize_identity_to_unicode_cmap(table: &BTreeMap<u16, Vec<char>>) -> Vec<u8> {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = Writer::write_identity_to_unicode_cmap(&mut buffer, table);
    buffer
}

pub struct Writer;

impl Writer {
    pub fn write_identity_to_unicode_cmap<W: Write>(target: &mut W, table: &BTreeMap<u16, Vec<char>>) -> Result<()> {
        Writer::write_preamble(target)?;
        writeln!(target, "1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange")?;
        for (&glyph, dest) in table {
            writeln!(target, "1 beginbfchar")?;
            writeln!(target, "<{:04X}> <{}>", glyph, unicode_sequence_to_hex(dest))?;
            writeln!(target, "endbfchar")?;
        }
        Writer::write_trailer(target)
    }

    fn write_preamble(file: &mut dyn Write) -> Result<()> {
        file.write_all(b"/CIDInit /ProcSet findresource begin\n")?;
        file.write_all(b"12 dict begin\n")?;
        file.write_all(b"begincmap\n")?;
        file.write_all(b"/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n")?;
        file.write_all(b"/CMapName /Adobe-Identity-UCS def\n")?;
        file.write_all(b"/CMapType 2 def\n")?;
        Ok(())
    }

    fn write_trailer(file: &mut dyn Write) -> Result<()> {
        file.write_all(b"endcmap\n")?;
        file.write_all(b"CMapName currentdict /CMap defineresource pop\n")?;
        file.write_all(b"end\n")?;
        file.write_all(b"end\n")?;
        Ok(())
    }
}
