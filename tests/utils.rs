use pdf_cmap::{parse_cid_cmap, parse_unicode_cmap, CidCMap, Result, UnicodeCMap};

/// ToUnicode CMap as written by common PDF producers for an Identity-H font.
#[allow(dead_code)]
pub const IDENTITY_UCS: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfrange
<0000> <005E> <0020>
<005F> <0061> [<D83DDE00> <D83DDD27> <D83DDD28>]
endbfrange
1 beginbfchar
<3A51> <D840DC3E>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

/// Wrap CMap sections in the usual resource boilerplate.
#[allow(dead_code)]
pub fn cmap_program(sections: &str) -> Vec<u8> {
    format!(
        "%!PS-Adobe-3.0 Resource-CMap
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo 3 dict dup begin
  /Registry (Adobe) def
  /Ordering (Test) def
  /Supplement 0 def
end def
/CMapName /Test def
/CMapType 1 def
{}
endcmap
CMapName currentdict /CMap defineresource pop
end
end
",
        sections
    )
    .into_bytes()
}

#[allow(dead_code)]
pub fn load_cid_cmap(sections: &str) -> Result<CidCMap> {
    let _ = env_logger::try_init();
    parse_cid_cmap(&cmap_program(sections))
}

#[allow(dead_code)]
pub fn load_unicode_cmap(sections: &str) -> Result<UnicodeCMap> {
    let _ = env_logger::try_init();
    parse_unicode_cmap(&cmap_program(sections))
}
