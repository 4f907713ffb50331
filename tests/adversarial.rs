use pdf_cmap::{parse_cid_cmap, parse_unicode_cmap, Error, ParseError, ParseOptions, ToUnicodeMapping};
use rand::RngExt as _;

mod utils;
use utils::IDENTITY_UCS;

const TOKENS: &[&str] = &[
    "<00>",
    "<FFFF>",
    "<D835DC50>",
    "<0000> <FFFF>",
    "[",
    "]",
    "<<",
    ">>",
    "(Adobe)",
    "/Registry",
    "/CMapName",
    "/CMapType",
    "/CMapVersion",
    "/CIDSystemInfo",
    "/WMode",
    "1",
    "-7",
    "65536",
    "1.5.2",
    "def",
    "begin",
    "end",
    "usecmap",
    "begincodespacerange",
    "endcodespacerange",
    "begincidrange",
    "endcidrange",
    "begincidchar",
    "beginbfchar",
    "endbfchar",
    "beginbfrange",
    "endbfrange",
    "%comment\n",
];

fn parse_both(data: &[u8]) {
    let _ = parse_cid_cmap(data);
    let _ = parse_unicode_cmap(data);
}

#[test]
fn random_bytes_terminate() {
    let _ = env_logger::try_init();
    let mut rng = rand::rng();
    let mut data = [0u8; 512];
    for _ in 0..500 {
        rng.fill(&mut data);
        let len = usize::from(data[0]) * 2;
        parse_both(&data[..len]);
    }
}

#[test]
fn random_token_soup_terminates() {
    let mut rng = rand::rng();
    let mut picks = [0u8; 200];
    for _ in 0..500 {
        rng.fill(&mut picks);
        let program = picks
            .iter()
            .map(|&pick| TOKENS[usize::from(pick) % TOKENS.len()])
            .collect::<Vec<_>>()
            .join(" ");
        parse_both(program.as_bytes());
    }
}

#[test]
fn every_truncation_is_handled() {
    for len in 0..IDENTITY_UCS.len() {
        parse_both(&IDENTITY_UCS[..len]);
    }
}

#[test]
fn deep_nesting_is_an_error() {
    for open in ["[", "<<", "("] {
        let data = open.repeat(100_000);
        assert!(parse_unicode_cmap(data.as_bytes()).is_err(), "{}", open);
    }
    let err = parse_unicode_cmap("[".repeat(1000).as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::NestingLimit { .. })));
}

#[test]
fn nesting_limit_is_configurable() {
    let data = format!("{}{}", "[".repeat(150), "]".repeat(150));
    assert!(parse_unicode_cmap(data.as_bytes()).is_err());
    let options = ParseOptions::builder().max_depth(200).build();
    assert!(pdf_cmap::parse_unicode_cmap_with_options(data.as_bytes(), &options).is_ok());
}

#[test]
fn unterminated_scalars_give_up() {
    let names = "/Name ".repeat(10_000);
    for keyword in ["/CMapName", "/CMapType", "/CMapVersion", "/WMode", "/CIDSystemInfo"] {
        let data = format!("{} {}", keyword, names);
        let err = parse_cid_cmap(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::BadCMap(_)), "{}", keyword);
    }
}

#[test]
fn huge_ranges_stay_compact() {
    let data = b"1 begincodespacerange <00000000> <FFFFFFFF> endcodespacerange
1 begincidrange <00000000> <FFFFFFFF> 0 endcidrange
1 beginbfrange <00000000> <FFFFFFFF> <0020> endbfrange";
    let cmap = parse_cid_cmap(data).unwrap();
    assert_eq!(cmap.cid(0xFFFF), Some(0xFFFF));
    assert_eq!(cmap.cid(0x1_0000), None);
    let unicode = parse_unicode_cmap(data).unwrap();
    assert_eq!(unicode.get(0x21), Some(vec!['A']));
}

#[test]
fn wide_ligature_ranges_are_not_materialized() {
    let lines = "<0000> <FFFF> <00660066>\n".repeat(64);
    let data = format!("64 beginbfrange\n{}endbfrange", lines);
    let cmap = parse_unicode_cmap(data.as_bytes()).unwrap();
    assert_eq!(cmap.mappings().len(), 64);
    for mapping in cmap.mappings() {
        match mapping {
            ToUnicodeMapping::RangeSequence { dest, .. } => assert_eq!(dest, &vec!['f', 'f']),
            other => panic!("expected a compact ligature range, got {:?}", other),
        }
    }
    assert_eq!(cmap.get(0x0001), Some(vec!['f', 'g']));
    assert_eq!(cmap.get(0xFFFF), Some(vec!['f', '\u{10065}']));
}

#[test]
fn huge_nesting_limit_returns_an_error() {
    let options = ParseOptions::builder().max_depth(usize::MAX).build();
    let data = "[".repeat(1_000_000);
    let err = pdf_cmap::parse_unicode_cmap_with_options(data.as_bytes(), &options).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::NestingLimit { .. })));
    let err = pdf_cmap::parse_cid_cmap_with_options(data.as_bytes(), &options).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::NestingLimit { .. })));
}
