#![feature(test)]

extern crate test;
use pdf_cmap::{parse_cid_cmap, parse_unicode_cmap};

fn unicode_program(entries: u32) -> Vec<u8> {
    let mut program = String::from("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");
    for chunk in (0..entries).collect::<Vec<_>>().chunks(100) {
        program.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for code in chunk {
            program.push_str(&format!("<{:04X}> <{:04X}>\n", code, 0x4E00 + code));
        }
        program.push_str("endbfchar\n");
    }
    program.into_bytes()
}

fn cid_program(ranges: u32) -> Vec<u8> {
    let mut program = String::from("2 begincodespacerange\n<00> <80>\n<8140> <FFFF>\nendcodespacerange\n");
    program.push_str(&format!("{} begincidrange\n", ranges));
    for range in 0..ranges {
        let low = 0x8140 + range * 0x40;
        program.push_str(&format!("<{:04X}> <{:04X}> {}\n", low, low + 0x3F, range * 0x40));
    }
    program.push_str("endcidrange\n");
    program.into_bytes()
}

#[bench]
fn bench_parse_unicode_cmap(b: &mut test::test::Bencher) {
    let data = unicode_program(5000);
    b.iter(|| {
        parse_unicode_cmap(&data).unwrap();
    })
}

#[bench]
fn bench_parse_cid_cmap(b: &mut test::test::Bencher) {
    let data = cid_program(500);
    b.iter(|| {
        parse_cid_cmap(&data).unwrap();
    })
}

#[bench]
fn bench_decode_mixed_width(b: &mut test::test::Bencher) {
    let cmap = parse_cid_cmap(&cid_program(500)).unwrap();
    let content: Vec<u8> = (0..10_000u32).flat_map(|i| [0x81 + (i % 0x40) as u8, 0x40 + (i % 0x3F) as u8, 0x41]).collect();
    b.iter(|| {
        let (codes, complete) = cmap.bytes_to_character_codes(&content);
        assert!(complete);
        codes
    })
}
