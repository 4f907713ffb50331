use std::fs;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use pdf_cmap::{CidCMap, UnicodeCMap};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Parse a CMap resource and print what it declares.",
    arg_required_else_help = true
)]
pub struct Args {
    pub cmap_path: PathBuf,

    /// Read the file as a ToUnicode CMap instead of a CID CMap.
    #[clap(short, long)]
    pub unicode: bool,

    /// Print every mapping instead of a summary.
    #[clap(short, long)]
    pub table: bool,

    /// Print the parsed CMap as JSON.
    #[clap(long)]
    pub json: bool,
}

fn to_io_error(err: pdf_cmap::Error) -> Error {
    Error::new(ErrorKind::InvalidData, err.to_string())
}

fn dump_cid_cmap(cmap: &CidCMap, args: &Args) -> Result<(), Error> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(cmap).map_err(Error::other)?);
        return Ok(());
    }
    println!("Name: {}", cmap.name());
    println!(
        "System: {}-{}-{}",
        cmap.system_info().registry,
        cmap.system_info().ordering,
        cmap.system_info().supplement
    );
    println!("Writing mode: {:?}", cmap.writing_mode());
    if let Some(base) = cmap.use_cmap() {
        println!("Uses: {}", base);
    }
    for codespace in cmap.codespaces() {
        println!(
            "Codespace: {} byte(s) {:X}..={:X}",
            codespace.num_bytes, codespace.low, codespace.high
        );
    }
    println!("CID ranges: {}", cmap.cid_ranges().len());
    if args.table {
        for (code, cid) in cmap.flatten_to_cid_table() {
            println!("{:X} -> {}", code, cid);
        }
    }
    Ok(())
}

fn dump_unicode_cmap(cmap: &UnicodeCMap, args: &Args) -> Result<(), Error> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(cmap).map_err(Error::other)?);
        return Ok(());
    }
    if let Some(base) = cmap.use_cmap() {
        println!("Uses: {}", base);
    }
    println!("Mappings: {}", cmap.mappings().len());
    if args.table {
        for (code, text) in cmap.flatten_to_unicode_table() {
            println!("{:X} -> {}", code, text.into_iter().collect::<String>());
        }
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();
    let data = fs::read(&args.cmap_path)?;

    let start_time = Instant::now();
    if args.unicode {
        let cmap = UnicodeCMap::parse(&data).map_err(to_io_error)?;
        eprintln!("Parsed in {:?}", start_time.elapsed());
        dump_unicode_cmap(&cmap, &args)
    } else {
        let cmap = CidCMap::parse(&data).map_err(to_io_error)?;
        eprintln!("Parsed in {:?}", start_time.elapsed());
        dump_cid_cmap(&cmap, &args)
    }
}
