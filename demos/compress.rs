use log::info;
use sequitur_grammar::Sequitur;
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::process;

/// Builds a grammar over the bytes of a file and reports how well it
/// compresses.
///
/// Usage: cargo run --example compress <filename>
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <filename>", args[0]);
        process::exit(1);
    }

    if let Err(err) = run(&args[1]) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(filename)
        .map_err(|err| format!("File \"{filename}\" could not be opened: {err}"))?;

    let mut seq = Sequitur::new();
    for (count, byte) in BufReader::new(file).bytes().enumerate() {
        seq.push(byte?)?;
        if (count + 1) % 100_000 == 0 {
            info!("{} bytes read", count + 1);
        }
    }

    // Reconstruct and compare against the file.
    let mut original = Vec::new();
    File::open(filename)?.read_to_end(&mut original)?;
    if seq.len() != original.len() {
        return Err(format!("read {} bytes but file has {}", seq.len(), original.len()).into());
    }
    if let Some(position) = seq
        .iter()
        .zip(&original)
        .position(|(rebuilt, byte)| rebuilt != byte)
    {
        return Err(format!("reconstruction differs at byte {position}").into());
    }
    seq.verify()?;

    let stats = seq.stats();
    let grammar = seq.finish()?;

    println!("=== Statistics ===");
    println!("Total bytes inserted: {}", stats.input_length);
    println!("Symbols in grammar: {}", stats.grammar_symbols);
    println!("Rules created: {}", grammar.len());
    println!("Compression ratio: {:.2}%", stats.compression_ratio());
    Ok(())
}
