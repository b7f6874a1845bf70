use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use docsim_cli::init_tracing;
use docsim_core::TextExtractor;
use docsim_extract::FileExtractor;
use docsim_text::TextNormalizer;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file>", args[0]);
        return ExitCode::from(2);
    }
    init_tracing("warn");

    let path = PathBuf::from(&args[1]);
    match FileExtractor::default().extract(&path) {
        Ok(raw) => {
            println!("{}", TextNormalizer::new().normalize(&raw));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(if e.is_client_error() { 2 } else { 1 })
        }
    }
}
