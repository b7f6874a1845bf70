//! Shared plumbing for the docsim binaries: argument parsing, input
//! collection and logging setup.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

pub const USAGE: &str = "Usage: docsim [--dir DIR] [--compact] FILE...";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub files: Vec<PathBuf>,
    pub dir: Option<PathBuf>,
    pub compact: bool,
    pub help: bool,
}

pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dir" | "-d" => match args.next() {
                Some(dir) => parsed.dir = Some(PathBuf::from(dir)),
                None => bail!("--dir requires a directory"),
            },
            "--compact" | "-c" => parsed.compact = true,
            "--help" | "-h" => parsed.help = true,
            flag if flag.starts_with('-') => bail!("unknown option: {flag}"),
            _ => parsed.files.push(PathBuf::from(&arg)),
        }
    }
    Ok(parsed)
}

/// Explicit files first, then every regular file under `--dir` in path order.
pub fn collect_inputs(args: &CliArgs) -> Vec<PathBuf> {
    let mut inputs = args.files.clone();
    if let Some(dir) = &args.dir {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        found.sort();
        inputs.extend(found);
    }
    inputs
}

/// Log to stderr so stdout carries only results. `RUST_LOG` wins over
/// `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}
