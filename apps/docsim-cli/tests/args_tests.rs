use std::path::PathBuf;

use docsim_cli::{collect_inputs, parse_args, CliArgs};
use tempfile::TempDir;

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parses_files_and_flags() {
    let parsed = parse_args(args(&["a.txt", "--compact", "--dir", "docs", "b.pdf"])).unwrap();
    assert_eq!(
        parsed,
        CliArgs {
            files: vec![PathBuf::from("a.txt"), PathBuf::from("b.pdf")],
            dir: Some(PathBuf::from("docs")),
            compact: true,
            help: false,
        }
    );
}

#[test]
fn rejects_bad_options() {
    assert!(parse_args(args(&["--dir"])).is_err());
    let err = parse_args(args(&["--verbose"])).unwrap_err();
    assert!(err.to_string().contains("--verbose"));
}

#[test]
fn directory_inputs_are_sorted_after_explicit_files() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("nested")).unwrap();
    std::fs::write(tmp.path().join("b.txt"), "b").unwrap();
    std::fs::write(tmp.path().join("a.txt"), "a").unwrap();
    std::fs::write(tmp.path().join("nested/c.txt"), "c").unwrap();

    let parsed = CliArgs { files: vec![PathBuf::from("first.txt")], dir: Some(tmp.path().to_path_buf()), ..Default::default() };
    let inputs = collect_inputs(&parsed);
    assert_eq!(
        inputs,
        vec![
            PathBuf::from("first.txt"),
            tmp.path().join("a.txt"),
            tmp.path().join("b.txt"),
            tmp.path().join("nested/c.txt"),
        ]
    );
}
