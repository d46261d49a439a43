//! # Squeeze Pack Integration Tests
//!
//! File: cli/tests/pack.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! End-to-end runs of the `squeeze` binary over a small sample tree:
//!
//! ```text
//! in/
//! ├── docs/notes.txt
//! ├── photo.jpg
//! └── report.csv
//! ```
//!
//! Each test checks the produced archive's entry names, the summary table,
//! and that no temporary `.part` file survives.
//!

mod common;
use common::*;
use flate2::read::GzDecoder;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

fn single_archive(ws: &Workspace, extension: &str) -> PathBuf {
    let files = ws.output_files();
    assert_eq!(files.len(), 1, "expected exactly one output file: {:?}", files);
    let archive = files.into_iter().next().unwrap();
    let name = archive.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with(&format!(".{}", extension)), "unexpected name {}", name);
    // YYYYMMDD_HHMMSS
    let stem = &name[..name.len() - extension.len() - 1];
    assert_eq!(stem.len(), 15);
    assert_eq!(stem.as_bytes()[8], b'_');
    assert!(stem.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    archive
}

fn zip_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn tar_gz_entries(path: &Path) -> Vec<(String, String)> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            (name, content)
        })
        .collect()
}

#[test]
fn test_pack_zip_groups_by_extension() {
    let ws = Workspace::new().with_sample_tree();
    ws.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"))
        .stdout(predicate::str::contains("Mb"))
        .stdout(predicate::str::contains("Count of archived files"))
        .stdout(predicate::str::is_match(r"│ Count of archived files │ 3\s+│").unwrap());

    let archive = single_archive(&ws, "zip");
    assert_eq!(
        zip_names(&archive),
        vec![".csv/report.csv", ".jpg/photo.jpg", ".txt/notes.txt"]
    );
}

#[test]
fn test_pack_without_recursion_skips_subdirectories() {
    let ws = Workspace::new().with_sample_tree();
    ws.cmd().arg("--recursion=false").assert().success();

    let archive = single_archive(&ws, "zip");
    assert_eq!(zip_names(&archive), vec![".csv/report.csv", ".jpg/photo.jpg"]);
}

#[test]
fn test_pack_excludes_extensions() {
    let ws = Workspace::new().with_sample_tree();
    ws.cmd().args(["-e", "JPG"]).assert().success();

    let archive = single_archive(&ws, "zip");
    assert_eq!(zip_names(&archive), vec![".csv/report.csv", ".txt/notes.txt"]);
}

#[test]
fn test_pack_tar_gz_keeps_contents() {
    let ws = Workspace::new().with_sample_tree();
    ws.cmd().args(["-m", "tar.gz"]).assert().success();

    let archive = single_archive(&ws, "tar.gz");
    assert_eq!(
        tar_gz_entries(&archive),
        vec![
            (".csv/report.csv".to_string(), "a,b\n1,2\n".to_string()),
            (".jpg/photo.jpg".to_string(), "not really a jpeg".to_string()),
            (".txt/notes.txt".to_string(), "remember the milk".to_string()),
        ]
    );
}

#[test]
fn test_pack_groups_extensionless_files_as_unknown() {
    let ws = Workspace::new();
    ws.file("Makefile", "all:\n").file("a.TXT", "upper");
    ws.cmd().assert().success();

    let archive = single_archive(&ws, "zip");
    assert_eq!(zip_names(&archive), vec![".txt/a.TXT", "unknown/Makefile"]);
}

#[test]
fn test_pack_uses_config_file_defaults() {
    let ws = Workspace::new().with_sample_tree();
    fs::write(
        ws.config(),
        "[defaults]\nmode = \"tar.gz\"\nrecursive = false\nexclude = [\"csv\"]\n",
    )
    .unwrap();
    ws.cmd().assert().success();

    let archive = single_archive(&ws, "tar.gz");
    let names: Vec<String> = tar_gz_entries(&archive).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec![".jpg/photo.jpg"]);
}

#[test]
fn test_flags_override_config_file() {
    let ws = Workspace::new().with_sample_tree();
    fs::write(ws.config(), "[defaults]\nmode = \"tar.gz\"\n").unwrap();
    ws.cmd().args(["-m", "zip"]).assert().success();
    single_archive(&ws, "zip");
}

#[test]
fn test_invalid_mode_fails_without_output() {
    let ws = Workspace::new().with_sample_tree();
    ws.cmd()
        .args(["-m", "rar"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("invalid mode: rar"));
    assert!(ws.output_files().is_empty());
}

#[test]
fn test_error_is_reported_once() {
    let ws = Workspace::new().with_sample_tree();
    let output = ws.cmd().args(["-m", "rar"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("invalid mode: rar").count(), 1, "stderr: {}", stderr);
    assert_eq!(stderr.matches("Error:").count(), 1, "stderr: {}", stderr);
}

#[test]
fn test_pack_dotfiles_group_by_name_and_can_be_excluded() {
    let ws = Workspace::new();
    ws.file(".bashrc", "export A=1").file("a.txt", "a");
    ws.cmd().assert().success();
    let archive = single_archive(&ws, "zip");
    assert_eq!(zip_names(&archive), vec![".bashrc/.bashrc", ".txt/a.txt"]);
    fs::remove_file(&archive).unwrap();

    ws.cmd().args(["-e", "bashrc"]).assert().success();
    let archive = single_archive(&ws, "zip");
    assert_eq!(zip_names(&archive), vec![".txt/a.txt"]);
}

#[test]
fn test_missing_input_fails() {
    let ws = Workspace::new();
    squeeze_cmd()
        .env("SQUEEZE_CONFIG", ws.config())
        .arg("-i")
        .arg(ws.path().join("nope"))
        .arg("-o")
        .arg(ws.output())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid input path"));
}

#[test]
fn test_broken_config_file_fails() {
    let ws = Workspace::new().with_sample_tree();
    fs::write(ws.config(), "[defaults]\ncolour = \"blue\"\n").unwrap();
    ws.cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
    assert!(ws.output_files().is_empty());
}

#[test]
fn test_output_directory_is_created_and_has_no_leftovers() {
    let ws = Workspace::new().with_sample_tree();
    assert!(!ws.output().exists());
    ws.cmd().args(["-m", "tar.gz"]).assert().success();

    let leftovers: Vec<PathBuf> = ws
        .output_files()
        .into_iter()
        .filter(|p| p.to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty(), "temporary files left: {:?}", leftovers);
    single_archive(&ws, "tar.gz");
}
