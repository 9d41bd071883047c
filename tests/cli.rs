use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn dirkit(temp: &Path, args: &[&str]) -> Output {
    // Point at a missing settings file so the user's own settings are not read
    Command::new(env!("CARGO_BIN_EXE_dirkit"))
        .arg("--config")
        .arg(temp.join("no-settings.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn project(temp: &Path) -> String {
    let proj = temp.join("proj");
    fs::create_dir_all(proj.join("src")).unwrap();
    fs::create_dir_all(proj.join("node_modules/x")).unwrap();
    fs::write(proj.join("src/main.ts"), "main\n").unwrap();
    fs::write(proj.join("debug.log"), "log\n").unwrap();
    fs::write(proj.join("node_modules/x/index.js"), "x\n").unwrap();
    proj.to_string_lossy().into_owned()
}

#[test]
fn test_flatten_command() {
    let temp = TempDir::new().unwrap();
    let proj = project(temp.path());
    let out = temp.path().join("out");

    let output = dirkit(
        temp.path(),
        &["flatten", &proj, &out.to_string_lossy(), "--ignore", "node_modules", "--ignore-ext", "log"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Copy operation completed successfully."));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Copied:"));
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    assert!(out.join("proj_src_main.ts").exists());
}

#[test]
fn test_flatten_missing_source_fails() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let missing = temp.path().join("missing");

    let output = dirkit(temp.path(), &["flatten", &missing.to_string_lossy(), &out.to_string_lossy()]);

    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn test_tree_command_plain() {
    let temp = TempDir::new().unwrap();
    let proj = project(temp.path());

    let output = dirkit(
        temp.path(),
        &["tree", &proj, "--no-color", "--ignore", "node_modules", "--ignore-ext", ".log"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("├── node_modules/ (ignored folder)"));
    assert!(stdout.contains("└── src/"));
    assert!(stdout.contains("    └── main.ts"));
    assert!(!stdout.contains("debug.log"));
}

#[test]
fn test_tree_json() {
    let temp = TempDir::new().unwrap();
    let proj = project(temp.path());

    let output = dirkit(temp.path(), &["tree", &proj, "--format", "json"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["root"]["type"], "directory");
}

#[test]
fn test_annotate_command() {
    let temp = TempDir::new().unwrap();
    let proj = project(temp.path());

    let output = dirkit(temp.path(), &["annotate", &proj]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("proj/src/main.ts")).unwrap(),
        "// File: src/main.ts\nmain\n"
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 files annotated"));
}

#[test]
fn test_run_streams_child_output() {
    let temp = TempDir::new().unwrap();
    let proj = project(temp.path());

    let output = dirkit(temp.path(), &["run", "tree", &proj, "--ignore", "node_modules"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Running command:"));
    assert!(stdout.contains("main.ts"));
    assert!(stdout.contains("completed successfully"));
}

#[test]
fn test_run_rejects_missing_input() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    let output = dirkit(temp.path(), &["run", "annotate", &missing.to_string_lossy()]);

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Running command:"));
}
