#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI binary against the store at `root`.
///
/// HOME and XDG_CONFIG_HOME are pointed inside `root` so no user
/// configuration leaks into the test.
pub fn run_cli(root: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_oai-backend"));
    cmd.args(args);
    cmd.env("OAI_STORE_ROOT", root);
    cmd.env("HOME", root.join("home"));
    cmd.env("XDG_CONFIG_HOME", root.join("home/config"));
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(root: &Path, args: &[&str]) -> String {
    let output = run_cli(root, args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(root: &Path, args: &[&str]) -> String {
    let output = run_cli(root, args);
    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!("CLI command unexpectedly succeeded: {:?}\nstdout: {}", args, stdout);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Run the CLI and parse stdout as JSON.
pub fn run_cli_json(root: &Path, args: &[&str]) -> serde_json::Value {
    let stdout = run_cli_success(root, args);
    serde_json::from_str(&stdout).expect("CLI output is not JSON")
}

/// Store a Dublin Core record with the given title.
pub fn put_record(root: &Path, identifier: &str, datestamp: &str, sets: &[&str]) {
    let doc = root.join(format!("{}.doc.json", identifier.replace(':', "_")));
    std::fs::write(
        &doc,
        serde_json::json!({ "title": identifier }).to_string(),
    )
    .unwrap();

    let doc = doc.to_string_lossy().to_string();
    let mut args = vec![
        "put-record",
        "--identifier",
        identifier,
        "--datestamp",
        datestamp,
        "--file",
        doc.as_str(),
    ];
    for set in sets {
        args.push("--set");
        args.push(set);
    }
    run_cli_success(root, &args);
}
