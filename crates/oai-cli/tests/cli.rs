//! CLI integration tests against a file store.

mod common;

use std::fs;

use tempfile::TempDir;

use common::{put_record, run_cli, run_cli_failure, run_cli_json, run_cli_success};

fn populated() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    run_cli_success(root, &["put-set", "--spec", "science", "--name", "Science"]);
    run_cli_success(
        root,
        &[
            "put-set",
            "--spec",
            "science:physics",
            "--name",
            "Physics",
            "--description",
            "Matter and energy",
        ],
    );

    for (n, day) in ["01", "02", "03", "04", "05"].iter().enumerate() {
        let id = format!("oai:cli:{n}");
        let set = if n % 2 == 0 { "science:physics" } else { "science" };
        put_record(root, &id, &format!("2024-01-{day}T12:00:00Z"), &[set]);
    }

    dir
}

fn write_config(dir: &TempDir, json: &str) -> String {
    let path = dir.path().join("config.json");
    fs::write(&path, json).unwrap();
    path.to_string_lossy().to_string()
}

fn identifiers(page: &serde_json::Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["identifier"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    let stdout = run_cli_success(dir.path(), &["--version"]);
    assert_eq!(
        stdout.trim(),
        format!("oai-backend {}", env!("OAI_BACKEND_VERSION"))
    );
}

#[test]
fn test_identify_reports_capabilities() {
    let dir = populated();
    let identity = run_cli_json(dir.path(), &["identify"]);

    assert_eq!(identity["earliestDatestamp"], "2024-01-01T12:00:00Z");
    assert_eq!(identity["deletedRecord"], "persistent");
    assert_eq!(identity["granularity"], "YYYY-MM-DDThh:mm:ssZ");
}

#[test]
fn test_get_record() {
    let dir = populated();
    let record = run_cli_json(dir.path(), &["get-record", "--identifier", "oai:cli:2"]);

    assert_eq!(record["header"]["identifier"], "oai:cli:2");
    assert_eq!(record["metadata"]["title"], "oai:cli:2");
    assert_eq!(record["header"]["set_specs"][0], "science:physics");
}

#[test]
fn test_get_missing_record_reports_code() {
    let dir = populated();
    let stderr = run_cli_failure(dir.path(), &["get-record", "--identifier", "oai:cli:99"]);
    assert!(stderr.contains("idDoesNotExist"), "stderr: {stderr}");
}

#[test]
fn test_list_identifiers_pages_through_tokens() {
    let dir = populated();
    let config = write_config(&dir, r#"{ "page_size": 2 }"#);
    let root = dir.path();

    let first = run_cli_json(
        root,
        &["list-identifiers", "--config", &config, "--metadata-prefix", "oai_dc"],
    );
    assert_eq!(identifiers(&first), ["oai:cli:0", "oai:cli:1"]);
    assert_eq!(first["flow_control"]["complete_list_size"], 5);
    assert_eq!(first["flow_control"]["cursor"], 0);

    // Tokens are honoured by a later invocation.
    let token = first["flow_control"]["resumption_token"].as_str().unwrap();
    let second = run_cli_json(root, &["list-identifiers", "--config", &config, "--token", token]);
    assert_eq!(identifiers(&second), ["oai:cli:2", "oai:cli:3"]);
    assert_eq!(second["flow_control"]["cursor"], 2);

    let all = run_cli_json(
        root,
        &["list-identifiers", "--config", &config, "--metadata-prefix", "oai_dc", "--all"],
    );
    assert_eq!(identifiers(&all).len(), 5);
    assert!(all.get("flow_control").is_none());
}

#[test]
fn test_list_records_with_selective_arguments() {
    let dir = populated();
    let root = dir.path();

    let page = run_cli_json(
        root,
        &[
            "list-records",
            "--metadata-prefix",
            "oai_dc",
            "--from",
            "2024-01-02",
            "--until",
            "2024-01-04",
            "--set",
            "science:physics",
        ],
    );

    let ids: Vec<_> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["header"]["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["oai:cli:2"]);
}

#[test]
fn test_list_records_errors_carry_codes() {
    let dir = populated();
    let root = dir.path();

    let stderr = run_cli_failure(root, &["list-records"]);
    assert!(stderr.contains("badArgument"), "stderr: {stderr}");

    let stderr = run_cli_failure(root, &["list-records", "--metadata-prefix", "marc21"]);
    assert!(stderr.contains("cannotDisseminateFormat"), "stderr: {stderr}");

    let stderr = run_cli_failure(
        root,
        &["list-records", "--metadata-prefix", "oai_dc", "--from", "yesterday"],
    );
    assert!(stderr.contains("badArgument"), "stderr: {stderr}");

    let stderr = run_cli_failure(root, &["list-records", "--token", "bogus"]);
    assert!(stderr.contains("badResumptionToken"), "stderr: {stderr}");

    let stderr = run_cli_failure(
        root,
        &["list-records", "--metadata-prefix", "oai_dc", "--from", "2030-01-01"],
    );
    assert!(stderr.contains("noRecordsMatch"), "stderr: {stderr}");
}

#[test]
fn test_list_sets() {
    let dir = populated();
    let page = run_cli_json(dir.path(), &["list-sets"]);

    let specs: Vec<_> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["spec"].as_str().unwrap())
        .collect();
    assert_eq!(specs, ["science", "science:physics"]);
    assert_eq!(page["items"][1]["description"], "Matter and energy");
}

#[test]
fn test_delete_record_leaves_tombstone() {
    let dir = populated();
    let root = dir.path();

    run_cli_success(root, &["delete-record", "--identifier", "oai:cli:1"]);

    let record = run_cli_json(root, &["get-record", "--identifier", "oai:cli:1"]);
    assert_eq!(record["header"]["deleted"], true);
    assert!(record.get("metadata").is_none());

    let formats = run_cli_failure(
        root,
        &["list-metadata-formats", "--identifier", "oai:cli:1"],
    );
    assert!(formats.contains("noMetadataFormats"), "stderr: {formats}");
}

#[test]
fn test_purge_and_hidden_deletions() {
    let dir = populated();
    let root = dir.path();
    let config = write_config(&dir, r#"{ "deleted_records": "no" }"#);

    run_cli_success(root, &["delete-record", "--identifier", "oai:cli:1"]);
    let stderr = run_cli_failure(
        root,
        &["get-record", "--config", &config, "--identifier", "oai:cli:1"],
    );
    assert!(stderr.contains("idDoesNotExist"), "stderr: {stderr}");

    run_cli_success(root, &["delete-record", "--identifier", "oai:cli:3", "--purge"]);
    let stderr = run_cli_failure(root, &["delete-record", "--identifier", "oai:cli:3"]);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn test_list_metadata_formats() {
    let dir = populated();
    let formats = run_cli_json(dir.path(), &["list-metadata-formats"]);
    assert_eq!(formats[0]["prefix"], "oai_dc");
    assert_eq!(
        formats[0]["namespace"],
        "http://www.openarchives.org/OAI/2.0/oai_dc/"
    );
}

#[test]
fn test_put_record_rejects_unconfigured_format() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let doc = root.join("doc.json");
    fs::write(&doc, r#"{ "title": "x" }"#).unwrap();

    let output = run_cli(
        root,
        &[
            "put-record",
            "--identifier",
            "oai:cli:x",
            "--metadata-prefix",
            "marc21",
            "--file",
            doc.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
    assert!(!root.join("oai/records").exists());
}

#[test]
fn test_prototype_backend() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let identity = run_cli_json(root, &["--prototype", "identify"]);
    assert_eq!(identity["deletedRecord"], "no");
    assert_eq!(identity["granularity"], "YYYY-MM-DD");

    let stderr = run_cli_failure(
        root,
        &["--prototype", "list-records", "--metadata-prefix", "oai_dc"],
    );
    assert!(stderr.contains("noRecordsMatch"), "stderr: {stderr}");

    let stderr = run_cli_failure(root, &["--prototype", "list-sets"]);
    assert!(stderr.contains("noSetHierarchy"), "stderr: {stderr}");
}
