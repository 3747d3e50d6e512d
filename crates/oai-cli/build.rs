//! Build script stamping the `oai-backend` version.
//!
//! Packagers building outside a git checkout can pin the version through
//! `OAI_BACKEND_VERSION`. Otherwise the crate version is suffixed with the
//! git description, e.g. `0.1.0 (v0.1.0-3-g1a2b3c4-dirty)`.

use std::env;
use std::process::Command;

const VERSION_VAR: &str = "OAI_BACKEND_VERSION";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed={VERSION_VAR}");

    let package = env!("CARGO_PKG_VERSION");
    let version = match env::var(VERSION_VAR) {
        Ok(pinned) if !pinned.trim().is_empty() => pinned.trim().to_string(),
        _ => match git_describe() {
            Some(describe) if describe.trim_start_matches('v') == package => package.to_string(),
            Some(describe) => format!("{package} ({describe})"),
            None => package.to_string(),
        },
    };

    println!("cargo:rustc-env={VERSION_VAR}={version}");
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let describe = String::from_utf8(output.stdout).ok()?;
    let describe = describe.trim();
    (!describe.is_empty()).then(|| describe.to_string())
}
