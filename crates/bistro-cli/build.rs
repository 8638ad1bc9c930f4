//! Stamps the binary with the package version and, when built from a git
//! checkout, the commit it was built from.

use std::path::PathBuf;
use std::process::Command;

fn main() {
    let pkg = env!("CARGO_PKG_VERSION");

    let version = match git(&["rev-parse", "--git-dir"]) {
        Some(git_dir) => {
            // Paths are relative to the package, not the repository root.
            let git_dir = PathBuf::from(git_dir);
            println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
            println!("cargo:rerun-if-changed={}", git_dir.join("index").display());
            commit_version(pkg).unwrap_or_else(|| pkg.to_string())
        }
        None => pkg.to_string(),
    };

    println!("cargo:rustc-env=BISTRO_VERSION={version}");
}

/// `0.1.0 (3f2a9c1)`, or `0.1.0 (3f2a9c1-dirty)` with uncommitted changes.
fn commit_version(pkg: &str) -> Option<String> {
    let commit = git(&["rev-parse", "--short", "HEAD"])?;
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|changes| !changes.is_empty());
    let suffix = if dirty { "-dirty" } else { "" };
    Some(format!("{pkg} ({commit}{suffix})"))
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    Some(stdout.trim().to_string())
}
