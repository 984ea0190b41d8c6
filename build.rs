//! Build script for reviewprompt - embeds version information.
//!
//! `BUILD_INFO_HUMAN` is the package version followed, when the crate is
//! built from a git checkout, by the abbreviated commit, its commit date and
//! a `dirty` marker for uncommitted changes:
//!
//! - `0.1.0`                               (no git available)
//! - `0.1.0 (3f9c2a1b7d04 2026-10-17)`     (clean checkout)
//! - `0.1.0 (3f9c2a1b7d04 2026-10-17, dirty)`

use std::process::Command;

use chrono::{DateTime, Utc};

fn main() {
    ["src", "build.rs", "Cargo.toml"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Commit date in UTC, or `None` outside a git checkout.
fn commit_date() -> Option<String> {
    git(&["log", "-1", "--format=%ct"])
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn is_dirty() -> bool {
    git(&["status", "--porcelain"])
        .map(|status| status.lines().any(|line| !line.ends_with(".cargo-ok")))
        .unwrap_or(false)
}

fn build_info() -> String {
    let version = env!("CARGO_PKG_VERSION");

    let Some(commit) = git(&["rev-parse", "--short=12", "HEAD"]) else {
        return version.to_string();
    };

    let mut detail = commit;
    if let Some(date) = commit_date() {
        detail.push(' ');
        detail.push_str(&date);
    }
    if is_dirty() {
        detail.push_str(", dirty");
    }

    format!("{version} ({detail})")
}
