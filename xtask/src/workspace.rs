//! Discovers this workspace's member crates and counts their source lines,
//! the input `size` needs to compare actual against the budgeted
//! distribution and `fmt`/`clippy` need to know nothing about at all.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One workspace member crate, with its source line count.
#[derive(Debug, Clone)]
pub struct CrateInfo {
    pub name: String,
    pub path: PathBuf,
    pub source_lines: u64,
}

/// Every member crate the root `Cargo.toml` lists, skipping `xtask` itself.
pub struct Workspace {
    pub crates: Vec<CrateInfo>,
}

impl Workspace {
    pub fn load(root: &Path) -> Result<Self> {
        let members = member_dirs(root)?;
        let mut crates = Vec::new();
        for member in members {
            if member == "xtask" {
                continue;
            }
            let path = root.join(&member);
            let name = crate_name(&path).unwrap_or_else(|| member.clone());
            let source_lines = count_source_lines(&path)?;
            crates.push(CrateInfo { name, path, source_lines });
        }
        Ok(Self { crates })
    }

    pub fn total_lines(&self) -> u64 {
        self.crates.iter().map(|c| c.source_lines).sum()
    }
}

/// Extracts the `[workspace] members = [...]` list from the root manifest
/// without pulling in a TOML parser: every entry in this workspace is a
/// plain quoted path, one per line, which is all `members` ever needs to be.
fn member_dirs(root: &Path) -> Result<Vec<String>> {
    let manifest = fs::read_to_string(root.join("Cargo.toml")).context("reading root Cargo.toml")?;
    let start = manifest
        .find("members")
        .and_then(|idx| manifest[idx..].find('[').map(|b| idx + b + 1))
        .context("no [workspace] members array found")?;
    let end = manifest[start..]
        .find(']')
        .map(|b| start + b)
        .context("unterminated members array")?;
    let members = manifest[start..end]
        .split(',')
        .filter_map(|entry| {
            let trimmed = entry.trim().trim_matches('"');
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect();
    Ok(members)
}

/// Reads `name = "..."` out of a crate's own `Cargo.toml`, falling back to
/// the directory name if parsing fails for any reason.
fn crate_name(crate_dir: &Path) -> Option<String> {
    let manifest = fs::read_to_string(crate_dir.join("Cargo.toml")).ok()?;
    manifest.lines().find_map(|line| {
        let line = line.trim();
        line.strip_prefix("name").and_then(|rest| {
            let rest = rest.trim_start();
            let rest = rest.strip_prefix('=')?;
            Some(rest.trim().trim_matches('"').to_string())
        })
    })
}

/// Counts newlines across every `.rs` file under `crate_dir`, skipping
/// `target/`. This is a line *budget* check, not a coverage tool — blank
/// lines and comments count the same as any other line, the way a
/// byte-counting `calculate_crate_size` counts every byte of every source
/// file without weighing its content.
fn count_source_lines(crate_dir: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(crate_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.components().any(|c| c.as_os_str() == "target") {
            continue;
        }
        if path.extension().map(|e| e == "rs").unwrap_or(false) {
            let content = fs::read_to_string(path).unwrap_or_default();
            total += content.lines().count() as u64;
        }
    }
    Ok(total)
}
