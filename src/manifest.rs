//! go.mod parsing and the internal/replaced package queries built on it.
//!
//! The grammar handled here is deliberately best-effort: a module-path
//! declaration, an optional version declaration, and require/replace
//! directives either as single lines or inside parenthesized blocks.
//! Malformed lines are silently skipped.

use crate::core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "go.mod";

/// Parsed dependency manifest. Immutable once parsed; at most one per run.
#[derive(Debug, Clone, Default)]
pub struct ManifestInfo {
    pub module_path: String,
    pub go_version: String,
    pub requires: Vec<Require>,
    pub replaces: Vec<Replace>,
    pub root_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub path: String,
    pub version: String,
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old_path: String,
    pub old_version: String,
    pub new_path: String,
    pub new_version: String,
}

/// Walk upward from `start_dir` until a manifest is found or the filesystem
/// root is reached. Absence is expected, not an error.
pub fn find_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = if start_dir.is_absolute() {
        start_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(start_dir))
            .unwrap_or_else(|_| start_dir.to_path_buf())
    };
    if dir.is_file() {
        dir.pop();
    }
    loop {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

pub fn parse_manifest(path: &Path) -> Result<ManifestInfo> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Manifest(format!("failed to read {}: {e}", path.display())))?;
    let root_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    Ok(parse_manifest_str(&contents, root_dir))
}

pub fn parse_manifest_str(contents: &str, root_dir: PathBuf) -> ManifestInfo {
    let mut info = ManifestInfo {
        root_dir,
        ..Default::default()
    };

    let mut in_require_block = false;
    let mut in_replace_block = false;

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line == ")" {
            in_require_block = false;
            in_replace_block = false;
            continue;
        }
        if let Some(rest) = line.strip_prefix("module ") {
            info.module_path = rest.trim().to_string();
            continue;
        }
        if let Some(rest) = line.strip_prefix("go ") {
            info.go_version = rest.trim().to_string();
            continue;
        }
        if line.starts_with("require (") {
            in_require_block = true;
            continue;
        }
        if line.starts_with("replace (") {
            in_replace_block = true;
            continue;
        }
        if let Some(rest) = line.strip_prefix("require ") {
            if let Some(req) = parse_require_line(rest) {
                info.requires.push(req);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("replace ") {
            if let Some(rep) = parse_replace_line(rest) {
                info.replaces.push(rep);
            }
            continue;
        }
        if in_require_block {
            if let Some(req) = parse_require_line(line) {
                info.requires.push(req);
            }
            continue;
        }
        if in_replace_block {
            if let Some(rep) = parse_replace_line(line) {
                info.replaces.push(rep);
            }
        }
    }

    info
}

fn parse_require_line(line: &str) -> Option<Require> {
    let (directive, comment) = match line.find("//") {
        Some(i) => (line[..i].trim(), line[i + 2..].trim()),
        None => (line.trim(), ""),
    };
    let mut fields = directive.split_whitespace();
    let path = fields.next()?;
    let version = fields.next()?;
    Some(Require {
        path: path.to_string(),
        version: version.to_string(),
        indirect: comment.contains("indirect"),
    })
}

fn parse_replace_line(line: &str) -> Option<Replace> {
    let directive = match line.find("//") {
        Some(i) => line[..i].trim(),
        None => line.trim(),
    };
    // Format: oldpath [oldversion] => newpath [newversion], exactly one arrow.
    let mut parts = directive.split("=>");
    let old_part = parts.next()?.trim();
    let new_part = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    let old_fields: Vec<&str> = old_part.split_whitespace().collect();
    let new_fields: Vec<&str> = new_part.split_whitespace().collect();
    if old_fields.is_empty() || new_fields.is_empty() {
        return None;
    }
    Some(Replace {
        old_path: old_fields[0].to_string(),
        old_version: old_fields.get(1).unwrap_or(&"").to_string(),
        new_path: new_fields[0].to_string(),
        new_version: new_fields.get(1).unwrap_or(&"").to_string(),
    })
}

impl ManifestInfo {
    /// True iff the import path is the module itself or a subpackage of it.
    pub fn is_internal(&self, import_path: &str) -> bool {
        if self.module_path.is_empty() {
            return false;
        }
        import_path == self.module_path
            || import_path.starts_with(&format!("{}/", self.module_path))
    }

    /// The replacement target for an import path, if any replace directive
    /// matches. The first directive whose old path equals or `/`-prefixes
    /// the import path wins.
    pub fn replacement_for(&self, import_path: &str) -> Option<&str> {
        self.replaces
            .iter()
            .find(|r| {
                import_path == r.old_path
                    || import_path.starts_with(&format!("{}/", r.old_path))
            })
            .map(|r| r.new_path.as_str())
    }

    /// True when a replace directive points the import path at a local
    /// directory, which makes the package effectively internal.
    pub fn is_replaced_locally(&self, import_path: &str) -> bool {
        match self.replacement_for(import_path) {
            Some(new_path) => {
                !new_path.contains('/')
                    || new_path.starts_with("./")
                    || new_path.starts_with("../")
            }
            None => false,
        }
    }

    pub fn direct_dependencies(&self) -> Vec<&str> {
        self.requires
            .iter()
            .filter(|r| !r.indirect)
            .map(|r| r.path.as_str())
            .collect()
    }
}
