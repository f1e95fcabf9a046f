pub mod errors;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use errors::{Error, Result};

/// Canonical, corpus-wide identifier for a function: `packagePath.funcName`.
///
/// Two same-named functions in different packages never collide because the
/// package path is part of the name.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(package_path: &str, func_name: &str) -> Self {
        let pkg = package_path.trim();
        if pkg.is_empty() {
            QualifiedName(format!("local.{func_name}"))
        } else {
            QualifiedName(format!("{pkg}.{func_name}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        QualifiedName(s.to_string())
    }
}

/// One call-graph edge. Duplicates are permitted; the graph is a multigraph
/// and multiplicity is irrelevant to reachability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub caller: QualifiedName,
    pub callee: QualifiedName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A finding produced by a detector and enriched by the core with an example
/// call path from a workflow entry point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub call_path: Vec<QualifiedName>,
}
