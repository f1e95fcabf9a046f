// Export modules for library usage
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod core;
pub mod detectors;
pub mod io;
pub mod manifest;
pub mod parse;
pub mod registry;
pub mod resolve;

// Re-export commonly used types
pub use crate::analyzer::{AnalysisReport, Analyzer, FileRecord};
pub use crate::config::{MarkerConfig, RuleSet};
pub use crate::core::{Edge, Issue, QualifiedName, Severity};
pub use crate::manifest::{find_manifest, parse_manifest, ManifestInfo};
pub use crate::parse::{GoParser, ImportTable, ParsedFile};
pub use crate::registry::WorkflowRegistry;
pub use crate::resolve::PackageResolver;
