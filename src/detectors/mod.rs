//! Violation detectors.
//!
//! Detectors are stateless consumers of the completed registry: each one is
//! a predicate table over qualified call names (or syntax shapes) that asks
//! whether the enclosing function is workflow-reachable before emitting a
//! finding. They run in pass 2 only.

mod concurrency;
mod func_calls;
mod imports;

pub use concurrency::{ChannelDetector, GoroutineDetector};
pub use func_calls::FuncCallDetector;
pub use imports::ImportDetector;

use crate::core::Issue;
use crate::manifest::ManifestInfo;
use crate::parse::{ImportTable, ParsedFile};
use crate::registry::WorkflowRegistry;

/// Everything a detector may need about the file under inspection.
pub struct FileContext<'a> {
    pub file: &'a ParsedFile,
    pub imports: &'a ImportTable,
    pub package_path: &'a str,
    pub manifest: Option<&'a ManifestInfo>,
}

pub trait Detector {
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &FileContext<'_>, registry: &WorkflowRegistry, issues: &mut Vec<Issue>);
}
