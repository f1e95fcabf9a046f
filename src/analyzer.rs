//! Two-pass batch driver.
//!
//! Pass 1 parses every file, resolves its package path, and populates the
//! shared registry (classification + call edges). Pass 2 re-walks each file
//! running the detectors against the completed registry. The phases are
//! strictly separated: querying a partially built graph would under-report.

use crate::config::{MarkerConfig, RuleSet};
use crate::core::Issue;
use crate::detectors::{
    ChannelDetector, Detector, FileContext, FuncCallDetector, GoroutineDetector, ImportDetector,
};
use crate::io::walker::GoFileWalker;
use crate::manifest::{self, ManifestInfo};
use crate::parse::{GoParser, ImportTable, ParsedFile};
use crate::registry::{builder, WorkflowRegistry};
use crate::resolve::{PackageResolver, ProjectPrefixStrategy};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Per-file state carried from pass 1 into pass 2. Read-only once built.
pub struct FileRecord {
    pub parsed: ParsedFile,
    pub imports: ImportTable,
    pub package_path: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub issues: Vec<Issue>,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

impl AnalysisReport {
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == crate::core::Severity::Error)
    }
}

pub struct Analyzer {
    rules: RuleSet,
    markers: MarkerConfig,
    ignore_patterns: Vec<String>,
    include_tests: bool,
}

impl Analyzer {
    pub fn new(rules: RuleSet, markers: MarkerConfig) -> Self {
        Self {
            rules,
            markers,
            ignore_patterns: Vec::new(),
            include_tests: false,
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_include_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    /// Analyze a single file or a directory tree.
    pub fn analyze_path(&self, target: &Path) -> Result<AnalysisReport> {
        let files = self.discover(target)?;
        let root_dir = if target.is_file() {
            target.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            target.to_path_buf()
        };

        let manifest = self.locate_manifest(&root_dir);
        let resolver = self.build_resolver(manifest.clone(), &root_dir);

        let mut parser = GoParser::new()?;
        let mut registry = WorkflowRegistry::new();
        let mut records = Vec::new();
        let mut skipped = 0usize;

        // Pass 1: build. A malformed file aborts only its own contribution.
        for path in &files {
            match self.load_file(&mut parser, path, &resolver) {
                Ok(record) => {
                    builder::classify(
                        &record.parsed,
                        &record.package_path,
                        &self.markers,
                        &mut registry,
                    );
                    registry.add_edges(builder::build_edges(
                        &record.parsed,
                        &record.package_path,
                        &record.imports,
                    ));
                    records.push(record);
                }
                Err(e) => {
                    log::warn!("skipping {}: {e:#}", path.display());
                    skipped += 1;
                }
            }
        }
        log::debug!(
            "pass 1 complete: {} files, {} workflow functions, {} activity functions",
            records.len(),
            registry.workflow_count(),
            registry.activity_count()
        );

        // Pass 2: query. The registry is read-only from here on.
        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(FuncCallDetector::new(&self.rules, &self.markers)),
            Box::new(ImportDetector::new(&self.rules)),
            Box::new(GoroutineDetector),
            Box::new(ChannelDetector),
        ];
        let mut issues = Vec::new();
        for record in &records {
            let ctx = FileContext {
                file: &record.parsed,
                imports: &record.imports,
                package_path: &record.package_path,
                manifest: manifest.as_ref(),
            };
            for detector in &detectors {
                detector.check(&ctx, &registry, &mut issues);
            }
        }
        issues.sort_by(|a, b| {
            (&a.file, a.line, a.column, &a.rule).cmp(&(&b.file, b.line, b.column, &b.rule))
        });

        Ok(AnalysisReport {
            issues,
            files_scanned: records.len(),
            files_skipped: skipped,
        })
    }

    fn discover(&self, target: &Path) -> Result<Vec<PathBuf>> {
        if target.is_file() {
            return Ok(vec![target.to_path_buf()]);
        }
        GoFileWalker::new(target.to_path_buf())
            .with_ignore_patterns(self.ignore_patterns.clone())
            .with_include_tests(self.include_tests)
            .walk()
    }

    /// Manifest absence degrades to heuristic resolution; an unreadable
    /// manifest is logged and likewise degrades rather than failing the run.
    fn locate_manifest(&self, root_dir: &Path) -> Option<ManifestInfo> {
        let path = manifest::find_manifest(root_dir)?;
        match manifest::parse_manifest(&path) {
            Ok(info) => {
                log::debug!("using manifest {} ({})", path.display(), info.module_path);
                Some(info)
            }
            Err(e) => {
                log::warn!("ignoring manifest {}: {e}", path.display());
                None
            }
        }
    }

    fn build_resolver(&self, manifest: Option<ManifestInfo>, root_dir: &Path) -> PackageResolver {
        let fallback = self
            .markers
            .fallback_module_path
            .as_ref()
            .map(|prefix| ProjectPrefixStrategy {
                prefix: prefix.clone(),
                root: root_dir.to_path_buf(),
            });
        PackageResolver::new(manifest, fallback)
    }

    fn load_file(
        &self,
        parser: &mut GoParser,
        path: &Path,
        resolver: &PackageResolver,
    ) -> Result<FileRecord> {
        let source = std::fs::read_to_string(path)?;
        let parsed = parser.parse(path, source)?;
        let declared = parsed.package_name().unwrap_or_default();
        let package_path = resolver.resolve(path, &declared);
        let imports = ImportTable::from_file(&parsed);
        Ok(FileRecord {
            parsed,
            imports,
            package_path,
        })
    }
}
