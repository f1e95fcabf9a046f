//! Disallowed-import detection.

use super::{Detector, FileContext};
use crate::config::{ImportRule, RuleSet};
use crate::core::{Issue, Severity};
use crate::parse::preorder;
use crate::registry::WorkflowRegistry;

pub struct ImportDetector {
    rules: Vec<ImportRule>,
}

impl ImportDetector {
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            rules: rules.disallowed_imports.clone(),
        }
    }
}

impl Detector for ImportDetector {
    fn name(&self) -> &'static str {
        "Imports"
    }

    fn check(&self, ctx: &FileContext<'_>, registry: &WorkflowRegistry, issues: &mut Vec<Issue>) {
        if self.rules.is_empty() {
            return;
        }
        // Activity-only corpora keep the import legitimately; downgrade.
        let downgrade = registry.workflow_count() == 0 && registry.activity_count() > 0;

        preorder(ctx.file.root(), &mut |node| {
            if node.kind() != "import_spec" {
                return;
            }
            let Some(path_node) = node.child_by_field_name("path") else {
                return;
            };
            let path = ctx
                .file
                .text(path_node)
                .trim_matches(|c| c == '"' || c == '`');
            for rule in &self.rules {
                if path == rule.path {
                    let (line, column) = ctx.file.position(node);
                    issues.push(Issue {
                        file: ctx.file.path.clone(),
                        line,
                        column,
                        rule: rule.rule.clone(),
                        severity: if downgrade {
                            Severity::Warning
                        } else {
                            rule.severity
                        },
                        message: rule.message.clone(),
                        function: None,
                        call_path: Vec::new(),
                    });
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QualifiedName;
    use crate::parse::{GoParser, ImportTable};
    use indoc::indoc;
    use std::path::Path;

    fn check(source: &str, registry: &WorkflowRegistry) -> Vec<Issue> {
        let file = GoParser::new()
            .unwrap()
            .parse(Path::new("test.go"), source.to_string())
            .unwrap();
        let imports = ImportTable::from_file(&file);
        let detector = ImportDetector::new(&RuleSet::default());
        let ctx = FileContext {
            file: &file,
            imports: &imports,
            package_path: "p",
            manifest: None,
        };
        let mut issues = Vec::new();
        detector.check(&ctx, registry, &mut issues);
        issues
    }

    const SOURCE: &str = indoc! {r#"
        package app

        import (
            "math/rand"
            "strings"
        )
    "#};

    #[test]
    fn disallowed_import_is_flagged() {
        let mut registry = WorkflowRegistry::new();
        registry.mark_workflow(QualifiedName::from("p.W"));
        let issues = check(SOURCE, &registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "ImportRandom");
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn severity_downgrades_for_activity_only_code() {
        let mut registry = WorkflowRegistry::new();
        registry.mark_activity(QualifiedName::from("p.A"));
        let issues = check(SOURCE, &registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
