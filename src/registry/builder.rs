//! Per-file extraction of call edges and workflow/activity classification.
//!
//! This is the write side of the registry: pass 1 runs both functions over
//! every parsed file. Calls through values, interfaces, or higher-order
//! parameters never match either call shape and are invisible to the graph.

use super::WorkflowRegistry;
use crate::config::MarkerConfig;
use crate::core::{Edge, QualifiedName};
use crate::parse::{Callee, ImportTable, ParsedFile};
use tree_sitter::Node;

/// Canonical call edges for one file. Bare-identifier calls resolve to the
/// file's own package; qualified calls resolve through the import table,
/// falling back to the alias text for single-segment stdlib references.
pub fn build_edges(file: &ParsedFile, package_path: &str, imports: &ImportTable) -> Vec<Edge> {
    let mut edges = Vec::new();
    for decl in file.functions() {
        let Some(body) = decl.body else { continue };
        let caller = QualifiedName::new(package_path, &decl.name);
        for call in file.calls_in(body) {
            let callee = match &call.callee {
                Callee::Bare(name) => QualifiedName::new(package_path, name),
                Callee::Qualified { alias, func } => {
                    QualifiedName::new(imports.resolve_or_alias(alias), func)
                }
            };
            edges.push(Edge {
                caller: caller.clone(),
                callee,
            });
        }
    }
    edges
}

/// Records workflow/activity classifications from one file into the
/// registry. Two kinds of evidence are considered:
///
/// 1. a parameter of a recognized workflow-context or activity-context
///    marker type;
/// 2. registration indirection: a function passed as the second argument of
///    a two-argument register-workflow call, or as the first argument of a
///    register-activity call, even without a matching parameter.
///
/// Conflicting evidence is recorded in both sets; the registry preserves
/// dual membership rather than resolving intent.
pub fn classify(
    file: &ParsedFile,
    package_path: &str,
    markers: &MarkerConfig,
    registry: &mut WorkflowRegistry,
) {
    for decl in file.functions() {
        let name = QualifiedName::new(package_path, &decl.name);
        for type_name in file.parameter_types(&decl) {
            if markers.is_workflow_context(&type_name) {
                registry.mark_workflow(name.clone());
            } else if markers.is_activity_context(&type_name) {
                registry.mark_activity(name.clone());
            }
        }
    }

    for decl in file.functions() {
        let Some(body) = decl.body else { continue };
        for call in file.calls_in(body) {
            let func_name = match &call.callee {
                Callee::Bare(name) => name.as_str(),
                Callee::Qualified { func, .. } => func.as_str(),
            };
            let args = argument_identifiers(file, call.node);
            if markers.is_register_workflow(func_name) && args.len() == 2 {
                if let Some(target) = &args[1] {
                    registry.mark_workflow(QualifiedName::new(package_path, target));
                }
            } else if markers.is_register_activity(func_name) && !args.is_empty() {
                if let Some(target) = &args[0] {
                    registry.mark_activity(QualifiedName::new(package_path, target));
                }
            }
        }
    }
}

/// Argument list of a call, keeping only plain identifiers (`Some`) and
/// holding position for everything else (`None`) so arity checks stay exact.
fn argument_identifiers(file: &ParsedFile, call: Node<'_>) -> Vec<Option<String>> {
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .map(|arg| {
            if arg.kind() == "identifier" {
                Some(file.text(arg).to_string())
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::GoParser;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn parse(source: &str) -> ParsedFile {
        GoParser::new()
            .unwrap()
            .parse(Path::new("test.go"), source.to_string())
            .unwrap()
    }

    fn q(s: &str) -> QualifiedName {
        QualifiedName::from(s)
    }

    #[test]
    fn bare_calls_become_same_package_edges() {
        let file = parse(indoc! {r#"
            package app

            func run() {
                helper()
            }

            func helper() {}
        "#});
        let imports = ImportTable::from_file(&file);
        let edges = build_edges(&file, "example.com/p/app", &imports);
        assert_eq!(
            edges,
            vec![Edge {
                caller: q("example.com/p/app.run"),
                callee: q("example.com/p/app.helper"),
            }]
        );
    }

    #[test]
    fn qualified_calls_resolve_through_the_import_table() {
        let file = parse(indoc! {r#"
            package app

            import (
                "time"
                util "example.com/p/pkgutil"
            )

            func run() {
                time.Now()
                util.Helper()
            }
        "#});
        let imports = ImportTable::from_file(&file);
        let edges = build_edges(&file, "example.com/p/app", &imports);
        let callees: Vec<&str> = edges.iter().map(|e| e.callee.as_str()).collect();
        assert_eq!(callees, vec!["time.Now", "example.com/p/pkgutil.Helper"]);
    }

    #[test]
    fn unresolved_alias_falls_back_to_the_alias_text() {
        let file = parse(indoc! {r#"
            package app

            func run() {
                fmt.Println("x")
            }
        "#});
        let imports = ImportTable::from_file(&file);
        let edges = build_edges(&file, "app", &imports);
        assert_eq!(edges[0].callee, q("fmt.Println"));
    }

    #[test]
    fn context_parameters_classify_functions() {
        let file = parse(indoc! {r#"
            package app

            import (
                "context"
                "go.uber.org/cadence/workflow"
            )

            func MyWorkflow(ctx workflow.Context) error { return nil }

            func MyActivity(ctx context.Context) error { return nil }

            func plain(n int) {}
        "#});
        let mut reg = WorkflowRegistry::new();
        classify(&file, "example.com/p/app", &MarkerConfig::default(), &mut reg);
        assert!(reg.is_workflow(&q("example.com/p/app.MyWorkflow")));
        assert!(reg.is_activity(&q("example.com/p/app.MyActivity")));
        assert!(!reg.is_workflow(&q("example.com/p/app.plain")));
        assert!(!reg.is_activity(&q("example.com/p/app.plain")));
    }

    #[test]
    fn registration_calls_classify_without_matching_parameters() {
        let file = parse(indoc! {r#"
            package app

            func setup(w Worker) {
                w.RegisterWorkflow("order-flow", OrderFlow)
                w.RegisterActivity(ChargeCard)
            }

            func OrderFlow(input string) error { return nil }

            func ChargeCard(input string) error { return nil }
        "#});
        let mut reg = WorkflowRegistry::new();
        classify(&file, "example.com/p/app", &MarkerConfig::default(), &mut reg);
        assert!(reg.is_workflow(&q("example.com/p/app.OrderFlow")));
        assert!(reg.is_activity(&q("example.com/p/app.ChargeCard")));
    }

    #[test]
    fn register_workflow_requires_exactly_two_arguments() {
        let file = parse(indoc! {r#"
            package app

            func setup(w Worker) {
                w.RegisterWorkflow(OrderFlow)
            }
        "#});
        let mut reg = WorkflowRegistry::new();
        classify(&file, "app", &MarkerConfig::default(), &mut reg);
        assert_eq!(reg.workflow_count(), 0);
    }

    #[test]
    fn conflicting_evidence_records_both_memberships() {
        let file = parse(indoc! {r#"
            package app

            import "go.uber.org/cadence/workflow"

            func Mixed(ctx workflow.Context) error { return nil }

            func setup(w Worker) {
                w.RegisterActivity(Mixed)
            }
        "#});
        let mut reg = WorkflowRegistry::new();
        classify(&file, "app", &MarkerConfig::default(), &mut reg);
        assert!(reg.is_workflow(&q("app.Mixed")));
        assert!(reg.is_activity(&q("app.Mixed")));
    }
}
