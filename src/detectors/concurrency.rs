//! Unmanaged concurrency primitives inside workflow-reachable code:
//! goroutine launches and raw channel creation. Durable-workflow frameworks
//! provide replay-safe replacements for both.

use super::{Detector, FileContext};
use crate::core::{Issue, QualifiedName, Severity};
use crate::parse::preorder;
use crate::registry::WorkflowRegistry;
use tree_sitter::Node;

pub struct GoroutineDetector;

impl Detector for GoroutineDetector {
    fn name(&self) -> &'static str {
        "Goroutines"
    }

    fn check(&self, ctx: &FileContext<'_>, registry: &WorkflowRegistry, issues: &mut Vec<Issue>) {
        for decl in ctx.file.functions() {
            let Some(body) = decl.body else { continue };
            let enclosing = QualifiedName::new(ctx.package_path, &decl.name);
            let call_path = registry.call_path_to(&enclosing);
            if call_path.is_empty() {
                continue;
            }
            preorder(body, &mut |node| {
                if node.kind() != "go_statement" {
                    return;
                }
                let (line, column) = ctx.file.position(node);
                issues.push(Issue {
                    file: ctx.file.path.clone(),
                    line,
                    column,
                    rule: "Concurrency".into(),
                    severity: Severity::Error,
                    message: "Detected goroutine in workflow. Use workflow.Go(ctx) instead.".into(),
                    function: Some(decl.name.clone()),
                    call_path: call_path.clone(),
                });
            });
        }
    }
}

pub struct ChannelDetector;

impl Detector for ChannelDetector {
    fn name(&self) -> &'static str {
        "Channels"
    }

    fn check(&self, ctx: &FileContext<'_>, registry: &WorkflowRegistry, issues: &mut Vec<Issue>) {
        for decl in ctx.file.functions() {
            let Some(body) = decl.body else { continue };
            let enclosing = QualifiedName::new(ctx.package_path, &decl.name);
            let call_path = registry.call_path_to(&enclosing);
            if call_path.is_empty() {
                continue;
            }
            preorder(body, &mut |node| {
                if is_channel_make(ctx, node) {
                    let (line, column) = ctx.file.position(node);
                    issues.push(Issue {
                        file: ctx.file.path.clone(),
                        line,
                        column,
                        rule: "Concurrency".into(),
                        severity: Severity::Error,
                        message: "Detected channel creation in workflow. Use workflow.NewChannel(ctx) instead."
                            .into(),
                        function: Some(decl.name.clone()),
                        call_path: call_path.clone(),
                    });
                }
            });
        }
    }
}

/// Matches `make(chan ...)`.
fn is_channel_make(ctx: &FileContext<'_>, node: Node<'_>) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    let Some(function) = node.child_by_field_name("function") else {
        return false;
    };
    if function.kind() != "identifier" || ctx.file.text(function) != "make" {
        return false;
    }
    let Some(arguments) = node.child_by_field_name("arguments") else {
        return false;
    };
    arguments
        .named_child(0)
        .map(|first| first.kind() == "channel_type")
        .unwrap_or(false)
}
