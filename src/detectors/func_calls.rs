//! Qualified-call rule matching plus the hybrid unknown-external check.

use super::{Detector, FileContext};
use crate::config::{ExternalPackageRule, FunctionRule, MarkerConfig, RuleSet, FUNC_PLACEHOLDER};
use crate::core::{Issue, QualifiedName, Severity};
use crate::parse::Callee;
use crate::registry::WorkflowRegistry;
use crate::resolve::FIXTURE_MODULE;
use std::collections::HashMap;

pub struct FuncCallDetector {
    // importPath -> funcName -> rule
    function_rules: HashMap<String, HashMap<String, FunctionRule>>,
    external_rules: HashMap<String, HashMap<String, ExternalPackageRule>>,
    safe_external: Vec<String>,
    markers: MarkerConfig,
}

impl FuncCallDetector {
    pub fn new(rules: &RuleSet, markers: &MarkerConfig) -> Self {
        let mut function_rules: HashMap<String, HashMap<String, FunctionRule>> = HashMap::new();
        for rule in &rules.function_calls {
            let per_pkg = function_rules.entry(rule.package.clone()).or_default();
            for func in &rule.functions {
                per_pkg.insert(func.clone(), rule.clone());
            }
        }
        let mut external_rules: HashMap<String, HashMap<String, ExternalPackageRule>> =
            HashMap::new();
        for rule in &rules.external_packages {
            let per_pkg = external_rules.entry(rule.package.clone()).or_default();
            for func in &rule.functions {
                per_pkg.insert(func.clone(), rule.clone());
            }
        }
        Self {
            function_rules,
            external_rules,
            safe_external: rules.safe_external_packages.clone(),
            markers: markers.clone(),
        }
    }

    fn is_safe_external(&self, import_path: &str) -> bool {
        self.safe_external
            .iter()
            .any(|p| import_path == p || import_path.starts_with(&format!("{p}/")))
    }

    /// Standard library paths have no dot in their first segment;
    /// golang.org/x/ is treated the same way.
    fn is_stdlib(import_path: &str) -> bool {
        let first = import_path.split('/').next().unwrap_or(import_path);
        !first.contains('.') || import_path.starts_with("golang.org/x/")
    }

    /// Hybrid internal classification: the manifest is authoritative when
    /// present (module membership or local replacement); otherwise fixture
    /// and configured-prefix heuristics fill in.
    fn is_internal(&self, import_path: &str, ctx: &FileContext<'_>) -> bool {
        if let Some(manifest) = ctx.manifest {
            if manifest.is_internal(import_path) || manifest.is_replaced_locally(import_path) {
                return true;
            }
        }
        if import_path.starts_with("testdata/")
            || import_path == FIXTURE_MODULE
            || import_path.starts_with(&format!("{FIXTURE_MODULE}/"))
        {
            return true;
        }
        if let Some(prefix) = &self.markers.fallback_module_path {
            if import_path == prefix || import_path.starts_with(&format!("{prefix}/")) {
                return true;
            }
        }
        false
    }

    fn is_unknown_external(&self, import_path: &str, ctx: &FileContext<'_>) -> bool {
        !Self::is_stdlib(import_path)
            && !self.markers.is_framework_path(import_path)
            && !self.external_rules.contains_key(import_path)
            && !self.is_safe_external(import_path)
            && !self.is_internal(import_path, ctx)
    }
}

impl Detector for FuncCallDetector {
    fn name(&self) -> &'static str {
        "FuncCalls"
    }

    fn check(&self, ctx: &FileContext<'_>, registry: &WorkflowRegistry, issues: &mut Vec<Issue>) {
        for decl in ctx.file.functions() {
            let Some(body) = decl.body else { continue };
            let enclosing = QualifiedName::new(ctx.package_path, &decl.name);

            for call in ctx.file.calls_in(body) {
                let Callee::Qualified { alias, func } = &call.callee else {
                    continue;
                };
                let import_path = ctx.imports.resolve_or_alias(alias);

                let matched = self
                    .function_rules
                    .get(import_path)
                    .and_then(|per_pkg| per_pkg.get(func))
                    .map(|r| (r.rule.clone(), r.severity, r.message.clone()))
                    .or_else(|| {
                        self.external_rules
                            .get(import_path)
                            .and_then(|per_pkg| per_pkg.get(func))
                            .map(|r| (r.rule.clone(), r.severity, r.message.clone()))
                    });

                if let Some((rule, severity, message)) = matched {
                    let call_path = registry.call_path_to(&enclosing);
                    if call_path.is_empty() {
                        continue;
                    }
                    let (line, column) = ctx.file.position(call.name_node);
                    issues.push(Issue {
                        file: ctx.file.path.clone(),
                        line,
                        column,
                        rule,
                        severity,
                        message: message.replace(FUNC_PLACEHOLDER, func),
                        function: Some(decl.name.clone()),
                        call_path,
                    });
                    continue;
                }

                if self.is_unknown_external(import_path, ctx)
                    && registry.is_workflow_reachable(&enclosing)
                {
                    let (line, column) = ctx.file.position(call.name_node);
                    issues.push(Issue {
                        file: ctx.file.path.clone(),
                        line,
                        column,
                        rule: "UnknownExternalCall".into(),
                        severity: Severity::Info,
                        message: format!(
                            "Call to unknown external package {import_path}.{func}() - please verify it's workflow-safe"
                        ),
                        function: Some(decl.name.clone()),
                        call_path: Vec::new(),
                    });
                }
            }
        }
    }
}
