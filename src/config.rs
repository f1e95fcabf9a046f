//! Rule tables and classification markers.
//!
//! Rules are static lookup tables keyed by (import path, function name).
//! A built-in default set covers the usual determinism hazards; a YAML file
//! passed via `--rules` replaces it wholesale.

use crate::core::{Error, Result, Severity};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Placeholder substituted with the offending function name in messages.
pub const FUNC_PLACEHOLDER: &str = "%FUNC%";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRule {
    pub rule: String,
    /// Import path, e.g. "time", "math/rand", "os".
    pub package: String,
    pub functions: Vec<String>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRule {
    pub rule: String,
    pub path: String,
    pub severity: Severity,
    pub message: String,
}

/// Vetted third-party package rule: full import path plus the function names
/// to flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalPackageRule {
    pub rule: String,
    pub package: String,
    pub functions: Vec<String>,
    pub severity: Severity,
    pub message: String,
}

/// A rule file replaces the built-in set wholesale; sections absent from the
/// file are simply empty rather than backfilled from the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub function_calls: Vec<FunctionRule>,
    #[serde(default)]
    pub disallowed_imports: Vec<ImportRule>,
    #[serde(default)]
    pub external_packages: Vec<ExternalPackageRule>,
    #[serde(default)]
    pub safe_external_packages: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            function_calls: vec![
                FunctionRule {
                    rule: "TimeUsage".into(),
                    package: "time".into(),
                    functions: vec!["Now".into(), "Since".into(), "Sleep".into()],
                    severity: Severity::Error,
                    message: format!(
                        "Detected time.{FUNC_PLACEHOLDER}() in workflow. Use workflow.Now(ctx) / workflow.Sleep(ctx) instead."
                    ),
                },
                FunctionRule {
                    rule: "Randomness".into(),
                    package: "math/rand".into(),
                    functions: vec![
                        "Int".into(),
                        "Intn".into(),
                        "Int63".into(),
                        "Float32".into(),
                        "Float64".into(),
                        "Read".into(),
                    ],
                    severity: Severity::Error,
                    message: format!(
                        "Detected rand.{FUNC_PLACEHOLDER}() in workflow. Avoid nondeterminism; use workflow.SideEffect if needed."
                    ),
                },
                FunctionRule {
                    rule: "IOCalls".into(),
                    package: "os".into(),
                    functions: vec![
                        "Open".into(),
                        "OpenFile".into(),
                        "Create".into(),
                        "ReadFile".into(),
                        "WriteFile".into(),
                        "Mkdir".into(),
                        "Remove".into(),
                    ],
                    severity: Severity::Error,
                    message: format!(
                        "Detected os.{FUNC_PLACEHOLDER}() in workflow. Avoid file I/O inside workflows; move it to an activity."
                    ),
                },
                FunctionRule {
                    rule: "IOCalls".into(),
                    package: "fmt".into(),
                    functions: vec!["Println".into(), "Printf".into(), "Print".into()],
                    severity: Severity::Warning,
                    message: format!(
                        "Detected fmt.{FUNC_PLACEHOLDER}() in workflow. Use workflow.GetLogger(ctx) instead."
                    ),
                },
                FunctionRule {
                    rule: "NetworkCalls".into(),
                    package: "net/http".into(),
                    functions: vec!["Get".into(), "Post".into(), "Head".into(), "PostForm".into()],
                    severity: Severity::Error,
                    message: format!(
                        "Detected http.{FUNC_PLACEHOLDER}() in workflow. Network I/O belongs in an activity."
                    ),
                },
            ],
            disallowed_imports: vec![
                ImportRule {
                    rule: "ImportRandom".into(),
                    path: "math/rand".into(),
                    severity: Severity::Error,
                    message: "Importing math/rand in workflow code introduces nondeterminism.".into(),
                },
                ImportRule {
                    rule: "ImportHttp".into(),
                    path: "net/http".into(),
                    severity: Severity::Error,
                    message: "Importing net/http in workflow code introduces network I/O.".into(),
                },
            ],
            external_packages: vec![ExternalPackageRule {
                rule: "UUIDGeneration".into(),
                package: "github.com/google/uuid".into(),
                functions: vec!["New".into(), "NewRandom".into(), "NewString".into()],
                severity: Severity::Error,
                message: format!(
                    "uuid.{FUNC_PLACEHOLDER}() is non-deterministic. Generate IDs via workflow.SideEffect."
                ),
            }],
            safe_external_packages: vec![
                "go.uber.org/cadence".into(),
                "go.temporal.io/sdk".into(),
            ],
        }
    }
}

impl RuleSet {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read rules {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::Configuration(format!("invalid rules {}: {e}", path.display())))
    }
}

/// Closed enumeration of recognized marker types and registration calls.
/// Classification is matched structurally against the parsed type
/// expression, so framework variants can be recognized by adding names here
/// instead of touching the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Parameter types that mark a function as a workflow entry point.
    pub workflow_context_types: Vec<String>,
    /// Parameter types that mark a function as an activity entry point.
    pub activity_context_types: Vec<String>,
    /// Two-argument registration calls whose second argument is a workflow.
    pub register_workflow_functions: Vec<String>,
    /// Registration calls whose first argument is an activity.
    pub register_activity_functions: Vec<String>,
    /// Import-path prefixes of the workflow frameworks themselves; calls into
    /// these are never reported as unknown externals.
    pub framework_prefixes: Vec<String>,
    /// Optional module prefix used for package path resolution when no
    /// manifest is found.
    pub fallback_module_path: Option<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            workflow_context_types: vec!["workflow.Context".into()],
            activity_context_types: vec!["context.Context".into()],
            register_workflow_functions: vec!["RegisterWorkflow".into()],
            register_activity_functions: vec!["RegisterActivity".into()],
            framework_prefixes: vec![
                "go.uber.org/cadence".into(),
                "go.temporal.io/sdk".into(),
            ],
            fallback_module_path: None,
        }
    }
}

impl MarkerConfig {
    pub fn is_workflow_context(&self, type_name: &str) -> bool {
        self.workflow_context_types.iter().any(|t| t == type_name)
    }

    pub fn is_activity_context(&self, type_name: &str) -> bool {
        self.activity_context_types.iter().any(|t| t == type_name)
    }

    pub fn is_register_workflow(&self, func_name: &str) -> bool {
        self.register_workflow_functions.iter().any(|f| f == func_name)
    }

    pub fn is_register_activity(&self, func_name: &str) -> bool {
        self.register_activity_functions.iter().any(|f| f == func_name)
    }

    pub fn is_framework_path(&self, import_path: &str) -> bool {
        self.framework_prefixes
            .iter()
            .any(|p| import_path == p || import_path.starts_with(&format!("{p}/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn default_rules_cover_the_usual_hazards() {
        let rules = RuleSet::default();
        assert!(rules.function_calls.iter().any(|r| r.package == "time"));
        assert!(rules.function_calls.iter().any(|r| r.package == "math/rand"));
        assert!(rules.disallowed_imports.iter().any(|r| r.path == "math/rand"));
        assert!(rules
            .external_packages
            .iter()
            .any(|r| r.package == "github.com/google/uuid"));
    }

    #[test]
    fn rules_parse_from_yaml_with_partial_sections() {
        let yaml = indoc! {r#"
            function_calls:
              - rule: TimeUsage
                package: time
                functions: [Now]
                severity: error
                message: "no %FUNC% in workflows"
        "#};
        let rules: RuleSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.function_calls.len(), 1);
        assert!(rules.disallowed_imports.is_empty());
    }

    #[test]
    fn marker_config_defaults_recognize_cadence_shapes() {
        let markers = MarkerConfig::default();
        assert!(markers.is_workflow_context("workflow.Context"));
        assert!(markers.is_activity_context("context.Context"));
        assert!(!markers.is_workflow_context("context.Context"));
        assert!(markers.is_framework_path("go.uber.org/cadence/workflow"));
        assert!(!markers.is_framework_path("go.uber.org/cadence-fork"));
    }
}
