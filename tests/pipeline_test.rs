//! End-to-end runs of the two-pass pipeline over small fixture projects
//! written into a temp dir.

use replaycheck::analyzer::Analyzer;
use replaycheck::config::{MarkerConfig, RuleSet};
use replaycheck::core::{Issue, Severity};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn analyze(dir: &Path) -> replaycheck::AnalysisReport {
    Analyzer::new(RuleSet::default(), MarkerConfig::default())
        .analyze_path(dir)
        .expect("analysis should succeed")
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn rules_of<'a>(issues: &'a [Issue], rule: &str) -> Vec<&'a Issue> {
    issues.iter().filter(|i| i.rule == rule).collect()
}

#[test]
fn direct_violations_in_a_workflow_are_reported() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "workflow.go",
        r#"package main

import (
	"fmt"
	"time"

	"go.uber.org/cadence/workflow"
)

func MyWorkflow(ctx workflow.Context) error {
	fmt.Println("bad logging")
	_ = time.Now()
	go func() {}()
	ch := make(chan int)
	_ = ch
	return nil
}
"#,
    );

    let report = analyze(dir.path());
    assert_eq!(report.files_scanned, 1);
    assert_eq!(rules_of(&report.issues, "TimeUsage").len(), 1);
    assert_eq!(rules_of(&report.issues, "IOCalls").len(), 1);
    assert_eq!(rules_of(&report.issues, "Concurrency").len(), 2);
    assert!(report.has_errors());
}

#[test]
fn the_same_operations_in_an_activity_are_permitted() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "activity.go",
        r#"package main

import (
	"context"
	"fmt"
	"time"
)

func MyActivity(ctx context.Context) error {
	fmt.Println("logging from activity")
	_ = time.Now()
	ch := make(chan int)
	_ = ch
	go func() {}()
	return nil
}
"#,
    );

    let report = analyze(dir.path());
    assert!(report.issues.is_empty(), "unexpected: {:?}", report.issues);
}

#[test]
fn cross_package_reachability_with_manifest_resolution() {
    // Scenario: workflow W (module root) -> pkgutil.Helper -> time.Now().
    // The violation sits in helper code and is attributed to the workflow
    // path; the activity calling the same helper adds nothing.
    let dir = TempDir::new().unwrap();
    write(dir.path(), "go.mod", "module example.com/proj\n\ngo 1.21\n");
    write(
        dir.path(),
        "workflow.go",
        r#"package main

import (
	"context"

	"example.com/proj/pkgutil"
	"go.uber.org/cadence/workflow"
)

func TestWorkflow(ctx workflow.Context) error {
	_ = pkgutil.Helper()
	_ = pkgutil.SafeHelper()
	return nil
}

func TestActivity(ctx context.Context) error {
	_ = pkgutil.Helper()
	return nil
}
"#,
    );
    write(
        dir.path(),
        "pkgutil/helper.go",
        r#"package pkgutil

import "time"

func Helper() time.Time {
	return time.Now()
}

func SafeHelper() string {
	return "safe operation"
}
"#,
    );

    let report = analyze(dir.path());
    let time_issues = rules_of(&report.issues, "TimeUsage");
    assert_eq!(time_issues.len(), 1);
    let issue = time_issues[0];
    assert_eq!(issue.function.as_deref(), Some("Helper"));
    let path: Vec<&str> = issue.call_path.iter().map(|q| q.as_str()).collect();
    assert_eq!(
        path,
        vec!["example.com/proj.TestWorkflow", "example.com/proj/pkgutil.Helper"]
    );
}

#[test]
fn helpers_reached_only_from_activities_stay_silent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "go.mod", "module example.com/proj\n\ngo 1.21\n");
    write(
        dir.path(),
        "activity.go",
        r#"package main

import (
	"context"

	"example.com/proj/pkgutil"
)

func OnlyActivity(ctx context.Context) error {
	_ = pkgutil.Helper()
	return nil
}
"#,
    );
    write(
        dir.path(),
        "pkgutil/helper.go",
        r#"package pkgutil

import "time"

func Helper() time.Time {
	return time.Now()
}
"#,
    );

    let report = analyze(dir.path());
    assert!(
        rules_of(&report.issues, "TimeUsage").is_empty(),
        "activity-only reachability must not report: {:?}",
        report.issues
    );
}

#[test]
fn an_activity_edge_does_not_poison_the_workflow_path() {
    // pkgutil.Helper is reachable both from a workflow (via a helper chain)
    // and directly from an activity. The workflow path wins.
    let dir = TempDir::new().unwrap();
    write(dir.path(), "go.mod", "module example.com/proj\n\ngo 1.21\n");
    write(
        dir.path(),
        "main.go",
        r#"package main

import (
	"context"

	"example.com/proj/pkgutil"
	"go.uber.org/cadence/workflow"
)

func W(ctx workflow.Context) error {
	middle()
	return nil
}

func middle() {
	_ = pkgutil.Helper()
}

func A(ctx context.Context) error {
	_ = pkgutil.Helper()
	return nil
}
"#,
    );
    write(
        dir.path(),
        "pkgutil/helper.go",
        r#"package pkgutil

import "time"

func Helper() time.Time {
	return time.Now()
}
"#,
    );

    let report = analyze(dir.path());
    let time_issues = rules_of(&report.issues, "TimeUsage");
    assert_eq!(time_issues.len(), 1);
    let path: Vec<&str> = time_issues[0].call_path.iter().map(|q| q.as_str()).collect();
    assert_eq!(
        path,
        vec![
            "example.com/proj.W",
            "example.com/proj.middle",
            "example.com/proj/pkgutil.Helper"
        ]
    );
}

#[test]
fn registration_indirection_classifies_workflows() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "register.go",
        r#"package main

import "time"

func init() {
	w.RegisterWorkflow("order-flow", OrderFlow)
	w.RegisterActivity(ChargeCard)
}

func OrderFlow(input string) error {
	_ = time.Now()
	return nil
}

func ChargeCard(input string) error {
	_ = time.Now()
	return nil
}
"#,
    );

    let report = analyze(dir.path());
    let time_issues = rules_of(&report.issues, "TimeUsage");
    assert_eq!(time_issues.len(), 1);
    assert_eq!(time_issues[0].function.as_deref(), Some("OrderFlow"));
}

#[test]
fn recursive_helper_chains_terminate() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "cycle.go",
        r#"package main

import (
	"time"

	"go.uber.org/cadence/workflow"
)

func W(ctx workflow.Context) error {
	f1()
	return nil
}

func f1() {
	f2()
}

func f2() {
	f1()
	_ = time.Now()
}
"#,
    );

    let report = analyze(dir.path());
    assert_eq!(rules_of(&report.issues, "TimeUsage").len(), 1);
}

#[test]
fn unreadable_files_are_skipped_without_aborting_the_run() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "good.go",
        r#"package main

import (
	"time"

	"go.uber.org/cadence/workflow"
)

func W(ctx workflow.Context) error {
	_ = time.Now()
	return nil
}
"#,
    );
    // Invalid UTF-8 makes the file unreadable as source.
    fs::write(dir.path().join("broken.go"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let report = analyze(dir.path());
    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.files_skipped, 1);
    assert_eq!(rules_of(&report.issues, "TimeUsage").len(), 1);
}

#[test]
fn disallowed_imports_downgrade_in_activity_only_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "activity.go",
        r#"package main

import (
	"context"
	"math/rand"
)

func A(ctx context.Context) int {
	return rand.Intn(10)
}
"#,
    );

    let report = analyze(dir.path());
    let import_issues = rules_of(&report.issues, "ImportRandom");
    assert_eq!(import_issues.len(), 1);
    assert_eq!(import_issues[0].severity, Severity::Warning);
    // rand.Intn itself is fine inside the activity.
    assert!(rules_of(&report.issues, "Randomness").is_empty());
}

#[test]
fn issues_are_sorted_and_stable_across_runs() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.go",
        r#"package main

import (
	"time"

	"go.uber.org/cadence/workflow"
)

func W1(ctx workflow.Context) error {
	shared()
	return nil
}

func W2(ctx workflow.Context) error {
	shared()
	return nil
}

func shared() {
	_ = time.Now()
}
"#,
    );

    let first = analyze(dir.path());
    for _ in 0..4 {
        let again = analyze(dir.path());
        let paths: Vec<_> = again.issues.iter().map(|i| i.call_path.clone()).collect();
        let expected: Vec<_> = first.issues.iter().map(|i| i.call_path.clone()).collect();
        assert_eq!(paths, expected, "diagnostics must not flap between runs");
    }
}
