//! Report rendering: terminal, JSON, or YAML.

use crate::analyzer::AnalysisReport;
use crate::cli::OutputFormat;
use anyhow::Result;
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;

pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.issues)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&report.issues)?),
        OutputFormat::Terminal => Ok(render_terminal(report)),
    }
}

fn render_terminal(report: &AnalysisReport) -> String {
    let mut out = String::new();
    for issue in &report.issues {
        let _ = writeln!(
            out,
            "{}:{}:{}: [{}] {} {}",
            issue.file.display(),
            issue.line,
            issue.column,
            issue.severity,
            issue.rule,
            issue.message
        );
        if issue.call_path.len() > 1 {
            let path: Vec<&str> = issue.call_path.iter().map(|q| q.as_str()).collect();
            let _ = writeln!(out, "    call path: {}", path.join(" -> "));
        }
    }
    let _ = writeln!(
        out,
        "{} issue(s), {} file(s) scanned, {} skipped",
        report.issues.len(),
        report.files_scanned,
        report.files_skipped
    );
    out
}

pub fn write_rendered(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, rendered)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
        }
    }
    Ok(())
}
