//! Audit report rendering, as a styled table or as JSON for CI tooling.

use super::ui::{
    fit, print_banner, print_blocked, print_hint, print_section, print_success, print_warning,
};
use clap::ValueEnum;
use crossterm::style::Stylize;
use scriptinel_core::{DetectedScript, MatchResult, PolicyViolation, ReportSummary};
use serde::Serialize;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Machine-readable report shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput<'a> {
    pub violations: &'a [PolicyViolation],
    pub approved: &'a [DetectedScript],
    pub blocked: &'a [DetectedScript],
    pub summary: ReportSummary,
}

impl<'a> From<&'a MatchResult> for ReportOutput<'a> {
    fn from(result: &'a MatchResult) -> Self {
        Self {
            violations: &result.violations,
            approved: &result.approved,
            blocked: &result.blocked,
            summary: result.summary(),
        }
    }
}

pub fn render(result: &MatchResult, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => println!("{}", to_json(result)?),
        OutputFormat::Table => print_table(result),
    }
    Ok(())
}

pub fn to_json(result: &MatchResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportOutput::from(result))
}

/// One `approve` command per distinct violating package, first-seen order.
pub fn approve_hints(violations: &[PolicyViolation]) -> Vec<String> {
    let mut packages: Vec<&str> = Vec::new();
    for violation in violations {
        if !packages.contains(&violation.package_name.as_str()) {
            packages.push(&violation.package_name);
        }
    }
    packages
        .into_iter()
        .map(|name| format!("scriptinel approve {name}"))
        .collect()
}

/// Violation table columns: package, version, script.
const COLUMNS: [(&str, usize); 3] = [("PACKAGE", 32), ("VERSION", 14), ("SCRIPT", 12)];

fn violation_row(package: &str, version: &str, script: &str) -> String {
    let [(_, package_w), (_, version_w), _] = COLUMNS;
    format!(
        "{:<package_w$} {:<version_w$} {script}",
        fit(package, package_w),
        fit(version, version_w)
    )
}

fn print_violations(violations: &[PolicyViolation]) {
    print_section("Unapproved", violations.len());
    let [package, version, script] = COLUMNS.map(|(name, _)| name);
    println!("  {}", violation_row(package, version, script).white().bold());
    let rule: Vec<String> = COLUMNS.iter().map(|(_, w)| "─".repeat(*w)).collect();
    println!("  {}", rule.join(" ").dark_grey());
    for v in violations {
        let row = violation_row(&v.package_name, &v.version, v.script.as_str());
        println!("  {}", row.yellow());
    }

    println!();
    print_warning("These scripts were not run. To approve them:");
    for hint in approve_hints(violations) {
        println!("      {}", hint.cyan());
    }
}

fn print_table(result: &MatchResult) {
    print_banner("🔒 LIFECYCLE SCRIPT AUDIT");
    let summary = result.summary();

    if summary.total_detected == 0 {
        println!("  {}", "No lifecycle scripts detected.".dark_grey().italic());
        println!();
        return;
    }

    if !result.violations.is_empty() {
        print_violations(&result.violations);
    }

    if !result.blocked.is_empty() {
        print_section("Blocked", result.blocked.len());
        for s in &result.blocked {
            print_blocked(&format!("{}@{} - {}", s.package_name, s.version, s.script));
        }
    }

    if !result.approved.is_empty() {
        print_section("Approved", result.approved.len());
        for s in &result.approved {
            print_success(&format!("{}@{} - {}", s.package_name, s.version, s.script));
        }
    }

    println!();
    println!(
        "  Summary: {} detected  |  {} approved  |  {} violations  |  {} blocked",
        summary.total_detected.to_string().white().bold(),
        summary.total_approved.to_string().green(),
        summary.total_violations.to_string().yellow(),
        summary.total_blocked.to_string().red()
    );
    if summary.total_violations > 0 {
        print_hint("Run with --ci to fail the build on unapproved scripts");
    }
}
