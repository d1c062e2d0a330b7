use crate::reporter::Reporter;
use crate::run::ScanReport;
use crate::types::{FormattedIssue, FormattedResult, Severity};
use colored::Colorize;
use std::path::Path;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn severity_color(&self, severity: Severity) -> colored::ColoredString {
        let label = format!("[{}]", severity.as_str().to_uppercase());
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::High => label.yellow().bold(),
            Severity::Medium => label.cyan(),
            Severity::Low | Severity::None => label.white(),
        }
    }

    /// Lint-style block: `file:line: [SEVERITY] ID: title` plus advice lines.
    fn format_issue(&self, file_path: &Path, issue: &FormattedIssue) -> String {
        let mut output = String::new();
        let location = if issue.line_number > 0 {
            format!("{}:{}", file_path.display(), issue.line_number)
        } else {
            file_path.display().to_string()
        };

        output.push_str(&format!(
            "{}: {} {}: {}\n",
            location,
            self.severity_color(issue.severity()),
            issue.id,
            issue.name
        ));
        output.push_str(&format!(
            "  {} {}\n",
            "=".dimmed(),
            format!("path: {}", issue.issue_path.join(" > ")).dimmed()
        ));
        if !issue.policy.issue.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "=".dimmed(),
                format!("why: {}", issue.policy.issue).yellow()
            ));
        }
        if self.verbose && !issue.policy.impact.is_empty() {
            output.push_str(&format!(
                "  {} impact: {}\n",
                "=".dimmed(),
                issue.policy.impact
            ));
        }
        if !issue.policy.resolve.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "=".dimmed(),
                format!("fix: {}", issue.policy.resolve).green()
            ));
        }
        if self.verbose && !issue.policy.references.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "=".dimmed(),
                format!("ref: {}", issue.policy.references.join(", ")).bright_blue()
            ));
        }

        output
    }

    fn format_result(&self, result: &FormattedResult) -> String {
        let mut output = String::new();
        for issue in &result.issues {
            output.push_str(&self.format_issue(&result.file_path, issue));
            output.push('\n');
        }
        output
    }

    fn count(report: &ScanReport, severity: Severity) -> usize {
        report
            .results
            .iter()
            .flat_map(|r| &r.issues)
            .filter(|issue| issue.severity() == severity)
            .count()
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!(
                "iac-scan v{} - Infrastructure as Code Security Scanner",
                env!("CARGO_PKG_VERSION")
            )
            .bold()
        ));

        if report.has_issues() {
            for result in report.results.iter().filter(|r| r.has_issues()) {
                output.push_str(&self.format_result(result));
            }
        } else {
            output.push_str(&"No security issues found.\n".green().to_string());
        }

        if !report.failures.is_empty() {
            output.push('\n');
            output.push_str(&format!(
                "{}\n",
                format!("{} file(s) could not be scanned:", report.failures.len()).yellow()
            ));
            for failure in &report.failures {
                output.push_str(&format!(
                    "  {}: {}\n",
                    failure.file_path.display(),
                    failure.failure_reason.dimmed()
                ));
            }
        }

        output.push_str(&format!("{}\n", "━".repeat(50)));
        output.push_str(&format!(
            "Summary: {} file(s) scanned, {} critical, {} high, {} medium, {} low",
            report.results.len(),
            Self::count(report, Severity::Critical).to_string().red().bold(),
            Self::count(report, Severity::High).to_string().yellow().bold(),
            Self::count(report, Severity::Medium).to_string().cyan(),
            Self::count(report, Severity::Low)
        ));
        if report.ignore_count > 0 {
            output.push_str(&format!(", {} ignored", report.ignore_count));
        }
        output.push('\n');

        let result_text = if report.has_issues() {
            "FAIL".red().bold()
        } else {
            "PASS".green().bold()
        };
        output.push_str(&format!(
            "Result: {} (exit code {})\n",
            result_text,
            report.exit_code()
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PolicyViolation, ProjectType};
    use std::path::PathBuf;

    fn issue(id: &str, severity: Severity, line_number: i64) -> FormattedIssue {
        let mut policy = PolicyViolation::new(id, "Privileged container", severity, "spec.privileged");
        policy.issue = "Container runs with full host privileges".to_string();
        policy.resolve = "Set privileged to false".to_string();
        FormattedIssue {
            id: id.to_string(),
            name: "Privileged container".to_string(),
            policy,
            issue_path: vec!["[DocId:0]".into(), "spec".into(), "privileged".into()],
            line_number,
            is_ignored: false,
        }
    }

    fn report(issues: Vec<FormattedIssue>, ignore_count: usize) -> ScanReport {
        ScanReport {
            results: vec![FormattedResult {
                file_path: PathBuf::from("app.yaml"),
                project_type: ProjectType::K8sConfig,
                issues,
            }],
            failures: Vec::new(),
            ignore_count,
        }
    }

    #[test]
    fn test_report_no_issues() {
        colored::control::set_override(false);
        let output = TerminalReporter::new(false).report(&report(Vec::new(), 0));
        assert!(output.contains("No security issues found"));
        assert!(output.contains("PASS"));
        assert!(output.contains("exit code 0"));
    }

    #[test]
    fn test_report_with_issue() {
        colored::control::set_override(false);
        let output = TerminalReporter::new(false)
            .report(&report(vec![issue("K8S-001", Severity::High, 6)], 1));

        assert!(output.contains("app.yaml:6: [HIGH] K8S-001: Privileged container"));
        assert!(output.contains("path: [DocId:0] > spec > privileged"));
        assert!(output.contains("fix: Set privileged to false"));
        assert!(output.contains("1 high"));
        assert!(output.contains("1 ignored"));
        assert!(output.contains("FAIL"));
    }

    #[test]
    fn test_unresolved_line_omits_number() {
        colored::control::set_override(false);
        let output = TerminalReporter::new(false)
            .report(&report(vec![issue("K8S-001", Severity::Low, -1)], 0));
        assert!(output.contains("app.yaml: [LOW] K8S-001"));
    }
}
