//! Output formatting for lint results.

use std::fmt::Write;

use anyhow::Result;
use miette::{GraphicalReportHandler, GraphicalTheme, NamedSource};
use pepcheck_core::{LintResult, Severity, SourceInput, ViolationDiagnostic};

use crate::OutputFormat;

/// Prints lint results in the specified format.
///
/// `sources` supplies file contents for the `pretty` format.
pub fn print(result: &LintResult, format: OutputFormat, sources: &[SourceInput]) -> Result<()> {
    let rendered = render(result, format, sources)?;
    print!("{rendered}");
    Ok(())
}

/// Renders lint results to a string.
pub fn render(result: &LintResult, format: OutputFormat, sources: &[SourceInput]) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
        OutputFormat::Compact => render_compact(result),
        OutputFormat::Pretty => render_pretty(result, sources)?,
    })
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
    }
}

fn render_text(result: &LintResult) -> String {
    let mut out = String::new();
    for violation in result.violations() {
        let _ = write!(
            out,
            "{} {} at {}:{}",
            violation.code, violation.rule, violation.location.file, violation.location.line
        );
        if let Some(column) = violation.location.column {
            let _ = write!(out, ":{column}");
        }
        out.push('\n');
        let _ = writeln!(
            out,
            "  {}: {}",
            severity_indicator(violation.severity),
            violation.message
        );
        if let Some(suggestion) = &violation.suggestion {
            let _ = writeln!(out, "  = help: {}", suggestion.message);
        }
        out.push('\n');
    }
    render_failures(&mut out, result);
    render_summary(&mut out, result);
    out
}

fn render_compact(result: &LintResult) -> String {
    let mut out = String::new();
    for violation in result.violations() {
        let _ = writeln!(out, "{violation}");
    }
    for failure in &result.failures {
        let _ = writeln!(out, "{}: failed: {}", failure.identifier, failure.message);
    }
    out
}

fn render_pretty(result: &LintResult, sources: &[SourceInput]) -> Result<String> {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut out = String::new();
    for report in &result.reports {
        let Some(input) = sources.iter().find(|s| s.identifier == report.identifier) else {
            continue;
        };
        let text = String::from_utf8_lossy(&input.bytes).into_owned();
        for violation in &report.violations {
            let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation))
                .with_source_code(NamedSource::new(&report.identifier, text.clone()));
            let _ = writeln!(out, "{}:", severity_indicator(violation.severity));
            handler.render_report(&mut out, diagnostic.as_ref())?;
            out.push('\n');
        }
    }
    render_failures(&mut out, result);
    render_summary(&mut out, result);
    Ok(out)
}

fn render_failures(out: &mut String, result: &LintResult) {
    for failure in &result.failures {
        let _ = writeln!(
            out,
            "{} {}: {}\n",
            severity_indicator(Severity::Error),
            failure.identifier,
            failure.message
        );
    }
}

fn render_summary(out: &mut String, result: &LintResult) {
    let (errors, warnings) = result.count_by_severity();
    let failed = result.failures.len();

    let summary_color = if errors > 0 || failed > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let _ = write!(
        out,
        "{summary_color}Found {errors} error(s), {warnings} warning(s) in {} file(s)",
        result.files_checked
    );
    if failed > 0 {
        let _ = write!(out, ", {failed} file(s) could not be checked");
    }
    if !result.skipped.is_empty() {
        let _ = write!(out, ", {} skipped", result.skipped.len());
    }
    out.push_str("\x1b[0m\n");
}
