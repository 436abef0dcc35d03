//! Output formats and renderers for CLI payloads.
//!
//! JSON goes through serde; Markdown and one-line summaries are rendered here.
//! Everything returned is written to stdout by the caller.

use std::fmt::Write;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lifecycle::{AnalysisSummary, LifecycleReport};

/// Version of the JSON payloads printed by the CLI.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default for machine consumption)
    #[default]
    Json,

    /// Human-readable Markdown
    Md,

    /// One line per trend
    Summary,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Md => write!(f, "md"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

/// Decoded path of one trend, as emitted by `decode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DecodedTrend {
    pub name: String,
    pub labels: Vec<String>,
    pub states: Vec<usize>,
    pub log_score: f64,
    pub confidence: f64,
}

/// Collapse consecutive repeats: `A A B C C` → `A → B → C`.
pub fn phase_chain(labels: &[String]) -> String {
    let mut chain: Vec<&str> = Vec::new();
    for label in labels {
        if chain.last() != Some(&label.as_str()) {
            chain.push(label);
        }
    }
    chain.join(" → ")
}

pub fn render_decode_md(results: &[DecodedTrend]) -> String {
    let mut out = String::from("# Decoded Lifecycle Phases\n");
    for trend in results {
        let _ = writeln!(out, "\n## {}\n", trend.name);
        let _ = writeln!(out, "Path: {}\n", phase_chain(&trend.labels));
        out.push_str("| t | state |\n|---|---|\n");
        for (t, label) in trend.labels.iter().enumerate() {
            let _ = writeln!(out, "| {} | {} |", t, label);
        }
    }
    out
}

pub fn render_decode_summary(results: &[DecodedTrend]) -> String {
    let mut out = String::new();
    for trend in results {
        let _ = writeln!(
            out,
            "{}: {} ({} points)",
            trend.name,
            phase_chain(&trend.labels),
            trend.labels.len()
        );
    }
    out
}

fn render_report_md(out: &mut String, report: &LifecycleReport) {
    let _ = writeln!(out, "\n## {}\n", report.name);
    let _ = writeln!(out, "- Points: {}", report.total_points);
    let _ = writeln!(out, "- Final phase: {}", report.final_state);
    let _ = writeln!(out, "- Path: {}", phase_chain(&report.labels));
    match &report.decline {
        Some(point) => {
            let metrics: Vec<String> = point
                .metrics
                .iter()
                .map(|(k, v)| format!("{}={:.3}", k, v))
                .collect();
            let _ = writeln!(
                out,
                "- Decline: **{}** at t={} ({})",
                point.state,
                point.index,
                metrics.join(", ")
            );
        }
        None => out.push_str("- Decline: none\n"),
    }
    out.push_str("\n| phase | start | end | points |\n|---|---|---|---|\n");
    for seg in &report.segments {
        let _ = writeln!(out, "| {} | {} | {} | {} |", seg.state, seg.start, seg.end, seg.len);
    }
}

pub fn render_analysis_md(summary: &AnalysisSummary) -> String {
    let mut out = String::from("# Lifecycle Analysis\n\n");
    let _ = writeln!(out, "- Generated: {}", summary.generated_at.to_rfc3339());
    let _ = writeln!(out, "- Trends analyzed: {}", summary.total_trends_analyzed);
    let _ = writeln!(out, "- Trends with decline: {}", summary.trends_with_decline);
    if !summary.skipped.is_empty() {
        let _ = writeln!(out, "- Skipped: {}", summary.skipped.len());
    }
    for report in &summary.reports {
        render_report_md(&mut out, report);
    }
    out
}

pub fn render_analysis_summary(summary: &AnalysisSummary) -> String {
    let mut out = String::new();
    for report in &summary.reports {
        let status = match &report.decline {
            Some(point) => format!("DECLINE {} at t={}", point.state, point.index),
            None => "ok".to_string(),
        };
        let _ = writeln!(
            out,
            "{}: {} [{}]",
            report.name,
            phase_chain(&report.labels),
            status
        );
    }
    for skipped in &summary.skipped {
        let _ = writeln!(out, "{}: skipped ({})", skipped.name, skipped.reason);
    }
    let _ = writeln!(
        out,
        "{} analyzed, {} with decline",
        summary.total_trends_analyzed, summary.trends_with_decline
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_phase_chain() {
        assert_eq!(
            phase_chain(&labels(&["A", "A", "B", "C", "C"])),
            "A → B → C"
        );
        assert_eq!(phase_chain(&[]), "");
    }

    #[test]
    fn test_decode_summary_line() {
        let results = vec![DecodedTrend {
            name: "t".to_string(),
            labels: labels(&["Growth", "Growth", "Peak"]),
            states: vec![1, 1, 2],
            log_score: -1.0,
            confidence: 0.9,
        }];
        assert_eq!(render_decode_summary(&results), "t: Growth → Peak (3 points)\n");
        let md = render_decode_md(&results);
        assert!(md.contains("## t"));
        assert!(md.contains("| 2 | Peak |"));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }
}
