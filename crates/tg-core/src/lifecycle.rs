//! Lifecycle analysis on top of decoded state paths.
//!
//! Decoding answers "which phase is each point in"; this module answers the
//! questions asked of a trend afterwards: where did it first reach a terminal
//! phase, how long did each phase last, and how are points distributed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hmm::{GaussianHmm, HmmError, ViterbiDecoder};

/// Labels treated as terminal when none are configured.
pub const DEFAULT_TERMINAL_STATES: [&str; 2] = ["Saturation", "Decline"];

/// Minimum points for a trend to be analyzed by the CLI.
pub const DEFAULT_MIN_POINTS: usize = 10;

/// First point of a trend whose phase is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeclinePoint {
    pub index: usize,
    pub state: String,
    /// Observation at `index`, keyed by feature name.
    pub metrics: BTreeMap<String, f64>,
}

/// Maximal run of one state. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PhaseSegment {
    pub state: String,
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

/// Change of phase; `index` is the first point of the new phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PhaseTransition {
    pub index: usize,
    pub from: String,
    pub to: String,
}

/// Finds the first terminal phase in a label sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclineDetector {
    terminal_states: Vec<String>,
}

impl Default for DeclineDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINAL_STATES)
    }
}

impl DeclineDetector {
    pub fn new<I, S>(terminal_states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terminal_states: terminal_states.into_iter().map(Into::into).collect(),
        }
    }

    /// Use `configured` when non-empty, the default terminal set otherwise.
    pub fn from_labels(configured: &[String]) -> Self {
        if configured.is_empty() {
            Self::default()
        } else {
            Self::new(configured.iter().cloned())
        }
    }

    pub fn terminal_states(&self) -> &[String] {
        &self.terminal_states
    }

    pub fn is_terminal(&self, label: &str) -> bool {
        self.terminal_states.iter().any(|t| t == label)
    }

    /// Labels in the terminal set that the model does not define.
    pub fn unknown_states(&self, model: &GaussianHmm) -> Vec<String> {
        self.terminal_states
            .iter()
            .filter(|t| model.state_index(t).is_none())
            .cloned()
            .collect()
    }

    /// First index whose label is terminal, with that point's metrics.
    ///
    /// Metrics are omitted when `observations` is shorter than `labels`.
    pub fn detect<R: AsRef<[f64]>>(
        &self,
        labels: &[String],
        observations: &[R],
        feature_names: &[String],
    ) -> Option<DeclinePoint> {
        let index = labels.iter().position(|l| self.is_terminal(l))?;
        let metrics = observations
            .get(index)
            .map(|row| {
                row.as_ref()
                    .iter()
                    .enumerate()
                    .map(|(d, &v)| {
                        let name = feature_names
                            .get(d)
                            .cloned()
                            .unwrap_or_else(|| format!("x{}", d));
                        (name, v)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(DeclinePoint {
            index,
            state: labels[index].clone(),
            metrics,
        })
    }
}

/// Count of points per state label.
pub fn state_distribution(labels: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label.clone()).or_insert(0) += 1;
    }
    counts
}

/// Split a label sequence into maximal runs.
pub fn phase_segments(labels: &[String]) -> Vec<PhaseSegment> {
    let mut segments: Vec<PhaseSegment> = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        match segments.last_mut() {
            Some(seg) if &seg.state == label => {
                seg.end = i + 1;
                seg.len += 1;
            }
            _ => segments.push(PhaseSegment {
                state: label.clone(),
                start: i,
                end: i + 1,
                len: 1,
            }),
        }
    }
    segments
}

/// Every point where the label changes.
pub fn phase_transitions(labels: &[String]) -> Vec<PhaseTransition> {
    labels
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1])
        .map(|(i, w)| PhaseTransition {
            index: i + 1,
            from: w[0].clone(),
            to: w[1].clone(),
        })
        .collect()
}

/// Decoded lifecycle of one trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleReport {
    pub name: String,
    pub total_points: usize,
    pub labels: Vec<String>,
    pub final_state: String,
    pub log_score: f64,
    pub state_distribution: BTreeMap<String, usize>,
    pub segments: Vec<PhaseSegment>,
    pub transitions: Vec<PhaseTransition>,
    pub decline: Option<DeclinePoint>,
}

impl LifecycleReport {
    pub fn has_decline(&self) -> bool {
        self.decline.is_some()
    }
}

/// Decode one trend and derive its lifecycle report.
pub fn analyze_trend<R: AsRef<[f64]>>(
    model: &GaussianHmm,
    name: &str,
    observations: &[R],
    detector: &DeclineDetector,
) -> Result<LifecycleReport, HmmError> {
    analyze_trend_with(&ViterbiDecoder::default(), model, name, observations, detector)
}

/// [`analyze_trend`] with an explicit decoder.
pub fn analyze_trend_with<R: AsRef<[f64]>>(
    decoder: &ViterbiDecoder,
    model: &GaussianHmm,
    name: &str,
    observations: &[R],
    detector: &DeclineDetector,
) -> Result<LifecycleReport, HmmError> {
    let path = decoder.decode_path(model, observations)?;
    let labels = path.labels(model);
    let decline = detector.detect(&labels, observations, &model.feature_names());

    debug!(
        trend = name,
        points = labels.len(),
        decline_at = ?decline.as_ref().map(|d| d.index),
        "trend analyzed"
    );

    Ok(LifecycleReport {
        name: name.to_string(),
        total_points: labels.len(),
        final_state: labels.last().cloned().unwrap_or_default(),
        log_score: path.log_score,
        state_distribution: state_distribution(&labels),
        segments: phase_segments(&labels),
        transitions: phase_transitions(&labels),
        decline,
        labels,
    })
}

/// A trend left out of the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkippedTrend {
    pub name: String,
    pub points: usize,
    pub reason: String,
}

/// Combined result over several trends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisSummary {
    pub generated_at: DateTime<Utc>,
    pub total_trends_analyzed: usize,
    pub trends_with_decline: usize,
    /// Terminal state reached first by each declining trend, counted.
    pub decline_states: BTreeMap<String, usize>,
    pub skipped: Vec<SkippedTrend>,
    pub reports: Vec<LifecycleReport>,
}

impl AnalysisSummary {
    pub fn new(reports: Vec<LifecycleReport>, skipped: Vec<SkippedTrend>) -> Self {
        let mut decline_states = BTreeMap::new();
        for decline in reports.iter().filter_map(|r| r.decline.as_ref()) {
            *decline_states.entry(decline.state.clone()).or_insert(0) += 1;
        }
        Self {
            generated_at: Utc::now(),
            total_trends_analyzed: reports.len(),
            trends_with_decline: reports.iter().filter(|r| r.has_decline()).count(),
            decline_states,
            skipped,
            reports,
        }
    }

    pub fn any_decline(&self) -> bool {
        self.trends_with_decline > 0
    }
}
