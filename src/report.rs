// src/report.rs — Exportable run reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::state::{AgentState, ProgressStats};
use crate::core::types::{ActionKind, Artifact, RunConfiguration, StopReason};
use crate::learner::LearningMemory;

/// Structured document for one run: configuration, aggregate progress,
/// learned memory, and per-iteration summaries.
///
/// Round-trippable: `recompute_progress` over the summaries reproduces
/// the live aggregates, so a consumer holding only the serialized report
/// can verify the numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub config: RunConfiguration,
    pub stop_reason: Option<StopReason>,
    pub iterations_completed: u32,
    pub spent_usd: f64,
    pub progress: ProgressStats,
    pub memory: LearningMemory,
    pub iterations: Vec<IterationSummary>,
    pub errors: Vec<String>,
}

/// One iteration as it appears in the report. Evaluation fields are
/// absent for Wait decisions and failed executions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationSummary {
    pub iteration: u32,
    pub action: ActionKind,
    pub target: String,
    pub instruction: String,
    pub confidence: f32,
    pub estimated_cost: f64,
    pub executed: bool,
    pub quality_score: Option<f32>,
    pub style_score: Option<f32>,
    pub success: Option<bool>,
    pub lesson: Option<String>,
}

/// A retained artifact paired with the iteration that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactExport {
    pub iteration: u32,
    pub artifact: Artifact,
}

impl RunReport {
    pub fn from_state(state: &AgentState) -> Self {
        let iterations = state
            .decisions
            .iter()
            .map(|d| {
                let eval = state
                    .evaluations
                    .iter()
                    .find(|e| e.iteration == d.iteration);
                IterationSummary {
                    iteration: d.iteration,
                    action: d.action,
                    target: d.target.clone(),
                    instruction: d.instruction.clone(),
                    confidence: d.confidence,
                    estimated_cost: d.estimated_cost,
                    executed: eval.is_some(),
                    quality_score: eval.map(|e| e.quality_score),
                    style_score: eval.map(|e| e.style_score),
                    success: eval.map(|e| e.success),
                    lesson: eval.map(|e| e.lesson.clone()),
                }
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            started_at: state.started_at,
            config: state.config.clone(),
            stop_reason: state.stop_reason,
            iterations_completed: state.iteration,
            spent_usd: state.spent_usd,
            progress: state.progress,
            memory: state.memory.clone(),
            iterations,
            errors: state.errors.clone(),
        }
    }

    /// Rebuild aggregate progress from the per-iteration summaries. At
    /// run end this matches the live aggregates within float tolerance.
    pub fn recompute_progress(&self) -> ProgressStats {
        let executed: Vec<&IterationSummary> =
            self.iterations.iter().filter(|s| s.executed).collect();
        if executed.is_empty() {
            return ProgressStats::default();
        }
        let n = executed.len() as f32;
        ProgressStats {
            mean_quality: executed.iter().filter_map(|s| s.quality_score).sum::<f32>() / n,
            mean_style: executed.iter().filter_map(|s| s.style_score).sum::<f32>() / n,
            success_rate: executed.iter().filter(|s| s.success == Some(true)).count() as f32 / n,
            changes_applied: executed.len() as u32,
        }
    }
}

/// Retained {iteration, artifact} pairs from a run's evaluations.
/// Simulate-only runs retain none, so this comes back empty for them.
pub fn artifacts_from_state(state: &AgentState) -> Vec<ArtifactExport> {
    state
        .evaluations
        .iter()
        .filter_map(|e| {
            e.artifact.clone().map(|artifact| ArtifactExport {
                iteration: e.iteration,
                artifact,
            })
        })
        .collect()
}
