// src/core/state.rs — Published run state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{AgentPhase, Artifact, Decision, Evaluation, RunConfiguration, StopReason};
use crate::learner::LearningMemory;

/// Running aggregates over the evaluation log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub mean_quality: f32,
    pub mean_style: f32,
    pub success_rate: f32,
    pub changes_applied: u32,
}

impl ProgressStats {
    /// Recompute from scratch. The evaluation log is small (bounded by
    /// the iteration cap), so a full pass beats incremental bookkeeping.
    pub fn from_evaluations(evaluations: &[Evaluation]) -> Self {
        if evaluations.is_empty() {
            return Self::default();
        }
        let n = evaluations.len() as f32;
        Self {
            mean_quality: evaluations.iter().map(|e| e.quality_score).sum::<f32>() / n,
            mean_style: evaluations.iter().map(|e| e.style_score).sum::<f32>() / n,
            success_rate: evaluations.iter().filter(|e| e.success).count() as f32 / n,
            changes_applied: evaluations.len() as u32,
        }
    }
}

/// Snapshot of one run, published after every transition.
///
/// Exclusively owned and mutated by the agent loop; everyone else sees
/// clones through the watch channel. Once the phase is Stopped no field
/// changes again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub config: RunConfiguration,
    pub phase: AgentPhase,
    pub iteration: u32,
    pub spent_usd: f64,
    pub artifact: Artifact,
    pub decisions: Vec<Decision>,
    pub evaluations: Vec<Evaluation>,
    pub progress: ProgressStats,
    pub memory: LearningMemory,
    pub errors: Vec<String>,
    pub stop_reason: Option<StopReason>,
    pub started_at: DateTime<Utc>,
}

impl AgentState {
    pub fn new(config: RunConfiguration, artifact: Artifact) -> Self {
        Self {
            config,
            phase: AgentPhase::Idle,
            iteration: 0,
            spent_usd: 0.0,
            artifact,
            decisions: Vec::new(),
            evaluations: Vec::new(),
            progress: ProgressStats::default(),
            memory: LearningMemory::new(),
            errors: Vec::new(),
            stop_reason: None,
            started_at: Utc::now(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == AgentPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == AgentPhase::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == AgentPhase::Stopped
    }

    /// Most recent error entry, for hosts surfacing live progress.
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }

    pub fn recompute_progress(&mut self) {
        self.progress = ProgressStats::from_evaluations(&self.evaluations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ActionKind;

    fn eval(iteration: u32, quality: f32, style: f32, success: bool) -> Evaluation {
        Evaluation {
            iteration,
            timestamp: Utc::now(),
            decision: Decision {
                iteration,
                action: ActionKind::Edit,
                target: "wall".into(),
                reasoning: String::new(),
                instruction: "paint it sage".into(),
                confidence: 0.9,
                estimated_cost: 0.04,
            },
            quality_score: quality,
            style_score: style,
            success,
            strengths: vec![],
            weaknesses: vec![],
            style_notes: vec![],
            lesson: String::new(),
            better_approach: None,
            artifact: None,
        }
    }

    #[test]
    fn test_progress_empty() {
        let p = ProgressStats::from_evaluations(&[]);
        assert_eq!(p, ProgressStats::default());
    }

    #[test]
    fn test_progress_means_and_rate() {
        let evals = vec![
            eval(1, 0.8, 0.6, true),
            eval(2, 0.4, 0.8, false),
            eval(3, 0.6, 0.7, true),
        ];
        let p = ProgressStats::from_evaluations(&evals);
        assert!((p.mean_quality - 0.6).abs() < 1e-6);
        assert!((p.mean_style - 0.7).abs() < 1e-6);
        assert!((p.success_rate - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(p.changes_applied, 3);
    }

    #[test]
    fn test_new_state_is_idle() {
        let s = AgentState::new(RunConfiguration::default(), Artifact::new("room.jpg"));
        assert_eq!(s.phase, AgentPhase::Idle);
        assert_eq!(s.iteration, 0);
        assert_eq!(s.spent_usd, 0.0);
        assert!(s.decisions.is_empty());
        assert!(s.evaluations.is_empty());
        assert!(s.stop_reason.is_none());
        assert!(s.last_error().is_none());
    }

    #[test]
    fn test_phase_helpers() {
        let mut s = AgentState::new(RunConfiguration::default(), Artifact::new("room.jpg"));
        assert!(!s.is_running());
        s.phase = AgentPhase::Running;
        assert!(s.is_running());
        s.phase = AgentPhase::Paused;
        assert!(s.is_paused());
        s.phase = AgentPhase::Stopped;
        assert!(s.is_stopped());
    }

    #[test]
    fn test_last_error() {
        let mut s = AgentState::new(RunConfiguration::default(), Artifact::new("room.jpg"));
        s.errors.push("iteration 1: execution failed".into());
        s.errors.push("budget exhausted".into());
        assert_eq!(s.last_error(), Some("budget exhausted"));
    }
}
