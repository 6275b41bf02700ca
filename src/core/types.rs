// src/core/types.rs — Core domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The working image a run iteratively refines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    /// Image location: an https URL or a local file path.
    pub uri: String,
}

impl Artifact {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            uri: uri.into(),
        }
    }
}

/// What kind of change a decision proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Edit,
    Remove,
    Wait,
}

impl ActionKind {
    /// Parse a wire action string. Unknown kinds map to `None` so the
    /// caller can apply its Wait default.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "move" => Some(Self::Move),
            "edit" => Some(Self::Edit),
            "remove" => Some(Self::Remove),
            "wait" => Some(Self::Wait),
            _ => None,
        }
    }

    pub fn is_wait(self) -> bool {
        matches!(self, Self::Wait)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Move => write!(f, "move"),
            ActionKind::Edit => write!(f, "edit"),
            ActionKind::Remove => write!(f, "remove"),
            ActionKind::Wait => write!(f, "wait"),
        }
    }
}

/// One proposed change. Append-only: never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub iteration: u32,
    pub action: ActionKind,
    pub target: String,
    pub reasoning: String,
    pub instruction: String,
    /// Advisory only: logged and reported, never gates execution.
    pub confidence: f32,
    pub estimated_cost: f64,
}

impl Decision {
    /// The fallback decision: skip productive work this iteration.
    pub fn wait(iteration: u32, reasoning: impl Into<String>, confidence: f32) -> Self {
        Self {
            iteration,
            action: ActionKind::Wait,
            target: String::new(),
            reasoning: reasoning.into(),
            instruction: String::new(),
            confidence,
            estimated_cost: 0.0,
        }
    }
}

/// A scored critique of one executed decision's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub iteration: u32,
    pub timestamp: DateTime<Utc>,
    pub decision: Decision,
    pub quality_score: f32,
    pub style_score: f32,
    pub success: bool,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub style_notes: Vec<String>,
    pub lesson: String,
    pub better_approach: Option<String>,
    /// The executed artifact, kept unless the run is simulate-only.
    pub artifact: Option<Artifact>,
}

/// Immutable per-run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub goal: String,
    /// Target aesthetic, in priority order.
    pub style_keywords: Vec<String>,
    /// Score without retaining generated artifacts.
    pub simulate: bool,
    pub max_iterations: u32,
    pub iteration_delay_ms: u64,
    pub budget_usd: f64,
    /// Estimated synthesis cost reserved per executed decision.
    pub unit_cost_usd: f64,
    pub call_timeout_secs: u64,
}

impl RunConfiguration {
    pub fn iteration_delay(&self) -> Duration {
        Duration::from_millis(self.iteration_delay_ms)
    }

    /// Backoff after a Wait decision: twice the normal delay.
    pub fn wait_delay(&self) -> Duration {
        2 * self.iteration_delay()
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            goal: String::new(),
            style_keywords: Vec::new(),
            simulate: false,
            max_iterations: 10,
            iteration_delay_ms: 2000,
            budget_usd: 1.0,
            unit_cost_usd: 0.04,
            call_timeout_secs: 60,
        }
    }
}

impl From<&crate::infra::config::AgentConfig> for RunConfiguration {
    fn from(cfg: &crate::infra::config::AgentConfig) -> Self {
        Self {
            goal: String::new(),
            style_keywords: Vec::new(),
            simulate: cfg.simulate,
            max_iterations: cfg.max_iterations,
            iteration_delay_ms: cfg.iteration_delay_ms,
            budget_usd: cfg.budget_usd,
            unit_cost_usd: cfg.unit_cost_usd,
            call_timeout_secs: cfg.call_timeout_secs,
        }
    }
}

/// Lifecycle of a run. Stopped is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Why a run reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    IterationCap,
    BudgetExhausted,
    UserStop,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::IterationCap => write!(f, "iteration cap reached"),
            StopReason::BudgetExhausted => write!(f, "budget exhausted"),
            StopReason::UserStop => write!(f, "stopped by user"),
        }
    }
}
