// src/engine/decision.rs — Next-action proposals

use std::sync::Arc;

use tokio::time::timeout;

use crate::core::types::{ActionKind, Artifact, Decision, RunConfiguration};
use crate::learner::LearningMemory;
use crate::provider::{DecisionRequest, DecisionWire, VisionProvider};

/// How many prior decisions the history summary feeds back.
const HISTORY_WINDOW: usize = 5;

/// Proposes the next change using the current artifact, the decision
/// history, and the run's learning memory.
pub struct DecisionEngine {
    provider: Arc<dyn VisionProvider>,
}

impl DecisionEngine {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Propose the next decision. Never fails: inference errors,
    /// timeouts, and malformed responses all degrade to Wait.
    pub async fn next_decision(
        &self,
        config: &RunConfiguration,
        artifact: &Artifact,
        history: &[Decision],
        memory: &LearningMemory,
        iteration: u32,
    ) -> Decision {
        let request = DecisionRequest {
            artifact: artifact.clone(),
            goal: config.goal.clone(),
            style_keywords: config.style_keywords.clone(),
            history_summary: summarize_history(history),
            memory_summary: memory.summary(),
        };

        match timeout(config.call_timeout(), self.provider.decide(request)).await {
            Ok(Ok(wire)) => decision_from_wire(wire, iteration, config.unit_cost_usd),
            Ok(Err(e)) => {
                tracing::warn!("Decision inference failed: {}", e);
                Decision::wait(iteration, format!("Decision inference failed: {}", e), 0.0)
            }
            Err(_) => {
                tracing::warn!(
                    seconds = config.call_timeout_secs,
                    "Decision inference timed out"
                );
                Decision::wait(iteration, "Decision inference timed out", 0.0)
            }
        }
    }
}

/// Default-filling rules for the decision wire format.
///
/// A missing or unknown action kind, or an actionable kind without an
/// instruction, yields Wait. Confidence defaults to 0.5 and is clamped
/// to [0,1].
pub(crate) fn decision_from_wire(
    wire: DecisionWire,
    iteration: u32,
    unit_cost_usd: f64,
) -> Decision {
    let action = wire.action.as_deref().and_then(ActionKind::parse);
    let confidence = wire.confidence.unwrap_or(0.5).clamp(0.0, 1.0);
    let target = wire.target.unwrap_or_default();
    let reasoning = wire.reasoning.unwrap_or_default();
    let instruction = wire.instruction.unwrap_or_default();

    match action {
        None | Some(ActionKind::Wait) => {
            let why = if reasoning.is_empty() {
                "No actionable proposal".to_string()
            } else {
                reasoning
            };
            Decision::wait(iteration, why, confidence)
        }
        Some(_) if instruction.trim().is_empty() => Decision::wait(
            iteration,
            format!("Proposal for '{}' arrived without an instruction", target),
            confidence,
        ),
        Some(kind) => Decision {
            iteration,
            action: kind,
            target,
            reasoning,
            instruction,
            confidence,
            estimated_cost: unit_cost_usd,
        },
    }
}

pub(crate) fn summarize_history(history: &[Decision]) -> String {
    if history.is_empty() {
        return "No changes yet.".into();
    }
    let skipped = history.len().saturating_sub(HISTORY_WINDOW);
    history[skipped..]
        .iter()
        .map(|d| {
            format!(
                "#{} {} {} ({:.0}% confident)",
                d.iteration,
                d.action,
                d.target,
                d.confidence * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
