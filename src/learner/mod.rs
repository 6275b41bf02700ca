// src/learner/mod.rs — In-run learning memory

use serde::{Deserialize, Serialize};

use crate::core::types::Evaluation;

/// Quality above which a successful evaluation becomes a success pattern.
pub const SUCCESS_PATTERN_MIN_QUALITY: f32 = 0.7;

/// Style score above which style notes become style insights.
pub const STYLE_INSIGHT_MIN_STYLE: f32 = 0.7;

/// Deduplicated observations accumulated within one run.
///
/// Scoped to the run on purpose: cross-run preference persistence is a
/// separate collaborator with its own read/write contract. Nothing is
/// evicted within a run; the iteration cap bounds growth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningMemory {
    success_patterns: Vec<String>,
    failure_patterns: Vec<String>,
    style_insights: Vec<String>,
}

impl LearningMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one evaluation into memory.
    ///
    /// A high-quality success becomes a success pattern keyed by
    /// {action, target, lesson}; anything else becomes a failure pattern
    /// keyed by {action, target, weaknesses}. Strong style scores with
    /// notes also yield style insights. Entries are deduplicated by
    /// exact text.
    pub fn update(&mut self, eval: &Evaluation) {
        if eval.success && eval.quality_score > SUCCESS_PATTERN_MIN_QUALITY {
            push_unique(
                &mut self.success_patterns,
                format!(
                    "{} {}: {}",
                    eval.decision.action, eval.decision.target, eval.lesson
                ),
            );
        } else {
            push_unique(
                &mut self.failure_patterns,
                format!(
                    "{} {}: {}",
                    eval.decision.action,
                    eval.decision.target,
                    eval.weaknesses.join("; ")
                ),
            );
        }

        if eval.style_score > STYLE_INSIGHT_MIN_STYLE {
            for note in &eval.style_notes {
                if !note.trim().is_empty() {
                    push_unique(&mut self.style_insights, note.clone());
                }
            }
        }
    }

    pub fn success_patterns(&self) -> &[String] {
        &self.success_patterns
    }

    pub fn failure_patterns(&self) -> &[String] {
        &self.failure_patterns
    }

    pub fn style_insights(&self) -> &[String] {
        &self.style_insights
    }

    pub fn is_empty(&self) -> bool {
        self.success_patterns.is_empty()
            && self.failure_patterns.is_empty()
            && self.style_insights.is_empty()
    }

    /// Compact prompt block biasing the next decision: failures as
    /// constraints to avoid, successes and style insights as priors.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        if !self.failure_patterns.is_empty() {
            out.push_str("Avoid repeating these failures:\n");
            for p in &self.failure_patterns {
                out.push_str(&format!("- {}\n", p));
            }
        }
        if !self.success_patterns.is_empty() {
            out.push_str("What has worked so far:\n");
            for p in &self.success_patterns {
                out.push_str(&format!("- {}\n", p));
            }
        }
        if !self.style_insights.is_empty() {
            out.push_str("Style guidance:\n");
            for p in &self.style_insights {
                out.push_str(&format!("- {}\n", p));
            }
        }
        out.trim_end().to_string()
    }
}

fn push_unique(list: &mut Vec<String>, entry: String) {
    if !entry.is_empty() && !list.iter().any(|e| e == &entry) {
        list.push(entry);
    }
}
