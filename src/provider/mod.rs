// src/provider/mod.rs — External vision/synthesis service boundary

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::types::{Artifact, Decision};
use crate::infra::errors::DecoraError;

/// The three external capabilities a run consumes.
///
/// Implementations wrap one concrete API. Responses come back as wire
/// structs with every field optional: the engine layer owns the
/// defaulting rules and the enforced timeouts, so a provider only has
/// to report what the service actually said.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    /// Propose the next change for the artifact.
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionWire, DecoraError>;

    /// Score an executed change against the design goal.
    async fn assess(&self, request: AssessmentRequest) -> Result<AssessmentWire, DecoraError>;

    /// Apply an instruction to the artifact, producing a new one.
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Artifact, DecoraError>;
}

impl std::fmt::Debug for dyn VisionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionProvider").field("id", &self.id()).finish()
    }
}

#[derive(Debug, Clone)]
pub struct DecisionRequest {
    pub artifact: Artifact,
    pub goal: String,
    pub style_keywords: Vec<String>,
    pub history_summary: String,
    pub memory_summary: String,
}

#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub artifact: Artifact,
    pub decision: Decision,
    pub goal: String,
    pub style_keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub artifact: Artifact,
    pub instruction: String,
    pub target: String,
    /// Overwrite the target area instead of restyling it (set for
    /// removals).
    pub force_override: bool,
}

/// Decision response as it arrives off the wire.
///
/// The defaulting rules live in `engine::decision`: a missing or
/// unknown action, or an actionable kind without an instruction,
/// degrades to Wait.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionWire {
    pub action: Option<String>,
    pub target: Option<String>,
    pub reasoning: Option<String>,
    pub instruction: Option<String>,
    pub confidence: Option<f32>,
}

/// Assessment response as it arrives off the wire. Scores are 0-100.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentWire {
    pub quality: Option<f32>,
    pub style: Option<f32>,
    pub success: Option<bool>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub style_notes: Vec<String>,
    pub lesson: Option<String>,
    pub better_approach: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_wire_parses_partial_payload() {
        let wire: DecisionWire = serde_json::from_str(r#"{"action": "edit"}"#).unwrap();
        assert_eq!(wire.action.as_deref(), Some("edit"));
        assert!(wire.target.is_none());
        assert!(wire.instruction.is_none());
        assert!(wire.confidence.is_none());
    }

    #[test]
    fn test_decision_wire_ignores_unknown_fields() {
        let wire: DecisionWire =
            serde_json::from_str(r#"{"action": "move", "mood": "cozy", "confidence": 0.7}"#)
                .unwrap();
        assert_eq!(wire.action.as_deref(), Some("move"));
        assert_eq!(wire.confidence, Some(0.7));
    }

    #[test]
    fn test_assessment_wire_defaults_lists() {
        let wire: AssessmentWire =
            serde_json::from_str(r#"{"quality": 82, "style": 74}"#).unwrap();
        assert_eq!(wire.quality, Some(82.0));
        assert_eq!(wire.style, Some(74.0));
        assert!(wire.success.is_none());
        assert!(wire.strengths.is_empty());
        assert!(wire.weaknesses.is_empty());
        assert!(wire.style_notes.is_empty());
    }

    #[test]
    fn test_assessment_wire_full_payload() {
        let wire: AssessmentWire = serde_json::from_str(
            r#"{
                "quality": 91,
                "style": 88,
                "success": true,
                "strengths": ["balanced layout"],
                "weaknesses": [],
                "style_notes": ["matte black hardware fits"],
                "lesson": "hardware swaps are cheap wins",
                "better_approach": null
            }"#,
        )
        .unwrap();
        assert_eq!(wire.success, Some(true));
        assert_eq!(wire.strengths.len(), 1);
        assert_eq!(wire.lesson.as_deref(), Some("hardware swaps are cheap wins"));
        assert!(wire.better_approach.is_none());
    }
}
