// src/engine/evaluator.rs — Outcome scoring

use std::sync::Arc;

use chrono::Utc;
use tokio::time::timeout;

use crate::core::types::{Artifact, Decision, Evaluation, RunConfiguration};
use crate::provider::{AssessmentRequest, AssessmentWire, VisionProvider};

/// Both scores must reach this cutoff for an outcome to count as a
/// success. Policy value; tune with care — the learner keys off the
/// success flag.
pub const SUCCESS_SCORE_CUTOFF: f32 = 0.6;

/// Scores one executed decision's result against the design goal.
pub struct OutcomeEvaluator {
    provider: Arc<dyn VisionProvider>,
}

impl OutcomeEvaluator {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Score one executed decision. Never fails: scoring errors and
    /// timeouts produce a neutral evaluation so the loop keeps moving.
    pub async fn assess(
        &self,
        config: &RunConfiguration,
        artifact: &Artifact,
        decision: &Decision,
    ) -> Evaluation {
        let request = AssessmentRequest {
            artifact: artifact.clone(),
            decision: decision.clone(),
            goal: config.goal.clone(),
            style_keywords: config.style_keywords.clone(),
        };
        let retained = if config.simulate {
            None
        } else {
            Some(artifact.clone())
        };

        match timeout(config.call_timeout(), self.provider.assess(request)).await {
            Ok(Ok(wire)) => evaluation_from_wire(wire, decision, retained),
            Ok(Err(e)) => {
                tracing::warn!("Outcome scoring failed: {}", e);
                neutral_evaluation(decision, retained)
            }
            Err(_) => {
                tracing::warn!(
                    seconds = config.call_timeout_secs,
                    "Outcome scoring timed out"
                );
                neutral_evaluation(decision, retained)
            }
        }
    }
}

/// Default-filling rules for the assessment wire format.
///
/// Wire scores are 0-100: clamped, then scaled to [0,1]. A missing score
/// reads as neutral (50). The success flag combines the service's own
/// verdict (missing reads as true) with the score policy, so the cutoff
/// alone decides when the service stays silent.
pub(crate) fn evaluation_from_wire(
    wire: AssessmentWire,
    decision: &Decision,
    artifact: Option<Artifact>,
) -> Evaluation {
    let quality = wire.quality.unwrap_or(50.0).clamp(0.0, 100.0) / 100.0;
    let style = wire.style.unwrap_or(50.0).clamp(0.0, 100.0) / 100.0;
    let success = wire.success.unwrap_or(true)
        && quality >= SUCCESS_SCORE_CUTOFF
        && style >= SUCCESS_SCORE_CUTOFF;

    Evaluation {
        iteration: decision.iteration,
        timestamp: Utc::now(),
        decision: decision.clone(),
        quality_score: quality,
        style_score: style,
        success,
        strengths: wire.strengths,
        weaknesses: wire.weaknesses,
        style_notes: wire.style_notes,
        lesson: wire.lesson.unwrap_or_default(),
        better_approach: wire.better_approach,
        artifact,
    }
}

/// The stand-in when scoring itself failed: neutral scores, not a
/// success, and a weakness entry a host can surface.
pub(crate) fn neutral_evaluation(decision: &Decision, artifact: Option<Artifact>) -> Evaluation {
    Evaluation {
        iteration: decision.iteration,
        timestamp: Utc::now(),
        decision: decision.clone(),
        quality_score: 0.5,
        style_score: 0.5,
        success: false,
        strengths: vec![],
        weaknesses: vec!["Analysis failed".into()],
        style_notes: vec![],
        lesson: String::new(),
        better_approach: None,
        artifact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ActionKind;
    use crate::infra::errors::DecoraError;
    use crate::provider::{DecisionRequest, DecisionWire, SynthesisRequest};
    use async_trait::async_trait;

    struct FixedProvider {
        wire: Option<AssessmentWire>,
    }

    #[async_trait]
    impl VisionProvider for FixedProvider {
        fn id(&self) -> &str {
            "fixed"
        }
        fn name(&self) -> &str {
            "Fixed"
        }

        async fn decide(&self, _request: DecisionRequest) -> Result<DecisionWire, DecoraError> {
            unimplemented!("not used in evaluator tests")
        }

        async fn assess(
            &self,
            _request: AssessmentRequest,
        ) -> Result<AssessmentWire, DecoraError> {
            self.wire.clone().ok_or(DecoraError::Provider {
                provider: "fixed".into(),
                message: "scoring offline".into(),
                retriable: false,
            })
        }

        async fn synthesize(&self, _request: SynthesisRequest) -> Result<Artifact, DecoraError> {
            unimplemented!("not used in evaluator tests")
        }
    }

    fn decision() -> Decision {
        Decision {
            iteration: 2,
            action: ActionKind::Edit,
            target: "curtains".into(),
            reasoning: String::new(),
            instruction: "swap to sheer linen".into(),
            confidence: 0.7,
            estimated_cost: 0.04,
        }
    }

    // ─── evaluation_from_wire ───────────────────────────────────

    #[test]
    fn test_scores_scaled_to_unit_interval() {
        let wire = AssessmentWire {
            quality: Some(82.0),
            style: Some(74.0),
            success: Some(true),
            ..Default::default()
        };
        let e = evaluation_from_wire(wire, &decision(), None);
        assert!((e.quality_score - 0.82).abs() < 1e-6);
        assert!((e.style_score - 0.74).abs() < 1e-6);
        assert!(e.success);
    }

    #[test]
    fn test_out_of_range_scores_clamped() {
        let wire = AssessmentWire {
            quality: Some(150.0),
            style: Some(-20.0),
            ..Default::default()
        };
        let e = evaluation_from_wire(wire, &decision(), None);
        assert_eq!(e.quality_score, 1.0);
        assert_eq!(e.style_score, 0.0);
        assert!(!e.success);
    }

    #[test]
    fn test_missing_scores_read_neutral() {
        let e = evaluation_from_wire(AssessmentWire::default(), &decision(), None);
        assert_eq!(e.quality_score, 0.5);
        assert_eq!(e.style_score, 0.5);
        // 0.5 is below the cutoff on both axes
        assert!(!e.success);
    }

    #[test]
    fn test_cutoff_gates_success() {
        let wire = AssessmentWire {
            quality: Some(90.0),
            style: Some(59.0),
            success: Some(true),
            ..Default::default()
        };
        assert!(!evaluation_from_wire(wire, &decision(), None).success);

        let wire = AssessmentWire {
            quality: Some(60.0),
            style: Some(60.0),
            ..Default::default()
        };
        assert!(evaluation_from_wire(wire, &decision(), None).success);
    }

    #[test]
    fn test_service_verdict_can_veto() {
        let wire = AssessmentWire {
            quality: Some(95.0),
            style: Some(95.0),
            success: Some(false),
            ..Default::default()
        };
        assert!(!evaluation_from_wire(wire, &decision(), None).success);
    }

    // ─── assess ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_scoring_failure_yields_neutral_evaluation() {
        let evaluator = OutcomeEvaluator::new(Arc::new(FixedProvider { wire: None }));
        let config = RunConfiguration {
            call_timeout_secs: 5,
            ..Default::default()
        };
        let e = evaluator
            .assess(&config, &Artifact::new("room.jpg"), &decision())
            .await;
        assert_eq!(e.quality_score, 0.5);
        assert_eq!(e.style_score, 0.5);
        assert!(!e.success);
        assert_eq!(e.weaknesses, vec!["Analysis failed".to_string()]);
        // Execution did happen, so the artifact is still retained
        assert!(e.artifact.is_some());
    }

    #[tokio::test]
    async fn test_simulate_retains_no_artifact() {
        let evaluator = OutcomeEvaluator::new(Arc::new(FixedProvider {
            wire: Some(AssessmentWire {
                quality: Some(80.0),
                style: Some(80.0),
                ..Default::default()
            }),
        }));
        let config = RunConfiguration {
            simulate: true,
            call_timeout_secs: 5,
            ..Default::default()
        };
        let e = evaluator
            .assess(&config, &Artifact::new("room.jpg"), &decision())
            .await;
        assert!(e.artifact.is_none());
        assert!(e.success);
    }
}
