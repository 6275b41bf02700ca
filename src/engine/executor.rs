// src/engine/executor.rs — Applying decisions through the synthesis service

use std::sync::Arc;

use tokio::time::timeout;

use crate::core::types::{ActionKind, Artifact, Decision, RunConfiguration};
use crate::infra::errors::DecoraError;
use crate::provider::{SynthesisRequest, VisionProvider};

/// Applies a non-Wait decision to the artifact through the external
/// synthesis capability.
pub struct ExecutionAdapter {
    provider: Arc<dyn VisionProvider>,
}

impl ExecutionAdapter {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Apply a decision, producing a new artifact. Failures (error,
    /// empty result, timeout) are per-iteration: the caller logs them
    /// and leaves the current artifact unchanged.
    pub async fn apply(
        &self,
        config: &RunConfiguration,
        artifact: &Artifact,
        decision: &Decision,
    ) -> Result<Artifact, DecoraError> {
        let request = SynthesisRequest {
            artifact: artifact.clone(),
            instruction: decision.instruction.clone(),
            target: decision.target.clone(),
            force_override: decision.action == ActionKind::Remove,
        };

        let produced = timeout(config.call_timeout(), self.provider.synthesize(request))
            .await
            .map_err(|_| DecoraError::Timeout {
                phase: "synthesis",
                seconds: config.call_timeout_secs,
            })??;

        if produced.uri.trim().is_empty() {
            return Err(DecoraError::EmptyResult { phase: "synthesis" });
        }
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{
        AssessmentRequest, AssessmentWire, DecisionRequest, DecisionWire,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingProvider {
        requests: Mutex<Vec<SynthesisRequest>>,
        result_uri: Option<String>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl VisionProvider for RecordingProvider {
        fn id(&self) -> &str {
            "recording"
        }
        fn name(&self) -> &str {
            "Recording"
        }

        async fn decide(&self, _request: DecisionRequest) -> Result<DecisionWire, DecoraError> {
            unimplemented!("not used in executor tests")
        }

        async fn assess(
            &self,
            _request: AssessmentRequest,
        ) -> Result<AssessmentWire, DecoraError> {
            unimplemented!("not used in executor tests")
        }

        async fn synthesize(&self, request: SynthesisRequest) -> Result<Artifact, DecoraError> {
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.result_uri {
                Some(uri) => Ok(Artifact::new(uri.clone())),
                None => Err(DecoraError::Provider {
                    provider: "recording".into(),
                    message: "synthesis overloaded".into(),
                    retriable: true,
                }),
            }
        }
    }

    fn provider(result_uri: Option<&str>, delay: Option<Duration>) -> Arc<RecordingProvider> {
        Arc::new(RecordingProvider {
            requests: Mutex::new(Vec::new()),
            result_uri: result_uri.map(String::from),
            delay,
        })
    }

    fn decision(action: ActionKind) -> Decision {
        Decision {
            iteration: 1,
            action,
            target: "side table".into(),
            reasoning: String::new(),
            instruction: "swap for a walnut one".into(),
            confidence: 0.8,
            estimated_cost: 0.04,
        }
    }

    fn config() -> RunConfiguration {
        RunConfiguration {
            call_timeout_secs: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_produces_new_artifact() {
        let p = provider(Some("https://img.test/next.png"), None);
        let adapter = ExecutionAdapter::new(p.clone());
        let before = Artifact::new("https://img.test/initial.png");

        let after = adapter
            .apply(&config(), &before, &decision(ActionKind::Edit))
            .await
            .unwrap();
        assert_eq!(after.uri, "https://img.test/next.png");
        assert_ne!(after.id, before.id);

        let requests = p.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].instruction, "swap for a walnut one");
        assert!(!requests[0].force_override);
    }

    #[tokio::test]
    async fn test_remove_sets_force_override() {
        let p = provider(Some("https://img.test/next.png"), None);
        let adapter = ExecutionAdapter::new(p.clone());

        adapter
            .apply(
                &config(),
                &Artifact::new("room.jpg"),
                &decision(ActionKind::Remove),
            )
            .await
            .unwrap();
        assert!(p.requests.lock().unwrap()[0].force_override);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let adapter = ExecutionAdapter::new(provider(None, None));
        let result = adapter
            .apply(
                &config(),
                &Artifact::new("room.jpg"),
                &decision(ActionKind::Edit),
            )
            .await;
        assert!(matches!(result, Err(DecoraError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_empty_uri_is_a_failure() {
        let adapter = ExecutionAdapter::new(provider(Some(""), None));
        let result = adapter
            .apply(
                &config(),
                &Artifact::new("room.jpg"),
                &decision(ActionKind::Edit),
            )
            .await;
        assert!(matches!(
            result,
            Err(DecoraError::EmptyResult { phase: "synthesis" })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_synthesis_times_out() {
        let adapter =
            ExecutionAdapter::new(provider(Some("x"), Some(Duration::from_secs(600))));
        let result = adapter
            .apply(
                &config(),
                &Artifact::new("room.jpg"),
                &decision(ActionKind::Edit),
            )
            .await;
        assert!(matches!(
            result,
            Err(DecoraError::Timeout {
                phase: "synthesis",
                seconds: 5
            })
        ));
    }
}
