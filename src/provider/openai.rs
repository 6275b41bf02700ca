// src/provider/openai.rs — OpenAI-backed vision and synthesis

use async_trait::async_trait;

use super::{
    AssessmentRequest, AssessmentWire, DecisionRequest, DecisionWire, SynthesisRequest,
    VisionProvider,
};
use crate::core::types::Artifact;
use crate::infra::errors::DecoraError;

pub struct OpenAiProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
    image_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, image_model: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: "https://api.openai.com/v1".into(),
            model,
            image_model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn decision_prompt(request: &DecisionRequest) -> String {
        let memory_block = if request.memory_summary.is_empty() {
            String::new()
        } else {
            format!("{}\n\n", request.memory_summary)
        };
        format!(
            "You are an interior designer refining the attached room photo.\n\n\
             Goal: {}\n\
             Style keywords: {}\n\n\
             Changes so far:\n{}\n\n\
             {}Propose exactly one next change, or wait if none is worthwhile. \
             Respond as a JSON object with keys action (move|edit|remove|wait), \
             target, reasoning, instruction, confidence (0-1).",
            request.goal,
            request.style_keywords.join(", "),
            request.history_summary,
            memory_block,
        )
    }

    fn assessment_prompt(request: &AssessmentRequest) -> String {
        format!(
            "The attached room photo just had a change applied.\n\n\
             Goal: {}\n\
             Style keywords: {}\n\
             Change: {} {} — {}\n\n\
             Critique the result. Respond as a JSON object with keys \
             quality (0-100), style (0-100), success, strengths, weaknesses, \
             style_notes, lesson, better_approach.",
            request.goal,
            request.style_keywords.join(", "),
            request.decision.action,
            request.decision.target,
            request.decision.instruction,
        )
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, DecoraError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| DecoraError::Provider {
                provider: "openai".into(),
                message: e.to_string(),
                retriable: e.is_timeout() || e.is_connect(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DecoraError::RateLimited {
                provider: "openai".into(),
                retry_after_ms: 5000,
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DecoraError::Provider {
                provider: "openai".into(),
                message: format!("HTTP {}: {}", status, error_body),
                retriable: status.is_server_error(),
            });
        }

        response.json().await.map_err(|e| DecoraError::Provider {
            provider: "openai".into(),
            message: format!("Failed to parse response: {}", e),
            retriable: false,
        })
    }

    /// One vision chat call returning the model's JSON text.
    async fn chat_json(
        &self,
        prompt: String,
        image_uri: &str,
        temperature: f32,
    ) -> Result<String, DecoraError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image_uri } },
                ],
            }],
            "response_format": { "type": "json_object" },
            "max_tokens": 600,
            "temperature": temperature,
        });

        let resp = self.post_json("/chat/completions", body).await?;
        Ok(resp["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn decide(&self, request: DecisionRequest) -> Result<DecisionWire, DecoraError> {
        let content = self
            .chat_json(Self::decision_prompt(&request), &request.artifact.uri, 0.4)
            .await?;
        if content.trim().is_empty() {
            return Err(DecoraError::EmptyResult { phase: "decision" });
        }
        serde_json::from_str(&content).map_err(|e| DecoraError::Provider {
            provider: "openai".into(),
            message: format!("Malformed decision payload: {}", e),
            retriable: false,
        })
    }

    async fn assess(&self, request: AssessmentRequest) -> Result<AssessmentWire, DecoraError> {
        let content = self
            .chat_json(Self::assessment_prompt(&request), &request.artifact.uri, 0.1)
            .await?;
        if content.trim().is_empty() {
            return Err(DecoraError::EmptyResult { phase: "assessment" });
        }
        serde_json::from_str(&content).map_err(|e| DecoraError::Provider {
            provider: "openai".into(),
            message: format!("Malformed assessment payload: {}", e),
            retriable: false,
        })
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<Artifact, DecoraError> {
        let mut prompt = format!(
            "Photorealistic edit of an interior photo. {}",
            request.instruction
        );
        if !request.target.is_empty() {
            prompt.push_str(&format!(" Focus on the {}.", request.target));
        }
        if request.force_override {
            prompt.push_str(" Replace the affected area entirely rather than restyling it.");
        }

        let body = serde_json::json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
            "response_format": "url",
        });

        let resp = self.post_json("/images/generations", body).await?;
        let url = resp["data"][0]["url"].as_str().unwrap_or_default();
        if url.is_empty() {
            return Err(DecoraError::EmptyResult { phase: "synthesis" });
        }
        Ok(Artifact::new(url))
    }
}
