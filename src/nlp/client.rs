//! Async HTTP client for hosted inference endpoints
//!
//! Talks to Hugging Face style inference APIs: one endpoint per model,
//! `POST {api_url}/{model}` with a bearer token. The same client serves
//! zero-shot classification and extractive question answering, each
//! against its own model.

use crate::core::error::{AgentError, Result};
use crate::nlp::capability::{Classification, QuestionAnswerer, Span, ZeroShotClassifier};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";
const DEFAULT_QA_MODEL: &str = "distilbert-base-cased-distilled-squad";

/// Async inference client implementing both NLP capabilities
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    api_key: String,
    api_url: String,
    zero_shot_model: String,
    qa_model: String,
}

impl InferenceClient {
    /// Create a new inference client with explicit configuration
    pub fn new(api_key: String, api_url: String, zero_shot_model: String, qa_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url,
            zero_shot_model,
            qa_model,
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: NLP_API_KEY
    /// Optional: NLP_API_URL (defaults to the Hugging Face inference API)
    /// Optional: NLP_ZERO_SHOT_MODEL (defaults to facebook/bart-large-mnli)
    /// Optional: NLP_QA_MODEL (defaults to distilbert-base-cased-distilled-squad)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NLP_API_KEY")
            .map_err(|_| AgentError::Config("NLP_API_KEY not set".into()))?;
        let api_url = std::env::var("NLP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let zero_shot_model =
            std::env::var("NLP_ZERO_SHOT_MODEL").unwrap_or_else(|_| DEFAULT_ZERO_SHOT_MODEL.into());
        let qa_model = std::env::var("NLP_QA_MODEL").unwrap_or_else(|_| DEFAULT_QA_MODEL.into());

        Ok(Self::new(api_key, api_url, zero_shot_model, qa_model))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), model)
    }

    async fn post<Req, Resp>(&self, model: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::Inference(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::Inference(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Inference(e.to_string()))
    }
}

impl ZeroShotClassifier for InferenceClient {
    async fn classify(&self, text: &str, candidate_labels: &[String]) -> Result<Classification> {
        let request = ZeroShotRequest {
            inputs: text.into(),
            parameters: ZeroShotParameters {
                candidate_labels: candidate_labels.to_vec(),
                multi_label: false,
            },
        };

        let response: ZeroShotResponse = self.post(&self.zero_shot_model, &request).await?;
        if response.labels.len() != response.scores.len() {
            return Err(AgentError::Inference(format!(
                "Mismatched classification: {} labels, {} scores",
                response.labels.len(),
                response.scores.len()
            )));
        }

        Ok(Classification::new(response.labels, response.scores))
    }
}

impl QuestionAnswerer for InferenceClient {
    async fn answer(&self, question: &str, context: &str) -> Result<Span> {
        let request = QaRequest {
            inputs: QaInputs {
                question: question.into(),
                context: context.into(),
            },
        };

        let response: QaResponse = self.post(&self.qa_model, &request).await?;
        Ok(Span {
            text: response.answer,
            score: response.score,
            start: response.start,
            end: response.end,
        })
    }
}

// Zero-shot classification format
#[derive(Serialize)]
struct ZeroShotRequest {
    inputs: String,
    parameters: ZeroShotParameters,
}

#[derive(Serialize)]
struct ZeroShotParameters {
    candidate_labels: Vec<String>,
    multi_label: bool,
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

// Question answering format
#[derive(Serialize)]
struct QaRequest {
    inputs: QaInputs,
}

#[derive(Serialize)]
struct QaInputs {
    question: String,
    context: String,
}

#[derive(Deserialize)]
struct QaResponse {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    start: usize,
    #[serde(default)]
    end: usize,
}
