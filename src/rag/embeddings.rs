use crate::types::{AppError, Result};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dimensionality of `text-embedding-ada-002` vectors.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Text to vector capability.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str;
}

/// Where an embedding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingOrigin {
    /// Returned by the embedding provider.
    Provider,
    /// Random stand-in; similarity against it is meaningless.
    Placeholder,
}

impl EmbeddingOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingOrigin::Provider => "provider",
            EmbeddingOrigin::Placeholder => "placeholder",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub origin: EmbeddingOrigin,
}

impl Embedding {
    pub fn is_placeholder(&self) -> bool {
        self.origin == EmbeddingOrigin::Placeholder
    }
}

/// Uniform random vector in `[0, 1)` of the given length.
pub fn placeholder_vector(dimensions: usize) -> Vec<f32> {
    let mut rng = rand::rng();
    (0..dimensions).map(|_| rng.random::<f32>()).collect()
}

/// OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbeddings {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAIEmbeddings {
    pub fn new(api_key: String, api_base: String, model: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .http
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "Embedding API returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Malformed embedding response: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::Embedding("No embedding in response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
