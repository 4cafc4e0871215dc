//! OpenAI-compatible embeddings client.

use crate::provider::EmbeddingProvider;
use async_trait::async_trait;
use pricematch_core::{Error, ProviderError, Result};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "openai";

/// Connection settings for [`OpenAiEmbedder`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    /// Requested output dimension; every response is checked against it
    pub dimensions: usize,
    /// HTTP-level timeout; the embedding cache applies its own on top
    pub timeout_ms: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            timeout_ms: 30_000,
        }
    }
}

/// Async embeddings client for `/embeddings` endpoints.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(api_key: &str, config: &OpenAiConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("missing OpenAI API key".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(Error::InvalidConfig("missing OpenAI model name".to_string()));
        }
        if config.dimensions == 0 {
            return Err(Error::InvalidConfig(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| Error::InvalidConfig("invalid OpenAI API key".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: [text],
            dimensions: Some(self.dimensions),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::request(PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "embedding request rejected");
            return Err(ProviderError::Status {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::request(PROVIDER, e.to_string()))?;
        parse_embedding_response(&body)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// First embedding of a response body
fn parse_embedding_response(body: &str) -> std::result::Result<Vec<f32>, ProviderError> {
    let parsed: EmbeddingResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;
    parsed
        .data
        .into_iter()
        .min_by_key(|entry| entry.index)
        .map(|entry| entry.embedding)
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "response contained no embeddings"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_key() {
        assert!(matches!(
            OpenAiEmbedder::new("  ", &OpenAiConfig::default()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let config = OpenAiConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            dimensions: 8,
            ..Default::default()
        };
        let embedder = OpenAiEmbedder::new("sk-test", &config).unwrap();
        assert_eq!(embedder.endpoint(), "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.dimension(), 8);
    }

    #[test]
    fn test_request_shape() {
        let request = EmbeddingRequest {
            model: "m",
            input: ["lamp"],
            dimensions: Some(4),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"][0], "lamp");
        assert_eq!(json["dimensions"], 4);
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"data":[{"embedding":[0.5,0.25],"index":0}],"model":"m"}"#;
        assert_eq!(parse_embedding_response(body).unwrap(), vec![0.5, 0.25]);

        assert!(matches!(
            parse_embedding_response(r#"{"data":[]}"#),
            Err(ProviderError::Malformed { .. })
        ));
        assert!(parse_embedding_response("not json").is_err());
    }
}
