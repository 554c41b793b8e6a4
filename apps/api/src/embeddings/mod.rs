//! Embeddings: text vectorization and cosine similarity.
//!
//! `EmbeddingProvider` is the seam; `MistralEmbeddings` is the only HTTP backend.
//! The matcher holds an `Option<Arc<dyn EmbeddingProvider>>` and falls back to
//! rank scoring when it is absent or fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const EMBEDDINGS_PATH: &str = "/v1/embeddings";
pub const EMBEDDING_MODEL: &str = "mistral-embed";
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds every text, returning one vector per input in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// Mistral `/v1/embeddings` client. Large inputs are split into `batch_size` chunks.
#[derive(Clone)]
pub struct MistralEmbeddings {
    client: Client,
    api_key: String,
    base_url: String,
    batch_size: usize,
}

impl MistralEmbeddings {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, EMBEDDINGS_PATH))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: EMBEDDING_MODEL,
                input: batch,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        parsed.data.sort_by_key(|d| d.index);
        if parsed.data.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: batch.len(),
                got: parsed.data.len(),
            });
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for MistralEmbeddings {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch).await?);
        }
        debug!("Embedded {} texts with {}", vectors.len(), EMBEDDING_MODEL);
        Ok(vectors)
    }
}

/// Cosine similarity in [-1, 1]. Zero-norm or mismatched vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarText {
    pub text: String,
    pub similarity: f64,
    pub index: usize,
}

/// Ranks `candidates` by similarity to `query`, best first, keeping `top_k`.
pub async fn find_most_similar(
    provider: &dyn EmbeddingProvider,
    query: &str,
    candidates: &[String],
    top_k: usize,
) -> Result<Vec<SimilarText>, EmbeddingError> {
    if candidates.is_empty() {
        return Ok(vec![]);
    }

    let mut inputs = Vec::with_capacity(candidates.len() + 1);
    inputs.push(query.to_string());
    inputs.extend_from_slice(candidates);

    let vectors = provider.embed_texts(&inputs).await?;
    if vectors.len() != inputs.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: inputs.len(),
            got: vectors.len(),
        });
    }

    let (query_vec, candidate_vecs) = vectors.split_at(1);
    let mut ranked: Vec<SimilarText> = candidate_vecs
        .iter()
        .enumerate()
        .map(|(index, v)| SimilarText {
            text: candidates[index].clone(),
            similarity: cosine_similarity(&query_vec[0], v),
            index,
        })
        .collect();

    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    ranked.truncate(top_k);
    Ok(ranked)
}

/// Deterministic providers for unit tests.
#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;

    use super::*;

    /// Returns a fixed vector per text; unknown texts map to `default`.
    pub struct FixedEmbeddings {
        pub vectors: HashMap<String, Vec<f32>>,
        pub default: Vec<f32>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbeddings {
        async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| self.vectors.get(t).cloned().unwrap_or_else(|| self.default.clone()))
                .collect())
        }
    }

    /// Always fails, as an unreachable provider would.
    pub struct DownEmbeddings;

    #[async_trait]
    impl EmbeddingProvider for DownEmbeddings {
        async fn embed_texts(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::testing::FixedEmbeddings;
    use super::*;

    #[test]
    fn test_cosine_identical_vectors_is_one() {
        let v = [0.3, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_opposite_is_minus_one() {
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_embedding_response_reordered_by_index() {
        let json = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_find_most_similar_orders_and_truncates() {
        let provider = FixedEmbeddings {
            vectors: HashMap::from([
                ("rust".to_string(), vec![1.0, 0.0]),
                ("cargo".to_string(), vec![0.9, 0.1]),
                ("pottery".to_string(), vec![0.0, 1.0]),
            ]),
            default: vec![0.5, 0.5],
        };
        let candidates = vec!["pottery".to_string(), "cargo".to_string(), "misc".to_string()];

        let ranked = find_most_similar(&provider, "rust", &candidates, 2).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text, "cargo");
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[1].text, "misc");
    }

    #[test]
    fn test_batch_size_is_at_least_one() {
        let client = |size| {
            MistralEmbeddings::new("key".to_string(), "http://x/".to_string(), Duration::from_secs(1))
                .unwrap()
                .with_batch_size(size)
        };
        assert_eq!(client(0).batch_size, 1);
        assert_eq!(client(16).batch_size, 16);
        assert_eq!(client(16).base_url, "http://x");
    }

    #[tokio::test]
    async fn test_find_most_similar_empty_candidates() {
        let provider = FixedEmbeddings {
            vectors: HashMap::new(),
            default: vec![1.0],
        };
        assert!(find_most_similar(&provider, "q", &[], 5).await.unwrap().is_empty());
    }
}
