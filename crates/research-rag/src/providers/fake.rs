//! Deterministic in-process providers for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{CompletionRequest, LlmProvider};

const DIMENSIONS: usize = 64;

/// Bag-of-words embedder: each lowercase word is hashed into a bucket and the
/// vector is L2-normalised, so texts sharing words land close together.
#[derive(Default)]
pub struct FakeEmbedder {
    fail: bool,
    calls: Mutex<usize>,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of texts embedded so far
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() % DIMENSIONS as u64) as usize] += 1.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(Error::embedding("fake embedder is offline"));
        }
        *self.calls.lock() += 1;
        Ok(Self::vector(text))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// LLM that records every request and answers with a canned reply
pub struct FakeLlm {
    reply: String,
    fail: bool,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeLlm {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    /// Every request seen so far, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Concatenated message contents of the most recent request
    pub fn last_prompt(&self) -> String {
        self.requests
            .lock()
            .last()
            .map(|r| {
                r.messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().push(request.clone());
        if self.fail {
            return Err(Error::llm("fake llm is offline"));
        }
        Ok(self.reply.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}
