//! Knowledge fallback chain.
//!
//! A [`FallbackChain`] holds sources in priority order. Each attempt runs under
//! its own timeout; an error, a timeout, or an empty answer all mean "no answer"
//! and the chain moves on. The first usable answer wins and later sources are
//! never called.

pub mod builtin;
pub mod dataset;
pub mod llm;
pub mod web;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::query::Query;

/// Returned when every source comes back empty.
pub const FALLBACK_MESSAGE: &str =
    "I don't have an answer to that yet. Try rephrasing, or ask me something else.";

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Builtin,
    Llm,
    Dataset,
    WebSearch,
    Encyclopedia,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Llm => "llm",
            Self::Dataset => "dataset",
            Self::WebSearch => "web_search",
            Self::Encyclopedia => "encyclopedia",
        }
    }

    /// Live sources produce answers that may go stale quickly.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Llm | Self::WebSearch)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "builtin" => Ok(Self::Builtin),
            "llm" => Ok(Self::Llm),
            "dataset" => Ok(Self::Dataset),
            "web_search" => Ok(Self::WebSearch),
            "encyclopedia" => Ok(Self::Encyclopedia),
            _ => Err(format!("unknown source: {s}")),
        }
    }
}

/// A usable answer from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub source: SourceKind,
}

impl Answer {
    pub fn new(text: impl Into<String>, source: SourceKind) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Why a collaborator produced nothing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("source is disabled")]
    Disabled,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SourceError {
    /// Classify a transport error from a client built with `timeout`.
    pub fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            return Self::Timeout(timeout);
        }
        match e.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Http(e.to_string()),
        }
    }
}

/// One step of the fallback chain.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// `Ok(None)` means the source had nothing relevant.
    async fn attempt(&self, query: &Query) -> Result<Option<Answer>, SourceError>;
}

struct GuardedSource {
    source: Arc<dyn KnowledgeSource>,
    timeout: Duration,
}

/// Sources in priority order, each with its own timeout.
#[derive(Default)]
pub struct FallbackChain {
    sources: Vec<GuardedSource>,
}

/// What the chain resolved to.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    /// `None` when every source was exhausted.
    pub answer: Option<Answer>,
    /// Sources that were actually called, in order.
    pub attempted: Vec<SourceKind>,
}

impl ChainOutcome {
    /// The answer text, or [`FALLBACK_MESSAGE`] on exhaustion.
    pub fn text(&self) -> &str {
        self.answer
            .as_ref()
            .map(|a| a.text.as_str())
            .unwrap_or(FALLBACK_MESSAGE)
    }
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source at the lowest priority so far.
    pub fn push(&mut self, source: Arc<dyn KnowledgeSource>, timeout: Duration) -> &mut Self {
        self.sources.push(GuardedSource { source, timeout });
        self
    }

    pub fn with(mut self, source: Arc<dyn KnowledgeSource>, timeout: Duration) -> Self {
        self.push(source, timeout);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|g| g.source.kind()).collect()
    }

    /// Try each source in order and stop at the first non-empty answer.
    pub async fn resolve(&self, query: &Query) -> ChainOutcome {
        let mut attempted = Vec::with_capacity(self.sources.len());

        for guarded in &self.sources {
            let kind = guarded.source.kind();
            attempted.push(kind);
            let started = Instant::now();

            let result =
                match tokio::time::timeout(guarded.timeout, guarded.source.attempt(query)).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout(guarded.timeout)),
                };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(Some(answer)) if !answer.text.trim().is_empty() => {
                    tracing::info!(source = %kind, elapsed_ms, "knowledge source answered");
                    return ChainOutcome {
                        answer: Some(answer),
                        attempted,
                    };
                }
                Ok(_) => {
                    tracing::debug!(source = %kind, elapsed_ms, "knowledge source had no answer");
                }
                Err(SourceError::Disabled) => {
                    tracing::debug!(source = %kind, "knowledge source disabled");
                }
                Err(e) => {
                    tracing::warn!(source = %kind, elapsed_ms, error = %e, "knowledge source failed");
                }
            }
        }

        tracing::info!(attempted = attempted.len(), "all knowledge sources exhausted");
        ChainOutcome {
            answer: None,
            attempted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(SourceKind, Option<&'static str>);

    #[async_trait]
    impl KnowledgeSource for Fixed {
        fn kind(&self) -> SourceKind {
            self.0
        }

        async fn attempt(&self, _query: &Query) -> Result<Option<Answer>, SourceError> {
            Ok(self.1.map(|t| Answer::new(t, self.0)))
        }
    }

    #[tokio::test]
    async fn blank_answer_counts_as_no_answer() {
        let chain = FallbackChain::new()
            .with(Arc::new(Fixed(SourceKind::Builtin, Some("   "))), Duration::from_secs(1))
            .with(Arc::new(Fixed(SourceKind::Dataset, Some("real"))), Duration::from_secs(1));

        let outcome = chain.resolve(&Query::new("q")).await;
        assert_eq!(outcome.answer.unwrap().source, SourceKind::Dataset);
        assert_eq!(outcome.attempted, vec![SourceKind::Builtin, SourceKind::Dataset]);
    }

    #[tokio::test]
    async fn empty_chain_returns_fallback_text() {
        let outcome = FallbackChain::new().resolve(&Query::new("q")).await;
        assert!(outcome.answer.is_none());
        assert_eq!(outcome.text(), FALLBACK_MESSAGE);
    }

    #[test]
    fn source_kind_parses_its_own_names() {
        for kind in [
            SourceKind::Builtin,
            SourceKind::Llm,
            SourceKind::Dataset,
            SourceKind::WebSearch,
            SourceKind::Encyclopedia,
        ] {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
    }
}
