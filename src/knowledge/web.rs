//! Last-resort external lookups: an instant-answer web search and an
//! encyclopedia summary endpoint. Both send the query's keywords rather than
//! the raw question.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::{Answer, KnowledgeSource, SourceError, SourceKind};
use crate::query::{keywords, Query};

/// Words that make a question but never name its topic.
const QUESTION_WORDS: &[&str] = &[
    "explain", "define", "describe", "meaning", "mean", "means", "know", "anything",
];

/// Keywords for an outbound search: stopwords and question words removed.
pub fn search_terms(text: &str) -> String {
    keywords(text)
        .split(' ')
        .filter(|w| !w.is_empty() && !QUESTION_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mcai/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {e}"))
}

// ── Web search ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    answer: serde_json::Value,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
}

impl InstantAnswer {
    /// Abstract first, then a direct answer, then the first related topic.
    fn snippet(self) -> Option<String> {
        if !self.abstract_text.trim().is_empty() {
            return Some(self.abstract_text);
        }
        if let Some(answer) = self.answer.as_str().filter(|a| !a.trim().is_empty()) {
            return Some(answer.to_string());
        }
        self.related_topics
            .into_iter()
            .filter_map(|t| t.text)
            .find(|t| !t.trim().is_empty())
    }
}

/// DuckDuckGo-style instant answer API.
pub struct WebSearchSource {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl WebSearchSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: http_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl KnowledgeSource for WebSearchSource {
    fn kind(&self) -> SourceKind {
        SourceKind::WebSearch
    }

    async fn attempt(&self, query: &Query) -> Result<Option<Answer>, SourceError> {
        let terms = search_terms(&query.text);
        if terms.is_empty() {
            return Ok(None);
        }

        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", terms.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
        .map_err(|e| SourceError::InvalidResponse(format!("bad search endpoint: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, self.timeout))?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        let body: InstantAnswer = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(body
            .snippet()
            .map(|text| Answer::new(text, SourceKind::WebSearch)))
    }
}

// ── Encyclopedia ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default, rename = "type")]
    page_type: String,
    #[serde(default)]
    extract: String,
}

/// Title for a summary lookup: search terms, first letter upper-cased,
/// spaces as underscores.
pub fn topic_title(text: &str) -> Option<String> {
    let terms = search_terms(text);
    let mut chars = terms.chars();
    let first = chars.next()?;
    let title: String = first.to_uppercase().chain(chars).collect();
    Some(title.replace(' ', "_"))
}

/// Wikipedia-style REST summary endpoint (`{endpoint}/page/summary/{title}`).
pub struct EncyclopediaSource {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl EncyclopediaSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: http_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl KnowledgeSource for EncyclopediaSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Encyclopedia
    }

    async fn attempt(&self, query: &Query) -> Result<Option<Answer>, SourceError> {
        let Some(title) = topic_title(&query.text) else {
            return Ok(None);
        };

        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| SourceError::InvalidResponse(format!("bad encyclopedia endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidResponse("endpoint cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["page", "summary", title.as_str()]);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, self.timeout))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        let summary: PageSummary = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        if summary.page_type == "disambiguation" || summary.extract.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Answer::new(summary.extract, SourceKind::Encyclopedia)))
    }
}
