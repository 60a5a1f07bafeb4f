//! The user query and the word-level text helpers shared by the router,
//! dataset search, and keyword extraction for outbound search calls.

use serde::{Deserialize, Serialize};

/// Words that carry no topical meaning for overlap scoring or search keywords.
pub const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get", "had",
    "has", "have", "he", "her", "his", "how", "i", "i'm", "if", "in", "into", "is", "it",
    "it's", "its", "just", "me", "my", "no", "not", "of", "on", "or", "our", "please", "she",
    "so", "some", "tell", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "to", "up", "us", "was", "we", "were", "what", "when", "where", "which",
    "who", "why", "will", "with", "would", "you", "your",
];

/// A user message plus the rolling window of prior turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    /// Prior turns, oldest first, already capped to the configured window.
    pub history: Vec<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            history: Vec::new(),
        }
    }

    /// Keep only the last `max_turns` entries of `history`.
    pub fn with_history(mut self, history: &[String], max_turns: usize) -> Self {
        let start = history.len().saturating_sub(max_turns);
        self.history = history[start..].to_vec();
        self
    }

    /// History joined as one block of prompt context.
    pub fn context(&self) -> String {
        self.history.join("\n")
    }
}

/// Lowercased alphanumeric tokens. Apostrophes inside words are kept ("don't").
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Tokens with stopwords and single characters removed, in order, deduplicated.
pub fn meaningful_words(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for w in words(text) {
        if w.chars().count() > 1 && !is_stopword(&w) && !out.contains(&w) {
            out.push(w);
        }
    }
    out
}

/// Space-joined meaningful words, used as the query for search APIs.
pub fn keywords(text: &str) -> String {
    meaningful_words(text).join(" ")
}
