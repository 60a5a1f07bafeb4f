#![allow(dead_code)]

use async_trait::async_trait;
use mcai::dataset::{DatasetBank, Example};
use mcai::knowledge::llm::{LlmClient, LlmPrompt};
use mcai::knowledge::{Answer, KnowledgeSource, SourceError, SourceKind};
use mcai::query::Query;
use rusqlite::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    mcai::db::schema::init_schema(&conn).unwrap();
    mcai::db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// What a [`MockSource`] does when called.
#[derive(Debug, Clone)]
pub enum Behavior {
    Answer(&'static str),
    Empty,
    Fail,
    /// Sleep this long, then answer.
    Slow(Duration, &'static str),
}

/// A knowledge source that counts its calls.
pub struct MockSource {
    kind: SourceKind,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(kind: SourceKind, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeSource for MockSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn attempt(&self, _query: &Query) -> Result<Option<Answer>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Answer(text) => Ok(Some(Answer::new(*text, self.kind))),
            Behavior::Empty => Ok(None),
            Behavior::Fail => Err(SourceError::Http("connection refused".into())),
            Behavior::Slow(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(Some(Answer::new(*text, self.kind)))
            }
        }
    }
}

/// An LLM that always fails and counts its calls.
#[derive(Default)]
pub struct FailingLlm {
    calls: AtomicUsize,
}

impl FailingLlm {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _prompt: &LlmPrompt<'_>) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Status(503))
    }
}

/// An LLM that echoes the question back with a fixed prefix.
pub struct EchoLlm(pub &'static str);

#[async_trait]
impl LlmClient for EchoLlm {
    async fn complete(&self, prompt: &LlmPrompt<'_>) -> Result<String, SourceError> {
        Ok(format!("{} {}", self.0, prompt.question))
    }
}

pub fn example(domain: &str, prompt: &str, completion: &str) -> Example {
    Example {
        domain: domain.into(),
        prompt: prompt.into(),
        completion: completion.into(),
    }
}

/// A small bank with one weather record and one unrelated coding record.
pub fn science_bank() -> DatasetBank {
    DatasetBank::from_examples([
        example(
            "programming",
            "How do I start debugging code that is made of many modules?",
            "Start by reproducing the bug, then bisect the modules one at a time.",
        ),
        example(
            "science",
            "What are clouds made of and how do they form?",
            "Clouds are made of tiny water droplets or ice crystals that condense around dust.",
        ),
        example(
            "science",
            "How do volcanoes erupt?",
            "Pressure from gas-rich magma forces it up through cracks in the crust.",
        ),
    ])
}

/// Write a dataset file into `dir`.
pub fn write_dataset(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}
