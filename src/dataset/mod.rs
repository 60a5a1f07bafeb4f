//! Dataset bank: curated prompt/completion records.
//!
//! The bank is loaded once at startup from a directory of JSON files shaped
//! `{ "domain": ..., "examples": [{ "prompt": ..., "completion": ... }] }` and is
//! read-only afterwards. Picking up new files needs a restart.

pub mod search;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::query::meaningful_words;

/// One curated record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub domain: String,
    pub prompt: String,
    pub completion: String,
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    domain: String,
    #[serde(default)]
    examples: Vec<FileExample>,
}

#[derive(Debug, Deserialize)]
struct FileExample {
    prompt: String,
    completion: String,
}

/// An example plus the meaningful words of its prompt, precomputed at load.
#[derive(Debug, Clone)]
pub(crate) struct IndexedExample {
    pub(crate) example: Example,
    pub(crate) words: HashSet<String>,
}

impl IndexedExample {
    fn new(example: Example) -> Self {
        let words = meaningful_words(&example.prompt).into_iter().collect();
        Self { example, words }
    }
}

/// Summary produced by [`DatasetBank::stats`].
#[derive(Debug, Serialize)]
pub struct DatasetStats {
    pub total_examples: usize,
    pub by_domain: BTreeMap<String, usize>,
}

/// Immutable, in-memory collection of examples.
#[derive(Debug, Default)]
pub struct DatasetBank {
    examples: Vec<IndexedExample>,
}

impl DatasetBank {
    pub fn from_examples(examples: impl IntoIterator<Item = Example>) -> Self {
        Self {
            examples: examples.into_iter().map(IndexedExample::new).collect(),
        }
    }

    /// Load every `*.json` file in `dir`, in file-name order.
    ///
    /// A missing directory yields an empty bank. Files that fail to parse are
    /// skipped with a warning so one bad file cannot take the service down.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            tracing::info!(dir = %dir.display(), "no dataset directory, starting with empty bank");
            return Ok(Self::default());
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read dataset dir: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut examples = Vec::new();
        for path in &paths {
            match load_file(path) {
                Ok(mut loaded) => {
                    tracing::debug!(file = %path.display(), count = loaded.len(), "dataset file loaded");
                    examples.append(&mut loaded);
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable dataset file");
                }
            }
        }

        tracing::info!(files = paths.len(), examples = examples.len(), "dataset bank loaded");
        Ok(Self::from_examples(examples))
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter().map(|e| &e.example)
    }

    pub fn stats(&self) -> DatasetStats {
        let mut by_domain = BTreeMap::new();
        for e in &self.examples {
            *by_domain.entry(e.example.domain.clone()).or_insert(0) += 1;
        }
        DatasetStats {
            total_examples: self.examples.len(),
            by_domain,
        }
    }

    pub(crate) fn indexed(&self) -> &[IndexedExample] {
        &self.examples
    }
}

fn load_file(path: &Path) -> Result<Vec<Example>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: DatasetFile = serde_json::from_str(&json).context("failed to parse dataset JSON")?;

    Ok(file
        .examples
        .into_iter()
        .filter(|e| !e.prompt.trim().is_empty() && !e.completion.trim().is_empty())
        .map(|e| Example {
            domain: file.domain.clone(),
            prompt: e.prompt,
            completion: e.completion,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_by_domain() {
        let bank = DatasetBank::from_examples(vec![
            Example {
                domain: "science".into(),
                prompt: "p1".into(),
                completion: "c1".into(),
            },
            Example {
                domain: "science".into(),
                prompt: "p2".into(),
                completion: "c2".into(),
            },
            Example {
                domain: "coding".into(),
                prompt: "p3".into(),
                completion: "c3".into(),
            },
        ]);
        let stats = bank.stats();
        assert_eq!(stats.total_examples, 3);
        assert_eq!(stats.by_domain["science"], 2);
        assert_eq!(stats.by_domain["coding"], 1);
    }

    #[test]
    fn missing_dir_gives_empty_bank() {
        let bank = DatasetBank::load_dir("/nonexistent/mcai/datasets").unwrap();
        assert!(bank.is_empty());
    }
}
