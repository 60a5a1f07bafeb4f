//! Word-overlap search over the dataset bank.
//!
//! Score is the number of meaningful words (stopwords removed) shared between
//! the query and a record's prompt. A record is only relevant if it shares at
//! least `min_shared_words` words, or one word of `long_word_len` characters or
//! more, so a single common word never produces a match.

use serde::Serialize;

use super::{DatasetBank, Example};
use crate::config::DatasetConfig;
use crate::query::meaningful_words;

/// Relevance knobs.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub min_shared_words: usize,
    pub long_word_len: usize,
    pub max_results: usize,
}

impl SearchConfig {
    pub fn from_config(config: &DatasetConfig) -> Self {
        Self {
            min_shared_words: config.min_shared_words,
            long_word_len: config.long_word_len,
            max_results: config.max_results,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_config(&DatasetConfig::default())
    }
}

/// A record that cleared the relevance threshold.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetMatch<'a> {
    pub example: &'a Example,
    pub score: usize,
    /// Shared words, in query order.
    pub shared: Vec<String>,
}

impl DatasetMatch<'_> {
    fn longest_shared(&self) -> usize {
        self.shared.iter().map(|w| w.chars().count()).max().unwrap_or(0)
    }
}

/// Relevant records ranked by score, then longest shared word, then load order.
pub fn search<'a>(bank: &'a DatasetBank, query: &str, config: &SearchConfig) -> Vec<DatasetMatch<'a>> {
    let query_words = meaningful_words(query);
    if query_words.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(usize, DatasetMatch<'a>)> = bank
        .indexed()
        .iter()
        .enumerate()
        .filter_map(|(position, indexed)| {
            let shared: Vec<String> = query_words
                .iter()
                .filter(|w| indexed.words.contains(w.as_str()))
                .cloned()
                .collect();
            let candidate = DatasetMatch {
                example: &indexed.example,
                score: shared.len(),
                shared,
            };
            is_relevant(&candidate, config).then_some((position, candidate))
        })
        .collect();

    matches.sort_by(|(pa, a), (pb, b)| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.longest_shared().cmp(&a.longest_shared()))
            .then_with(|| pa.cmp(pb))
    });

    matches
        .into_iter()
        .take(config.max_results)
        .map(|(_, m)| m)
        .collect()
}

/// The single best relevant record, if any.
pub fn best_match<'a>(bank: &'a DatasetBank, query: &str, config: &SearchConfig) -> Option<DatasetMatch<'a>> {
    let single = SearchConfig {
        max_results: 1,
        ..*config
    };
    search(bank, query, &single).into_iter().next()
}

fn is_relevant(candidate: &DatasetMatch<'_>, config: &SearchConfig) -> bool {
    candidate.score > 0
        && (candidate.score >= config.min_shared_words
            || candidate.longest_shared() >= config.long_word_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(domain: &str, prompt: &str, completion: &str) -> Example {
        Example {
            domain: domain.into(),
            prompt: prompt.into(),
            completion: completion.into(),
        }
    }

    fn bank() -> DatasetBank {
        DatasetBank::from_examples(vec![
            example("coding", "How do I start debugging a Rust program?", "Use a debugger."),
            example("science", "What are clouds made of and how do they form?", "Water droplets."),
            example("science", "Explain photosynthesis in plants", "Light to sugar."),
            example("history", "Who built the pyramids of Giza?", "Egyptian workers."),
        ])
    }

    #[test]
    fn ranks_by_overlap() {
        let bank = bank();
        let results = search(&bank, "what are clouds made of?", &SearchConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].example.domain, "science");
        assert_eq!(results[0].shared, vec!["clouds", "made"]);
    }

    #[test]
    fn single_short_word_is_not_enough() {
        let bank = bank();
        assert!(search(&bank, "plants", &SearchConfig::default()).is_empty());
    }

    #[test]
    fn long_distinctive_word_is_enough() {
        let bank = bank();
        let hit = best_match(&bank, "photosynthesis", &SearchConfig::default()).unwrap();
        assert_eq!(hit.example.completion, "Light to sugar.");
    }

    #[test]
    fn stopword_only_query_matches_nothing() {
        let bank = bank();
        assert!(search(&bank, "the of and", &SearchConfig::default()).is_empty());
    }
}
