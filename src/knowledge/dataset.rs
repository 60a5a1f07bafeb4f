//! Dataset bank as a fallback-chain source.

use async_trait::async_trait;
use std::sync::Arc;

use super::{Answer, KnowledgeSource, SourceError, SourceKind};
use crate::dataset::search::{best_match, SearchConfig};
use crate::dataset::DatasetBank;
use crate::query::Query;

pub struct DatasetSource {
    bank: Arc<DatasetBank>,
    config: SearchConfig,
}

impl DatasetSource {
    pub fn new(bank: Arc<DatasetBank>, config: SearchConfig) -> Self {
        Self { bank, config }
    }
}

#[async_trait]
impl KnowledgeSource for DatasetSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Dataset
    }

    async fn attempt(&self, query: &Query) -> Result<Option<Answer>, SourceError> {
        let Some(hit) = best_match(&self.bank, &query.text, &self.config) else {
            return Ok(None);
        };
        tracing::debug!(
            domain = %hit.example.domain,
            score = hit.score,
            shared = ?hit.shared,
            "dataset match"
        );
        Ok(Some(Answer::new(hit.example.completion.clone(), SourceKind::Dataset)))
    }
}
