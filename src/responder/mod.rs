//! Request pipeline: validate → route → handle → respond.
//!
//! [`Responder::respond`] never fails. Input problems produce a clarification
//! reply, collaborator failures degrade to the next source or a canned reply,
//! and the knowledge route returns [`FALLBACK_MESSAGE`] when every source
//! comes back empty.

pub mod handlers;

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CachedAnswer, SharedCache};
use crate::config::McaiConfig;
use crate::dataset::search::SearchConfig;
use crate::dataset::DatasetBank;
use crate::emotion::{self, Catalog, EmotionRecord};
use crate::knowledge::builtin::BuiltinSource;
use crate::knowledge::dataset::DatasetSource;
use crate::knowledge::llm::{
    HttpLlmClient, LlmClient, LlmPrompt, LlmSource, CODE_SYSTEM_PROMPT, RECIPE_SYSTEM_PROMPT,
};
use crate::knowledge::web::{EncyclopediaSource, WebSearchSource};
use crate::knowledge::{FallbackChain, SourceError, SourceKind, FALLBACK_MESSAGE};
use crate::query::Query;
use crate::router::{Route, Router};

/// How the cache took part in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Hit,
    Miss,
    /// No cache configured, or the route does not use it.
    Bypass,
    /// The store errored; the request ran without it.
    Unavailable,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Bypass => "bypass",
            Self::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub request_id: String,
    pub route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
    pub cache: CacheStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempted: Vec<SourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionRecord>,
    /// Frontend feature to open (`"art"`, `"music"`, `"games"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<&'static str>,
}

impl ResponseMetadata {
    fn new(route: Route, rule: Option<&'static str>) -> Self {
        Self {
            request_id: uuid::Uuid::now_v7().to_string(),
            route,
            rule,
            cache: CacheStatus::Bypass,
            source: None,
            attempted: Vec::new(),
            emotion: None,
            handoff: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub metadata: ResponseMetadata,
}

/// Owns everything a request needs. Shared across requests behind an `Arc`.
pub struct Responder {
    router: Router,
    chain: FallbackChain,
    cache: Option<SharedCache>,
    llm: Option<Arc<dyn LlmClient>>,
    llm_timeout: Duration,
    catalog: Catalog,
    history_turns: usize,
    max_message_chars: usize,
}

impl Responder {
    /// A responder with no cache, no LLM for the code/recipe routes, and
    /// default limits. Use the `with_*` methods to add collaborators.
    pub fn new(router: Router, chain: FallbackChain) -> Self {
        let config = McaiConfig::default();
        Self {
            router,
            chain,
            cache: None,
            llm: None,
            llm_timeout: Duration::from_millis(config.knowledge.llm_timeout_ms),
            catalog: Catalog::Neuroscience,
            history_turns: config.router.history_turns,
            max_message_chars: config.server.max_message_chars,
        }
    }

    pub fn with_cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        self.llm = Some(llm);
        self.llm_timeout = timeout;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_limits(mut self, history_turns: usize, max_message_chars: usize) -> Self {
        self.history_turns = history_turns;
        self.max_message_chars = max_message_chars;
        self
    }

    /// Build the full pipeline from config: standard routing table, the
    /// five-source chain (minus disabled sources), and the configured cache.
    pub fn from_config(config: &McaiConfig, bank: Arc<DatasetBank>) -> Result<Self> {
        let k = &config.knowledge;
        let llm: Arc<dyn LlmClient> =
            Arc::new(HttpLlmClient::new(config.llm.clone(), config.llm_api_key())?);
        let llm_timeout = Duration::from_millis(k.llm_timeout_ms);

        if config.llm_api_key().is_none() {
            tracing::warn!(env = %config.llm.api_key_env, "no LLM API key set, LLM source disabled");
        }

        let mut chain = FallbackChain::new();
        if k.builtin_enabled {
            chain.push(Arc::new(BuiltinSource), Duration::from_millis(k.builtin_timeout_ms));
        }
        chain.push(Arc::new(LlmSource::new(Arc::clone(&llm))), llm_timeout);
        chain.push(
            Arc::new(DatasetSource::new(bank, SearchConfig::from_config(&config.dataset))),
            Duration::from_millis(k.dataset_timeout_ms),
        );
        if k.web_enabled {
            let timeout = Duration::from_millis(k.web_timeout_ms);
            chain.push(Arc::new(WebSearchSource::new(&k.web_endpoint, timeout)?), timeout);
        }
        if k.encyclopedia_enabled {
            let timeout = Duration::from_millis(k.encyclopedia_timeout_ms);
            chain.push(
                Arc::new(EncyclopediaSource::new(&k.encyclopedia_endpoint, timeout)?),
                timeout,
            );
        }
        tracing::info!(sources = ?chain.kinds(), "knowledge chain ready");

        let catalog: Catalog = config
            .emotion
            .catalog
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        let mut responder = Self::new(Router::default(), chain)
            .with_llm(llm, llm_timeout)
            .with_catalog(catalog)
            .with_limits(config.router.history_turns, config.server.max_message_chars);
        if let Some(cache) = crate::cache::create_cache(config)? {
            responder = responder.with_cache(cache);
        }
        Ok(responder)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn cache(&self) -> Option<&SharedCache> {
        self.cache.as_ref()
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Answer one message given the prior turns.
    pub async fn respond(&self, message: &str, history: &[String]) -> ChatResponse {
        let text = message.trim();
        if text.is_empty() {
            return Self::input_error(handlers::CLARIFY_MESSAGE);
        }
        if text.chars().count() > self.max_message_chars {
            tracing::info!(chars = text.chars().count(), "message over length limit");
            return Self::input_error(handlers::TOO_LONG_MESSAGE);
        }

        let query = Query::new(text).with_history(history, self.history_turns);
        let decision = self.router.decide(&query);
        let mut meta = ResponseMetadata::new(decision.route, decision.rule);
        tracing::info!(
            request_id = %meta.request_id,
            route = %decision.route,
            rule = decision.rule.unwrap_or("-"),
            "message routed"
        );

        let response = match decision.route {
            Route::Knowledge => self.answer_knowledge(&query, &mut meta).await,
            Route::Code => self.answer_code(&query, &mut meta).await,
            Route::Recipe => self.answer_recipe(&query, &mut meta).await,
            Route::Art => {
                meta.handoff = Some("art");
                handlers::art_reply()
            }
            Route::Music => {
                meta.handoff = Some("music");
                handlers::music_reply()
            }
            Route::Game => {
                meta.handoff = Some("games");
                handlers::game_reply()
            }
            Route::Emotional | Route::Default => self.answer_emotion(&query, &mut meta),
        };

        ChatResponse {
            response,
            metadata: meta,
        }
    }

    /// The reply for a request that carries no usable message.
    pub fn clarification() -> ChatResponse {
        Self::input_error(handlers::CLARIFY_MESSAGE)
    }

    fn input_error(message: &str) -> ChatResponse {
        ChatResponse {
            response: message.to_string(),
            metadata: ResponseMetadata::new(Route::Default, None),
        }
    }

    async fn answer_knowledge(&self, query: &Query, meta: &mut ResponseMetadata) -> String {
        // Store calls are sync rusqlite work; keep them off the runtime threads.
        if let Some(cache) = &self.cache {
            let cache = cache.clone();
            let text = query.text.clone();
            let lookup = tokio::task::spawn_blocking(move || cache.get(&text))
                .await
                .map_err(|e| anyhow::anyhow!("cache read task failed: {e}"))
                .and_then(|r| r);
            match lookup {
                Ok(Some(hit)) => {
                    tracing::debug!(request_id = %meta.request_id, source = %hit.source, "cache hit");
                    meta.cache = CacheStatus::Hit;
                    meta.source = Some(hit.source);
                    return hit.text;
                }
                Ok(None) => meta.cache = CacheStatus::Miss,
                Err(e) => {
                    tracing::warn!(error = %e, "cache read failed, continuing without cache");
                    meta.cache = CacheStatus::Unavailable;
                }
            }
        }

        let outcome = self.chain.resolve(query).await;
        meta.attempted = outcome.attempted;

        let Some(answer) = outcome.answer else {
            return FALLBACK_MESSAGE.to_string();
        };
        meta.source = Some(answer.source);

        if let Some(cache) = &self.cache {
            let value = CachedAnswer {
                text: answer.text.clone(),
                source: answer.source,
            };
            let cache = cache.clone();
            let text = query.text.clone();
            let written = tokio::task::spawn_blocking(move || cache.put_answer(&text, &value))
                .await
                .map_err(|e| anyhow::anyhow!("cache write task failed: {e}"))
                .and_then(|r| r);
            if let Err(e) = written {
                tracing::warn!(error = %e, "cache write failed");
                meta.cache = CacheStatus::Unavailable;
            }
        }

        answer.text
    }

    /// Call the LLM under the route timeout; any failure or empty reply is `None`.
    async fn ask_llm(&self, system: &str, query: &Query) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let prompt = LlmPrompt::for_query(system, query);
        let result = match tokio::time::timeout(self.llm_timeout, llm.complete(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.llm_timeout)),
        };
        match result {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(SourceError::Disabled) => None,
            Err(e) => {
                tracing::warn!(error = %e, "LLM call failed");
                None
            }
        }
    }

    async fn answer_code(&self, query: &Query, meta: &mut ResponseMetadata) -> String {
        match self.ask_llm(CODE_SYSTEM_PROMPT, query).await {
            Some(text) => {
                meta.source = Some(SourceKind::Llm);
                text
            }
            None => handlers::CODE_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    async fn answer_recipe(&self, query: &Query, meta: &mut ResponseMetadata) -> String {
        if let Some(text) = handlers::recipe(&query.text) {
            meta.source = Some(SourceKind::Builtin);
            return text.to_string();
        }
        match self.ask_llm(RECIPE_SYSTEM_PROMPT, query).await {
            Some(text) => {
                meta.source = Some(SourceKind::Llm);
                text
            }
            None => handlers::RECIPE_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    fn answer_emotion(&self, query: &Query, meta: &mut ResponseMetadata) -> String {
        match emotion::detect(&query.text, self.catalog) {
            Some(record) => {
                meta.emotion = Some(record.clone());
                handlers::emotion_reply(record)
            }
            None if meta.route == Route::Emotional => handlers::unnamed_feeling_reply(),
            None => handlers::NEUTRAL_MESSAGE.to_string(),
        }
    }
}
