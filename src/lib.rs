//! Conversational backend for MC AI: keyword routing in front of a knowledge
//! fallback chain with a shared answer cache.
//!
//! Every chat message goes through the same pipeline: an ordered keyword router
//! picks a handler category, and the handler produces the reply. Factual
//! questions take the knowledge route, which asks each source in turn until one
//! answers:
//!
//! | Order | Source | Cache lifetime |
//! |-------|--------|----------------|
//! | 1 | **Builtin** curated answers | Document (24h) |
//! | 2 | **LLM** chat completion | Live (1h) |
//! | 3 | **Dataset** bank, keyword overlap | Document (24h) |
//! | 4 | **Web search** instant answers | Live (1h) |
//! | 5 | **Encyclopedia** page summary | Document (24h) |
//!
//! # Architecture
//!
//! - **Storage**: SQLite in WAL mode holds the answer cache so every worker
//!   process sees the same entries; an in-process map is available for tests
//!   and single-process runs
//! - **Sources**: each behind the async [`knowledge::KnowledgeSource`] trait,
//!   each attempt bounded by its own timeout
//! - **Transport**: JSON over HTTP (`POST /chat`, `GET /health`)
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite cache database initialization, schema, migrations, and health checks
//! - [`cache`] — TTL cache with SQLite and in-memory stores
//! - [`query`] — Query text and word helpers shared by the router and sources
//! - [`router`] — Ordered keyword routing table
//! - [`knowledge`] — Knowledge sources and the fallback chain
//! - [`dataset`] — Prompt/completion bank and keyword-overlap search
//! - [`emotion`] — Emotion keyword catalog
//! - [`responder`] — The request pipeline tying the above together

pub mod cache;
pub mod config;
pub mod dataset;
pub mod db;
pub mod emotion;
pub mod knowledge;
pub mod query;
pub mod responder;
pub mod router;
