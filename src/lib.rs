//! # Sifnos Concierge
//!
//! Intent routing and multi-source orchestration for the travel chat of a
//! Sifnos hotel website.
//!
//! Each user message is analyzed (entities, dates, intent), routed to one or
//! more backends and the answers merged into a single reply carrying text,
//! hotel cards, local content and metadata.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │  CLI / HTTP  │──▶│  Concierge   │──▶│  Orchestrator        │
//! │  (concierge) │   │ analyze+route│   │ single/parallel/seq  │
//! └──────────────┘   └──────┬───────┘   └──────────┬───────────┘
//!                           │                      │
//!                           ▼                      ▼
//!                    ┌──────────────┐   ┌──────────────────────┐
//!                    │    merge     │◀──│  Adapters            │
//!                    │ (core crate) │   │ LLM/live/dir/content │
//!                    └──────────────┘   └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! concierge analyze "hotels in apollonia next weekend"
//! concierge ask "best beaches near vathi?"
//! concierge sources
//! concierge serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`adapters`] | HTTP data source adapters and the source registry |
//! | [`stream`] | SSE decoding for streamed completions |
//! | [`orchestrator`] | Executes routing decisions with timeouts |
//! | [`concierge`] | End-to-end pipeline and CLI commands |
//! | [`server`] | JSON HTTP API |
//! | [`sources`] | Source status listing |

pub mod adapters;
pub mod concierge;
pub mod config;
pub mod orchestrator;
pub mod server;
pub mod sources;
pub mod stream;
