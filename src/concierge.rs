//! The end-to-end concierge pipeline.
//!
//! ```text
//! messages ─▶ latest user text ─▶ analyze ─▶ route ─▶ execute ─▶ merge
//! ```
//!
//! [`Concierge::respond`] never fails: a missing query or a total source
//! outage both produce the apology reply, so the chat UI always has
//! something to show.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use concierge_core::intent::analyze_query;
use concierge_core::merge::{fallback_response, merge_responses};
use concierge_core::models::{
    ConversationContext, ExecutionStrategy, Message, OrchestratedResponse, QueryAnalysis, Role,
    RoutingDecision,
};
use concierge_core::routing::select_route;
use concierge_core::source::SourceRequest;

use crate::adapters::SourceRegistry;
use crate::config::Config;
use crate::orchestrator::Orchestrator;

/// Analysis and plan for one query, computed without any I/O.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub analysis: QueryAnalysis,
    pub routing: RoutingDecision,
}

pub fn plan(query: &str, today: NaiveDate) -> QueryPlan {
    let analysis = analyze_query(query, today);
    let routing = select_route(analysis.intent);
    QueryPlan { analysis, routing }
}

pub struct Concierge {
    orchestrator: Orchestrator,
    context_window: usize,
}

impl Concierge {
    pub fn new(registry: SourceRegistry, source_timeout: Duration, context_window: usize) -> Self {
        Self {
            orchestrator: Orchestrator::new(registry, source_timeout),
            context_window,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = SourceRegistry::from_config(config)?;
        Ok(Self::new(
            registry,
            Duration::from_secs(config.orchestrator.source_timeout_secs),
            config.orchestrator.context_window,
        ))
    }

    pub fn registry(&self) -> &SourceRegistry {
        self.orchestrator.registry()
    }

    pub fn analyze(&self, query: &str, today: NaiveDate) -> QueryPlan {
        plan(query, today)
    }

    pub async fn respond(&self, messages: &[Message]) -> OrchestratedResponse {
        self.respond_at(messages, Utc::now()).await
    }

    /// Answer the latest user message as of `now`.
    pub async fn respond_at(&self, messages: &[Message], now: DateTime<Utc>) -> OrchestratedResponse {
        let start = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();

        let query = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.trim())
            .unwrap_or_default();

        if query.is_empty() {
            tracing::info!(request_id = %request_id, "no user query to answer");
            let mut reply = fallback_response(ExecutionStrategy::Single.as_str(), 0);
            reply.metadata.request_id = Some(request_id);
            return reply;
        }

        let QueryPlan { analysis, routing } = plan(query, now.date_naive());
        tracing::info!(
            request_id = %request_id,
            intent = %analysis.intent,
            confidence = analysis.confidence,
            strategy = routing.strategy.as_str(),
            "routing query"
        );

        let context = ConversationContext::from_messages(messages, self.context_window, now);
        let intent = analysis.intent;
        let request = SourceRequest::new(query, analysis, messages.to_vec(), context);

        let responses = self.orchestrator.execute(&routing, request).await;
        let mut reply = merge_responses(&responses, &routing);
        reply.metadata.intent = Some(intent);
        reply.metadata.request_id = Some(request_id.clone());

        tracing::info!(
            request_id = %request_id,
            sources = reply.metadata.sources_used.len(),
            hotels = reply.hotels.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "reply ready"
        );
        reply
    }
}

/// Parse `--date YYYY-MM-DD`, defaulting to today (UTC).
pub fn resolve_today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{}', expected YYYY-MM-DD", d)),
        None => Ok(Utc::now().date_naive()),
    }
}

/// `concierge analyze`: print the analysis and plan as JSON.
pub fn run_analyze(query: &str, date: Option<&str>) -> Result<()> {
    let today = resolve_today(date)?;
    let plan = plan(query, today);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// `concierge ask`: answer one query and print the reply.
pub async fn run_ask(config_path: &Path, query: &str, date: Option<&str>) -> Result<()> {
    let config = crate::config::load_config(config_path)?;
    let concierge = Concierge::from_config(&config)?;

    let now = match date {
        Some(_) => resolve_today(date)?
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now),
        None => Utc::now(),
    };

    let reply = concierge.respond_at(&[Message::user(1, query)], now).await;
    print_reply(&reply);
    Ok(())
}

fn print_reply(reply: &OrchestratedResponse) {
    println!("{}", reply.primary_response);

    if !reply.hotels.is_empty() {
        println!();
        println!("{:<28} {:<16} {:>10} {:>7}", "HOTEL", "LOCATION", "EUR/NIGHT", "RATING");
        for hotel in &reply.hotels {
            let price = hotel
                .price_per_night
                .map(|p| format!("{:.0}", p))
                .unwrap_or_else(|| "-".to_string());
            let rating = hotel
                .rating
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "-".to_string());
            let name = if hotel.sponsored {
                format!("{} *", hotel.name)
            } else {
                hotel.name.clone()
            };
            println!(
                "{:<28} {:<16} {:>10} {:>7}",
                name,
                hotel.location.as_deref().unwrap_or("-"),
                price,
                rating
            );
        }
    }

    if !reply.local_content.is_empty() {
        println!();
        for item in &reply.local_content {
            println!("[{}] {}", item.content_type.as_str(), item.title);
        }
    }

    let meta = &reply.metadata;
    let sources: Vec<&str> = meta.sources_used.iter().map(|s| s.as_str()).collect();
    println!();
    println!(
        "intent={} strategy={} sources=[{}] confidence={:.2} time={}ms",
        meta.intent.map(|i| i.as_str()).unwrap_or("-"),
        meta.strategy,
        sources.join(","),
        meta.confidence,
        meta.total_execution_time_ms
    );
}
