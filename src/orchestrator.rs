//! Execution of a routing decision against the registered sources.
//!
//! Every source call is bounded by the configured timeout, and every failure
//! (error, timeout, missing adapter) becomes a failed [`DataSourceResponse`]
//! instead of an error, so one bad backend never sinks the whole reply.
//! Responses come back in the decision's source order.

use std::time::{Duration, Instant};

use futures::future::join_all;

use concierge_core::models::{DataSourceResponse, ExecutionStrategy, RoutingDecision, SourceKind};
use concierge_core::source::SourceRequest;

use crate::adapters::SourceRegistry;

pub struct Orchestrator {
    registry: SourceRegistry,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(registry: SourceRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub async fn execute(
        &self,
        decision: &RoutingDecision,
        request: SourceRequest,
    ) -> Vec<DataSourceResponse> {
        match decision.strategy {
            ExecutionStrategy::Single => match decision.sources.first() {
                Some(plan) => vec![self.call(plan.source, &request).await],
                None => Vec::new(),
            },
            ExecutionStrategy::Parallel => {
                let calls = decision
                    .sources
                    .iter()
                    .map(|plan| self.call(plan.source, &request));
                join_all(calls).await
            }
            ExecutionStrategy::Sequential => {
                let mut request = request;
                let mut responses = Vec::with_capacity(decision.sources.len());
                for plan in &decision.sources {
                    let response = self.call(plan.source, &request).await;
                    request = request.enriched_with(&response);
                    responses.push(response);
                }
                responses
            }
        }
    }

    async fn call(&self, kind: SourceKind, request: &SourceRequest) -> DataSourceResponse {
        let Some(source) = self.registry.get(kind) else {
            tracing::warn!(source = %kind, "source not configured");
            return DataSourceResponse::failed(kind, "source not configured", 0);
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, source.fetch(request)).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(payload)) => {
                tracing::debug!(source = %kind, elapsed_ms, "source answered");
                DataSourceResponse::succeeded(kind, payload, elapsed_ms)
            }
            Ok(Err(e)) => {
                let message = format!("{:#}", e);
                tracing::warn!(source = %kind, elapsed_ms, error = %message, "source failed");
                DataSourceResponse::failed(kind, message, elapsed_ms)
            }
            Err(_) => {
                tracing::warn!(source = %kind, elapsed_ms, "source timed out");
                DataSourceResponse::failed(
                    kind,
                    format!("timed out after {}s", self.timeout.as_secs_f64()),
                    elapsed_ms,
                )
            }
        }
    }
}
