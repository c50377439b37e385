use anyhow::Result;

use concierge_core::models::SourceKind;

use crate::config::Config;

/// One row of `concierge sources`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatus {
    pub kind: SourceKind,
    pub status: &'static str,
    pub endpoint: String,
}

pub fn source_statuses(config: &Config) -> Vec<SourceStatus> {
    let sources = &config.sources;
    SourceKind::ALL
        .into_iter()
        .map(|kind| {
            let endpoint = match kind {
                SourceKind::GeneralKnowledge => sources
                    .general_knowledge
                    .as_ref()
                    .map(|g| format!("{} ({})", g.base_url, g.model)),
                SourceKind::RealTimeHotels => sources.real_time_hotels.as_ref().map(|s| s.url.clone()),
                SourceKind::LocalHotelDirectory => sources.directory.as_ref().map(|s| s.url.clone()),
                SourceKind::LocalContent => sources.local_content.as_ref().map(|s| s.url.clone()),
            };
            SourceStatus {
                kind,
                status: if sources.is_configured(kind) {
                    "OK"
                } else {
                    "NOT CONFIGURED"
                },
                endpoint: endpoint.unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<24} {:<16} ENDPOINT", "SOURCE", "STATUS");
    for row in source_statuses(config) {
        println!("{:<24} {:<16} {}", row.kind.as_str(), row.status, row.endpoint);
    }
    Ok(())
}
