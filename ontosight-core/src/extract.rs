//! Orchestration entry point for a single extraction run.

use ontosight_extractor::{
    lock, ClassExtractor, EventBus, ExtractError, FailureRecord, GraphEvent, Node, NodeGraph,
    PropertyEdge, PropertyGraph, RequestConfig, RequestStats, SparqlClient, StatsCallback,
    StatsSnapshot,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

/// Options for configuring an extraction run.
pub struct ExtractionOptions {
    pub endpoint: Url,
    pub limit: usize,
    pub label_lang: String,
    pub query_delay: Duration,
    pub concurrency: usize,
}

impl ExtractionOptions {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            limit: 10,
            label_lang: "en".to_string(),
            query_delay: Duration::from_millis(100),
            concurrency: 1,
        }
    }
}

/// Final snapshot of everything one run discovered.
pub struct ExtractionResult {
    pub endpoint: String,
    pub class_ids: Vec<String>,
    pub nodes: HashMap<String, Node>,
    pub properties: Vec<PropertyEdge>,
    pub stats: StatsSnapshot,
    pub failures: Vec<FailureRecord>,
    pub duration: Duration,
}

/// Runs a complete extraction pass against the configured endpoint.
///
/// Subscribers on `events` observe intermediate graph states while the run is
/// in flight; the returned result is the final state. Only seeding errors
/// surface here, discovery branch failures are absorbed into the stats.
pub async fn run_extraction(
    options: ExtractionOptions,
    events: Arc<EventBus>,
    stats_callback: Option<StatsCallback>,
) -> Result<ExtractionResult, ExtractError> {
    let endpoint = options.endpoint.to_string();
    let config = RequestConfig::new(options.endpoint)
        .with_limit(options.limit)
        .with_label_lang(&options.label_lang)
        .with_query_delay(options.query_delay)
        .with_concurrency(options.concurrency)
        .into_shared();

    let stats = Arc::new(RequestStats::new());
    if let Some(callback) = stats_callback {
        stats.subscribe(callback);
    }

    let client = SparqlClient::new(config.clone(), stats.clone())?;
    let nodes = NodeGraph::new(events.clone()).into_shared();
    let properties = PropertyGraph::new(events.clone()).into_shared();
    let extractor = ClassExtractor::new(
        client,
        config,
        nodes.clone(),
        properties.clone(),
        events.clone(),
    );

    info!("Starting extraction against {}", endpoint);
    let started = Instant::now();
    let class_ids = extractor.request_classes().await?;
    let duration = started.elapsed();

    events.publish(GraphEvent::ExtractionComplete(endpoint.clone()));
    info!(
        "Extraction against {} finished in {:.1}s",
        endpoint,
        duration.as_secs_f64()
    );

    Ok(ExtractionResult {
        endpoint,
        class_ids,
        nodes: lock(&nodes).snapshot(),
        properties: lock(&properties).snapshot(),
        stats: stats.snapshot(),
        failures: stats.failures(),
        duration,
    })
}
