pub mod bindings;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod extractors;
pub mod model;
pub mod nodes;
pub mod prefixes;
pub mod properties;
pub mod queries;
pub mod stats;

pub use client::SparqlClient;
pub use config::{RequestConfig, SharedConfig};
pub use error::{ExtractError, Result};
pub use events::{EventBus, EventCallback, GraphEvent};
pub use extractors::ClassExtractor;
pub use model::{
    DiscoveryState, Node, NodeKind, PropEntry, PropertyEdge, PLACEHOLDER_PROP_URI, SUBCLASS_OF_URI,
};
pub use nodes::{NodeGraph, SharedNodeGraph};
pub use properties::{PropertyGraph, SharedPropertyGraph};
pub use stats::{FailureRecord, RequestStats, StatsCallback, StatsSnapshot};

/// Store locks are held only across synchronous mutation, so a poisoned lock
/// still guards consistent data.
pub fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
