//! Node store: identity allocation, deduplication, and change broadcast for
//! discovered entities.

use crate::events::{EventBus, GraphEvent};
use crate::model::{DiscoveryState, Node, NodeKind};
use crate::prefixes::{self, PrefixRegistry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared handle. Mutation happens under the lock with no await point held,
/// so interleaved tasks always observe complete mutations.
pub type SharedNodeGraph = Arc<Mutex<NodeGraph>>;

pub struct NodeGraph {
    nodes: HashMap<String, Node>,
    class_ids_by_uri: HashMap<String, String>,
    prefixes: PrefixRegistry,
    events: Arc<EventBus>,
}

impl NodeGraph {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            nodes: HashMap::new(),
            class_ids_by_uri: HashMap::new(),
            prefixes: PrefixRegistry::new(),
            events,
        }
    }

    pub fn into_shared(self) -> SharedNodeGraph {
        Arc::new(Mutex::new(self))
    }

    /// Registers a discovered entity and returns its id.
    ///
    /// Class candidates are idempotent per URI: a second call with a known
    /// class URI returns the existing id without creating anything. Ids are
    /// `{kind}{size}` and never reused.
    pub fn add_node(&mut self, mut candidate: Node) -> String {
        if candidate.kind == NodeKind::Class {
            if let Some(existing) = self.class_ids_by_uri.get(&candidate.uri) {
                return existing.clone();
            }
        }

        let id = format!("{}{}", candidate.kind.prefix(), self.nodes.len());
        candidate.id = id.clone();
        if candidate.name.is_empty() {
            candidate.name = prefixes::friendly_name(&candidate.uri);
        }
        if candidate.kind == NodeKind::Class {
            candidate.discovery.get_or_insert(DiscoveryState::Seeded);
            self.class_ids_by_uri
                .insert(candidate.uri.clone(), id.clone());
        }
        self.prefixes.record(&candidate.uri);
        debug!("Registered {} node {} for {}", candidate.kind.prefix(), id, candidate.uri);
        self.nodes.insert(id.clone(), candidate);
        self.emit_changed();
        id
    }

    /// Datatype nodes are unique per URI across the whole session. `None`
    /// means the datatype already exists and the caller must create neither
    /// a node nor an edge.
    pub fn add_datatype_for_class(&mut self, candidate: Node) -> Option<String> {
        let exists = self
            .nodes
            .values()
            .any(|node| node.kind == NodeKind::Type && node.uri == candidate.uri);
        if exists {
            return None;
        }
        Some(self.add_node(candidate))
    }

    pub fn insert_label(&mut self, id: &str, label: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.name = label.to_string();
        self.emit_changed();
    }

    /// Rewrites a node's URI in place, re-deriving its display name. The id
    /// stays stable.
    pub fn set_uri(&mut self, id: &str, uri: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let old_uri = std::mem::replace(&mut node.uri, uri.to_string());
        node.name = prefixes::friendly_name(uri);
        let kind = node.kind;
        if kind == NodeKind::Class {
            self.class_ids_by_uri.remove(&old_uri);
            self.class_ids_by_uri.insert(uri.to_string(), id.to_string());
        }
        self.prefixes.record(uri);
        self.emit_changed();
    }

    pub fn uri_of(&self, id: &str) -> Option<String> {
        self.nodes.get(id).map(|node| node.uri.clone())
    }

    pub fn get(&self, id: &str) -> Option<Node> {
        self.nodes.get(id).cloned()
    }

    /// Zero for unknown ids; lookups never fail.
    pub fn instance_count_of(&self, id: &str) -> u64 {
        self.nodes.get(id).map(|node| node.instance_count).unwrap_or(0)
    }

    pub fn advance_discovery(&mut self, id: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.discovery == Some(DiscoveryState::Seeded) {
                node.discovery = Some(DiscoveryState::TypesDiscovered);
            }
        }
    }

    pub fn discovery_state(&self, id: &str) -> Option<DiscoveryState> {
        self.nodes.get(id).and_then(|node| node.discovery)
    }

    pub fn class_ids(&self) -> Vec<String> {
        self.class_ids_by_uri.values().cloned().collect()
    }

    pub fn snapshot(&self) -> HashMap<String, Node> {
        self.nodes.clone()
    }

    pub fn prefixes(&self) -> &PrefixRegistry {
        &self.prefixes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn emit_changed(&self) {
        self.events
            .publish(GraphEvent::NodesChanged(self.nodes.clone()));
    }
}
