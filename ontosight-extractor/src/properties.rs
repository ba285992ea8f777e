//! Property store: merges discovered predicates between the same node pair
//! into one visual edge.

use crate::events::{EventBus, GraphEvent};
use crate::model::{PropEntry, PropertyEdge, PLACEHOLDER_PROP_URI};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub type SharedPropertyGraph = Arc<Mutex<PropertyGraph>>;

pub struct PropertyGraph {
    edges: Vec<PropertyEdge>,
    by_pair: HashMap<String, usize>,
    by_intermediate: HashMap<String, usize>,
    events: Arc<EventBus>,
}

impl PropertyGraph {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            edges: Vec::new(),
            by_pair: HashMap::new(),
            by_intermediate: HashMap::new(),
            events,
        }
    }

    pub fn into_shared(self) -> SharedPropertyGraph {
        Arc::new(Mutex::new(self))
    }

    /// Pair keys are directional: `(A, B)` and `(B, A)` are distinct edges.
    fn pair_key(source: &str, target: &str) -> String {
        format!("{source} - {target}")
    }

    /// Registers a discovered predicate between two nodes.
    ///
    /// First predicate for a pair creates the edge. A predicate arriving on
    /// an edge whose representative URI is still the placeholder replaces it
    /// wholesale. Any further predicate is appended to `props`, deduplicated
    /// by URI. The edge's intermediate id never changes after creation.
    pub fn add_property(
        &mut self,
        source: &str,
        intermediate: &str,
        target: &str,
        uri: &str,
        value: u64,
    ) {
        let key = Self::pair_key(source, target);
        match self.by_pair.get(&key) {
            None => {
                let edge = PropertyEdge {
                    source: source.to_string(),
                    intermediate: intermediate.to_string(),
                    target: target.to_string(),
                    uri: uri.to_string(),
                    name: None,
                    props: vec![PropEntry {
                        uri: uri.to_string(),
                        value,
                    }],
                };
                debug!("New edge {} via {}", key, uri);
                self.edges.push(edge);
                let index = self.edges.len() - 1;
                self.by_pair.insert(key, index);
                self.by_intermediate.insert(intermediate.to_string(), index);
            }
            Some(&index) => {
                let edge = &mut self.edges[index];
                if edge.uri == PLACEHOLDER_PROP_URI {
                    edge.uri = uri.to_string();
                    edge.props = vec![PropEntry {
                        uri: uri.to_string(),
                        value,
                    }];
                } else if !edge.props.iter().any(|entry| entry.uri == uri) {
                    edge.props.push(PropEntry {
                        uri: uri.to_string(),
                        value,
                    });
                }
            }
        }
        self.emit_changed();
    }

    /// `None` means the pair has not been seen, so the caller still needs to
    /// allocate an intermediate node for it.
    pub fn intermediate_id(&self, source: &str, target: &str) -> Option<String> {
        let index = self.by_pair.get(&Self::pair_key(source, target))?;
        Some(self.edges[*index].intermediate.clone())
    }

    /// Display-name enrichment for the first edge whose representative URI
    /// matches. Edges holding the predicate only as a secondary `props`
    /// entry are not touched.
    pub fn insert_name(&mut self, uri: &str, name: &str) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|edge| edge.uri == uri) else {
            return false;
        };
        edge.name = Some(name.to_string());
        self.emit_changed();
        true
    }

    pub fn snapshot(&self) -> Vec<PropertyEdge> {
        self.edges.clone()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn emit_changed(&self) {
        self.events
            .publish(GraphEvent::PropertiesChanged(self.edges.clone()));
    }
}
