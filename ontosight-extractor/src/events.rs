use crate::lock;
use crate::model::{Node, PropertyEdge};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub type EventCallback = Arc<dyn Fn(&GraphEvent) + Send + Sync>;

/// Change notifications published by the stores and the extraction driver.
/// Payloads are cloned snapshots.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    NodesChanged(HashMap<String, Node>),
    PropertiesChanged(Vec<PropertyEdge>),
    ExtractionLog(String),
    ExtractionComplete(String),
}

/// Synchronous pub/sub fan-out. No queuing, no replay for late subscribers.
///
/// Callbacks run on the publishing task, which may hold a store lock, so
/// they must not call back into the stores.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<HashMap<usize, EventCallback>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: EventCallback) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.subscribers).insert(id, callback);
        id
    }

    pub fn unsubscribe(&self, id: usize) {
        lock(&self.subscribers).remove(&id);
    }

    pub fn publish(&self, event: GraphEvent) {
        let callbacks: Vec<EventCallback> = lock(&self.subscribers).values().cloned().collect();
        for callback in callbacks {
            callback(&event);
        }
    }
}
