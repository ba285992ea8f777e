//! Top-level extraction driver: seeds classes, then fans out label, type,
//! relation, and equality discovery.

use crate::bindings::ClassRow;
use crate::client::SparqlClient;
use crate::config::SharedConfig;
use crate::error::Result;
use crate::events::{EventBus, GraphEvent};
use crate::extractors::{fetch_label, DatatypeExtractor, RelationExtractor};
use crate::lock;
use crate::model::Node;
use crate::nodes::SharedNodeGraph;
use crate::properties::SharedPropertyGraph;
use crate::queries;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Drives a full extraction pass against one endpoint.
///
/// Seeding is fallible and aborts the pass; every discovery branch after it
/// only logs its failure, so one unreachable class never sinks the rest.
#[derive(Clone)]
pub struct ClassExtractor {
    client: SparqlClient,
    config: SharedConfig,
    nodes: SharedNodeGraph,
    events: Arc<EventBus>,
    relations: RelationExtractor,
    datatypes: DatatypeExtractor,
}

impl ClassExtractor {
    pub fn new(
        client: SparqlClient,
        config: SharedConfig,
        nodes: SharedNodeGraph,
        properties: SharedPropertyGraph,
        events: Arc<EventBus>,
    ) -> Self {
        let relations = RelationExtractor::new(
            client.clone(),
            config.clone(),
            nodes.clone(),
            properties.clone(),
        );
        let datatypes =
            DatatypeExtractor::new(client.clone(), config.clone(), nodes.clone(), properties);
        Self {
            client,
            config,
            nodes,
            events,
            relations,
            datatypes,
        }
    }

    /// Seeds the node store with the endpoint's largest classes and runs
    /// every discovery branch to completion. Returns the ids of all seeded
    /// classes.
    ///
    /// Calling this on a non-empty store is a no-op that returns the
    /// existing class ids.
    pub async fn request_classes(&self) -> Result<Vec<String>> {
        {
            let nodes = lock(&self.nodes);
            if !nodes.is_empty() {
                debug!("Store already seeded, skipping class discovery");
                return Ok(nodes.class_ids());
            }
        }

        let limit = lock(&self.config).limit;
        let rows = self.client.query(&queries::class_query(limit, 0)).await?;
        let mut class_ids = Vec::new();
        for row in rows.iter().filter_map(ClassRow::from_solution) {
            if !row.uri.starts_with("http") {
                debug!("Skipping non-dereferenceable class {}", row.uri);
                continue;
            }
            let id = lock(&self.nodes).add_node(Node::class(&row.uri, row.instance_count));
            class_ids.push(id);
        }
        info!("Seeded {} classes", class_ids.len());
        self.events.publish(GraphEvent::ExtractionLog(format!(
            "Found {} classes. Requesting details...",
            class_ids.len()
        )));

        let mut branches = JoinSet::new();
        for id in &class_ids {
            let this = self.clone();
            let label_id = id.clone();
            branches.spawn(async move { this.request_label(&label_id).await });
            let this = self.clone();
            let type_id = id.clone();
            branches.spawn(async move { this.datatypes.request_referring_types(&type_id).await });
        }

        self.events.publish(GraphEvent::ExtractionLog(
            "Discovering relationships between classes...".to_string(),
        ));
        for (i, origin) in class_ids.iter().enumerate() {
            for (j, target) in class_ids.iter().enumerate() {
                if i == j {
                    continue;
                }
                let this = self.clone();
                let origin = origin.clone();
                let target = target.clone();
                branches.spawn(async move {
                    this.relations
                        .request_class_class_relation(&origin, &target)
                        .await
                });
                if i < j {
                    let this = self.clone();
                    let a = class_ids[i].clone();
                    let b = class_ids[j].clone();
                    branches
                        .spawn(async move { this.relations.request_class_equality(&a, &b).await });
                }
            }
        }

        while let Some(joined) = branches.join_next().await {
            if let Err(error) = joined {
                warn!("Discovery branch panicked: {}", error);
            }
        }

        self.events
            .publish(GraphEvent::ExtractionLog("Discovery complete.".to_string()));
        Ok(class_ids)
    }

    async fn request_label(&self, id: &str) {
        let uri = {
            let nodes = lock(&self.nodes);
            match nodes.uri_of(id) {
                Some(uri) => uri,
                None => return,
            }
        };
        let lang = lock(&self.config).label_lang.clone();
        if let Some(label) = fetch_label(&self.client, &uri, &lang).await {
            lock(&self.nodes).insert_label(id, &label);
        }
    }
}
