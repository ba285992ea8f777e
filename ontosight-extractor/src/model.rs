use serde::{Deserialize, Serialize};

/// Sentinel predicate URI assigned to an edge before its real predicate is
/// known. Replaced wholesale by the first discovered predicate.
pub const PLACEHOLDER_PROP_URI: &str = "urn:x-ontosight:unknown-property";

pub const SUBCLASS_OF_URI: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

/// Node categories, spelled the way the VOWL vocabulary spells them on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "property")]
    Property,
    #[serde(rename = "datatypeProperty")]
    DatatypeProperty,
}

impl NodeKind {
    /// Also the leading portion of allocated node ids.
    pub fn prefix(&self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Type => "type",
            NodeKind::Property => "property",
            NodeKind::DatatypeProperty => "datatypeProperty",
        }
    }
}

/// Per-class discovery progress. A class node that exists is at least
/// `Seeded`; `TypesDiscovered` marks that referring-datatype discovery ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryState {
    Seeded,
    TypesDiscovered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(rename = "instanceCount")]
    pub instance_count: u64,
    pub value: u64,
    #[serde(rename = "isLoopNode")]
    pub is_loop_node: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryState>,
}

impl Node {
    fn bare(uri: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: String::new(),
            uri: uri.into(),
            kind,
            name: String::new(),
            instance_count: 0,
            value: 0,
            is_loop_node: false,
            discovery: None,
        }
    }

    pub fn class(uri: impl Into<String>, instance_count: u64) -> Self {
        let mut node = Self::bare(uri, NodeKind::Class);
        node.instance_count = instance_count;
        node
    }

    pub fn datatype(uri: impl Into<String>, value: u64) -> Self {
        let mut node = Self::bare(uri, NodeKind::Type);
        node.value = value;
        node
    }

    pub fn property(uri: impl Into<String>, is_loop_node: bool) -> Self {
        let mut node = Self::bare(uri, NodeKind::Property);
        node.is_loop_node = is_loop_node;
        node
    }

    /// Placeholder intermediate for a class-to-datatype edge whose predicate
    /// is not yet known.
    pub fn datatype_property(uri: impl Into<String>) -> Self {
        Self::bare(uri, NodeKind::DatatypeProperty).with_name("unknown")
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// One merged predicate underlying a visual edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropEntry {
    pub uri: String,
    pub value: u64,
}

/// One visual relation between two nodes, possibly aggregating several
/// underlying predicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyEdge {
    pub source: String,
    pub intermediate: String,
    pub target: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub props: Vec<PropEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kinds_serialize_to_vowl_spellings() {
        let node = Node::datatype_property(PLACEHOLDER_PROP_URI);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "datatypeProperty");
        assert_eq!(json["name"], "unknown");
        assert!(json.get("discovery").is_none());
    }

    #[test]
    fn class_nodes_carry_their_instance_count() {
        let node = Node::class("http://example.org/Person", 100);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["instanceCount"], 100);
        assert_eq!(json["isLoopNode"], false);
    }
}
