//! Namespace prefix tracking and display-name derivation.

use std::collections::HashMap;

/// Namespaces shorter than this are noise (e.g. bare schemes) and are not
/// recorded.
const MIN_NAMESPACE_LEN: usize = 8;

/// Well-known RDF namespaces used to shorten URIs for display.
const GLOBAL_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("schema", "http://schema.org/"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("geo", "http://www.opengis.net/ont/geosparql#"),
    ("wd", "http://www.wikidata.org/entity/"),
    ("wdt", "http://www.wikidata.org/prop/direct/"),
];

const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

const XSD_DISPLAY_NAMES: &[&str] = &[
    "string",
    "boolean",
    "decimal",
    "integer",
    "int",
    "long",
    "short",
    "byte",
    "float",
    "double",
    "date",
    "time",
    "dateTime",
    "duration",
    "gYear",
    "gYearMonth",
    "gMonthDay",
    "anyURI",
    "nonNegativeInteger",
    "positiveInteger",
];

/// Classification used only for color-coding: the most frequent namespace is
/// the dataset's own, everything else is foreign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixKind {
    Intern,
    Extern,
}

/// Frequency-ranked registry of namespaces seen during extraction.
#[derive(Debug, Default)]
pub struct PrefixRegistry {
    counts: HashMap<String, usize>,
}

impl PrefixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, uri: &str) {
        if let Some(namespace) = namespace_of(uri) {
            if namespace.len() >= MIN_NAMESPACE_LEN {
                *self.counts.entry(namespace.to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn classify(&self, namespace: &str) -> Option<PrefixKind> {
        let position = self
            .ranked()
            .iter()
            .position(|(ns, _)| ns == namespace)?;
        Some(if position == 0 {
            PrefixKind::Intern
        } else {
            PrefixKind::Extern
        })
    }

    /// Namespaces by descending frequency, name as tie-break for a stable
    /// order.
    pub fn ranked(&self) -> Vec<(String, usize)> {
        let mut entries: Vec<(String, usize)> = self
            .counts
            .iter()
            .map(|(ns, count)| (ns.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Namespace portion of a URI: through the last `#`, else through the last
/// path `/`.
pub fn namespace_of(uri: &str) -> Option<&str> {
    if let Some(pos) = uri.rfind('#') {
        return Some(&uri[..=pos]);
    }
    let scheme_end = uri.find("://").map(|p| p + 3)?;
    let pos = uri[scheme_end..].rfind('/')?;
    Some(&uri[..=scheme_end + pos])
}

/// `prefix:suffix` shortening against the well-known namespace table.
pub fn shorten(uri: &str) -> Option<String> {
    for (prefix, namespace) in GLOBAL_PREFIXES {
        if let Some(suffix) = uri.strip_prefix(namespace) {
            if !suffix.is_empty() && !suffix.contains('/') {
                return Some(format!("{prefix}:{suffix}"));
            }
        }
    }
    None
}

pub fn well_known_datatype_name(uri: &str) -> Option<String> {
    if uri == "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString" {
        return Some("langString".to_string());
    }
    if uri == "http://www.w3.org/2000/01/rdf-schema#Literal" {
        return Some("Literal".to_string());
    }
    let suffix = uri.strip_prefix(XSD_NS)?;
    XSD_DISPLAY_NAMES
        .contains(&suffix)
        .then(|| suffix.to_string())
}

/// Trailing fragment or path segment, the derivation of last resort.
pub fn last_segment(uri: &str) -> String {
    let trimmed = uri.trim_end_matches('/');
    let candidate = trimmed.rsplit(['#', '/']).next().unwrap_or(trimmed);
    if candidate.is_empty() {
        uri.to_string()
    } else {
        candidate.to_string()
    }
}

/// Display-name derivation: datatype table, then prefix shortening, then the
/// last URI segment.
pub fn friendly_name(uri: &str) -> String {
    if let Some(name) = well_known_datatype_name(uri) {
        return name;
    }
    if let Some(short) = shorten(uri) {
        return short;
    }
    last_segment(uri)
}
