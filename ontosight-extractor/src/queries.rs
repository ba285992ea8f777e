//! SPARQL query text builders.
//!
//! Pure string assembly, no network or state. Every paginated query takes
//! `limit`/`offset` and returns at most `limit` rows so callers can detect
//! a full page.

const PREAMBLE: &str = "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#> \
                        PREFIX skos: <http://www.w3.org/2004/02/skos/core#> ";

/// Ranked class discovery: distinct classes with their instance counts.
pub fn class_query(limit: usize, offset: usize) -> String {
    format!(
        "{PREAMBLE}SELECT DISTINCT ?class (count(?sub) AS ?instanceCount) \
         WHERE {{ ?sub a ?class. }} \
         GROUP BY ?class \
         ORDER BY DESC(?instanceCount) \
         LIMIT {limit} OFFSET {offset}"
    )
}

/// Single `rdfs:label` for a resource, language-filtered, via SAMPLE.
pub fn label_query(uri: &str, lang: &str) -> String {
    format!(
        "{PREAMBLE}SELECT (SAMPLE (?lbl) AS ?label) \
         WHERE {{ <{uri}> rdfs:label ?lbl. \
         FILTER (langMatches(lang(?lbl), '{lang}')) }}"
    )
}

/// `skos:prefLabel` fallback for resources without an `rdfs:label`.
pub fn preferred_label_query(uri: &str, lang: &str) -> String {
    format!(
        "{PREAMBLE}SELECT ?label \
         WHERE {{ <{uri}> skos:prefLabel ?label . \
         FILTER (langMatches(lang(?label), '{lang}')) }}"
    )
}

pub fn comment_query(uri: &str) -> String {
    format!("{PREAMBLE}SELECT ?comment WHERE {{ <{uri}> rdfs:comment ?comment . }} LIMIT 1")
}

/// Ranked datatypes appearing as property values of a class's instances.
pub fn referring_types_query(class_uri: &str, limit: usize) -> String {
    format!(
        "{PREAMBLE}SELECT (COUNT(?val) AS ?valCount) ?valType \
         WHERE {{ ?instance a <{class_uri}> . \
         ?instance ?prop ?val . \
         BIND (datatype(?val) AS ?valType) . }} \
         GROUP BY ?valType \
         ORDER BY DESC(?valCount) \
         LIMIT {limit}"
    )
}

/// Predicates linking instances of `origin` to instances of `target`, ranked
/// by co-occurrence count.
pub fn ordered_class_class_relation_query(
    origin: &str,
    target: &str,
    limit: usize,
    offset: usize,
) -> String {
    format!(
        "{PREAMBLE}SELECT (count(?originInstance) as ?count) ?prop \
         WHERE {{ ?originInstance a <{origin}> . \
         ?targetInstance a <{target}> . \
         ?originInstance ?prop ?targetInstance . }} \
         GROUP BY ?prop \
         ORDER BY DESC(?count) \
         LIMIT {limit} OFFSET {offset}"
    )
}

/// Distinct predicates linking instances of `origin` to instances of
/// `target`. The default relation-discovery path.
pub fn unordered_class_class_relation_query(
    origin: &str,
    target: &str,
    limit: usize,
    offset: usize,
) -> String {
    format!(
        "{PREAMBLE}SELECT DISTINCT ?prop \
         WHERE {{ ?originInstance a <{origin}> . \
         ?targetInstance a <{target}> . \
         ?originInstance ?prop ?targetInstance . }} \
         LIMIT {limit} OFFSET {offset}"
    )
}

/// Predicates whose values carry the given datatype, ranked by value count.
pub fn ordered_class_type_relation_query(
    class_uri: &str,
    type_uri: &str,
    limit: usize,
    offset: usize,
) -> String {
    format!(
        "{PREAMBLE}SELECT (count(?instance) AS ?count) ?prop \
         WHERE {{ ?instance a <{class_uri}> . \
         ?instance ?prop ?val . \
         FILTER (datatype(?val) = <{type_uri}>) }} \
         GROUP BY ?prop \
         ORDER BY DESC(?count) \
         LIMIT {limit} OFFSET {offset}"
    )
}

/// Distinct predicates whose values carry the given datatype.
pub fn unordered_class_type_relation_query(
    class_uri: &str,
    type_uri: &str,
    limit: usize,
    offset: usize,
) -> String {
    format!(
        "{PREAMBLE}SELECT DISTINCT ?prop \
         WHERE {{ ?instance a <{class_uri}> . \
         ?instance ?prop ?val . \
         FILTER (datatype(?val) = <{type_uri}>) }} \
         LIMIT {limit} OFFSET {offset}"
    )
}

/// Count of instances shared by two classes, used for subclass inference.
pub fn common_instances_query(uri1: &str, uri2: &str) -> String {
    format!(
        "{PREAMBLE}SELECT (count(?commonInstance) AS ?commonInstanceCount) \
         WHERE {{ ?commonInstance a <{uri1}>. \
         ?commonInstance a <{uri2}>. }}"
    )
}
