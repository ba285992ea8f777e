//! Discovery drivers that turn SPARQL query results into store mutations.

pub mod class;
pub mod datatype;
pub mod relation;

pub use class::ClassExtractor;
pub use datatype::DatatypeExtractor;
pub use relation::RelationExtractor;

use crate::bindings::LabelRow;
use crate::client::SparqlClient;
use crate::queries;
use tracing::warn;

/// Initial page size for relation discovery; doubles after each full page.
pub(crate) const INITIAL_RELATION_LIMIT: usize = 10;

/// Pagination stops unconditionally after this many rounds per pair.
pub(crate) const MAX_PAGE_ROUNDS: usize = 12;

/// At most this many referring value types are examined per class.
pub(crate) const REFERRING_TYPE_LIMIT: usize = 5;

/// Resolves a display label for `uri`, trying `rdfs:label` first and falling
/// back to `skos:prefLabel`. Query failures are logged and treated as no
/// label found.
pub(crate) async fn fetch_label(client: &SparqlClient, uri: &str, lang: &str) -> Option<String> {
    for query in [
        queries::label_query(uri, lang),
        queries::preferred_label_query(uri, lang),
    ] {
        match client.query(&query).await {
            Ok(rows) => {
                let label = rows
                    .iter()
                    .filter_map(LabelRow::from_solution)
                    .map(|row| row.label)
                    .find(|label| !label.is_empty());
                if label.is_some() {
                    return label;
                }
            }
            Err(error) if error.is_cancelled() => return None,
            Err(error) => {
                warn!("Label lookup for {} failed: {}", uri, error);
            }
        }
    }
    None
}
