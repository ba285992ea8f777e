//! Typed views over SPARQL result rows.
//!
//! Each row type validates the bindings it needs and yields `None` for rows
//! missing a required field, so one malformed row never aborts a batch.

use crate::error::{ExtractError, Result};
use oxrdf::Term;
use sparesults::{
    QueryResultsFormat, QueryResultsParser, QuerySolution, ReaderQueryResultsParserOutput,
};

/// Parse an `application/sparql-results+json` body into solution rows.
pub fn parse_solutions(body: &[u8]) -> Result<Vec<QuerySolution>> {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
    match parser.for_reader(body)? {
        ReaderQueryResultsParserOutput::Solutions(solutions) => {
            let mut rows = Vec::new();
            for solution in solutions {
                rows.push(solution?);
            }
            Ok(rows)
        }
        ReaderQueryResultsParserOutput::Boolean(_) => Err(ExtractError::BooleanResult),
    }
}

/// The engine only ever consumes the lexical value of a bound term.
fn term_text(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        other => other.to_string(),
    }
}

fn term_count(term: &Term) -> Option<u64> {
    match term {
        Term::Literal(literal) => literal.value().parse().ok(),
        _ => None,
    }
}

/// One row of the class-discovery query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRow {
    pub uri: String,
    pub instance_count: u64,
}

impl ClassRow {
    pub fn from_solution(solution: &QuerySolution) -> Option<Self> {
        Some(Self {
            uri: term_text(solution.get("class")?),
            instance_count: term_count(solution.get("instanceCount")?)?,
        })
    }
}

/// One row of a label or preferred-label query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub label: String,
}

impl LabelRow {
    pub fn from_solution(solution: &QuerySolution) -> Option<Self> {
        Some(Self {
            label: term_text(solution.get("label")?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    pub comment: String,
}

impl CommentRow {
    pub fn from_solution(solution: &QuerySolution) -> Option<Self> {
        Some(Self {
            comment: term_text(solution.get("comment")?),
        })
    }
}

/// One row of a relation query: a single predicate URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateRow {
    pub uri: String,
}

impl PredicateRow {
    pub fn from_solution(solution: &QuerySolution) -> Option<Self> {
        Some(Self {
            uri: term_text(solution.get("prop")?),
        })
    }
}

/// One row of the referring-datatype query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRow {
    pub uri: String,
    pub count: u64,
}

impl TypeRow {
    pub fn from_solution(solution: &QuerySolution) -> Option<Self> {
        Some(Self {
            uri: term_text(solution.get("valType")?),
            count: term_count(solution.get("valCount")?)?,
        })
    }
}

/// The single row of the instance-overlap query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapRow {
    pub common: u64,
}

impl OverlapRow {
    pub fn from_solution(solution: &QuerySolution) -> Option<Self> {
        Some(Self {
            common: term_count(solution.get("commonInstanceCount")?)?,
        })
    }
}
