//! Report generation from an extraction result.

use crate::extract::ExtractionResult;
use ontosight_extractor::NodeKind;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub endpoint: String,
    pub duration_seconds: f64,
    pub classes: Vec<ClassSummary>,
    pub datatype_count: usize,
    pub relations: Vec<RelationSummary>,
    pub request_stats: RequestSummary,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub instance_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationSummary {
    pub source: String,
    pub target: String,
    pub predicate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub predicate_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureSummary {
    pub endpoint: String,
    pub message: String,
    pub query: String,
}

pub fn gather_report_data(result: &ExtractionResult) -> ReportData {
    let mut classes: Vec<ClassSummary> = result
        .nodes
        .values()
        .filter(|node| node.kind == NodeKind::Class)
        .map(|node| ClassSummary {
            id: node.id.clone(),
            uri: node.uri.clone(),
            name: node.name.clone(),
            instance_count: node.instance_count,
        })
        .collect();
    classes.sort_by(|a, b| b.instance_count.cmp(&a.instance_count).then(a.id.cmp(&b.id)));

    let datatype_count = result
        .nodes
        .values()
        .filter(|node| node.kind == NodeKind::Type)
        .count();

    let relations = result
        .properties
        .iter()
        .map(|edge| {
            let display_of = |id: &str| {
                result
                    .nodes
                    .get(id)
                    .map(|node| node.name.clone())
                    .unwrap_or_else(|| id.to_string())
            };
            RelationSummary {
                source: display_of(&edge.source),
                target: display_of(&edge.target),
                predicate: edge.uri.clone(),
                name: edge.name.clone(),
                predicate_count: edge.props.len(),
            }
        })
        .collect();

    let failures = result
        .failures
        .iter()
        .map(|failure| FailureSummary {
            endpoint: failure.endpoint.clone(),
            message: failure.message.clone(),
            query: failure.query.clone(),
        })
        .collect();

    ReportData {
        endpoint: result.endpoint.clone(),
        duration_seconds: result.duration.as_secs_f64(),
        classes,
        datatype_count,
        relations,
        request_stats: RequestSummary {
            total: result.stats.successful + result.stats.failed,
            successful: result.stats.successful,
            failed: result.stats.failed,
        },
        failures,
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    // Header
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                      ONTOSIGHT SCHEMA EXTRACTION REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Endpoint:     {}\n", data.endpoint));
    report.push_str(&format!(
        "Extracted:    {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!("Duration:     {:.1} seconds\n", data.duration_seconds));
    report.push_str(&format!("Classes:      {}\n", data.classes.len()));
    report.push_str(&format!("Value Types:  {}\n", data.datatype_count));
    report.push_str(&format!("Relations:    {}\n", data.relations.len()));
    report.push_str(&format!(
        "Queries:      {} total, {} failed\n",
        data.request_stats.total, data.request_stats.failed
    ));
    report.push('\n');

    // Classes
    if !data.classes.is_empty() {
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        report.push_str("CLASSES\n");
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for (idx, class) in data.classes.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, class.name));
            report.push_str(&format!("URI:          {}\n", class.uri));
            report.push_str(&format!("Instances:    {}\n\n", class.instance_count));
        }
    }

    // Relations
    if !data.relations.is_empty() {
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        report.push_str("RELATIONS\n");
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for relation in &data.relations {
            let predicate = relation.name.as_deref().unwrap_or(&relation.predicate);
            let mut line = format!("  {} -> {}  via {}", relation.source, relation.target, predicate);
            if relation.predicate_count > 1 {
                line.push_str(&format!("  (+{} more)", relation.predicate_count - 1));
            }
            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    // Failed queries
    if !data.failures.is_empty() {
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        report.push_str("FAILED QUERIES\n");
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for (idx, failure) in data.failures.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, failure.message));
            report.push_str(&format!("Query:        {}\n\n", truncate(&failure.query, 120)));
        }
    }

    // Footer
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                          End of Report\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("\nGenerated by ontosight - incremental schema extraction for SPARQL endpoints\n\n");

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "ontosight",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "session": {
                "endpoint": data.endpoint,
                "duration_seconds": data.duration_seconds
            },
            "summary": {
                "classes": data.classes.len(),
                "value_types": data.datatype_count,
                "relations": data.relations.len(),
                "queries": {
                    "total": data.request_stats.total,
                    "successful": data.request_stats.successful,
                    "failed": data.request_stats.failed
                }
            },
            "classes": data.classes,
            "relations": data.relations,
            "failures": data.failures
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < max)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(max);
        format!("{}...", &text[..cut])
    }
}
