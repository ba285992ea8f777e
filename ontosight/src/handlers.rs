use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ontosight_core::{
    gather_report_data, generate_json_report, generate_text_report, run_extraction, save_report,
    ExtractionOptions, ExtractionResult, ReportFormat,
};
use ontosight_extractor::{
    queries, EventBus, ExtractError, GraphEvent, NodeKind, RequestConfig, RequestStats,
    SparqlClient, StatsCallback, StatsSnapshot, PLACEHOLDER_PROP_URI,
};
use ontosight_tui::{create_monitor_channel, run_monitor, ExtractMessage, LogLevel};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Initialize tracing for logging. `RUST_LOG` wins over the verbose flag.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn resolve_report_format(raw: &str) -> ReportFormat {
    ReportFormat::from_str(raw).unwrap_or(ReportFormat::Text)
}

pub fn options_from_matches(sub_matches: &ArgMatches) -> ExtractionOptions {
    let endpoint = sub_matches.get_one::<Url>("endpoint").unwrap().clone();
    let mut options = ExtractionOptions::new(endpoint);
    options.limit = *sub_matches.get_one::<usize>("limit").unwrap_or(&10);
    options.label_lang = sub_matches
        .get_one::<String>("lang")
        .cloned()
        .unwrap_or_else(|| "en".to_string());
    options.query_delay =
        Duration::from_millis(*sub_matches.get_one::<u64>("delay").unwrap_or(&100));
    options.concurrency = *sub_matches.get_one::<usize>("concurrency").unwrap_or(&1);
    options
}

pub async fn handle_extract(sub_matches: &ArgMatches, verbose: bool) {
    let options = options_from_matches(sub_matches);
    let format = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let output = sub_matches.get_one::<PathBuf>("output").cloned();

    let outcome = if sub_matches.get_flag("monitor") {
        // The monitor owns the terminal, so tracing output stays off here.
        run_monitored_extraction(options).await
    } else {
        init_tracing(verbose);
        run_extraction_with_spinner(options).await
    };

    match outcome {
        Ok(result) => {
            print_summary(&result);
            write_report(&result, resolve_report_format(format), output.as_deref());
        }
        Err(error) => {
            eprintln!("{} Extraction failed: {}", "✗".red().bold(), error);
            std::process::exit(1);
        }
    }
}

/// Run the extraction behind the live TUI monitor. Graph and stats changes
/// are forwarded over a channel; the monitor thread owns the terminal until
/// the user quits.
async fn run_monitored_extraction(
    options: ExtractionOptions,
) -> Result<ExtractionResult, ExtractError> {
    let events = Arc::new(EventBus::new());
    let (tx, rx) = create_monitor_channel();
    let _ = tx.send(ExtractMessage::SessionStarted {
        endpoint: options.endpoint.to_string(),
    });

    // Diff each snapshot against what the monitor has already been told.
    // Node names are remembered so relation rows can show labels instead of ids.
    let announced: Arc<StdMutex<(HashMap<String, String>, HashSet<String>, HashSet<String>)>> =
        Arc::new(StdMutex::new((HashMap::new(), HashSet::new(), HashSet::new())));

    let tx_events = tx.clone();
    let announced_clone = announced.clone();
    events.subscribe(Arc::new(move |event: &GraphEvent| {
        let mut state = announced_clone.lock().unwrap();
        let (ref mut names, ref mut classes_seen, ref mut relations_seen) = *state;
        match event {
            GraphEvent::NodesChanged(nodes) => {
                for node in nodes.values() {
                    names.insert(node.id.clone(), node.name.clone());
                    if node.kind == NodeKind::Class && classes_seen.insert(node.id.clone()) {
                        let _ = tx_events.send(ExtractMessage::ClassFound {
                            name: node.name.clone(),
                            uri: node.uri.clone(),
                            instance_count: node.instance_count,
                        });
                    }
                }
            }
            GraphEvent::PropertiesChanged(edges) => {
                for edge in edges {
                    if edge.uri == PLACEHOLDER_PROP_URI {
                        continue;
                    }
                    let key = format!("{} {} {}", edge.source, edge.uri, edge.target);
                    if !relations_seen.insert(key) {
                        continue;
                    }
                    let display =
                        |id: &str| names.get(id).cloned().unwrap_or_else(|| id.to_string());
                    let _ = tx_events.send(ExtractMessage::RelationFound {
                        source: display(&edge.source),
                        predicate: edge.name.clone().unwrap_or_else(|| edge.uri.clone()),
                        target: display(&edge.target),
                    });
                }
            }
            GraphEvent::ExtractionLog(message) => {
                let _ = tx_events.send(ExtractMessage::Log {
                    level: LogLevel::Info,
                    message: message.clone(),
                });
            }
            GraphEvent::ExtractionComplete(_) => {}
        }
    }));

    let stats_tx = tx.clone();
    let stats_callback: StatsCallback = Arc::new(move |snapshot: StatsSnapshot| {
        let _ = stats_tx.send(ExtractMessage::Stats {
            pending: snapshot.pending,
            successful: snapshot.successful,
            failed: snapshot.failed,
        });
    });

    let monitor_handle = std::thread::spawn({
        let should_exit = Arc::new(AtomicBool::new(false));
        move || run_monitor(rx, should_exit)
    });

    let outcome = run_extraction(options, events, Some(stats_callback)).await;
    match &outcome {
        Ok(result) => {
            let _ = tx.send(ExtractMessage::Complete {
                classes: result.class_ids.len(),
                relations: result.properties.len(),
            });
        }
        Err(error) => {
            let _ = tx.send(ExtractMessage::Log {
                level: LogLevel::Error,
                message: format!("Extraction failed: {}", error),
            });
        }
    }

    // The monitor keeps running until the user quits, so the final state
    // stays on screen.
    match monitor_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(error)) => eprintln!("Monitor error: {}", error),
        Err(_) => eprintln!("Monitor thread panicked"),
    }

    outcome
}

async fn run_extraction_with_spinner(
    options: ExtractionOptions,
) -> Result<ExtractionResult, ExtractError> {
    let endpoint = options.endpoint.to_string();
    let events = Arc::new(EventBus::new());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Extracting schema from {}", endpoint));

    let spinner_events = spinner.clone();
    events.subscribe(Arc::new(move |event: &GraphEvent| {
        if let GraphEvent::ExtractionLog(message) = event {
            spinner_events.println(format!("{} {}", "→".blue(), message));
        }
    }));

    let spinner_stats = spinner.clone();
    let stats_callback: StatsCallback = Arc::new(move |snapshot: StatsSnapshot| {
        spinner_stats.set_message(format!(
            "{} queries completed, {} pending, {} failed",
            snapshot.successful, snapshot.pending, snapshot.failed
        ));
    });

    let outcome = run_extraction(options, events, Some(stats_callback)).await;
    spinner.finish_and_clear();
    outcome
}

fn print_summary(result: &ExtractionResult) {
    let classes = result
        .nodes
        .values()
        .filter(|node| node.kind == NodeKind::Class)
        .count();
    let datatypes = result
        .nodes
        .values()
        .filter(|node| node.kind == NodeKind::Type)
        .count();

    println!("\n{}", "✓ Extraction complete!".green().bold());
    println!(
        "{} Classes:     {}",
        "→".blue(),
        classes.to_string().bright_white()
    );
    println!(
        "{} Value types: {}",
        "→".blue(),
        datatypes.to_string().bright_white()
    );
    println!(
        "{} Relations:   {}",
        "→".blue(),
        result.properties.len().to_string().bright_white()
    );
    println!(
        "{} Queries:     {} completed, {} failed",
        "→".blue(),
        result.stats.successful.to_string().bright_white(),
        result.stats.failed.to_string().bright_white()
    );
    println!(
        "{} Duration:    {}",
        "→".blue(),
        format!("{:.1}s", result.duration.as_secs_f64()).bright_white()
    );
    println!();
}

fn write_report(result: &ExtractionResult, format: ReportFormat, output: Option<&Path>) {
    let data = gather_report_data(result);
    let content = match format {
        ReportFormat::Text => generate_text_report(&data),
        ReportFormat::Json => match generate_json_report(&data) {
            Ok(content) => content,
            Err(error) => {
                eprintln!("{} Failed to render JSON report: {}", "✗".red().bold(), error);
                std::process::exit(1);
            }
        },
    };

    match output {
        Some(path) => match save_report(&content, path) {
            Ok(()) => println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
            Err(error) => {
                eprintln!(
                    "{} Failed to save report to {}: {}",
                    "✗".red().bold(),
                    path.display(),
                    error
                );
                std::process::exit(1);
            }
        },
        None => print!("{}", content),
    }
}

pub async fn handle_probe(sub_matches: &ArgMatches) {
    let endpoint = sub_matches.get_one::<Url>("endpoint").unwrap().clone();
    let config = RequestConfig::new(endpoint.clone()).into_shared();
    let stats = Arc::new(RequestStats::new());

    let client = match SparqlClient::new(config, stats) {
        Ok(client) => client,
        Err(error) => {
            eprintln!("{} Could not build the client: {}", "✗".red().bold(), error);
            std::process::exit(1);
        }
    };

    println!(
        "{} Probing {}",
        "→".blue(),
        endpoint.to_string().bright_white()
    );
    match client.query(&queries::class_query(1, 0)).await {
        Ok(_) => {
            println!(
                "{} {} is reachable and answers SELECT queries",
                "✓".green().bold(),
                endpoint.to_string().bright_white()
            );
        }
        Err(error) => {
            eprintln!(
                "{} {} is not usable: {}",
                "✗".red().bold(),
                endpoint,
                error
            );
            std::process::exit(1);
        }
    }
}

pub fn handle_queries() {
    let class = "http://example.org/Person";
    let target = "http://example.org/Organization";
    let datatype = "http://www.w3.org/2001/XMLSchema#string";

    let samples = [
        ("Class discovery", queries::class_query(10, 0)),
        ("Label lookup", queries::label_query(class, "en")),
        (
            "Preferred label fallback",
            queries::preferred_label_query(class, "en"),
        ),
        ("Comment lookup", queries::comment_query(class)),
        (
            "Referring value types",
            queries::referring_types_query(class, 5),
        ),
        (
            "Class-to-class relations",
            queries::unordered_class_class_relation_query(class, target, 10, 0),
        ),
        (
            "Class-to-class relations (ranked)",
            queries::ordered_class_class_relation_query(class, target, 10, 0),
        ),
        (
            "Class-to-type relations",
            queries::unordered_class_type_relation_query(class, datatype, 10, 0),
        ),
        (
            "Class-to-type relations (ranked)",
            queries::ordered_class_type_relation_query(class, datatype, 10, 0),
        ),
        (
            "Instance overlap",
            queries::common_instances_query(class, target),
        ),
    ];

    println!(
        "{}",
        "SPARQL queries used during extraction".bright_white().bold()
    );
    println!("Shown with example URIs; placeholders are filled in at run time.\n");
    for (title, query) in samples {
        println!("{}", title.bright_cyan().bold());
        println!("{}\n", query);
    }
}
