use crate::CLAP_STYLING;
use clap::{arg, command};
use ontosight_extractor::RequestConfig;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("ontosight")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("ontosight")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Enable verbose logging").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("extract")
                .about(
                    "Extract the class, relation, and value-type schema of a SPARQL endpoint \
                and produce a report.",
                )
                .arg(
                    arg!(-e --"endpoint" <URL>)
                        .required(true)
                        .help("The SPARQL endpoint to extract from")
                        .value_parser(RequestConfig::parse_endpoint),
                )
                .arg(
                    arg!(-l --"limit" <NUM>)
                        .required(false)
                        .help("The number of top classes to seed the extraction with")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"lang" <LANG>)
                        .required(false)
                        .help("Preferred language for labels")
                        .default_value("en"),
                )
                .arg(
                    arg!(--"delay" <MILLIS>)
                        .required(false)
                        .help("Delay in milliseconds before each query is dispatched")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("100"),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM>)
                        .required(false)
                        .help("Maximum number of queries in flight at once")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"monitor")
                        .required(false)
                        .help("Show a live monitor while the extraction runs")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("probe")
                .about("Check that a SPARQL endpoint is reachable and answers SELECT queries")
                .arg(
                    arg!(-e --"endpoint" <URL>)
                        .required(true)
                        .help("The SPARQL endpoint to probe")
                        .value_parser(RequestConfig::parse_endpoint),
                ),
        )
        .subcommand(
            command!("queries").about("Print the SPARQL queries used during extraction"),
        )
}
