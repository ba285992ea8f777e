pub mod extract;
pub mod report;

pub use extract::{run_extraction, ExtractionOptions, ExtractionResult};
pub use report::{
    gather_report_data, generate_json_report, generate_text_report, save_report, ReportData,
    ReportFormat,
};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
             _             _       _     _
  ___  _ __ | |_ ___  ___ (_) __ _| |__ | |_
 / _ \| '_ \| __/ _ \/ __|| |/ _` | '_ \| __|
| (_) | | | | || (_) \__ \| | (_| | | | | |_
 \___/|_| |_|\__\___/|___/|_|\__, |_| |_|\__|
                             |___/
"#;
    println!("{}", banner.bright_cyan());
    println!(
        "{} {}",
        "ontosight".bright_white().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_blue()
    );
    println!("{}\n", "Incremental schema extraction for SPARQL endpoints".bright_blue());
}
