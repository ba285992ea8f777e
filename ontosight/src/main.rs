use ontosight::commands::command_argument_builder;
use ontosight::{handle_extract, handle_probe, handle_queries, init_tracing};
use ontosight_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("extract", primary_command)) => handle_extract(primary_command, verbose).await,
        Some(("probe", primary_command)) => {
            init_tracing(verbose);
            handle_probe(primary_command).await;
        }
        Some(("queries", _)) => handle_queries(),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
