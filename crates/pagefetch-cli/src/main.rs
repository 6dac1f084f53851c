use pagefetch_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; stderr if the log file is unavailable.
    logging::init();

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("pagefetch error: {:#}", err);
        std::process::exit(1);
    }
}
