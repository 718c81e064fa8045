use freebox_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Log file when the state dir is usable, stderr otherwise.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("freebox error: {:#}", err);
        std::process::exit(1);
    }
}
