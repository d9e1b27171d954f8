//! rax-files - Entry Point
//!
//! Loads configuration, sets up logging and runs one file operation on a
//! blocking worker under the configured deadline.

use clap::Parser;
use log::{debug, info};

use rax_files::StorageConfig;
use rax_files::commands::{Cli, Command, run};
use rax_files::error::AppError;
use rax_files::error::handlers::{error_to_exit_code, handle_error};
use rax_files::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match StorageConfig::load(cli.config.as_deref()) {
        Ok(config) => {
            setup_logging(&config.log_level);
            info!(
                "Using upload directory {}",
                config.default_upload_dir.display()
            );
            exit_code(execute(cli.command, config).await)
        }
        Err(e) => {
            setup_logging("info");
            exit_code(Err(AppError::from(e)))
        }
    };

    // A timed-out worker may still be running; exit without waiting for it.
    std::process::exit(code);
}

async fn execute(command: Command, config: StorageConfig) -> Result<(), AppError> {
    let deadline = config.operation_timeout();
    let secs = config.operation_timeout_secs;
    debug!("Running {:?} with a {}s deadline", command, secs);

    let worker = tokio::task::spawn_blocking(move || run(command, &config));

    match tokio::time::timeout(deadline, worker).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(AppError::WorkerFailed(join_error.to_string())),
        Err(_) => Err(AppError::TimedOut(secs)),
    }
}

fn exit_code(result: Result<(), AppError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            handle_error(&e);
            i32::from(error_to_exit_code(&e))
        }
    }
}
