use clap::Parser;
use launchpad::cli::{self, Args};
use launchpad::core::{ConfigLoader, ConsoleReporter, Reporter};
use launchpad::logging;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config_path = ConfigLoader::default_path();
    let logging_guard = match logging::init(config_path.as_deref(), args.verbose) {
        Ok(guard) => {
            tracing::debug!(
                log_file = %guard.log_file_path().display(),
                console = %guard.console_output(),
                "logging initialized"
            );
            Some(guard)
        }
        Err(err) => {
            eprintln!("Warning: logging disabled: {:#}", err);
            None
        }
    };

    if let Err(err) = cli::run(args).await {
        tracing::debug!(code = %err.code, category = %err.category, "command failed: {}", err.message);
        if !err.reported {
            ConsoleReporter::new().report_error(&err);
        }
        drop(logging_guard);
        std::process::exit(1);
    }
}
