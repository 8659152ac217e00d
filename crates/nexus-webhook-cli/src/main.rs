use nexus_webhook_cli::run_cli;
use tracing::error;

#[tokio::main]
async fn main() {
    // Run CLI and handle errors
    if let Err(e) = run_cli().await {
        error!(exit_code = e.exit_code(), "CLI error: {}", e);

        // Logging may not be up yet when configuration fails.
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
