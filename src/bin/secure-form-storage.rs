use secure_form_storage::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before any configuration or override is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    cli::run_cli().await
}
