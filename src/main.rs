use anyhow::Result;
use portal_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    portal_core::init()?;

    let (config, validation) = Config::load_validated()?;
    tracing::info!(
        "Configuration loaded ({} warnings)",
        validation.warnings.len()
    );

    println!("SA Daily Portal {}", portal_server::VERSION);
    println!("  Listening on: http://{}", config.bind_address());
    println!("  Data directory: {}", config.storage.data_dir.display());

    portal_server::start_server(config).await
}
