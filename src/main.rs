use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    bookedcal::startup::init_logging()?;

    info!("Starting bookedcal");

    // Load configuration
    let config = bookedcal::startup::load_config()?;

    // Run the one-shot conversion
    bookedcal::startup::run(config).await
}
