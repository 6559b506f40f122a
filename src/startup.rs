use crate::calendar::gateway::{CalendarGateway, EventSink};
use crate::calendar::token::TokenStore;
use crate::config::Config;
use crate::error::{AppResult, Error};
use crate::input::{InputProvider, StdinInput};
use crate::parser::builder::build_event;
use crate::parser::extract::{build_extractor, FieldExtractor};
use crate::parser::splitter::split_blocks;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// One-shot run: authenticate, read the pasted text, and create one calendar
/// event per well-formed block. Only authentication may abort the run; every
/// per-block failure is logged and skipped.
pub async fn run(config: Config) -> miette::Result<()> {
    let client = reqwest::Client::new();

    let tokens = TokenStore::new(&config, client.clone());
    let access_token = tokens.access_token().await?;

    let gateway = CalendarGateway::new(
        client.clone(),
        config.google_calendar_id.clone(),
        access_token,
    );
    let extractor = build_extractor(&config, client)?;

    println!("Enter the event details as copied from WhatsApp:");
    let input = StdinInput.read_input()?;

    let created = process_input(&input, extractor.as_ref(), &gateway, &config.timezone).await;
    info!("Done, {} event(s) created", created);

    Ok(())
}

/// Split the raw input and process every block to completion, in input order.
/// Returns the number of events actually created.
pub async fn process_input(
    input: &str,
    extractor: &dyn FieldExtractor,
    sink: &dyn EventSink,
    timezone: &str,
) -> usize {
    let blocks = split_blocks(input);
    info!("Found {} event block(s)", blocks.len());

    let mut created = 0;
    for block in &blocks {
        match process_block(block, extractor, sink, timezone).await {
            Ok(link) => {
                created += 1;
                info!("Event created: {}", link);
            }
            Err(e) => warn!("Skipping block '{}': {}", preview(block), e),
        }
    }

    created
}

async fn process_block(
    block: &str,
    extractor: &dyn FieldExtractor,
    sink: &dyn EventSink,
    timezone: &str,
) -> AppResult<String> {
    let fields = extractor.extract(block).await?;
    let event = build_event(&fields, timezone)?;
    sink.insert(&event).await
}

/// Shorten a block for log output
fn preview(block: &str) -> String {
    const MAX: usize = 60;
    if block.chars().count() <= MAX {
        block.to_string()
    } else {
        let head: String = block.chars().take(MAX).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_block_unchanged() {
        assert_eq!(preview("6.4.24 Booked 1pm"), "6.4.24 Booked 1pm");
    }

    #[test]
    fn test_preview_long_block_truncated() {
        let long = "x".repeat(200);
        let shown = preview(&long);
        assert!(shown.len() < long.len());
        assert!(shown.ends_with("..."));
    }
}
