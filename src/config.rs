use crate::error::{config_error, env_error, AppResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Default timezone attached to every created event
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Default location of the persisted OAuth token
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Which field extraction strategy to use for each event block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractorKind {
    /// Fixed-position regex grammar, format-strict
    Grammar,
    /// Delegated extraction through the OpenAI chat API
    OpenAi,
}

impl FromStr for ExtractorKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "regex" | "grammar" => Ok(ExtractorKind::Grammar),
            "openai" | "llm" => Ok(ExtractorKind::OpenAi),
            other => Err(config_error(&format!(
                "Unknown extractor strategy: {} (expected \"regex\" or \"openai\")",
                other
            ))),
        }
    }
}

/// Main configuration structure for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Google Calendar ID events are created in
    pub google_calendar_id: String,
    /// Timezone attached to created events
    pub timezone: String,
    /// Path to the persisted OAuth token file
    pub token_path: String,
    /// Field extraction strategy
    pub extractor: ExtractorKind,
    /// OpenAI API key, required only for the OpenAI strategy
    pub openai_api_key: Option<String>,
    /// OpenAI model used for delegated extraction
    pub openai_model: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;

        // Optional with defaults
        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| String::from("primary"));
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from(DEFAULT_TIMEZONE));
        let token_path = env::var("TOKEN_PATH").unwrap_or_else(|_| String::from(DEFAULT_TOKEN_PATH));

        // Validate the timezone name early so the run can fail before any network I/O
        chrono_tz::Tz::from_str(&timezone)
            .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone)))?;

        let extractor = env::var("EXTRACTOR")
            .unwrap_or_else(|_| String::from("regex"))
            .parse::<ExtractorKind>()?;

        let openai_api_key = env::var("OPENAI_API_KEY").ok();
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| String::from("gpt-4o-mini"));

        if extractor == ExtractorKind::OpenAi && openai_api_key.is_none() {
            return Err(env_error("OPENAI_API_KEY"));
        }

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            timezone,
            token_path,
            extractor,
            openai_api_key,
            openai_model,
        })
    }
}
