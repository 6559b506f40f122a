use crate::config::{Config, ExtractorKind};
use crate::error::{extraction_error, AppResult};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Field names an extractor is expected to produce for one event block
pub const REQUIRED_FIELDS: [&str; 9] = [
    "EventDate",
    "EventTime",
    "Phone",
    "Name",
    "Address",
    "City",
    "State",
    "ZipCode",
    "Description",
];

/// Intermediate key/value extraction result, not guaranteed complete
pub type FieldMap = HashMap<String, String>;

/// One strategy for turning a raw event block into a [`FieldMap`].
///
/// Implementations must either return all nine [`REQUIRED_FIELDS`] or make the
/// shortfall visible to the caller (an error, or an empty/partial map that the
/// event builder's completeness check rejects).
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, block: &str) -> AppResult<FieldMap>;
}

/// Build the extractor selected by configuration
pub fn build_extractor(config: &Config, client: Client) -> AppResult<Box<dyn FieldExtractor>> {
    match config.extractor {
        ExtractorKind::Grammar => Ok(Box::new(GrammarExtractor::new())),
        ExtractorKind::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| crate::error::env_error("OPENAI_API_KEY"))?;
            Ok(Box::new(OpenAiExtractor::new(
                client,
                api_key,
                config.openai_model.clone(),
            )))
        }
    }
}

lazy_static! {
    /// Fixed-position grammar for a well-formed booking block: date, "Booked",
    /// optional event date, time, phone (whitespace separated), then the
    /// tab-separated bulk fields.
    static ref GRAMMAR: Regex = Regex::new(
        r"^(?P<booked_date>\d+\.\d+\.\d+)\s+Booked\s+(?:(?P<event_date>\d+\.\d+\.\d+)\s+)?(?P<time>\d{1,4}(?:[:.]\d{2})?(?i:[ap]m))\s+(?P<phone>\d{10,11})\t(?P<name>[^\t]+)\t(?P<address>[^\t]+)\t(?P<city>[^\t]+)\t(?P<state>[A-Za-z]{2})\t(?P<zip>\d+)\t(?P<description>.+)$"
    )
    .expect("invalid grammar regex");

    /// Copy/paste artifact: time suffix glued straight onto the phone number
    static ref GLUED_PHONE: Regex =
        Regex::new(r"(?i)([ap]m)(\d{10,11})").expect("invalid repair regex");
}

/// Deterministic extractor backed by a single fixed-position regex grammar.
///
/// Either the whole pattern matches and all nine fields come back, or the
/// block is rejected outright; no partial result is ever returned.
pub struct GrammarExtractor;

impl GrammarExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrammarExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FieldExtractor for GrammarExtractor {
    async fn extract(&self, block: &str) -> AppResult<FieldMap> {
        // Repair "1pm15104144644" into "1pm 15104144644" before matching
        let repaired = GLUED_PHONE.replace(block, "${1} ${2}");

        let caps = GRAMMAR
            .captures(repaired.trim())
            .ok_or_else(|| extraction_error("malformed block, grammar did not match"))?;

        // The second date, when present, is the actual event date; otherwise
        // the anchor date doubles as it.
        let event_date = caps
            .name("event_date")
            .or_else(|| caps.name("booked_date"))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let mut fields = FieldMap::new();
        fields.insert("EventDate".to_string(), event_date);
        fields.insert("EventTime".to_string(), caps["time"].to_string());
        fields.insert("Phone".to_string(), caps["phone"].to_string());
        fields.insert("Name".to_string(), caps["name"].trim().to_string());
        fields.insert("Address".to_string(), caps["address"].trim().to_string());
        fields.insert("City".to_string(), caps["city"].trim().to_string());
        fields.insert("State".to_string(), caps["state"].to_string());
        fields.insert("ZipCode".to_string(), caps["zip"].to_string());
        fields.insert(
            "Description".to_string(),
            caps["description"].trim().to_string(),
        );

        Ok(fields)
    }
}

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts structured event details from text.";

const USER_PROMPT_TEMPLATE: &str = "Extract the following details from this text: {block}
Provide the extracted details in the following format:
EventDate: <event_date>
EventTime: <event_time>
Phone: <phone>
Name: <name>
Address: <address>
City: <city>
State: <state>
ZipCode: <zip_code>
Description: <description>
Example:
EventDate: 6.4.24
EventTime: 1pm
Phone: 15104144644
Name: John Hornung
Address: 2835 Buena Vista Way
City: Berkeley
State: CA
ZipCode: 94708
Description: Renovation project to install or replace an asphalt shingle roof.";

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// How a collaborator HTTP status is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyDisposition {
    /// Success, parse the reply body
    Use,
    /// Rate limit or rejected request: report an empty extraction, never an error
    Degrade,
    /// Anything else is a hard extractor failure
    Fail,
}

fn classify_status(status: reqwest::StatusCode) -> ReplyDisposition {
    if status.is_success() {
        ReplyDisposition::Use
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::BAD_REQUEST
    {
        ReplyDisposition::Degrade
    } else {
        ReplyDisposition::Fail
    }
}

/// Delegated extractor: sends the raw block to the OpenAI chat API and parses
/// its `Key: value` reply lines into a [`FieldMap`].
pub struct OpenAiExtractor {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiExtractor {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self::with_endpoint(client, api_key, model, OPENAI_ENDPOINT.to_string())
    }

    /// Point the extractor at a different completion endpoint, used by tests
    pub fn with_endpoint(client: Client, api_key: String, model: String, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            model,
            endpoint,
        }
    }
}

#[async_trait]
impl FieldExtractor for OpenAiExtractor {
    async fn extract(&self, block: &str) -> AppResult<FieldMap> {
        let user_prompt = USER_PROMPT_TEMPLATE.replace("{block}", block);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": user_prompt }
                ],
                "temperature": 0.2
            }))
            .send()
            .await
            .map_err(|e| extraction_error(&format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        match classify_status(status) {
            ReplyDisposition::Degrade => {
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "OpenAI declined the request (HTTP {}), returning empty extraction: {}",
                    status, body
                );
                return Ok(FieldMap::new());
            }
            ReplyDisposition::Fail => {
                let body = response.text().await.unwrap_or_default();
                return Err(extraction_error(&format!(
                    "OpenAI API error: HTTP {} - {}",
                    status, body
                )));
            }
            ReplyDisposition::Use => {}
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| extraction_error(&format!("Failed to parse OpenAI response: {}", e)))?;

        let content = data
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| extraction_error("OpenAI response missing message content"))?;

        debug!("OpenAI reply:\n{}", content);

        Ok(parse_reply(content))
    }
}

/// Parse a `Key: value` reply into a field map. Lines without the `": "`
/// separator are ignored; the split happens at the first occurrence so values
/// may themselves contain colons.
fn parse_reply(reply: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    for line in reply.lines() {
        if let Some((key, value)) = line.split_once(": ") {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    fields
}
