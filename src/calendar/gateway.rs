use crate::calendar::models::CanonicalEvent;
use crate::error::{google_calendar_error, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;
use url::Url;

/// Destination for canonical events. The production implementation talks to
/// the Google Calendar API; tests substitute a recording mock.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Persist one event, returning a link to the created remote copy
    async fn insert(&self, event: &CanonicalEvent) -> AppResult<String>;
}

/// Google Calendar events.insert client
pub struct CalendarGateway {
    client: Client,
    calendar_id: String,
    access_token: String,
}

impl CalendarGateway {
    pub fn new(client: Client, calendar_id: String, access_token: String) -> Self {
        Self {
            client,
            calendar_id,
            access_token,
        }
    }

    fn events_url(&self) -> AppResult<Url> {
        let url_str = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            self.calendar_id
        );
        Url::parse(&url_str)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))
    }
}

#[async_trait]
impl EventSink for CalendarGateway {
    async fn insert(&self, event: &CanonicalEvent) -> AppResult<String> {
        let url = self.events_url()?;

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(event)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to create event: HTTP {} - {}",
                status, error_body
            )));
        }

        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse create response: {}", e)))?;

        Ok(created_event_link(&created))
    }
}

/// Prefer the htmlLink of the created event; when the response lacks one,
/// fall back to the event id so the operator can still locate the event
fn created_event_link(created: &serde_json::Value) -> String {
    if let Some(link) = created.get("htmlLink").and_then(|l| l.as_str()) {
        return link.to_string();
    }

    let id = created
        .get("id")
        .and_then(|i| i.as_str())
        .unwrap_or("unknown");
    warn!("Create response missing htmlLink, event id: {}", id);
    format!("event id {}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_link_taken_from_response() {
        let created = json!({
            "id": "abc123",
            "htmlLink": "https://www.google.com/calendar/event?eid=abc123"
        });
        assert_eq!(
            created_event_link(&created),
            "https://www.google.com/calendar/event?eid=abc123"
        );
    }

    #[test]
    fn test_missing_link_falls_back_to_event_id() {
        let created = json!({ "id": "abc123" });
        assert_eq!(created_event_link(&created), "event id abc123");
    }

    #[test]
    fn test_missing_link_and_id_still_identifiable() {
        let created = json!({});
        assert_eq!(created_event_link(&created), "event id unknown");
    }
}
