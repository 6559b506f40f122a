use serde::{Deserialize, Serialize};

/// Fixed prefix for every created event title
pub const TITLE_PREFIX: &str = "ros";

/// Every event is exactly one hour long
pub const EVENT_DURATION_MINUTES: i64 = 60;

/// Popup reminder fires this many minutes before the event starts
pub const REMINDER_MINUTES: u32 = 10;

/// A zone-qualified timestamp in the shape the Calendar API expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

/// Fully validated event record, ready to hand to the Calendar Gateway.
/// Serializes directly into the Google Calendar events.insert request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
}
