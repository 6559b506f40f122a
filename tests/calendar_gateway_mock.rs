use async_trait::async_trait;
use bookedcal::calendar::gateway::EventSink;
use bookedcal::calendar::models::CanonicalEvent;
use bookedcal::error::{google_calendar_error, AppResult};
use bookedcal::parser::builder::build_event;
use bookedcal::parser::extract::FieldMap;
use std::sync::Mutex;

/// Mock implementation of the calendar gateway for testing
#[derive(Debug, Default)]
pub struct MockEventSink {
    inserted: Mutex<Vec<CanonicalEvent>>,
    fail: bool,
}

impl MockEventSink {
    /// Create a mock that accepts every insert
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that rejects every insert with a gateway error
    pub fn failing() -> Self {
        Self {
            inserted: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn inserted_events(&self) -> Vec<CanonicalEvent> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for MockEventSink {
    async fn insert(&self, event: &CanonicalEvent) -> AppResult<String> {
        if self.fail {
            return Err(google_calendar_error("HTTP 503 - service unavailable"));
        }

        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(event.clone());
        Ok(format!(
            "https://www.google.com/calendar/event?eid={}",
            inserted.len()
        ))
    }
}

fn sample_fields() -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("EventDate".to_string(), "6.4.24".to_string());
    fields.insert("EventTime".to_string(), "1pm".to_string());
    fields.insert("Phone".to_string(), "15104144644".to_string());
    fields.insert("Name".to_string(), "John Hornung".to_string());
    fields.insert("Address".to_string(), "2835 Buena Vista Way".to_string());
    fields.insert("City".to_string(), "Berkeley".to_string());
    fields.insert("State".to_string(), "CA".to_string());
    fields.insert("ZipCode".to_string(), "94708".to_string());
    fields.insert("Description".to_string(), "Roof replacement".to_string());
    fields
}

/// Test that demonstrates how to use the mock
#[tokio::test]
async fn test_mock_records_inserts() {
    let sink = MockEventSink::new();
    let event = build_event(&sample_fields(), "America/Los_Angeles").unwrap();

    let link = sink.insert(&event).await.unwrap();
    assert!(link.contains("calendar/event"));

    let inserted = sink.inserted_events();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].summary, "ros 15104144644 John Hornung");
}

#[tokio::test]
async fn test_failing_mock_rejects_inserts() {
    let sink = MockEventSink::failing();
    let event = build_event(&sample_fields(), "America/Los_Angeles").unwrap();

    assert!(sink.insert(&event).await.is_err());
    assert!(sink.inserted_events().is_empty());
}
