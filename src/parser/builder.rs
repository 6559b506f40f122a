use crate::calendar::models::{
    CanonicalEvent, EventDateTime, ReminderOverride, Reminders, EVENT_DURATION_MINUTES,
    REMINDER_MINUTES, TITLE_PREFIX,
};
use crate::error::{AppResult, Error};
use crate::parser::extract::{FieldMap, REQUIRED_FIELDS};
use crate::parser::time::normalize_time;
use chrono::{Duration, NaiveDateTime};

/// Validate an extracted field map and assemble the canonical event.
///
/// Fails with `IncompleteFields` when any of the nine required keys is absent
/// and with `InvalidDateTime` when the date/time pair parses under neither the
/// minute-precision nor the hour-only format. The caller skips the block on
/// either failure and carries on with the rest of the batch.
pub fn build_event(fields: &FieldMap, timezone: &str) -> AppResult<CanonicalEvent> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(Error::IncompleteFields(missing.join(", ")));
    }

    let time = normalize_time(&fields["EventTime"]).to_uppercase();
    let datetime_str = format!("{} {}", fields["EventDate"], time);

    let start = NaiveDateTime::parse_from_str(&datetime_str, "%m.%d.%y %I:%M%p")
        .or_else(|_| NaiveDateTime::parse_from_str(&datetime_str, "%m.%d.%y %I%p"))
        .map_err(|_| Error::InvalidDateTime(datetime_str.clone()))?;
    let end = start + Duration::minutes(EVENT_DURATION_MINUTES);

    Ok(CanonicalEvent {
        summary: format!("{} {} {}", TITLE_PREFIX, fields["Phone"], fields["Name"]),
        location: format!(
            "{}, {}, {} {}",
            fields["Address"], fields["City"], fields["State"], fields["ZipCode"]
        ),
        description: fields["Description"].clone(),
        start: EventDateTime {
            date_time: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: timezone.to_string(),
        },
        end: EventDateTime {
            date_time: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: timezone.to_string(),
        },
        reminders: Reminders {
            use_default: false,
            overrides: vec![ReminderOverride {
                method: "popup".to_string(),
                minutes: REMINDER_MINUTES,
            }],
        },
    })
}
