//! Provider-neutral event types.
//!
//! Source events are owned by the calendar provider; the engine only reads
//! them. Mirrored events are owned by the engine once created. The only
//! fields that ever cross from a source event to the mirror calendar are
//! the ones `MirrorFields::from_source` copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an event blocks time on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Busy,
    Free,
    Tentative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// An event read from a source calendar.
///
/// `id` is opaque and unique within its source calendar. The time range is
/// half-open: `start <= t < end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub availability: Availability,
    pub status: EventStatus,
}

/// The field subset written to the mirror calendar for one source event.
///
/// Constructed only through [`MirrorFields::from_source`], which keeps the
/// mirror opaque: the title is a fixed marker and the source summary,
/// location, attendees and any other identifying fields are never copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorFields {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub availability: Availability,
    pub status: EventStatus,
}

impl MirrorFields {
    pub fn from_source(event: &SourceEvent, title: &str) -> Self {
        MirrorFields {
            title: title.to_string(),
            start: event.start,
            end: event.end,
            all_day: event.all_day,
            availability: event.availability,
            status: event.status,
        }
    }
}

/// An event living on the mirror calendar, identified by the id the
/// provider assigned at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirroredEvent {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mirror_fields_never_carry_the_source_summary() {
        let event = SourceEvent {
            id: "evt-1".to_string(),
            calendar_id: "work".to_string(),
            summary: "1:1 with legal".to_string(),
            start: Utc.with_ymd_and_hms(2026, 3, 20, 15, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 20, 16, 0, 0).unwrap(),
            all_day: false,
            availability: Availability::Busy,
            status: EventStatus::Confirmed,
        };

        let fields = MirrorFields::from_source(&event, "Booked");

        assert_eq!(fields.title, "Booked");
        assert_ne!(fields.title, event.summary);
        assert_eq!(fields.start, event.start);
        assert_eq!(fields.end, event.end);
        assert_eq!(fields.availability, Availability::Busy);
        assert_eq!(fields.status, EventStatus::Confirmed);
    }
}
