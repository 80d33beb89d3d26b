//! On-disk encoding of events and ring positions.
//!
//! Each slot holds one JSON record followed by a newline:
//!
//! ```text
//! {"time":"2024-05-01T12:00:00Z","container":"example.org/app","type":"issue","payload":{...}}
//! ```
//!
//! The actor is not stored; it is implied by the directory the record lives
//! in and is supplied again by the caller on decode.

use crate::event::{
    Change, ChangeComment, CommitComment, Create, Delete, Event, Fork, Issue, IssueComment,
    Payload, Push, Star, User, Wiki,
};
use crate::ring::Ring;
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
struct EventRecordRef<'a> {
    time: &'a DateTime<FixedOffset>,
    container: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    payload: Value,
}

#[derive(Deserialize)]
struct EventRecord {
    #[serde(default = "epoch")]
    time: DateTime<FixedOffset>,
    #[serde(default)]
    container: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    payload: Value,
}

fn epoch() -> DateTime<FixedOffset> {
    DateTime::<Utc>::default().fixed_offset()
}

/// Persisted form of a [`Ring`]. The capacity is not stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingRecord {
    pub start: usize,
    pub length: usize,
}

impl<const N: usize> From<Ring<N>> for RingRecord {
    fn from(ring: Ring<N>) -> Self {
        RingRecord {
            start: ring.start(),
            length: ring.len(),
        }
    }
}

/// Serialize an event for storage in a slot, dropping the actor.
pub fn encode_event(event: &Event) -> serde_json::Result<Vec<u8>> {
    let (kind, payload) = match &event.payload {
        Some(payload) => (payload.tag(), encode_payload(payload)?),
        None => ("", Value::Null),
    };
    let record = EventRecordRef {
        time: &event.time,
        container: &event.container,
        kind,
        payload,
    };
    let mut buf = serde_json::to_vec(&record)?;
    buf.push(b'\n');
    Ok(buf)
}

fn encode_payload(payload: &Payload) -> serde_json::Result<Value> {
    match payload {
        Payload::Issue(p) => serde_json::to_value(p),
        Payload::Change(p) => serde_json::to_value(p),
        Payload::IssueComment(p) => serde_json::to_value(p),
        Payload::ChangeComment(p) => serde_json::to_value(p),
        Payload::CommitComment(p) => serde_json::to_value(p),
        Payload::Push(p) => serde_json::to_value(p),
        Payload::Star(p) => serde_json::to_value(p),
        Payload::Create(p) => serde_json::to_value(p),
        Payload::Fork(p) => serde_json::to_value(p),
        Payload::Delete(p) => serde_json::to_value(p),
        Payload::Wiki(p) => serde_json::to_value(p),
    }
}

/// Parse a slot record, attributing it to `actor`.
///
/// Empty input and a bare `null` yield the zero-value event. A record whose
/// `type` is not recognized decodes with no payload instead of failing.
pub fn decode_event(bytes: &[u8], actor: &User) -> serde_json::Result<Event> {
    if is_blank(bytes) {
        return Ok(Event {
            actor: actor.clone(),
            ..Event::default()
        });
    }
    let record: Option<EventRecord> = serde_json::from_slice(bytes)?;
    let Some(record) = record else {
        return Ok(Event {
            actor: actor.clone(),
            ..Event::default()
        });
    };
    Ok(Event {
        time: record.time,
        actor: actor.clone(),
        container: record.container,
        payload: decode_payload(&record.kind, record.payload)?,
    })
}

fn decode_payload(kind: &str, payload: Value) -> serde_json::Result<Option<Payload>> {
    let payload = match kind {
        "issue" => Payload::Issue(from_value::<Issue>(payload)?),
        "change" => Payload::Change(from_value::<Change>(payload)?),
        "issueComment" => Payload::IssueComment(from_value::<IssueComment>(payload)?),
        "changeComment" => Payload::ChangeComment(from_value::<ChangeComment>(payload)?),
        "commitComment" => Payload::CommitComment(from_value::<CommitComment>(payload)?),
        "push" => Payload::Push(from_value::<Push>(payload)?),
        "star" => Payload::Star(Star {}),
        "create" => Payload::Create(from_value::<Create>(payload)?),
        "fork" => Payload::Fork(from_value::<Fork>(payload)?),
        "delete" => Payload::Delete(from_value::<Delete>(payload)?),
        "wiki" => Payload::Wiki(from_value::<Wiki>(payload)?),
        "" => return Ok(None),
        other => {
            log::warn!("activity-ring: unknown event type {other:?}, dropping payload");
            return Ok(None);
        }
    };
    Ok(Some(payload))
}

// A missing payload object decodes like an empty one.
fn from_value<T: DeserializeOwned>(payload: Value) -> serde_json::Result<T> {
    match payload {
        Value::Null => serde_json::from_value(Value::Object(Default::default())),
        other => serde_json::from_value(other),
    }
}

/// Serialize a ring position.
pub fn encode_ring<const N: usize>(ring: Ring<N>) -> serde_json::Result<Vec<u8>> {
    let mut buf = serde_json::to_vec(&RingRecord::from(ring))?;
    buf.push(b'\n');
    Ok(buf)
}

/// Parse a ring position. A literal `null` yields the empty ring; empty
/// input is a truncated record and fails.
///
/// Range checking against a capacity is left to the caller, see
/// [`Ring::from_parts`].
pub fn decode_ring(bytes: &[u8]) -> serde_json::Result<RingRecord> {
    let record: Option<RingRecord> = serde_json::from_slice(bytes)?;
    Ok(record.unwrap_or_default())
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}
