//! In-memory representation of a clang `-ftime-trace` document.
//!
//! Traces are stored in the Chrome tracing JSON format; we are only concerned with a small
//! subset of it (see spec §6). `Event`/`Trace` mirror the original's `cbp::trace::event`/
//! `cbp::trace::trace` structs, renaming the wire's short field names to readable ones the way
//! `ingredient-parser`'s own serde forms rename fields for ergonomics.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::time::Microseconds;

/// The phase of a trace event, decoded from the single-character `ph` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Begin,
    End,
    Complete,
}

impl Phase {
    fn from_char(c: char) -> Result<Phase> {
        match c {
            'b' | 'B' => Ok(Phase::Begin),
            'e' | 'E' => Ok(Phase::End),
            'X' => Ok(Phase::Complete),
            other => Err(Error::SchemaMismatch {
                message: format!("unknown event phase '{other}'"),
            }),
        }
    }
}

/// A single record from a trace.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub phase: Phase,
    pub thread: u64,
    pub time: Microseconds,
    pub duration: Option<Microseconds>,
    pub args: HashMap<String, Value>,
}

impl Event {
    /// The `args.detail` string used as the node name for parse/instantiate events.
    pub fn detail(&self) -> Result<&str> {
        self.args
            .get("detail")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::SchemaMismatch {
                message: format!("event {:?} is missing string 'args.detail'", self.name),
            })
    }

    /// `duration`, required for complete events; a schema-mismatch error if absent.
    pub fn required_duration(&self) -> Result<Microseconds> {
        self.duration.ok_or_else(|| Error::SchemaMismatch {
            message: format!("complete event {:?} is missing 'dur'", self.name),
        })
    }

    /// End time of a complete event (`time + duration`).
    pub fn end_time(&self) -> Result<Microseconds> {
        Ok(self.time + self.required_duration()?)
    }
}

/// Chronological ordering: earlier `time` first, stable among ties (callers must use a stable
/// sort — `Ord`/`Eq` alone can't express tie-breaking by insertion order).
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}
impl Eq for Event {}
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time)
    }
}

/// Wire-format mirror of [`Event`], deserialized directly from the Chrome tracing JSON shape.
#[derive(Debug, Deserialize)]
struct WireEvent {
    name: String,
    ph: String,
    #[serde(default)]
    tid: u64,
    ts: i64,
    #[serde(default)]
    dur: Option<i64>,
    #[serde(default)]
    args: HashMap<String, Value>,
}

impl TryFrom<WireEvent> for Event {
    type Error = Error;

    fn try_from(wire: WireEvent) -> Result<Event> {
        let phase_char = wire.ph.chars().next().ok_or_else(|| Error::SchemaMismatch {
            message: format!("event {:?} has an empty 'ph' field", wire.name),
        })?;
        let phase = Phase::from_char(phase_char)?;

        if phase == Phase::Complete && wire.dur.is_none() {
            return Err(Error::SchemaMismatch {
                message: format!("complete event {:?} is missing 'dur'", wire.name),
            });
        }

        Ok(Event {
            name: wire.name,
            phase,
            thread: wire.tid,
            time: Microseconds::new(wire.ts),
            duration: wire.dur.map(Microseconds::new),
            args: wire.args,
        })
    }
}

/// Wire-format mirror of the top-level trace document.
#[derive(Debug, Default, Deserialize)]
struct WireTrace {
    #[serde(rename = "traceEvents", default)]
    trace_events: Option<Vec<WireEvent>>,
    #[serde(rename = "beginningOfTime", default)]
    #[allow(dead_code)]
    beginning_of_time: Option<i64>,
}

/// Decodes a trace document into its event sequence. Fails with [`Error::MalformedTrace`] if the
/// top-level shape is absent, per spec §4.1. Unknown keys are ignored.
pub fn decode(input: &str) -> Result<Vec<Event>> {
    let wire: WireTrace = serde_json::from_str(input).map_err(|e| Error::MalformedTrace {
        message: e.to_string(),
    })?;

    let wire_events = wire.trace_events.ok_or_else(|| Error::MalformedTrace {
        message: "trace document is missing 'traceEvents'".to_string(),
    })?;

    wire_events.into_iter().map(Event::try_from).collect()
}
