//! Trace event records

use serde::{Deserialize, Serialize};

use super::clock;

/// One timestamped occurrence in the trace.
///
/// Serializes to the Chrome trace-event object layout with keys in the
/// fixed order `name, ph, ts, pid, tid`. All fields are captured when the
/// event is constructed and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    name: String,
    ph: char,
    ts: u64,
    pid: u32,
    tid: u64,
}

impl TraceEvent {
    /// Phase marking the start of a span
    pub const BEGIN: char = 'B';
    /// Phase marking the end of a span
    pub const END: char = 'E';
    /// Phase for a point-in-time marker
    pub const INSTANT: char = 'I';

    /// Create an event stamped with the current time, process and thread.
    ///
    /// The phase is not validated; any character is recorded as given.
    pub fn new(name: impl Into<String>, phase: char) -> Self {
        Self {
            name: name.into(),
            ph: phase,
            ts: clock::now_us(),
            pid: clock::process_id(),
            tid: clock::thread_id(),
        }
    }

    /// Create a begin event
    pub fn begin(name: impl Into<String>) -> Self {
        Self::new(name, Self::BEGIN)
    }

    /// Create an end event
    pub fn end(name: impl Into<String>) -> Self {
        Self::new(name, Self::END)
    }

    /// Create an instant event
    pub fn instant(name: impl Into<String>) -> Self {
        Self::new(name, Self::INSTANT)
    }

    /// Display label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase character
    pub fn phase(&self) -> char {
        self.ph
    }

    /// Timestamp in microseconds
    pub fn timestamp_us(&self) -> u64 {
        self.ts
    }

    /// Owning process id
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Producing thread id
    pub fn tid(&self) -> u64 {
        self.tid
    }

    /// Serialize to a single-line JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_event_captures_identity() {
        let event = TraceEvent::new("load", 'B');
        assert_eq!(event.name(), "load");
        assert_eq!(event.phase(), 'B');
        assert_eq!(event.pid(), std::process::id());
        assert_eq!(event.tid(), clock::thread_id());
        assert!(event.timestamp_us() > 0);
    }

    #[test]
    fn test_helpers_set_phase() {
        assert_eq!(TraceEvent::begin("x").phase(), 'B');
        assert_eq!(TraceEvent::end("x").phase(), 'E');
        assert_eq!(TraceEvent::instant("x").phase(), 'I');
    }

    #[test]
    fn test_any_phase_passes_through() {
        let event = TraceEvent::new("counter", 'C');
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["ph"], "C");
    }

    #[test]
    fn test_key_order() {
        let event = TraceEvent::new("step", 'I');
        let json = event.to_json().unwrap();
        let expected_prefix = "{\"name\":\"step\",\"ph\":\"I\",\"ts\":";
        assert!(json.starts_with(expected_prefix), "unexpected layout: {}", json);

        let positions: Vec<usize> = ["\"name\"", "\"ph\"", "\"ts\"", "\"pid\"", "\"tid\""]
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_numeric_fields_are_integers() {
        let event = TraceEvent::begin("numbers");
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["ts"].as_u64(), Some(event.timestamp_us()));
        assert_eq!(json["pid"].as_u64(), Some(event.pid() as u64));
        assert_eq!(json["tid"].as_u64(), Some(event.tid()));
    }

    #[test]
    fn test_name_is_escaped() {
        let name = "say \"hi\"\n\tand \\ leave\u{1}";
        let event = TraceEvent::instant(name);
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], name);
    }

    #[test]
    fn test_empty_name_accepted() {
        let event = TraceEvent::instant("");
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "");
    }

    #[test]
    fn test_timestamps_monotonic() {
        let first = TraceEvent::begin("a");
        let second = TraceEvent::end("a");
        assert!(second.timestamp_us() >= first.timestamp_us());
    }

    #[test]
    fn test_deserialize_written_event() {
        let event = TraceEvent::begin("parse");
        let parsed: TraceEvent = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed, event);
    }
}
