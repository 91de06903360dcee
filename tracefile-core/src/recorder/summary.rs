//! Reading finished trace files

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::event::TraceEvent;
use crate::error::Result;

/// Parse a finished trace file into its events.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened and a serialization
/// error if it is not a complete trace-event array.
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>> {
    let file = File::open(path)?;
    let events = serde_json::from_reader(BufReader::new(file))?;
    Ok(events)
}

/// Aggregate view of a trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    /// Total number of events
    pub total_events: usize,
    /// Event count per phase character
    pub phases: BTreeMap<char, usize>,
    /// Distinct thread ids
    pub threads: usize,
    /// Distinct process ids
    pub processes: usize,
    /// Earliest timestamp (µs)
    pub first_ts: Option<u64>,
    /// Latest timestamp (µs)
    pub last_ts: Option<u64>,
}

impl TraceSummary {
    /// Summarize a set of events
    pub fn from_events(events: &[TraceEvent]) -> Self {
        let mut phases = BTreeMap::new();
        let mut threads = BTreeSet::new();
        let mut processes = BTreeSet::new();

        for event in events {
            *phases.entry(event.phase()).or_insert(0) += 1;
            threads.insert((event.pid(), event.tid()));
            processes.insert(event.pid());
        }

        Self {
            total_events: events.len(),
            phases,
            threads: threads.len(),
            processes: processes.len(),
            first_ts: events.iter().map(TraceEvent::timestamp_us).min(),
            last_ts: events.iter().map(TraceEvent::timestamp_us).max(),
        }
    }

    /// Time between the first and last event in microseconds
    pub fn span_us(&self) -> u64 {
        match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    /// Number of events with the given phase
    pub fn count(&self, phase: char) -> usize {
        self.phases.get(&phase).copied().unwrap_or(0)
    }

    /// Render as human-readable text
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Events: {}", self.total_events));
        lines.push(format!("Threads: {}", self.threads));
        lines.push(format!("Processes: {}", self.processes));
        lines.push(format!("Span: {:.3}ms", self.span_us() as f64 / 1000.0));

        if !self.phases.is_empty() {
            lines.push(String::new());
            lines.push("Phases:".to_string());
            for (phase, count) in &self.phases {
                lines.push(format!("  {}: {}", phase, count));
            }
        }

        lines.join("\n")
    }
}
