//! Buffered trace writer
//!
//! A [`Tracer`] accumulates [`TraceEvent`]s in memory and writes them to its
//! sink as one JSON array, a batch at a time. Every batch is written while
//! holding the same lock that guards the buffer, so concurrent producers can
//! never interleave with a flush in progress.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use super::event::TraceEvent;
use super::scope::TraceScope;
use crate::config::TraceConfig;
use crate::error::{Result, TracefileError};

/// Counters describing what a tracer has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TracerStats {
    /// Events written to the sink
    pub events_written: u64,
    /// Non-empty batches written to the sink
    pub flushes: u64,
    /// Events discarded because the sink was closed or failed
    pub dropped: u64,
}

enum Sink {
    /// Accepting writes. `started` is set once the opening bracket is out.
    Open {
        writer: Box<dyn Write + Send>,
        started: bool,
    },
    /// A write failed; nothing more is written.
    Failed,
    /// Closing bracket written.
    Closed,
}

struct TracerState {
    buffer: Vec<TraceEvent>,
    sink: Sink,
    stats: TracerStats,
    warned_drop: bool,
}

/// Thread-safe buffered recorder writing a Chrome trace-event JSON array.
pub struct Tracer {
    path: Option<PathBuf>,
    capacity: usize,
    state: Mutex<TracerState>,
}

impl Tracer {
    /// Create a tracer writing to `path`, truncating any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`TracefileError::InvalidCapacity`] for a zero capacity and
    /// [`TracefileError::SinkOpen`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        if capacity == 0 {
            return Err(TracefileError::InvalidCapacity(capacity));
        }
        let file = File::create(path).map_err(|source| TracefileError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), capacity, "Creating tracer");
        let mut tracer = Self::from_writer(BufWriter::new(file), capacity)?;
        tracer.path = Some(path.to_path_buf());
        Ok(tracer)
    }

    /// Create a tracer from a validated configuration.
    pub fn from_config(config: &TraceConfig) -> Result<Self> {
        config.validate()?;
        Self::create(&config.file, config.buffer_size)
    }

    /// Create a tracer over an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TracefileError::InvalidCapacity(capacity));
        }
        Ok(Self {
            path: None,
            capacity,
            state: Mutex::new(TracerState {
                buffer: Vec::with_capacity(capacity),
                sink: Sink::Open {
                    writer: Box::new(writer),
                    started: false,
                },
                stats: TracerStats::default(),
                warned_drop: false,
            }),
        })
    }

    /// Output path, if the tracer writes to a file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of events buffered before a flush
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the tracer's counters
    pub fn stats(&self) -> TracerStats {
        self.lock().stats
    }

    /// Number of events currently held in memory
    pub fn buffered(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Whether the tracer still accepts events
    pub fn is_open(&self) -> bool {
        matches!(self.lock().sink, Sink::Open { .. })
    }

    /// Record an event.
    ///
    /// Once the buffer reaches capacity the whole batch is written out
    /// before the lock is released.
    pub fn append(&self, event: TraceEvent) {
        let mut state = self.lock();
        if !matches!(state.sink, Sink::Open { .. }) {
            state.stats.dropped += 1;
            if !state.warned_drop {
                state.warned_drop = true;
                warn!(
                    path = ?self.path,
                    event = event.name(),
                    "Dropping trace events recorded after the tracer stopped"
                );
            }
            return;
        }
        state.buffer.push(event);
        if state.buffer.len() >= self.capacity {
            state.flush();
        }
    }

    /// Record a new event with the given name and phase
    pub fn record(&self, name: impl Into<String>, phase: char) {
        self.append(TraceEvent::new(name, phase));
    }

    /// Record an instant event
    pub fn instant(&self, name: impl Into<String>) {
        self.append(TraceEvent::instant(name));
    }

    /// Record a begin event now and the matching end event when the
    /// returned guard is dropped.
    pub fn scope(&self, name: impl Into<String>) -> TraceScope<'_> {
        TraceScope::new(self, name)
    }

    /// Write any buffered events, close the JSON array and stop accepting
    /// events.
    ///
    /// Only the first call does any work; later calls return the final
    /// counters unchanged.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the closing bracket cannot be written. The
    /// tracer is closed either way.
    pub fn close(&self) -> Result<TracerStats> {
        let mut state = self.lock();
        state.flush();

        match std::mem::replace(&mut state.sink, Sink::Closed) {
            Sink::Open {
                mut writer,
                started,
            } => {
                let tail: &[u8] = if started { b"]" } else { b"[]" };
                let result = writer.write_all(tail).and_then(|()| writer.flush());
                if let Err(e) = result {
                    error!(error = %e, "Failed to close trace file");
                    return Err(e.into());
                }
                info!(
                    path = ?self.path,
                    events = state.stats.events_written,
                    dropped = state.stats.dropped,
                    "Tracer closed"
                );
            }
            Sink::Failed => {
                warn!(
                    path = ?self.path,
                    dropped = state.stats.dropped,
                    "Tracer closed after write failure; trace file is incomplete"
                );
            }
            Sink::Closed => {}
        }

        Ok(state.stats)
    }

    fn lock(&self) -> MutexGuard<'_, TracerState> {
        // A producer that panicked while holding the lock leaves the state
        // consistent: every mutation below completes or is a no-op.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(error = %e, "Failed to finalize trace on drop");
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("path", &self.path)
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}

impl TracerState {
    /// Write the buffered batch and clear the buffer.
    ///
    /// The first batch opens the array with `[`; later batches continue it
    /// with `,`. An empty buffer writes nothing.
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let count = self.buffer.len() as u64;

        let result = match &mut self.sink {
            Sink::Open { writer, started } => {
                debug!(events = count, "Writing trace events");
                write_batch(&mut **writer, *started, &self.buffer).map(|()| *started = true)
            }
            Sink::Failed | Sink::Closed => Err(TracefileError::Closed),
        };

        match result {
            Ok(()) => {
                self.stats.events_written += count;
                self.stats.flushes += 1;
            }
            Err(TracefileError::Closed) => {
                self.stats.dropped += count;
            }
            Err(e) => {
                error!(error = %e, events = count, "Failed to write trace events; disabling tracer");
                self.stats.dropped += count;
                self.sink = Sink::Failed;
            }
        }
        self.buffer.clear();
    }
}

fn write_batch(writer: &mut dyn Write, started: bool, events: &[TraceEvent]) -> Result<()> {
    writer.write_all(if started { b"," } else { b"[" })?;
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        serde_json::to_writer(&mut *writer, event)?;
    }
    writer.flush()?;
    Ok(())
}
