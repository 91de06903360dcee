//! Trace Event Recording
//!
//! Buffers begin/end/instant events from any number of threads and writes
//! them incrementally as a Chrome trace-event JSON array, viewable in
//! `about:tracing` or ui.perfetto.dev.
//!
//! # Example
//!
//! ```rust,no_run
//! use tracefile_core::recorder::{TraceEvent, Tracer};
//!
//! let tracer = Tracer::create("/tmp/trace.json", 1024)?;
//! {
//!     let _scope = tracer.scope("load_config");
//!     tracer.append(TraceEvent::instant("parsed"));
//! }
//! let stats = tracer.close()?;
//! println!("{} events written", stats.events_written);
//! # Ok::<(), tracefile_core::error::TracefileError>(())
//! ```

mod clock;
mod event;
pub mod global;
mod scope;
mod summary;
mod tracer;

pub use event::TraceEvent;
pub use global::TracerGuard;
pub use scope::TraceScope;
pub use summary::{TraceSummary, read_trace};
pub use tracer::{Tracer, TracerStats};
