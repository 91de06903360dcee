//! # tracefile - Chrome trace files from any thread
//!
//! A small, thread-safe trace event recorder. Instrumented code records
//! begin, end and instant events; the recorder buffers them and writes a
//! JSON array in the Chrome trace-event format that can be opened in
//! `about:tracing` or Perfetto.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tracefile_core::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = TraceConfig::builder()
//!         .enabled(true)
//!         .file("/tmp/trace.json")
//!         .build()?;
//!
//!     // Finalizes the trace file when main returns
//!     let _guard = global::install(&config)?;
//!
//!     let _scope = global::scope("main");
//!     global::event("started", TraceEvent::INSTANT);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **TraceEvent**: immutable record stamped with time, pid and tid
//! - **Tracer**: mutex-protected buffer that flushes to its sink in batches
//!   and closes the JSON array on teardown
//! - **TraceScope**: RAII guard emitting a begin/end pair
//! - **global**: optional process-wide tracer with explicit install/shutdown

pub mod config;
pub mod error;
pub mod recorder;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{TraceConfig, TraceConfigBuilder};
    pub use crate::error::{Result, TracefileError};
    pub use crate::recorder::global;
    pub use crate::recorder::{
        TraceEvent, TraceScope, TraceSummary, Tracer, TracerGuard, TracerStats, read_trace,
    };
}
