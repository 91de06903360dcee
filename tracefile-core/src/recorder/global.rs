//! Process-wide tracer
//!
//! Most call sites should receive a `&Tracer` explicitly. For code that
//! cannot, a single tracer can be registered for the whole process:
//!
//! - [`install`] creates it from an explicit configuration and hands back a
//!   [`TracerGuard`] that finalizes the trace file when dropped (typically
//!   at the end of `main`).
//! - [`instance`] creates it lazily from [`TraceConfig::load`] on first use
//!   and registers an exit hook that finalizes it when the process exits
//!   normally.
//! - [`shutdown`] finalizes it explicitly.
//!
//! [`event`] and [`scope`] record only when a tracer has been registered and
//! cost a single atomic load otherwise.

use once_cell::sync::OnceCell;
use tracing::{error, info, warn};

use super::scope::TraceScope;
use super::tracer::{Tracer, TracerStats};
use crate::config::TraceConfig;
use crate::error::{Result, TracefileError};

static GLOBAL: OnceCell<Tracer> = OnceCell::new();

/// Finalizes the process-wide tracer when dropped
#[must_use = "the trace file is finalized when the guard is dropped"]
#[derive(Debug)]
pub struct TracerGuard {
    _private: (),
}

impl TracerGuard {
    /// Finalize now instead of on drop
    pub fn finish(self) -> Option<TracerStats> {
        let stats = shutdown();
        std::mem::forget(self);
        stats
    }
}

impl Drop for TracerGuard {
    fn drop(&mut self) {
        shutdown();
    }
}

/// Register the process-wide tracer from `config`.
///
/// Returns `Ok(None)` without creating anything when tracing is disabled.
///
/// # Errors
///
/// Returns [`TracefileError::AlreadyInitialized`] if a tracer is already
/// registered, or the error from opening the output file.
pub fn install(config: &TraceConfig) -> Result<Option<TracerGuard>> {
    if !config.enabled {
        return Ok(None);
    }
    if GLOBAL.get().is_some() {
        return Err(TracefileError::AlreadyInitialized);
    }

    let mut created = false;
    GLOBAL.get_or_try_init(|| {
        created = true;
        Tracer::from_config(config)
    })?;
    if !created {
        return Err(TracefileError::AlreadyInitialized);
    }

    info!(file = %config.file.display(), "Installed process-wide tracer");
    Ok(Some(TracerGuard { _private: () }))
}

/// The process-wide tracer, created from the loaded configuration on first
/// use.
///
/// Later calls return the same instance without re-reading configuration.
/// If the configuration is invalid or the output file cannot be opened the
/// process is aborted: once tracing is requested it is not optional.
///
/// The tracer lives in a static and is never dropped, so creation registers
/// an `atexit` hook that runs [`shutdown`] when the process exits through
/// `exit` or by returning from `main`. Processes that end by abort or signal
/// skip the hook and must call [`shutdown`] themselves; calling it early is
/// always allowed.
pub fn instance() -> &'static Tracer {
    GLOBAL.get_or_init(|| {
        let config = TraceConfig::load().unwrap_or_else(|e| fatal(&e));
        info!(file = %config.file.display(), "Creating tracing object");
        let tracer = Tracer::from_config(&config).unwrap_or_else(|e| fatal(&e));
        register_exit_hook();
        tracer
    })
}

/// The process-wide tracer, if one has been created
pub fn get() -> Option<&'static Tracer> {
    GLOBAL.get()
}

/// Whether a process-wide tracer is recording
pub fn enabled() -> bool {
    GLOBAL.get().is_some_and(Tracer::is_open)
}

/// Record an event on the process-wide tracer, if any
pub fn event(name: impl Into<String>, phase: char) {
    if let Some(tracer) = GLOBAL.get() {
        tracer.record(name, phase);
    }
}

/// Scope guard on the process-wide tracer; inert when none is registered
pub fn scope(name: impl Into<String>) -> TraceScope<'static> {
    TraceScope::maybe(GLOBAL.get(), name)
}

/// Finalize the process-wide tracer.
///
/// Writes remaining events and the closing bracket. Producers must have
/// finished before this is called; anything recorded afterwards is dropped.
pub fn shutdown() -> Option<TracerStats> {
    let tracer = GLOBAL.get()?;
    if !tracer.is_open() {
        return Some(tracer.stats());
    }
    match tracer.close() {
        Ok(stats) => {
            info!(path = ?tracer.path(), "Tracing object destroyed");
            Some(stats)
        }
        Err(e) => {
            error!(error = %e, "Failed to finalize process-wide tracer");
            Some(tracer.stats())
        }
    }
}

fn register_exit_hook() {
    extern "C" fn shutdown_at_exit() {
        shutdown();
    }

    // SAFETY: the handler is a plain function that only touches the static
    // tracer, which outlives every exit handler.
    let rc = unsafe { libc::atexit(shutdown_at_exit) };
    if rc != 0 {
        warn!("Failed to register exit hook; call global::shutdown() before exiting");
    }
}

fn fatal(err: &TracefileError) -> ! {
    error!(error = %err, "Cannot start tracing");
    eprintln!("tracefile: cannot start tracing: {}", err);
    std::process::abort()
}
