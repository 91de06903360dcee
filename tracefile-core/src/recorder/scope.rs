//! Scoped begin/end recording

use super::event::TraceEvent;
use super::tracer::Tracer;

/// Guard that records a begin event when created and the matching end
/// event when dropped, so every exit path of the enclosing scope is
/// covered.
///
/// Names may be built at runtime.
#[must_use = "the end event is recorded when the guard is dropped"]
pub struct TraceScope<'a> {
    tracer: Option<&'a Tracer>,
    name: String,
}

impl<'a> TraceScope<'a> {
    /// Begin a scope on `tracer`
    pub fn new(tracer: &'a Tracer, name: impl Into<String>) -> Self {
        let name = name.into();
        tracer.append(TraceEvent::begin(name.clone()));
        Self {
            tracer: Some(tracer),
            name,
        }
    }

    /// A scope that records nothing
    pub fn disabled() -> Self {
        Self {
            tracer: None,
            name: String::new(),
        }
    }

    /// Begin a scope only if a tracer is available
    pub fn maybe(tracer: Option<&'a Tracer>, name: impl Into<String>) -> Self {
        match tracer {
            Some(tracer) => Self::new(tracer, name),
            None => Self::disabled(),
        }
    }

    /// Whether this guard will record an end event
    pub fn is_active(&self) -> bool {
        self.tracer.is_some()
    }

    /// Scope name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TraceScope<'_> {
    fn drop(&mut self) {
        if let Some(tracer) = self.tracer {
            tracer.append(TraceEvent::end(std::mem::take(&mut self.name)));
        }
    }
}
