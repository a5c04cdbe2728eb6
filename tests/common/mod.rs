//! Shared test doubles for integration testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use trace_gate::{EntryPoint, Kernel, SpanGuard, SpanHandle, TraceSpan};

/// Entry point double counting acquisitions and releases and recording
/// the order of observable events.
#[derive(Clone, Default)]
pub struct RecordingEntryPoint {
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingEntryPoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl EntryPoint for RecordingEntryPoint {
    fn continue_or_root(&self, name: &str, kernel: &Kernel) -> SpanGuard {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let mut pairs: Vec<String> = kernel.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        self.log(format!("open {name} [{}]", pairs.join(",")));

        let released = self.released.clone();
        let events = self.events.clone();
        SpanGuard::new(SpanHandle::new(RecordingSpan), move || {
            released.fetch_add(1, Ordering::SeqCst);
            events.lock().unwrap().push("close".to_string());
        })
    }
}

/// Span double; inert but distinguishable from a noop span.
pub struct RecordingSpan;

impl TraceSpan for RecordingSpan {
    fn record(&self, _key: &str, _value: &str) {}

    fn child(&self, _name: &str) -> SpanHandle {
        SpanHandle::new(RecordingSpan)
    }

    fn trace_id(&self) -> Option<String> {
        Some("test-trace".to_string())
    }

    fn span_id(&self) -> Option<String> {
        Some("test-span".to_string())
    }

    fn trace_url(&self) -> Option<String> {
        None
    }
}
