use std::fmt;

use tracing::info;

/// Pipeline phase that emits progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Extraction,
    Merge,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Extraction => "retrieve metadata",
            Phase::Merge => "combining files",
        }
    }
}

/// `index` counts completed items, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub index: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn new(phase: Phase, index: usize, total: usize) -> Self {
        Self {
            phase,
            index,
            total,
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.index as f64 / self.total as f64
        }
    }

    pub fn is_last(&self) -> bool {
        self.index >= self.total
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}/{}", self.phase.label(), self.index, self.total)
    }
}

/// Receives the progress of a single phase.
pub trait ProgressObserver {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(ProgressEvent),
{
    fn on_progress(&mut self, event: ProgressEvent) {
        (self)(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

/// Keeps every event so callers can query how far a phase got.
#[derive(Debug, Default, Clone)]
pub struct ProgressRecorder {
    events: Vec<ProgressEvent>,
}

impl ProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    pub fn latest(&self) -> Option<ProgressEvent> {
        self.events.last().copied()
    }
}

impl ProgressObserver for ProgressRecorder {
    fn on_progress(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

/// Logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&mut self, event: ProgressEvent) {
        info!(
            phase = event.phase.label(),
            index = event.index,
            total = event.total,
            "{event}"
        );
    }
}
