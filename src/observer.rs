//! Optional structured event stream out of a run. Observers only watch: nothing they do can feed
//! back into scheduling.

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    BucketOpened { index: usize },
    VertexSettled { vertex: u32, distance: f32, bucket: usize },
    EdgeRelaxed { from: u32, to: u32, new_distance: f32 },
    BucketClosed { index: usize },
}

/// Receives events from the scheduler thread and, for `EdgeRelaxed`, from relaxation workers.
pub trait Observer: Sync {
    fn on_event(&self, event: &Event);

    /// Per-edge events are the hot path; returning false skips building them.
    fn wants_edge_events(&self) -> bool { true }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    #[inline] fn on_event(&self, _: &Event) {}
    #[inline] fn wants_edge_events(&self) -> bool { false }
}

pub(crate) static NOOP: NoopObserver = NoopObserver;

/// Forwards events to `tracing` under the `delta_sssp::events` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver {
    pub edges: bool,
}

impl Observer for TracingObserver {
    fn on_event(&self, event: &Event) {
        match *event {
            Event::BucketOpened { index } => tracing::debug!(target: "delta_sssp::events", bucket = index, "bucket opened"),
            Event::BucketClosed { index } => tracing::debug!(target: "delta_sssp::events", bucket = index, "bucket closed"),
            Event::VertexSettled { vertex, distance, bucket } => {
                tracing::trace!(target: "delta_sssp::events", vertex, distance, bucket, "vertex settled")
            }
            Event::EdgeRelaxed { from, to, new_distance } => {
                tracing::trace!(target: "delta_sssp::events", from, to, new_distance, "edge relaxed")
            }
        }
    }

    fn wants_edge_events(&self) -> bool { self.edges }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Self { Self::default() }
    pub fn events(&self) -> Vec<Event> { self.events.lock().clone() }
    pub fn take(&self) -> Vec<Event> { std::mem::take(&mut *self.events.lock()) }
    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string(&*self.events.lock()) }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &Event) {
        self.events.lock().push(*event);
    }
}
