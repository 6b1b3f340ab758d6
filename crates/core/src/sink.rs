//! Seams between the simulation core and its host.
//!
//! [`RenderSink`] receives the data the core produces: the field once per
//! run (or per resize) and the particle every frame. [`FrameHost`] is the
//! per-frame callback scheduler: the core asks it for the next frame and
//! may cancel a frame it no longer wants.
//!
//! Both traits are object-safe.

use std::collections::VecDeque;

use crate::field::{Field, FieldPoint};
use crate::particle::Particle;

/// Consumer of simulation output.
pub trait RenderSink {
    /// Draws the static field. Called once after start and again after
    /// every resize or reset.
    fn draw_field(&mut self, field: &Field, scale_factor: f64);

    /// Draws the particle and, if known, the field point it was matched to
    /// this frame.
    fn draw_particle(&mut self, particle: &Particle, matched: Option<&FieldPoint>);
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn draw_field(&mut self, _field: &Field, _scale_factor: f64) {}

    fn draw_particle(&mut self, _particle: &Particle, _matched: Option<&FieldPoint>) {}
}

/// Opaque handle to a requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side frame scheduling: "run the frame callback before the next
/// paint", with cancellation.
pub trait FrameHost {
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Headless [`FrameHost`] that queues requests for a driver loop to pop.
#[derive(Debug, Clone, Default)]
pub struct QueuedFrameHost {
    next_id: u64,
    queue: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl QueuedFrameHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops the oldest outstanding frame request.
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        self.queue.pop_front()
    }

    /// Number of requests not yet popped or cancelled.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total frames ever requested.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total frames cancelled while still queued.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameHost for QueuedFrameHost {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.queue.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(pos) = self.queue.iter().position(|h| *h == handle) {
            self.queue.remove(pos);
            self.cancelled += 1;
        }
    }
}
