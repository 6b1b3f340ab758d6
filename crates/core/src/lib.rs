#![deny(unsafe_code)]
//! Core of the flow-field simulator.
//!
//! Generates a discretized vector field from one of four analytic
//! [`Pattern`]s, looks up the flow under a tracer [`Particle`], advects the
//! particle with toroidal wrap, and drives the whole thing one tick per host
//! frame through the [`Scheduler`]. Drawing is left to a [`RenderSink`]
//! supplied by the host.

pub mod config;
pub mod debounce;
pub mod error;
pub mod field;
pub mod interp;
pub mod lookup;
pub mod params;
pub mod particle;
pub mod pattern;
pub mod prng;
pub mod scheduler;
pub mod sink;

pub use config::SimulationConfig;
pub use error::FlowError;
pub use field::{Field, FieldPoint};
pub use lookup::{LookupCache, LookupOptions, Metric, Nearest, Strategy};
pub use particle::{Extent, Particle};
pub use pattern::{FlowVector, Pattern};
pub use prng::Xorshift64;
pub use scheduler::{FrameOutcome, RunState, Scheduler, SimulationClock};
pub use sink::{FrameHandle, FrameHost, NullSink, QueuedFrameHost, RenderSink};
