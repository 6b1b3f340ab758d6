//! Frame scheduler: owns all simulation state and drives one advection
//! step per host frame.
//!
//! ```text
//!          start                 tick > tick_limit, or stop
//!   Idle ─────────▶ Running ───────────────────────────────▶ Stopped
//!    ▲                 │ ▲                                      │
//!    │                 └─┘ frame (or paused: re-request only)   │
//!    └──────────────────────── reset ───────────────────────────┘
//! ```
//!
//! Every piece of mutable state lives in [`Scheduler`]; the lookup and
//! advection functions only borrow it for a single call. Resizes arrive
//! through a single-slot debouncer so a burst collapses into the last
//! request.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::debounce::Debouncer;
use crate::error::FlowError;
use crate::field::Field;
use crate::lookup::{CacheStats, LookupCache, Nearest};
use crate::particle::{advance, Advection, Extent, Particle};
use crate::pattern::Pattern;
use crate::prng::Xorshift64;
use crate::sink::{FrameHandle, FrameHost, RenderSink};

/// Lifecycle of a run. Pausing is tracked separately in
/// [`SimulationClock::paused`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

impl RunState {
    pub fn name(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tick counter and frame budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationClock {
    /// Starts at 1 and increases by one per executed frame.
    pub tick: u64,
    pub tick_limit: u64,
    pub paused: bool,
}

impl SimulationClock {
    pub fn new(tick_limit: u64) -> Self {
        Self {
            tick: 1,
            tick_limit,
            paused: false,
        }
    }

    /// True once the tick has passed the budget.
    pub fn exhausted(&self) -> bool {
        self.tick > self.tick_limit
    }
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not running; nothing happened and no frame was requested.
    Inactive,
    /// Paused; the next frame was requested without ticking.
    Paused,
    /// One tick executed and the next frame requested.
    Advanced,
    /// One tick executed and the budget is spent; the run is stopped.
    Finished,
}

/// Owner of the field, particle, cache, clock and all transitions.
#[derive(Debug)]
pub struct Scheduler {
    config: SimulationConfig,
    extent: Extent,
    scale_factor: f64,
    field: Field,
    particle: Particle,
    cache: Option<LookupCache>,
    clock: SimulationClock,
    state: RunState,
    field_rendered: bool,
    last_match: Option<Nearest>,
    pending_frame: Option<FrameHandle>,
    resize: Debouncer<Extent>,
    rng: Xorshift64,
}

/// Screen pixels per field-space unit for a surface of `extent`.
fn scale_for(extent: Extent, field_size: usize) -> f64 {
    extent.min_side() / field_size as f64
}

impl Scheduler {
    /// Builds an idle scheduler for a surface of `extent` pixels.
    ///
    /// Validates the config, generates the field and places the particle.
    pub fn new(config: SimulationConfig, extent: Extent) -> Result<Self, FlowError> {
        config.validate()?;
        if !extent.is_valid() {
            return Err(FlowError::InvalidDimensions);
        }
        let field = Field::generate(
            config.field_size,
            config.field_size,
            config.steps,
            config.pattern,
        )?;
        let scale_factor = scale_for(extent, config.field_size);
        let mut rng = Xorshift64::new(config.seed);
        let particle = Particle::random(
            extent,
            config.particle_speed,
            config.particle_size,
            &mut rng,
        );
        let cache = config
            .cache_enabled
            .then(|| LookupCache::for_scale(config.cache_resolution_px, scale_factor));
        let clock = SimulationClock::new(config.tick_limit());
        let resize = Debouncer::new(Duration::from_millis(config.resize_debounce_ms));

        Ok(Self {
            config,
            extent,
            scale_factor,
            field,
            particle,
            cache,
            clock,
            state: RunState::Idle,
            field_rendered: false,
            last_match: None,
            pending_frame: None,
            resize,
            rng,
        })
    }

    /// `Idle -> Running`: resets the tick, draws the field and requests the
    /// first frame. Returns false (and does nothing) unless idle.
    pub fn start(&mut self, host: &mut dyn FrameHost, sink: &mut dyn RenderSink) -> bool {
        if self.state != RunState::Idle {
            return false;
        }
        self.clock.tick = 1;
        self.state = RunState::Running;
        log::info!(
            "simulation started: pattern {}, tick limit {}",
            self.field.pattern(),
            self.clock.tick_limit
        );
        self.render_field_once(sink);
        if self.clock.exhausted() {
            self.finish(host);
        } else {
            self.schedule(host);
        }
        true
    }

    /// Frame callback. Runs one tick if running and not paused.
    pub fn on_frame(
        &mut self,
        host: &mut dyn FrameHost,
        sink: &mut dyn RenderSink,
    ) -> FrameOutcome {
        self.pending_frame = None;
        if self.state != RunState::Running {
            return FrameOutcome::Inactive;
        }
        if self.clock.paused {
            self.schedule(host);
            return FrameOutcome::Paused;
        }

        self.clock.tick += 1;
        log::trace!("tick {}", self.clock.tick);
        self.render_field_once(sink);

        let step = self.advection();
        let matched = advance(&mut self.particle, &self.field, self.cache.as_mut(), &step);
        self.last_match = Some(matched);
        if !self.particle.is_finite() {
            log::warn!(
                "particle left the finite plane at tick {}: ({}, {})",
                self.clock.tick,
                self.particle.x,
                self.particle.y
            );
        }
        sink.draw_particle(&self.particle, Some(&matched.point));

        if self.clock.exhausted() {
            self.finish(host);
            FrameOutcome::Finished
        } else {
            self.schedule(host);
            FrameOutcome::Advanced
        }
    }

    /// Stops the run and cancels any pending frame. Returns false if
    /// already stopped.
    pub fn stop(&mut self, host: &mut dyn FrameHost) -> bool {
        if self.state == RunState::Stopped {
            return false;
        }
        self.finish(host);
        true
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.paused = paused;
    }

    /// Flips the paused flag and returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.clock.paused = !self.clock.paused;
        self.clock.paused
    }

    /// Arms a debounced resize to `extent`. A request already pending is
    /// replaced. Returns whether one was replaced.
    pub fn request_resize(&mut self, extent: Extent, now: Duration) -> Result<bool, FlowError> {
        if !extent.is_valid() {
            return Err(FlowError::InvalidDimensions);
        }
        let replaced = self.resize.arm(extent, now);
        log::debug!(
            "resize to {}x{} armed for {:?}",
            extent.width,
            extent.height,
            self.resize.deadline()
        );
        Ok(replaced)
    }

    /// Fires the pending resize if its delay has elapsed. Returns whether a
    /// resize was applied.
    pub fn poll_timers(&mut self, now: Duration) -> Result<bool, FlowError> {
        match self.resize.poll(now) {
            Some(extent) => {
                self.apply_resize(extent)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resize transition: new scale, new random particle, tick back to 1,
    /// cache cleared and field marked for redraw. The run state is kept.
    pub fn apply_resize(&mut self, extent: Extent) -> Result<(), FlowError> {
        if !extent.is_valid() {
            return Err(FlowError::InvalidDimensions);
        }
        self.extent = extent;
        self.scale_factor = scale_for(extent, self.config.field_size);
        self.reinitialize();
        log::info!(
            "resized to {}x{}, scale factor {}",
            extent.width,
            extent.height,
            self.scale_factor
        );
        Ok(())
    }

    /// Back to `Idle` with a fresh particle, tick 1, empty cache and the
    /// field due for redraw. Pending frames and resizes are cancelled.
    pub fn reset(&mut self, host: &mut dyn FrameHost) {
        if let Some(handle) = self.pending_frame.take() {
            host.cancel_frame(handle);
        }
        self.resize.cancel();
        self.reinitialize();
        self.clock.paused = false;
        self.state = RunState::Idle;
        log::info!("simulation reset");
    }

    /// Switches to a different pattern chosen at random, rebuilds the
    /// field, resets and starts again.
    pub fn shuffle_pattern(
        &mut self,
        host: &mut dyn FrameHost,
        sink: &mut dyn RenderSink,
    ) -> Result<Pattern, FlowError> {
        let current = self.field.pattern();
        let next = Pattern::shuffle_from(current, &mut self.rng);
        self.field = Field::generate(
            self.config.field_size,
            self.config.field_size,
            self.config.steps,
            next,
        )?;
        self.config.pattern = next;
        log::info!("pattern shuffled: {current} -> {next}");
        self.reset(host);
        self.start(host, sink);
        Ok(next)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn clock(&self) -> SimulationClock {
        self.clock
    }

    pub fn tick_limit(&self) -> u64 {
        self.clock.tick_limit
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Field point matched on the most recent tick.
    pub fn last_match(&self) -> Option<&Nearest> {
        self.last_match.as_ref()
    }

    /// Whether the static field has been drawn since the last reset.
    pub fn field_rendered(&self) -> bool {
        self.field_rendered
    }

    /// Whether a debounced resize is waiting to fire.
    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// `None` when the cache is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(LookupCache::stats)
    }

    fn advection(&self) -> Advection {
        Advection::new(
            self.scale_factor,
            self.config.interpolation,
            self.config.fps_resistance,
            self.extent,
            self.config.lookup_options(),
        )
    }

    fn render_field_once(&mut self, sink: &mut dyn RenderSink) {
        if !self.field_rendered {
            sink.draw_field(&self.field, self.scale_factor);
            self.field_rendered = true;
        }
    }

    fn schedule(&mut self, host: &mut dyn FrameHost) {
        let handle = host.request_frame();
        if let Some(stale) = self.pending_frame.replace(handle) {
            host.cancel_frame(stale);
        }
    }

    fn finish(&mut self, host: &mut dyn FrameHost) {
        if let Some(handle) = self.pending_frame.take() {
            host.cancel_frame(handle);
        }
        self.state = RunState::Stopped;
        log::info!("simulation stopped at tick {}", self.clock.tick);
    }

    fn reinitialize(&mut self) {
        self.particle = Particle::random(
            self.extent,
            self.config.particle_speed,
            self.config.particle_size,
            &mut self.rng,
        );
        self.clock.tick = 1;
        let quantum = self.config.cache_resolution_px / self.scale_factor;
        if let Some(cache) = self.cache.as_mut() {
            cache.rescale(quantum);
        }
        self.field_rendered = false;
        self.last_match = None;
    }
}
