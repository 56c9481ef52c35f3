//! Periodic timers polled by the update step
//!
//! Nothing here runs on its own: the session hands every timer the elapsed
//! frame time and acts on the number of periods that completed.

use rand::Rng;
use std::time::Duration;

use crate::config::GameConfig;
use crate::entities::{Target, TargetShape};

/// Counts completed periods of a fixed interval
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    interval: Duration,
    elapsed: Duration,
}

impl IntervalTimer {
    /// A zero interval never fires
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated toward the next firing
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Adds `dt` and returns how many periods completed
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
        }
        fired
    }

    /// Re-arms the timer with a new interval, discarding progress
    pub fn reschedule(&mut self, interval: Duration) {
        self.interval = interval;
        self.elapsed = Duration::ZERO;
    }
}

/// Current target speed and spawn cadence
#[derive(Debug, Clone, PartialEq)]
pub struct Difficulty {
    /// Base fall speed of newly spawned targets
    pub target_speed: f32,
    pub spawn_interval: Duration,
    /// Number of ramps applied so far
    pub level: u32,
}

impl Difficulty {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            target_speed: config.initial_target_speed,
            spawn_interval: config.initial_spawn_interval(),
            level: 0,
        }
    }
}

/// Makes the game harder every ramp period
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyRamp {
    timer: IntervalTimer,
    speed_increment: f32,
    interval_factor: f32,
    min_interval: Duration,
}

impl DifficultyRamp {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            timer: IntervalTimer::new(config.difficulty_ramp_period()),
            speed_increment: config.ramp_speed_increment,
            interval_factor: config.ramp_interval_factor,
            min_interval: config.min_spawn_interval(),
        }
    }

    /// Advances the ramp clock; returns the number of ramps due
    pub fn poll(&mut self, dt: Duration) -> u32 {
        self.timer.advance(dt)
    }

    /// Applies one ramp step to `difficulty`
    pub fn apply(&self, difficulty: &mut Difficulty) {
        difficulty.target_speed += self.speed_increment;
        let scaled = (difficulty.spawn_interval.as_millis() as f64
            * f64::from(self.interval_factor))
        .round() as u64;
        difficulty.spawn_interval = Duration::from_millis(scaled).max(self.min_interval);
        difficulty.level += 1;
    }
}

/// Drops new targets in at the current spawn interval
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    timer: IntervalTimer,
    shape: TargetShape,
    min_size: f32,
    size_range: f32,
    size_clamp: (f32, f32),
    speed_jitter: f32,
    spawn_margin: f32,
}

impl Spawner {
    pub fn new(config: &GameConfig, shape: TargetShape) -> Self {
        Self {
            timer: IntervalTimer::new(config.initial_spawn_interval()),
            shape,
            min_size: config.target_min_size,
            size_range: config.target_size_range,
            size_clamp: config.target_size_clamp,
            speed_jitter: config.target_speed_jitter,
            spawn_margin: config.spawn_margin,
        }
    }

    pub fn interval(&self) -> Duration {
        self.timer.interval()
    }

    /// Advances the spawn clock; returns the number of targets due
    pub fn poll(&mut self, dt: Duration) -> u32 {
        self.timer.advance(dt)
    }

    /// Restarts the spawn clock at a new interval
    pub fn reschedule(&mut self, interval: Duration) {
        self.timer.reschedule(interval);
    }

    /// Builds one target just above the top edge at a random column
    pub fn spawn<R: Rng>(&self, rng: &mut R, play_width: f32, base_speed: f32) -> Target {
        let (lo, hi) = self.size_clamp;
        let size = (self.min_size + rng.random::<f32>() * self.size_range).clamp(lo, hi);
        let x = rng.random::<f32>() * (play_width - size).max(0.0);
        let speed = base_speed + rng.random::<f32>() * self.speed_jitter;
        let palette = self.shape.palette();
        let color = palette[rng.random_range(0..palette.len())];

        Target::new(x, -size - self.spawn_margin, size, speed, color, self.shape)
    }
}

/// Emits bullets at a steady rate while fire is held
///
/// The clock keeps running whether or not fire is held; a period that
/// completes while fire is released simply emits nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FireController {
    timer: IntervalTimer,
}

impl FireController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            timer: IntervalTimer::new(config.fire_interval()),
        }
    }

    /// Returns the number of bullets to emit for this frame
    pub fn poll(&mut self, dt: Duration, fire_held: bool) -> u32 {
        let ticks = self.timer.advance(dt);
        if fire_held { ticks } else { 0 }
    }
}
