//! Neon Runner - an endless neon runner for the browser
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, scoring)
//! - `renderer`: WebGPU rendering pipeline
//! - `highscores`: Persisted best score
//! - `commentary`: Optional AI race commentary
//! - `audio`: Procedural sound effects

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod commentary;
pub mod highscores;
pub mod renderer;
pub mod sim;

pub use highscores::HighScore;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz, matching the
    /// per-frame physics constants below)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical canvas dimensions
    pub const CANVAS_WIDTH: f32 = 1200.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    /// Ground baseline; the runner's feet and grounded obstacles sit here
    pub const GROUND_Y: f32 = 500.0;

    /// Downward acceleration applied to the runner each tick
    pub const GRAVITY: f32 = 0.75;
    /// Jump impulse (negative = up)
    pub const JUMP_FORCE: f32 = -18.0;

    /// Runner geometry - x is fixed, only the vertical offset moves
    pub const RUNNER_X: f32 = 100.0;
    pub const RUNNER_WIDTH: f32 = 70.0;
    pub const RUNNER_HEIGHT: f32 = 74.0;

    /// Scroll speed range (pixels per tick)
    pub const INITIAL_SPEED: f32 = 7.0;
    pub const SPEED_INCREMENT: f32 = 0.002;
    pub const MAX_SPEED: f32 = 22.0;
    /// Distance score gained per elapsed millisecond
    pub const SCORE_RATE: f64 = 0.02;

    /// Hitboxes shrink symmetrically by this much on every side
    pub const HITBOX_PADDING: f32 = 15.0;
    /// Obstacles are dropped once fully this far past the left edge
    pub const OFFSCREEN_MARGIN: f32 = 100.0;

    /// Spawn scheduling: first spawn after a run starts, then
    /// base + random(range), divided by the current speed ratio
    pub const FIRST_SPAWN_DELAY_MS: f64 = 1000.0;
    pub const SPAWN_DELAY_BASE_MS: f64 = 700.0;
    pub const SPAWN_DELAY_RANGE_MS: f64 = 1200.0;

    /// Particle aging (per tick)
    pub const PARTICLE_GRAVITY: f32 = 0.3;
    pub const PARTICLE_DECAY: f32 = 0.015;
    /// Burst sizes for coin pickups and crashes
    pub const COIN_BURST_COUNT: usize = 15;
    pub const CRASH_BURST_COUNT: usize = 30;
    /// Crash bursts erupt from the runner's chest, not its left edge
    pub const CRASH_BURST_X: f32 = 120.0;

    /// Screen shake ramps from 1.0 back to 0.0 over this long
    pub const SHAKE_DURATION_MS: f64 = 300.0;

    /// Commentary milestones: every 1000 m of distance, every 15 coins
    pub const MILESTONE_DISTANCE_STEP: f64 = 1000.0;
    pub const MILESTONE_COIN_STEP: u32 = 15;
    /// Minimum interval between commentary service calls
    pub const COMMENTARY_COOLDOWN_MS: f64 = 8000.0;
}
