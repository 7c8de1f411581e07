//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Title screen, waiting for the first jump trigger
    Start,
    /// Active run
    Playing,
    /// Run ended; waiting for a restart trigger
    GameOver,
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Ground-level column; jump over it
    Cactus,
    /// Elevated hazard; run under or time the jump
    Bird,
    /// Collectible; overlapping it scores instead of crashing
    Coin,
}

/// A scrolling obstacle or collectible
///
/// `x` is the left edge; `y` is the vertical offset of the bottom edge
/// relative to the ground baseline (0 = grounded, negative = elevated).
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u64,
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Coins flip this exactly once; other kinds never touch it
    pub collected: bool,
}

/// Commentary milestone variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneKind {
    /// Crossed another 1000 m of distance
    Distance,
    /// Banked another 15 coins
    Coins,
}

/// Side effects the tick wants the shell to perform.
///
/// The sim never touches audio, storage, or the network itself; it pushes
/// events and the driver drains them after each update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    Jump,
    Coin,
    Crash,
    Milestone(MilestoneKind),
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Palette index for the shader
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Maximum particles (oldest evicted first)
pub const MAX_PARTICLES: usize = 256;

/// Palette indices understood by the shader
pub const PARTICLE_GOLD: u32 = 0;
pub const PARTICLE_RED: u32 = 1;

/// Complete game state - the single authoritative snapshot
///
/// Mutated only inside [`tick`](super::tick::tick); everything else
/// (renderer, HUD, audio) reads it or drains `events`.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub status: Status,
    /// Distance score; fractional, floored for display and persistence
    pub score: f64,
    pub coins: u32,
    /// Runner vertical offset from the ground baseline (<= 0 while airborne)
    pub runner_y: f32,
    pub runner_vy: f32,
    pub is_jumping: bool,
    /// Scroll speed, pixels per tick
    pub speed: f32,
    /// Active obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Simulation clock in milliseconds; advances only while Playing
    pub time_ms: f64,
    /// Next spawn threshold on the simulation clock
    pub next_spawn_ms: f64,
    /// 1.0 right after a crash, ramping down to 0
    pub screen_shake: f32,
    /// Milestone watermarks, reset on run start
    pub distance_milestone: u32,
    pub coin_milestone: u32,
    /// Pending side effects, drained by the driver each frame
    pub events: Vec<GameEvent>,
    /// Seeded RNG; the only randomness source in the sim
    pub rng: Pcg32,
    next_id: u64,
}

impl GameState {
    /// Create a fresh state on the title screen
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            status: Status::Start,
            score: 0.0,
            coins: 0,
            runner_y: 0.0,
            runner_vy: 0.0,
            is_jumping: false,
            speed: INITIAL_SPEED,
            obstacles: Vec::new(),
            particles: Vec::new(),
            time_ms: 0.0,
            next_spawn_ms: 0.0,
            screen_shake: 0.0,
            distance_milestone: 0,
            coin_milestone: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new obstacle ID
    pub fn next_entity_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Begin a run: reset everything score-related, keep the clock and RNG
    /// rolling so consecutive runs see different spawn sequences.
    pub fn start_run(&mut self) {
        self.status = Status::Playing;
        self.score = 0.0;
        self.coins = 0;
        self.runner_y = 0.0;
        self.runner_vy = 0.0;
        self.is_jumping = false;
        self.speed = INITIAL_SPEED;
        self.obstacles.clear();
        self.particles.clear();
        self.distance_milestone = 0;
        self.coin_milestone = 0;
        self.next_spawn_ms = self.time_ms + FIRST_SPAWN_DELAY_MS;
        self.events.push(GameEvent::RunStarted);
    }

    /// End the run. Idempotent: a second collision in the same tick or a
    /// stray late call must not double-fire the crash side effects.
    pub fn end_run(&mut self) {
        if self.status == Status::GameOver {
            return;
        }
        self.status = Status::GameOver;
        self.screen_shake = 1.0;
        let burst_y = GROUND_Y + self.runner_y - 40.0;
        self.spawn_burst(CRASH_BURST_X, burst_y, PARTICLE_RED, CRASH_BURST_COUNT);
        self.events.push(GameEvent::Crash);
    }

    /// Spawn a burst of particles at an event site.
    ///
    /// Velocities fountain upward with a sideways spread; aging in
    /// [`tick`](super::tick::tick) pulls them back down.
    pub fn spawn_burst(&mut self, x: f32, y: f32, color: u32, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                self.particles.remove(0);
            }
            let vx = self.rng.random_range(-5.0..5.0);
            let vy = self.rng.random_range(-8.0..2.0);
            let size = 2.0 + self.rng.random::<f32>() * 4.0;
            self.particles.push(Particle {
                pos: Vec2::new(x, y),
                vel: Vec2::new(vx, vy),
                color,
                life: 1.0,
                size,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_run_resets_score_state() {
        let mut state = GameState::new(7);
        state.score = 4200.0;
        state.coins = 9;
        state.runner_y = -50.0;
        state.runner_vy = -3.0;
        state.is_jumping = true;
        state.speed = 19.0;
        state.time_ms = 90_000.0;
        state.status = Status::GameOver;

        state.start_run();

        assert_eq!(state.status, Status::Playing);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.coins, 0);
        assert_eq!(state.runner_y, 0.0);
        assert_eq!(state.runner_vy, 0.0);
        assert!(!state.is_jumping);
        assert_eq!(state.speed, INITIAL_SPEED);
        assert!(state.obstacles.is_empty());
        assert!(state.particles.is_empty());
        // Clock keeps rolling; only the spawn threshold moves
        assert_eq!(state.time_ms, 90_000.0);
        assert_eq!(state.next_spawn_ms, 90_000.0 + FIRST_SPAWN_DELAY_MS);
        assert!(state.events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_end_run_is_idempotent() {
        let mut state = GameState::new(7);
        state.start_run();
        state.events.clear();

        state.end_run();
        let particles_after_first = state.particles.len();
        let events_after_first = state.events.len();
        let shake_after_first = state.screen_shake;

        state.end_run();

        assert_eq!(state.status, Status::GameOver);
        assert_eq!(state.particles.len(), particles_after_first);
        assert_eq!(state.events.len(), events_after_first);
        assert_eq!(state.screen_shake, shake_after_first);
        assert_eq!(
            state.events.iter().filter(|e| **e == GameEvent::Crash).count(),
            1
        );
    }

    #[test]
    fn test_spawn_burst_caps_particles() {
        let mut state = GameState::new(7);
        for _ in 0..30 {
            state.spawn_burst(100.0, 400.0, PARTICLE_GOLD, COIN_BURST_COUNT);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(7);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }
}
