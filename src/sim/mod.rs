//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (obstacles in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, obstacle_box, runner_box};
pub use spawn::{schedule_next_spawn, spawn_obstacle};
pub use state::{
    GameEvent, GameState, MAX_PARTICLES, MilestoneKind, Obstacle, ObstacleKind, PARTICLE_GOLD,
    PARTICLE_RED, Particle, Status,
};
pub use tick::{TickInput, tick};
