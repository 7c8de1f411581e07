//! Obstacle spawning
//!
//! Entities enter at the right edge of the canvas. The kind is a weighted
//! draw (70% cactus, 20% bird, 10% coin) and the geometry of each kind is
//! jittered so runs don't feel stamped from a template. Spawn cadence
//! tightens as the run speeds up.

use rand::Rng;

use crate::consts::*;

use super::state::{GameState, Obstacle, ObstacleKind};

/// Roll a new obstacle and push it onto the field at the right edge.
pub fn spawn_obstacle(state: &mut GameState) {
    let roll: f64 = state.rng.random();
    let jitter: f32 = state.rng.random();

    let (kind, y, width, height) = if roll > 0.9 {
        // Floating pickup, always above bird height
        (ObstacleKind::Coin, -120.0 - jitter * 100.0, 35.0, 35.0)
    } else if roll > 0.7 {
        // Airborne hazard the runner ducks under by staying grounded
        (ObstacleKind::Bird, -80.0 - jitter * 100.0, 60.0, 45.0)
    } else {
        // Ground hazard of varying height
        (ObstacleKind::Cactus, 0.0, 40.0, 50.0 + jitter * 30.0)
    };

    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        kind,
        x: CANVAS_WIDTH,
        y,
        width,
        height,
        collected: false,
    });
}

/// Pick the next spawn time, compressed by how far above the starting
/// speed the run currently is.
pub fn schedule_next_spawn(state: &mut GameState) {
    let delay = SPAWN_DELAY_BASE_MS + state.rng.random::<f64>() * SPAWN_DELAY_RANGE_MS;
    let ratio = (state.speed / INITIAL_SPEED) as f64;
    state.next_spawn_ms = state.time_ms + delay / ratio;
}
