//! Fixed timestep simulation tick
//!
//! Core game loop that advances one run deterministically. All mutation of
//! [`GameState`] happens here (or in the `GameState` helpers this calls);
//! the shell only supplies inputs and drains events.

use crate::consts::*;

use super::collision::{obstacle_box, runner_box};
use super::spawn::{schedule_next_spawn, spawn_obstacle};
use super::state::{GameEvent, GameState, MilestoneKind, ObstacleKind, PARTICLE_GOLD, Status};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump impulse; on the title and game over screens this starts a run
    pub jump: bool,
}

/// Advance the game state by one fixed timestep of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    // Shake ramps down linearly, in every phase
    if state.screen_shake > 0.0 {
        state.screen_shake = (state.screen_shake - (dt_ms / SHAKE_DURATION_MS) as f32).max(0.0);
    }

    match state.status {
        Status::Start | Status::GameOver => {
            if input.jump {
                state.start_run();
            }
        }
        Status::Playing => playing_tick(state, input, dt_ms),
    }

    // Bursts keep falling on the game over screen
    age_particles(state);
}

fn playing_tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    state.time_ms += dt_ms;

    // Milestones fire off the totals committed by previous ticks
    let distance_step = (state.score / MILESTONE_DISTANCE_STEP) as u32;
    if distance_step > state.distance_milestone {
        state.distance_milestone = distance_step;
        state.events.push(GameEvent::Milestone(MilestoneKind::Distance));
    }
    let coin_step = state.coins / MILESTONE_COIN_STEP;
    if coin_step > state.coin_milestone && state.coins > 0 {
        state.coin_milestone = coin_step;
        state.events.push(GameEvent::Milestone(MilestoneKind::Coins));
    }

    // Kinematics go to locals first; they commit only if the frame ends
    // without a crash, so the runner freezes at the moment of impact
    let mut vy = state.runner_vy;
    let mut jumping = state.is_jumping;
    if input.jump && !jumping {
        vy = JUMP_FORCE;
        jumping = true;
        state.events.push(GameEvent::Jump);
    }
    let mut new_y = state.runner_y + vy;
    let mut new_vy = vy + GRAVITY;
    if new_y >= 0.0 {
        new_y = 0.0;
        new_vy = 0.0;
        jumping = false;
    }

    if state.time_ms > state.next_spawn_ms {
        spawn_obstacle(state);
        schedule_next_spawn(state);
    }

    // Advance, cull, and collide. A just-spawned obstacle takes its first
    // step on the same tick.
    let runner = runner_box(new_y);
    let speed = state.speed;
    let mut coins_earned = 0u32;
    let mut crashed = false;

    let obstacles = std::mem::take(&mut state.obstacles);
    let mut kept = Vec::with_capacity(obstacles.len());
    for mut obs in obstacles {
        obs.x -= speed;
        if obs.x + obs.width < -OFFSCREEN_MARGIN {
            continue;
        }
        if runner.overlaps(&obstacle_box(&obs)) {
            match obs.kind {
                ObstacleKind::Coin if !obs.collected => {
                    obs.collected = true;
                    coins_earned += 1;
                    state.events.push(GameEvent::Coin);
                    state.spawn_burst(
                        obs.x + 17.0,
                        GROUND_Y + obs.y - 17.0,
                        PARTICLE_GOLD,
                        COIN_BURST_COUNT,
                    );
                    // Banked coins leave the field immediately
                    continue;
                }
                // A coin that was already banked is inert
                ObstacleKind::Coin => {}
                _ => crashed = true,
            }
        }
        kept.push(obs);
    }
    state.obstacles = kept;

    if crashed {
        state.end_run();
        return;
    }

    state.score += dt_ms * SCORE_RATE;
    state.coins += coins_earned;
    state.runner_y = new_y;
    state.runner_vy = new_vy;
    state.is_jumping = jumping;
    state.speed = (state.speed + SPEED_INCREMENT).min(MAX_SPEED);
}

fn age_particles(state: &mut GameState) {
    for p in state.particles.iter_mut() {
        p.pos += p.vel;
        p.vel.y += PARTICLE_GRAVITY;
        p.life -= PARTICLE_DECAY;
    }
    state.particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Obstacle;
    use proptest::prelude::*;

    /// A fresh run with spawning suppressed, so tests control the field
    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start_run();
        state.events.clear();
        state.next_spawn_ms = f64::INFINITY;
        state
    }

    fn inject(state: &mut GameState, kind: ObstacleKind, x: f32, y: f32, collected: bool) {
        let (width, height) = match kind {
            ObstacleKind::Cactus => (40.0, 60.0),
            ObstacleKind::Bird => (60.0, 45.0),
            ObstacleKind::Coin => (35.0, 35.0),
        };
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind,
            x,
            y,
            width,
            height,
            collected,
        });
    }

    #[test]
    fn test_jump_starts_run_from_title() {
        let mut state = GameState::new(1);
        assert_eq!(state.status, Status::Start);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.status, Status::Start);

        tick(&mut state, &TickInput { jump: true }, SIM_DT_MS);
        assert_eq!(state.status, Status::Playing);
        assert!(state.events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_jump_restarts_run_from_game_over() {
        let mut state = playing_state(1);
        state.end_run();
        let crash_time = state.time_ms;

        tick(&mut state, &TickInput { jump: true }, SIM_DT_MS);

        assert_eq!(state.status, Status::Playing);
        assert_eq!(state.score, 0.0);
        // Clock survives the restart
        assert_eq!(state.time_ms, crash_time);
    }

    #[test]
    fn test_score_accrues_at_fixed_rate() {
        let mut state = playing_state(1);
        for _ in 0..1000 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
        }
        let expected = 1000.0 * SIM_DT_MS * SCORE_RATE;
        assert!((state.score - expected).abs() < 1e-6);
        assert_eq!(state.coins, 0);
        assert_eq!(state.status, Status::Playing);
    }

    #[test]
    fn test_airborne_jump_is_ignored() {
        let mut state = playing_state(1);
        let jump = TickInput { jump: true };

        tick(&mut state, &jump, SIM_DT_MS);
        assert!(state.is_jumping);
        let vy_after_first = state.runner_vy;

        tick(&mut state, &jump, SIM_DT_MS);
        // Second press did not reset the impulse
        assert_eq!(state.runner_vy, vy_after_first + GRAVITY);
        let jumps = state.events.iter().filter(|e| **e == GameEvent::Jump).count();
        assert_eq!(jumps, 1);
    }

    #[test]
    fn test_jump_arc_returns_to_ground() {
        let mut state = playing_state(1);
        tick(&mut state, &TickInput { jump: true }, SIM_DT_MS);

        let mut apex = 0.0f32;
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
            apex = apex.min(state.runner_y);
            // Never sinks below the ground baseline
            assert!(state.runner_y <= 0.0);
        }
        assert!(apex < -150.0, "apex: {apex}");
        assert_eq!(state.runner_y, 0.0);
        assert_eq!(state.runner_vy, 0.0);
        assert!(!state.is_jumping);
    }

    #[test]
    fn test_offscreen_obstacles_are_removed() {
        let mut state = playing_state(1);
        inject(&mut state, ObstacleKind::Cactus, -140.0, 0.0, false);
        inject(&mut state, ObstacleKind::Cactus, 500.0, 0.0, false);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);

        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].x, 500.0 - INITIAL_SPEED);
    }

    #[test]
    fn test_coin_overlap_collects_and_removes() {
        let mut state = playing_state(1);
        inject(&mut state, ObstacleKind::Coin, 120.0, -20.0, false);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);

        assert_eq!(state.coins, 1);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.status, Status::Playing);
        assert_eq!(state.particles.len(), COIN_BURST_COUNT);
        assert!(state.events.contains(&GameEvent::Coin));
    }

    #[test]
    fn test_collected_coin_is_inert() {
        let mut state = playing_state(1);
        inject(&mut state, ObstacleKind::Coin, 120.0, -20.0, true);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);

        assert_eq!(state.coins, 0);
        assert_eq!(state.status, Status::Playing);
        // Still scrolling out, untouched
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_cactus_overlap_ends_run() {
        let mut state = playing_state(1);
        inject(&mut state, ObstacleKind::Cactus, RUNNER_X, 0.0, false);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);

        assert_eq!(state.status, Status::GameOver);
        assert_eq!(state.screen_shake, 1.0);
        assert!(state.events.contains(&GameEvent::Crash));
        assert_eq!(state.particles.len(), CRASH_BURST_COUNT);
    }

    #[test]
    fn test_overlapping_hazards_crash_once() {
        let mut state = playing_state(1);
        inject(&mut state, ObstacleKind::Cactus, RUNNER_X, 0.0, false);
        inject(&mut state, ObstacleKind::Cactus, RUNNER_X + 5.0, 0.0, false);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);

        assert_eq!(state.status, Status::GameOver);
        let crashes = state.events.iter().filter(|e| **e == GameEvent::Crash).count();
        assert_eq!(crashes, 1);
        assert_eq!(state.particles.len(), CRASH_BURST_COUNT);
    }

    #[test]
    fn test_crash_freezes_score_and_runner() {
        let mut state = playing_state(1);
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
        }
        let score = state.score;
        let speed = state.speed;
        inject(&mut state, ObstacleKind::Cactus, RUNNER_X, 0.0, false);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.status, Status::GameOver);
        assert_eq!(state.score, score);
        assert_eq!(state.speed, speed);
        assert_eq!(state.runner_y, 0.0);

        // Nothing accrues after the run ends
        let time = state.time_ms;
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.score, score);
        assert_eq!(state.time_ms, time);
    }

    #[test]
    fn test_speed_ramps_and_clamps() {
        let mut state = playing_state(1);
        let mut last = state.speed;
        for _ in 0..20_000 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
            assert!(state.speed >= last);
            last = state.speed;
        }
        assert_eq!(state.speed, MAX_SPEED);
    }

    #[test]
    fn test_milestones_fire_once_per_step() {
        let mut state = playing_state(1);

        let distance_events = |s: &GameState| {
            s.events
                .iter()
                .filter(|e| **e == GameEvent::Milestone(MilestoneKind::Distance))
                .count()
        };

        state.score = 1200.0;
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(distance_events(&state), 1);

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(distance_events(&state), 1);

        state.score = 2100.0;
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(distance_events(&state), 2);
    }

    #[test]
    fn test_coin_milestone_needs_coins() {
        let mut state = playing_state(1);
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert!(!state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Milestone(MilestoneKind::Coins))));

        state.coins = MILESTONE_COIN_STEP;
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert!(state
            .events
            .contains(&GameEvent::Milestone(MilestoneKind::Coins)));
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut state = playing_state(1);
        state.end_run();
        assert_eq!(state.screen_shake, 1.0);

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
        }
        assert_eq!(state.screen_shake, 0.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed play out identically under the
        // same input script, spawns and restarts included
        let mut a = GameState::new(424242);
        let mut b = GameState::new(424242);

        for i in 0..800usize {
            let input = TickInput { jump: i % 50 == 0 };
            tick(&mut a, &input, SIM_DT_MS);
            tick(&mut b, &input, SIM_DT_MS);
        }

        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.coins, b.coins);
        assert_eq!(a.speed.to_bits(), b.speed.to_bits());
        assert_eq!(a.runner_y.to_bits(), b.runner_y.to_bits());
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.events, b.events);
        assert_eq!(a.particles.len(), b.particles.len());
    }

    proptest! {
        #[test]
        fn speed_and_score_stay_bounded(ticks in 1usize..1000, jump_every in 1usize..120) {
            let mut state = playing_state(9);
            let mut last_score = state.score;
            for i in 0..ticks {
                let input = TickInput { jump: i % jump_every == 0 };
                tick(&mut state, &input, SIM_DT_MS);
                prop_assert!(state.speed >= INITIAL_SPEED);
                prop_assert!(state.speed <= MAX_SPEED);
                prop_assert!(state.score >= last_score);
                last_score = state.score;
            }
        }
    }
}
