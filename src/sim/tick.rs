//! Fixed-cadence animation driver
//!
//! One call to `tick` is one discrete animation step. The outcome of a run is
//! decided by the verdict captured in `start`; ticks only play it out.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{
    AnimationState, CueEvent, RunPhase, RunSetup, RunToken, SimEvent, SoundCue, SplashParticle,
};
use super::verdict::calculate_score;
use crate::consts::*;

/// Splash droplets fall back at this rate (per tick)
const SPLASH_GRAVITY: f32 = 0.3;
/// Life lost per tick
const SPLASH_DECAY: f32 = 0.025;

/// Begin a new run. Any previous run is cancelled; its token goes stale.
pub fn start(state: &mut AnimationState, setup: RunSetup) -> RunToken {
    reset(state);
    log::info!(
        "run {} started: {} over {} segments ({})",
        state.run_id,
        setup.load.name,
        setup.segment_count,
        if setup.verdict.will_succeed {
            "will hold"
        } else {
            "will collapse"
        }
    );
    state.phase = RunPhase::Approaching;
    state.run = Some(setup);
    state.token()
}

/// Return to Idle from any phase and invalidate every outstanding token
pub fn reset(state: &mut AnimationState) {
    let run_id = state.run_id + 1;
    *state = AnimationState::new();
    state.run_id = run_id;
}

/// Advance the run by one step.
///
/// Returns false when the tick was ignored: stale token, no run, or a
/// terminal phase with nothing left to animate.
pub fn tick(state: &mut AnimationState, token: RunToken) -> bool {
    if token != state.token() {
        log::trace!("dropping stale tick for run {} (current {})", token.0, state.run_id);
        return false;
    }
    if state.run.is_none() {
        return false;
    }

    match state.phase {
        RunPhase::Idle => return false,
        RunPhase::Approaching | RunPhase::OnBridge => advance(state),
        RunPhase::Collapsing => collapse(state),
        RunPhase::Crossed => finish_success(state),
        RunPhase::Succeeded => return false,
        RunPhase::Failed => {
            if !settling(state) {
                return false;
            }
            fall_segments(state);
            update_particles(state);
        }
    }

    state.ticks += 1;
    true
}

/// Whether further ticks would change anything
pub fn needs_ticks(state: &AnimationState) -> bool {
    state.phase.is_running() || (state.phase == RunPhase::Failed && settling(state))
}

/// Debris still falling or splash still in the air after a failure
fn settling(state: &AnimationState) -> bool {
    !state.particles.is_empty() || state.segment_fall_offsets.iter().any(|&y| y <= SEGMENT_LANDED)
}

fn advance(state: &mut AnimationState) {
    let Some(run) = state.run.as_ref() else {
        return;
    };
    let will_succeed = run.verdict.will_succeed;
    let has_deck = run.segment_count > 0;

    state.object_position += run.load.traversal_speed;

    if !will_succeed && has_deck && state.object_position >= GAP_START {
        // Fast loads can step past the span in one tick; pin them to it
        state.object_position = state.object_position.min(GAP_END);
        state.object_vertical_offset = STANDING_LIFT;
        begin_collapse(state);
        return;
    }

    let over_gap = has_deck && (GAP_START..=GAP_END).contains(&state.object_position);
    if over_gap {
        state.object_vertical_offset = STANDING_LIFT;
        state.phase = RunPhase::OnBridge;
    } else {
        state.object_vertical_offset = 0.0;
        state.phase = RunPhase::Approaching;
    }

    if state.object_position >= FAR_SIDE {
        state.phase = RunPhase::Crossed;
    }
}

fn begin_collapse(state: &mut AnimationState) {
    let count = state.run.as_ref().map_or(0, |r| r.segment_count);
    log::info!("run {}: bridge collapsing", state.run_id);
    state.phase = RunPhase::Collapsing;
    state.segment_fall_offsets = vec![0.0; count];
}

/// Segments and object fall independently; the run fails as soon as the
/// object is down, and segments keep falling after that
fn collapse(state: &mut AnimationState) {
    fall_segments(state);
    state.object_vertical_offset += OBJECT_FALL_RATE;
    if state.object_vertical_offset > OBJECT_FALL_LIMIT {
        finish_failure(state);
    }
}

fn fall_segments(state: &mut AnimationState) {
    for (i, offset) in state.segment_fall_offsets.iter_mut().enumerate() {
        if *offset <= SEGMENT_LANDED {
            *offset += SEGMENT_FALL_BASE + i as f32 * SEGMENT_FALL_STEP;
        }
    }
}

fn finish_success(state: &mut AnimationState) {
    let Some(run) = state.run.as_ref() else {
        return;
    };
    let result = calculate_score(&run.verdict, &run.ledger, &run.load);
    log::info!(
        "run {} succeeded: {} stars, {}% efficiency",
        state.run_id,
        result.stars,
        result.efficiency_rounded()
    );

    state.phase = RunPhase::Succeeded;
    state.object_vertical_offset = 0.0;
    state.events.push(SimEvent::Cue(CueEvent::now(SoundCue::Success)));
    state.events.push(SimEvent::Cue(CueEvent::after(
        SoundCue::Applause,
        APPLAUSE_DELAY_MS,
    )));
    state.events.push(SimEvent::Succeeded(result));
}

fn finish_failure(state: &mut AnimationState) {
    let Some(run) = state.run.as_ref() else {
        return;
    };
    let result = calculate_score(&run.verdict, &run.ledger, &run.load);
    let seed = run.splash_seed ^ state.run_id;
    log::info!("run {} failed: {} fell in", state.run_id, run.load.name);

    state.phase = RunPhase::Failed;
    state.particles = spawn_splash(state.object_position, seed);
    state.events.push(SimEvent::Cue(CueEvent::now(SoundCue::Failure)));
    state.events.push(SimEvent::Cue(CueEvent::after(
        SoundCue::Splash,
        SPLASH_DELAY_MS,
    )));
    state.events.push(SimEvent::Failed(result));
}

fn spawn_splash(x: f32, seed: u64) -> Vec<SplashParticle> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..SPLASH_PARTICLES)
        .map(|_| SplashParticle {
            pos: Vec2::new(x + rng.random_range(-10.0..10.0), WATER_Y),
            vel: Vec2::new(rng.random_range(-1.5..1.5), rng.random_range(-6.0..-3.0)),
            life: 1.0,
            size: rng.random_range(2.0..5.0),
        })
        .collect()
}

fn update_particles(state: &mut AnimationState) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.vel.y += SPLASH_GRAVITY;
        particle.life -= SPLASH_DECAY;
    }
    state.particles.retain(|p| p.life > 0.0);
}
