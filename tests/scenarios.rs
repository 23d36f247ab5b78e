//! End-to-end load tests through the session API with a manual clock

use bridge_builder::consts::{MAX_SEGMENTS, START_POSITION};
use bridge_builder::sim::{Load, Material, RunPhase, Shape};
use bridge_builder::{BridgeSession, BuildError, SessionEvent, Settings};
use proptest::prelude::*;

fn session_with_budget(starting_budget: u32) -> BridgeSession {
    BridgeSession::new(Settings {
        starting_budget,
        ..Settings::default()
    })
}

fn build(session: &mut BridgeSession, material: Material, shape: Shape, count: usize) {
    session.select_material(material).unwrap();
    session.select_shape(shape).unwrap();
    for _ in 0..count {
        session.add_segment().unwrap();
    }
}

/// Tick until the run settles, returning the number of ticks taken
fn run_to_end(session: &mut BridgeSession) -> u32 {
    let mut n = 0;
    while session.is_testing() {
        assert!(session.tick());
        n += 1;
        assert!(n < 10_000, "run never finished");
    }
    n
}

#[test]
fn test_single_wood_segment_carries_person() {
    let mut session = BridgeSession::default();
    build(&mut session, Material::Wood, Shape::Straight, 1);
    session.select_load(Load::Person).unwrap();

    let verdict = session.run_test().unwrap();
    assert_eq!(verdict.required_strength, 1.0);
    assert_eq!(verdict.bridge_strength, 1.0);
    assert!(verdict.will_succeed);

    run_to_end(&mut session);
    assert_eq!(session.animation().phase, RunPhase::Succeeded);

    let result = session.last_result().unwrap();
    assert!(result.success);
    assert_eq!(result.budget_remaining, 9500);
    assert_eq!(result.efficiency_rounded(), 95);
    assert_eq!(result.stars, 3);
}

#[test]
fn test_single_wood_segment_drops_tank() {
    let mut session = BridgeSession::default();
    build(&mut session, Material::Wood, Shape::Straight, 1);
    session.select_load(Load::Tank).unwrap();

    let verdict = session.run_test().unwrap();
    assert_eq!(verdict.required_strength, 10.0);
    assert!(!verdict.will_succeed);

    run_to_end(&mut session);
    assert_eq!(session.animation().phase, RunPhase::Failed);
    let result = session.last_result().unwrap();
    assert!(!result.success);
    assert_eq!(result.stars, 0);
}

#[test]
fn test_full_steel_ibeam_deck_still_drops_tank() {
    let mut session = session_with_budget(20_000);
    build(&mut session, Material::Steel, Shape::IBeam, MAX_SEGMENTS);
    session.select_load(Load::Tank).unwrap();

    let verdict = session.run_test().unwrap();
    assert_eq!(verdict.bridge_strength, 80.0);
    assert_eq!(verdict.required_strength, 100.0);
    assert!(!verdict.will_succeed);

    run_to_end(&mut session);
    assert_eq!(session.animation().phase, RunPhase::Failed);
}

#[test]
fn test_short_budget_leaves_assembly_untouched() {
    let mut session = session_with_budget(900);
    build(&mut session, Material::Wood, Shape::Straight, 1);
    let before = session.snapshot();
    assert_eq!(before.budget.remaining, 400);

    let err = session.add_segment().unwrap_err();
    assert_eq!(
        err,
        BuildError::InsufficientBudget {
            needed: 500,
            remaining: 400
        }
    );

    let after = session.snapshot();
    assert_eq!(after.segments, before.segments);
    assert_eq!(after.budget, before.budget);
}

#[test]
fn test_clear_mid_collapse_stops_old_run() {
    let mut session = BridgeSession::default();
    build(&mut session, Material::Wood, Shape::Straight, 3);
    session.select_load(Load::Truck).unwrap();
    session.run_test().unwrap();

    while session.animation().phase != RunPhase::Collapsing {
        assert!(session.tick());
    }
    session.clear_assembly();

    let idle = session.animation().clone();
    assert_eq!(idle.phase, RunPhase::Idle);
    assert_eq!(idle.object_position, START_POSITION);
    assert!(idle.segment_fall_offsets.is_empty());

    // Fake clock keeps running after the reset
    for _ in 0..50 {
        assert_eq!(session.advance(0.05), 0);
        assert!(!session.tick());
    }
    assert_eq!(session.animation(), &idle);
    assert!(session.assembly().is_empty());
    assert!(
        !session
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::Failed(_)))
    );
}

#[test]
fn test_wall_clock_drives_run_to_completion() {
    let mut session = BridgeSession::default();
    build(&mut session, Material::Stone, Shape::Arch, 2);
    session.select_load(Load::Car).unwrap();
    session.run_test().unwrap();

    // 60 fps frames
    let mut frames = 0;
    while session.is_testing() {
        session.advance(1.0 / 60.0);
        frames += 1;
        assert!(frames < 10_000);
    }
    assert_eq!(session.animation().phase, RunPhase::Succeeded);

    let cues: Vec<_> = session
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::Cue(cue) => Some(cue.delay_ms),
            _ => None,
        })
        .collect();
    // Two construction cues, then success and delayed applause
    assert_eq!(cues, vec![0, 0, 0, 500]);
}

#[test]
fn test_level_progression() {
    let mut session = BridgeSession::default();
    // Steel I-beam (8 per segment) holds everything lighter than the tank
    for load in [Load::Person, Load::Car, Load::Truck, Load::Bus] {
        assert_eq!(session.selection().load, load);
        build(&mut session, Material::Steel, Shape::IBeam, 1);
        session.run_test().unwrap();
        run_to_end(&mut session);
        assert_eq!(session.animation().phase, RunPhase::Succeeded);
        assert_eq!(session.next_load(), load.next());
        assert!(session.assembly().is_empty());
    }
    assert_eq!(session.selection().load, Load::Tank);
    assert_eq!(session.next_load(), None);
    assert_eq!(session.scoreboard().entries().len(), 4);
}

#[derive(Debug, Clone)]
enum Action {
    Material(Material),
    Shape(Shape),
    Load(Load),
    Add,
    Clear,
    Run,
    Tick(u8),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => proptest::sample::select(Material::ALL.to_vec()).prop_map(Action::Material),
        1 => proptest::sample::select(Shape::ALL.to_vec()).prop_map(Action::Shape),
        1 => proptest::sample::select(Load::ALL.to_vec()).prop_map(Action::Load),
        3 => Just(Action::Add),
        1 => Just(Action::Clear),
        1 => Just(Action::Run),
        2 => (1u8..200).prop_map(Action::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_session_invariants_hold(actions in proptest::collection::vec(action(), 1..60)) {
        let mut session = BridgeSession::default();
        for action in actions {
            match action {
                Action::Material(m) => { let _ = session.select_material(m); }
                Action::Shape(s) => { let _ = session.select_shape(s); }
                Action::Load(l) => { let _ = session.select_load(l); }
                Action::Add => { let _ = session.add_segment(); }
                Action::Clear => session.clear_assembly(),
                Action::Run => { let _ = session.run_test(); }
                Action::Tick(n) => {
                    for _ in 0..n {
                        session.tick();
                    }
                }
            }

            let snap = session.snapshot();
            prop_assert_eq!(snap.budget.spent + snap.budget.remaining, snap.budget.starting);
            prop_assert!(snap.segments.len() <= MAX_SEGMENTS);
            let spent: u32 = snap.segments.iter().map(|s| s.cost).sum();
            prop_assert_eq!(spent, snap.budget.spent);

            // A settled run always agrees with its verdict
            if let (Some(verdict), Some(result)) = (snap.last_verdict, snap.last_result.as_ref()) {
                prop_assert_eq!(verdict.will_succeed, result.success);
            }
            if snap.animation.phase == RunPhase::Idle {
                prop_assert!(snap.animation.particles.is_empty());
            }
        }
    }
}
