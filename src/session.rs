//! UI-facing session
//!
//! Owns the catalog, the assembly and the animation as separate pieces. The
//! assembly is only touched by player actions; the animation is only touched
//! by the driver. Everything the UI needs comes back through `snapshot` and
//! `drain_events`.

use serde::Serialize;

use crate::error::BuildError;
use crate::scoreboard::Scoreboard;
use crate::settings::{Settings, SettingsError};
use crate::sim::{
    self, AnimationState, Assembly, BudgetBand, BudgetLedger, Catalog, CueEvent, LevelResult,
    Load, Material, RunPhase, RunSetup, Segment, Shape, SoundCue, TestVerdict, Ticker,
};

pub use crate::sim::SimEvent as SessionEvent;

/// What the player currently has picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub material: Material,
    pub shape: Shape,
    pub load: Load,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            material: Material::Wood,
            shape: Shape::Straight,
            load: Load::Person,
        }
    }
}

/// Read-only view for rendering
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub selection: Selection,
    pub segments: Vec<Segment>,
    pub budget: BudgetLedger,
    pub budget_band: BudgetBand,
    /// Per material, whether one more segment of it fits the budget
    pub affordable: Vec<(Material, bool)>,
    pub can_add_segment: bool,
    pub can_run_test: bool,
    pub animation: AnimationState,
    pub last_verdict: Option<TestVerdict>,
    pub last_result: Option<LevelResult>,
    pub total_stars: u32,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub struct BridgeSession {
    catalog: Catalog,
    settings: Settings,
    selection: Selection,
    assembly: Assembly,
    anim: AnimationState,
    ticker: Ticker,
    last_verdict: Option<TestVerdict>,
    last_result: Option<LevelResult>,
    scoreboard: Scoreboard,
    events: Vec<SessionEvent>,
}

impl Default for BridgeSession {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl BridgeSession {
    pub fn new(settings: Settings) -> Self {
        Self::with_catalog(Catalog::standard(), settings)
    }

    pub fn with_catalog(catalog: Catalog, settings: Settings) -> Self {
        Self {
            catalog,
            selection: Selection::default(),
            assembly: Assembly::new(settings.starting_budget),
            anim: AnimationState::new(),
            ticker: Ticker::new(settings.tick_ms),
            last_verdict: None,
            last_result: None,
            scoreboard: Scoreboard::new(),
            events: Vec::new(),
            settings,
        }
    }

    // === Inbound ===

    pub fn select_material(&mut self, material: Material) -> Result<(), BuildError> {
        self.selection.material = material;
        Ok(())
    }

    pub fn select_shape(&mut self, shape: Shape) -> Result<(), BuildError> {
        self.selection.shape = shape;
        Ok(())
    }

    /// Changing the load mid-run would desync the picker from what is on
    /// screen, so it waits for the run to end
    pub fn select_load(&mut self, load: Load) -> Result<(), BuildError> {
        if self.anim.phase.is_running() {
            return Err(self.reject(BuildError::TestAlreadyRunning));
        }
        self.selection.load = load;
        Ok(())
    }

    /// Buy a segment of the selected material and shape
    pub fn add_segment(&mut self) -> Result<Segment, BuildError> {
        if let Err(err) = self.check_buildable() {
            return Err(self.reject(err));
        }

        let Selection {
            material, shape, ..
        } = self.selection;
        let placed = self
            .assembly
            .add_segment(&self.catalog, material, shape)
            .copied();
        let segment = match placed {
            Ok(segment) => segment,
            Err(err) => return Err(self.reject(err)),
        };

        // Building on a bridge that already held clears the finished run
        if self.anim.phase == RunPhase::Succeeded {
            self.cancel_run();
        }
        self.last_verdict = None;

        log::info!(
            "placed {} {} for ${} ({} left)",
            material.as_str(),
            shape.as_str(),
            segment.cost,
            self.assembly.remaining()
        );
        self.events.push(SessionEvent::Cue(CueEvent::now(SoundCue::Construction(
            material,
        ))));
        Ok(segment)
    }

    /// Tear everything down: cancel the run, then refund the budget
    pub fn clear_assembly(&mut self) {
        self.cancel_run();
        self.assembly.clear();
        self.last_verdict = None;
        self.last_result = None;
        log::info!("bridge cleared");
    }

    /// Evaluate the bridge against the selected load and start the run
    pub fn run_test(&mut self) -> Result<TestVerdict, BuildError> {
        if self.anim.phase.is_running() {
            return Err(self.reject(BuildError::TestAlreadyRunning));
        }
        if self.anim.phase == RunPhase::Failed {
            return Err(self.reject(BuildError::BridgeCollapsed));
        }
        if self.assembly.is_empty() {
            return Err(self.reject(BuildError::AssemblyEmpty));
        }

        let load = self.catalog.load(self.selection.load).clone();
        let verdict = sim::evaluate(&self.catalog, &self.assembly, &load);
        let setup = RunSetup {
            verdict,
            load,
            segment_count: self.assembly.len(),
            ledger: self.assembly.ledger(),
            splash_seed: self.settings.splash_seed,
        };

        let token = sim::start(&mut self.anim, setup);
        self.ticker.arm(token);
        self.last_verdict = Some(verdict);
        self.last_result = None;
        Ok(verdict)
    }

    /// Move on to the next heavier load with a fresh bridge.
    /// Returns the new load, or None when already at the heaviest.
    pub fn next_load(&mut self) -> Option<Load> {
        let next = self.selection.load.next()?;
        self.clear_assembly();
        self.selection.load = next;
        log::info!("next load: {}", next.as_str());
        Some(next)
    }

    /// Start over with the same load
    pub fn try_again(&mut self) {
        self.clear_assembly();
    }

    /// Apply new settings. Cadence changes take effect from the next run;
    /// the starting budget only applies to new sessions.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        if self.ticker.armed().is_none() {
            self.ticker = Ticker::new(settings.tick_ms);
        }
        self.settings = settings;
        Ok(())
    }

    // === Clock ===

    /// Feed a wall-clock frame delta (seconds). Returns the ticks applied.
    pub fn advance(&mut self, dt: f32) -> u32 {
        let Some((token, due)) = self.ticker.advance(dt) else {
            return 0;
        };
        let mut applied = 0;
        for _ in 0..due {
            if !sim::tick(&mut self.anim, token) {
                break;
            }
            applied += 1;
        }
        self.after_ticks();
        applied
    }

    /// Apply exactly one tick for the armed run, if any
    pub fn tick(&mut self) -> bool {
        let Some(token) = self.ticker.armed() else {
            return false;
        };
        let applied = sim::tick(&mut self.anim, token);
        self.after_ticks();
        applied
    }

    pub fn is_testing(&self) -> bool {
        self.anim.phase.is_running()
    }

    // === Outbound ===

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        let affordable = Material::ALL
            .iter()
            .map(|&m| (m, self.assembly.can_afford(&self.catalog, m)))
            .collect();
        Snapshot {
            selection: self.selection,
            segments: self.assembly.segments().to_vec(),
            budget: self.assembly.ledger(),
            budget_band: self.assembly.ledger().band(),
            affordable,
            can_add_segment: self.check_buildable().is_ok()
                && !self.assembly.is_full()
                && self
                    .assembly
                    .can_afford(&self.catalog, self.selection.material),
            can_run_test: !self.anim.phase.is_running()
                && self.anim.phase != RunPhase::Failed
                && !self.assembly.is_empty(),
            animation: self.anim.clone(),
            last_verdict: self.last_verdict,
            last_result: self.last_result.clone(),
            total_stars: self.scoreboard.total_stars(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn animation(&self) -> &AnimationState {
        &self.anim
    }

    pub fn last_result(&self) -> Option<&LevelResult> {
        self.last_result.as_ref()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    // === Internals ===

    fn check_buildable(&self) -> Result<(), BuildError> {
        if self.anim.phase.is_running() {
            Err(BuildError::TestAlreadyRunning)
        } else if self.anim.phase == RunPhase::Failed {
            Err(BuildError::BridgeCollapsed)
        } else {
            Ok(())
        }
    }

    fn reject(&self, err: BuildError) -> BuildError {
        log::info!("rejected: {}", err);
        err
    }

    /// Stop ticks first so nothing lands on the state we are about to reset
    fn cancel_run(&mut self) {
        self.ticker.cancel();
        sim::reset(&mut self.anim);
    }

    fn after_ticks(&mut self) {
        for event in self.anim.drain_events() {
            if let SessionEvent::Succeeded(result) | SessionEvent::Failed(result) = &event {
                if let Some(load) = self.anim.load().map(|l| l.id) {
                    if self.scoreboard.record(load, result) {
                        log::info!("new best for {}: {} stars", load.as_str(), result.stars);
                    }
                }
                self.last_result = Some(result.clone());
            }
            self.events.push(event);
        }
        if !sim::needs_ticks(&self.anim) {
            self.ticker.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish(session: &mut BridgeSession) {
        let mut n = 0;
        while session.is_testing() {
            session.tick();
            n += 1;
            assert!(n < 10_000);
        }
    }

    #[test]
    fn test_add_segment_emits_construction_cue() {
        let mut session = BridgeSession::default();
        session.select_material(Material::Steel).unwrap();
        session.select_shape(Shape::IBeam).unwrap();
        let seg = session.add_segment().unwrap();
        assert_eq!(seg.cost, 2000);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::Cue(CueEvent::now(SoundCue::Construction(
                Material::Steel
            )))]
        );
        assert_eq!(session.snapshot().budget.remaining, 8000);
    }

    #[test]
    fn test_empty_bridge_cannot_be_tested() {
        let mut session = BridgeSession::default();
        assert_eq!(session.run_test(), Err(BuildError::AssemblyEmpty));
        assert_eq!(session.animation().phase, RunPhase::Idle);
        assert!(!session.snapshot().can_run_test);
    }

    #[test]
    fn test_reentrancy_is_rejected() {
        let mut session = BridgeSession::default();
        session.add_segment().unwrap();
        session.run_test().unwrap();
        assert!(session.is_testing());
        assert_eq!(session.run_test(), Err(BuildError::TestAlreadyRunning));
        assert_eq!(session.add_segment(), Err(BuildError::TestAlreadyRunning));
        assert_eq!(
            session.select_load(Load::Tank),
            Err(BuildError::TestAlreadyRunning)
        );
        assert_eq!(session.assembly().len(), 1);
    }

    #[test]
    fn test_collapsed_bridge_must_be_cleared() {
        let mut session = BridgeSession::default();
        session.select_load(Load::Tank).unwrap();
        session.add_segment().unwrap();
        session.run_test().unwrap();
        finish(&mut session);
        assert_eq!(session.animation().phase, RunPhase::Failed);

        assert_eq!(session.run_test(), Err(BuildError::BridgeCollapsed));
        assert_eq!(session.add_segment(), Err(BuildError::BridgeCollapsed));

        session.try_again();
        assert_eq!(session.animation().phase, RunPhase::Idle);
        assert!(session.add_segment().is_ok());
    }

    #[test]
    fn test_success_allows_building_on() {
        let mut session = BridgeSession::default();
        session.add_segment().unwrap();
        session.run_test().unwrap();
        finish(&mut session);
        assert_eq!(session.animation().phase, RunPhase::Succeeded);
        assert_eq!(session.scoreboard().total_stars(), 3);

        session.add_segment().unwrap();
        assert_eq!(session.animation().phase, RunPhase::Idle);
        assert_eq!(session.assembly().len(), 2);
        // A held bridge can be tested again
        assert!(session.run_test().is_ok());
    }

    #[test]
    fn test_events_carry_result() {
        let mut session = BridgeSession::default();
        session.add_segment().unwrap();
        session.drain_events();
        session.run_test().unwrap();
        finish(&mut session);

        let events = session.drain_events();
        let result = events.iter().find_map(|e| match e {
            SessionEvent::Succeeded(r) => Some(r.clone()),
            _ => None,
        });
        assert_eq!(result.as_ref(), session.last_result());
        assert_eq!(result.map(|r| r.load_type), Some("Person".to_string()));
    }

    #[test]
    fn test_next_load_advances_and_clears() {
        let mut session = BridgeSession::default();
        session.add_segment().unwrap();
        assert_eq!(session.next_load(), Some(Load::Car));
        assert!(session.assembly().is_empty());
        assert_eq!(session.selection().load, Load::Car);

        session.select_load(Load::Tank).unwrap();
        assert_eq!(session.next_load(), None);
        assert_eq!(session.selection().load, Load::Tank);
    }

    #[test]
    fn test_advance_uses_fixed_steps() {
        let mut session = BridgeSession::default();
        session.add_segment().unwrap();
        assert_eq!(session.advance(0.1), 0);

        session.run_test().unwrap();
        let start = session.animation().object_position;
        let applied = session.advance(0.05);
        assert_eq!(applied, 2);
        assert_eq!(session.animation().object_position, start + 4.0);
    }

    #[test]
    fn test_snapshot_flags() {
        let mut settings = Settings::default();
        settings.starting_budget = 1_500;
        let mut session = BridgeSession::new(settings);
        session.select_material(Material::Stone).unwrap();
        session.add_segment().unwrap();

        let snap = session.snapshot();
        assert_eq!(snap.budget.remaining, 700);
        assert_eq!(snap.budget_band, BudgetBand::Low);
        // Stone no longer fits, wood still does
        assert!(!snap.can_add_segment);
        assert!(snap.can_run_test);
        assert_eq!(
            snap.affordable,
            vec![
                (Material::Wood, true),
                (Material::Stone, false),
                (Material::Concrete, false),
                (Material::Steel, false),
            ]
        );
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"budget_band\":\"Low\""));
    }

    #[test]
    fn test_host_catalog_charges_selected_material() {
        let mut json = serde_json::to_value(Catalog::standard()).unwrap();
        json["materials"].as_array_mut().unwrap().reverse();
        let catalog: Catalog = serde_json::from_value(json).unwrap();

        let mut session = BridgeSession::with_catalog(catalog, Settings::default());
        session.select_material(Material::Wood).unwrap();
        let seg = session.add_segment().unwrap();
        assert_eq!(seg.material, Material::Wood);
        assert_eq!(seg.cost, 500);
        assert_eq!(session.snapshot().budget.remaining, 9500);
    }

    #[test]
    fn test_update_settings_validates() {
        let mut session = BridgeSession::default();
        let mut settings = Settings::default();
        settings.volume = 101;
        assert!(session.update_settings(settings).is_err());
        let mut settings = Settings::default();
        settings.volume = 10;
        assert!(session.update_settings(settings).is_ok());
        assert_eq!(session.settings().volume, 10);
    }
}
