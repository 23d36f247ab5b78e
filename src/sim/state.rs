//! Animation state and the events it emits
//!
//! Owned exclusively by the driver in `tick`. Nothing here references the
//! assembly: a run carries its own frozen copy of what it needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::assembly::BudgetLedger;
use super::catalog::{LoadSpec, Material};
use super::verdict::{LevelResult, TestVerdict};
use crate::consts::START_POSITION;

/// Where a run is in its choreography
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run; nothing traveling
    #[default]
    Idle,
    /// Rolling along solid ground (either bank)
    Approaching,
    /// Over the gap, riding the deck
    OnBridge,
    /// Deck gave way; segments and object are falling
    Collapsing,
    /// Reached the far side; reported on the next tick
    Crossed,
    Succeeded,
    Failed,
}

impl RunPhase {
    /// A run has started and not yet reached a terminal phase
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            RunPhase::Approaching | RunPhase::OnBridge | RunPhase::Collapsing | RunPhase::Crossed
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Succeeded | RunPhase::Failed)
    }
}

/// Named sound cue for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// A segment was placed; the adapter picks a cue per material
    Construction(Material),
    Success,
    Failure,
    Splash,
    Applause,
}

/// A cue plus how long after "now" it should start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueEvent {
    pub cue: SoundCue,
    pub delay_ms: u32,
}

impl CueEvent {
    pub fn now(cue: SoundCue) -> Self {
        Self { cue, delay_ms: 0 }
    }

    pub fn after(cue: SoundCue, delay_ms: u32) -> Self {
        Self { cue, delay_ms }
    }
}

/// Events produced by the driver, drained by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Cue(CueEvent),
    Succeeded(LevelResult),
    Failed(LevelResult),
}

/// Everything a run needs, captured when the test starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSetup {
    pub verdict: TestVerdict,
    pub load: LoadSpec,
    pub segment_count: usize,
    pub ledger: BudgetLedger,
    /// Seed for the splash burst
    pub splash_seed: u64,
}

/// Identifies the run a scheduled tick belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunToken(pub u64);

/// A splash droplet (cosmetic only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplashParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Transient per-run animation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub phase: RunPhase,
    /// Horizontal scene position of the traveling object
    pub object_position: f32,
    /// Vertical offset from the ground line (negative is up)
    pub object_vertical_offset: f32,
    /// Fall offset per segment, one entry per segment once collapsing
    pub segment_fall_offsets: Vec<f32>,
    /// Ticks since the run started
    pub ticks: u64,
    pub particles: Vec<SplashParticle>,
    /// Frozen setup of the current run
    #[serde(skip)]
    pub(crate) run: Option<RunSetup>,
    /// Bumped on every start and reset
    pub(crate) run_id: u64,
    #[serde(skip)]
    pub(crate) events: Vec<SimEvent>,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            object_position: START_POSITION,
            object_vertical_offset: 0.0,
            segment_fall_offsets: Vec::new(),
            ticks: 0,
            particles: Vec::new(),
            run: None,
            run_id: 0,
            events: Vec::new(),
        }
    }

    /// The object is advancing horizontally
    pub fn is_moving(&self) -> bool {
        matches!(self.phase, RunPhase::Approaching | RunPhase::OnBridge)
    }

    pub fn has_collapsed(&self) -> bool {
        matches!(self.phase, RunPhase::Collapsing | RunPhase::Failed)
    }

    /// Whether a traveling object should be drawn
    pub fn object_visible(&self) -> bool {
        self.phase != RunPhase::Idle
    }

    pub fn verdict(&self) -> Option<&TestVerdict> {
        self.run.as_ref().map(|r| &r.verdict)
    }

    pub fn load(&self) -> Option<&LoadSpec> {
        self.run.as_ref().map(|r| &r.load)
    }

    /// Token of the run currently in flight
    pub fn token(&self) -> RunToken {
        RunToken(self.run_id)
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
