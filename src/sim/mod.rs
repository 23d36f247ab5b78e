//! Deterministic simulation module
//!
//! All bridge logic lives here. This module must be pure and deterministic:
//! - One discrete step per tick, no wall clock
//! - Outcome decided once, before the first tick
//! - Seeded RNG only, and only for cosmetics
//! - No rendering or platform dependencies

pub mod assembly;
pub mod catalog;
pub mod clock;
pub mod layout;
pub mod state;
pub mod tick;
pub mod verdict;

pub use assembly::{Assembly, BudgetBand, BudgetLedger, Segment};
pub use catalog::{Catalog, CatalogError, Load, LoadSpec, Material, MaterialSpec, Shape, ShapeSpec};
pub use clock::Ticker;
pub use state::{
    AnimationState, CueEvent, RunPhase, RunSetup, RunToken, SimEvent, SoundCue, SplashParticle,
};
pub use tick::{needs_ticks, reset, start, tick};
pub use verdict::{LevelResult, TestVerdict, calculate_score, evaluate};
