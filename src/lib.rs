//! Bridge Builder - a budget bridge-building mini game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (catalog, assembly ledger, load test, animation driver)
//! - `session`: UI-facing facade that owns the simulation pieces
//! - `audio`: Cue routing and procedural sound effects
//! - `settings`: Session preferences and tuning
//! - `scoreboard`: Best results for the current session

pub mod audio;
pub mod error;
pub mod scoreboard;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::BuildError;
pub use scoreboard::Scoreboard;
pub use session::{BridgeSession, SessionEvent, Snapshot};
pub use settings::{MusicTrack, Settings};

/// Game configuration constants
pub mod consts {
    /// Animation tick cadence (milliseconds)
    pub const TICK_MS: u32 = 20;
    /// Slowest cadence a host may pick
    pub const MAX_TICK_MS: u32 = 50;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the ticker (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Economy
    pub const STARTING_BUDGET: u32 = 10_000;
    pub const MAX_SEGMENTS: usize = 10;
    /// Required strength per unit of load weight per segment
    pub const DIFFICULTY: f32 = 1.0;

    /// Scene geometry (800x400 canvas)
    pub const SCENE_WIDTH: f32 = 800.0;
    pub const SCENE_HEIGHT: f32 = 400.0;
    pub const GROUND_Y: f32 = SCENE_HEIGHT - 100.0;
    pub const WATER_Y: f32 = SCENE_HEIGHT - 20.0;
    pub const START_POSITION: f32 = 50.0;
    pub const GAP_START: f32 = 300.0;
    pub const GAP_END: f32 = 500.0;
    pub const FAR_SIDE: f32 = 550.0;

    /// Object lift while standing on the deck
    pub const STANDING_LIFT: f32 = -20.0;

    /// Collapse choreography (per tick)
    pub const SEGMENT_FALL_BASE: f32 = 3.0;
    pub const SEGMENT_FALL_STEP: f32 = 0.5;
    pub const SEGMENT_LANDED: f32 = 150.0;
    pub const OBJECT_FALL_RATE: f32 = 5.0;
    pub const OBJECT_FALL_LIMIT: f32 = 200.0;

    /// Audio delays after the terminal cue
    pub const APPLAUSE_DELAY_MS: u32 = 500;
    pub const SPLASH_DELAY_MS: u32 = 200;

    /// Splash burst
    pub const SPLASH_PARTICLES: usize = 10;
}
