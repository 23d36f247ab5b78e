//! Session settings and preferences
//!
//! Held in memory for one session; loaded from JSON when the host has some.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_TICK_MS, STARTING_BUDGET, TICK_MS};

/// Background music choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MusicTrack {
    #[default]
    HappyGame,
    FunAdventure,
    PlayfulKids,
    UpbeatFun,
}

impl MusicTrack {
    pub const ALL: [MusicTrack; 4] = [
        MusicTrack::HappyGame,
        MusicTrack::FunAdventure,
        MusicTrack::PlayfulKids,
        MusicTrack::UpbeatFun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MusicTrack::HappyGame => "Happy Game",
            MusicTrack::FunAdventure => "Fun Adventure",
            MusicTrack::PlayfulKids => "Playful Kids",
            MusicTrack::UpbeatFun => "Upbeat Fun",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "happy game" | "happy" | "track1" => Some(MusicTrack::HappyGame),
            "fun adventure" | "adventure" | "track2" => Some(MusicTrack::FunAdventure),
            "playful kids" | "playful" | "track3" => Some(MusicTrack::PlayfulKids),
            "upbeat fun" | "upbeat" | "track4" => Some(MusicTrack::UpbeatFun),
            _ => None,
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            MusicTrack::HappyGame => {
                "https://assets.mixkit.co/music/preview/mixkit-games-worldbeat-466.mp3"
            }
            MusicTrack::FunAdventure => {
                "https://assets.mixkit.co/music/preview/mixkit-tech-house-vibes-130.mp3"
            }
            MusicTrack::PlayfulKids => {
                "https://assets.mixkit.co/music/preview/mixkit-happy-bells-386.mp3"
            }
            MusicTrack::UpbeatFun => {
                "https://assets.mixkit.co/music/preview/mixkit-a-very-happy-christmas-897.mp3"
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master switch for every sound cue
    pub sound_enabled: bool,
    /// Volume (0 - 100)
    pub volume: u32,
    pub music_track: MusicTrack,

    // === Simulation ===
    /// Animation tick cadence (milliseconds)
    pub tick_ms: u32,
    /// Budget each build starts with
    pub starting_budget: u32,
    /// Seed for cosmetic splash particles
    pub splash_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            volume: 50,
            music_track: MusicTrack::HappyGame,

            tick_ms: TICK_MS,
            starting_budget: STARTING_BUDGET,
            splash_seed: 0x5EED,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.volume > 100 {
            return Err(SettingsError::OutOfRange {
                field: "volume",
                min: 0,
                max: 100,
                value: self.volume,
            });
        }
        if !(TICK_MS..=MAX_TICK_MS).contains(&self.tick_ms) {
            return Err(SettingsError::OutOfRange {
                field: "tick_ms",
                min: TICK_MS,
                max: MAX_TICK_MS,
                value: self.tick_ms,
            });
        }
        if self.starting_budget == 0 {
            return Err(SettingsError::OutOfRange {
                field: "starting_budget",
                min: 1,
                max: u32::MAX,
                value: self.starting_budget,
            });
        }
        Ok(())
    }

    /// Set volume, clamped to 0 - 100
    pub fn set_volume(&mut self, volume: u32) {
        self.volume = volume.min(100);
    }

    /// Effective cue volume (0.0 - 1.0)
    pub fn effective_volume(&self) -> f32 {
        if self.sound_enabled {
            self.volume as f32 / 100.0
        } else {
            0.0
        }
    }
}
