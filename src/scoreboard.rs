//! Best result per load for the current session
//!
//! In memory only; a new session starts with an empty board.

use serde::{Deserialize, Serialize};

use crate::sim::{LevelResult, Load};

/// A single best-result entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub load: Load,
    pub result: LevelResult,
}

/// Session leaderboard, one slot per load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    entries: Vec<ScoreEntry>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a result would replace the current best for its load.
    /// Failures never qualify; ties on stars go to the higher efficiency.
    pub fn qualifies(&self, load: Load, result: &LevelResult) -> bool {
        if !result.success {
            return false;
        }
        match self.best(load) {
            None => true,
            Some(best) => {
                result.stars > best.stars
                    || (result.stars == best.stars
                        && result.efficiency_percent > best.efficiency_percent)
            }
        }
    }

    /// Record a result. Returns true if it became the new best for its load.
    pub fn record(&mut self, load: Load, result: &LevelResult) -> bool {
        if !self.qualifies(load, result) {
            return false;
        }

        let entry = ScoreEntry {
            load,
            result: result.clone(),
        };
        match self.entries.iter_mut().find(|e| e.load == load) {
            Some(slot) => *slot = entry,
            None => {
                self.entries.push(entry);
                // Keep catalog order (lightest first)
                self.entries.sort_by_key(|e| e.load as u8);
            }
        }
        true
    }

    pub fn best(&self, load: Load) -> Option<&LevelResult> {
        self.entries
            .iter()
            .find(|e| e.load == load)
            .map(|e| &e.result)
    }

    /// Sum of best stars over every load
    pub fn total_stars(&self) -> u32 {
        self.entries.iter().map(|e| e.result.stars as u32).sum()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(success: bool, stars: u8, efficiency_percent: f32) -> LevelResult {
        LevelResult {
            success,
            stars,
            efficiency_percent,
            budget_used: 0,
            budget_remaining: 0,
            load_type: "Car".to_string(),
        }
    }

    #[test]
    fn test_failures_never_qualify() {
        let mut board = Scoreboard::new();
        assert!(!board.record(Load::Car, &result(false, 0, 0.0)));
        assert!(board.is_empty());
    }

    #[test]
    fn test_better_result_replaces() {
        let mut board = Scoreboard::new();
        assert!(board.record(Load::Car, &result(true, 2, 45.0)));
        assert!(!board.record(Load::Car, &result(true, 2, 41.0)));
        assert!(board.record(Load::Car, &result(true, 2, 60.0)));
        assert!(board.record(Load::Car, &result(true, 3, 71.0)));
        assert_eq!(board.entries().len(), 1);
        assert_eq!(board.best(Load::Car).map(|r| r.stars), Some(3));
    }

    #[test]
    fn test_entries_sorted_by_load() {
        let mut board = Scoreboard::new();
        board.record(Load::Tank, &result(true, 1, 10.0));
        board.record(Load::Person, &result(true, 3, 95.0));
        let loads: Vec<Load> = board.entries().iter().map(|e| e.load).collect();
        assert_eq!(loads, vec![Load::Person, Load::Tank]);
        assert_eq!(board.total_stars(), 4);
    }
}
