//! Placed segments and the budget ledger
//!
//! The ledger invariant `spent == sum(cost)` and `remaining == starting - spent`
//! holds after every call. Rejected calls leave the assembly untouched.

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Material, Shape};
use crate::consts::MAX_SEGMENTS;
use crate::error::BuildError;

/// One purchased unit of bridge. Immutable once placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub material: Material,
    pub shape: Shape,
    pub cost: u32,
}

/// Copy of the budget fields, handed to scoring and the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLedger {
    pub starting: u32,
    pub spent: u32,
    pub remaining: u32,
}

/// Budget health, as shown by the HUD colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetBand {
    /// More than half left
    Healthy,
    /// More than a fifth left
    Low,
    Critical,
}

impl BudgetLedger {
    /// Remaining budget as a percentage of the starting budget
    pub fn remaining_percent(&self) -> f32 {
        if self.starting == 0 {
            return 0.0;
        }
        self.remaining as f32 / self.starting as f32 * 100.0
    }

    pub fn band(&self) -> BudgetBand {
        let pct = self.remaining_percent();
        if pct > 50.0 {
            BudgetBand::Healthy
        } else if pct > 20.0 {
            BudgetBand::Low
        } else {
            BudgetBand::Critical
        }
    }
}

/// The bridge under construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    segments: Vec<Segment>,
    starting_budget: u32,
    spent: u32,
    remaining: u32,
}

impl Assembly {
    pub fn new(starting_budget: u32) -> Self {
        Self {
            segments: Vec::with_capacity(MAX_SEGMENTS),
            starting_budget,
            spent: 0,
            remaining: starting_budget,
        }
    }

    /// Buy and append a segment. Checks the segment cap first, then the budget.
    pub fn add_segment(
        &mut self,
        catalog: &Catalog,
        material: Material,
        shape: Shape,
    ) -> Result<&Segment, BuildError> {
        if self.segments.len() >= MAX_SEGMENTS {
            return Err(BuildError::AssemblyFull { max: MAX_SEGMENTS });
        }
        let cost = catalog.material(material).cost;
        if self.remaining < cost {
            return Err(BuildError::InsufficientBudget {
                needed: cost,
                remaining: self.remaining,
            });
        }

        self.remaining -= cost;
        self.spent += cost;
        self.segments.push(Segment {
            material,
            shape,
            cost,
        });
        Ok(&self.segments[self.segments.len() - 1])
    }

    /// Remove every segment and refund the whole budget
    pub fn clear(&mut self) {
        self.segments.clear();
        self.spent = 0;
        self.remaining = self.starting_budget;
    }

    pub fn can_afford(&self, catalog: &Catalog, material: Material) -> bool {
        self.remaining >= catalog.material(material).cost
    }

    pub fn is_full(&self) -> bool {
        self.segments.len() >= MAX_SEGMENTS
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn starting_budget(&self) -> u32 {
        self.starting_budget
    }

    pub fn spent(&self) -> u32 {
        self.spent
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn ledger(&self) -> BudgetLedger {
        BudgetLedger {
            starting: self.starting_budget,
            spent: self.spent,
            remaining: self.remaining,
        }
    }
}
