//! Rejection reasons for player actions
//!
//! Every variant is a local validation failure: the call that returned it had
//! no effect on the assembly or the animation.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("insufficient budget: segment costs ${needed} but only ${remaining} remains")]
    InsufficientBudget { needed: u32, remaining: u32 },
    #[error("bridge already has the maximum of {max} segments")]
    AssemblyFull { max: usize },
    #[error("add at least one segment before testing")]
    AssemblyEmpty,
    #[error("a load test is already running")]
    TestAlreadyRunning,
    #[error("the bridge collapsed; clear it and build again")]
    BridgeCollapsed,
}
