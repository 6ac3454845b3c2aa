//! Seat availability tiers.
//!
//! The thresholds are a quarter and a half of the hall, using truncating
//! integer division: a 100-seat hall with 25 seats left is `Medium`, not `Low`.

use serde::{Deserialize, Serialize};

/// How much room is left in a showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Medium,
    High,
}

/// Classify `available` out of `total` seats.
pub fn classify(available: u32, total: u32) -> Tier {
    if available < total / 4 {
        Tier::Low
    } else if available < total / 2 {
        Tier::Medium
    } else {
        Tier::High
    }
}
