//! Health tracking for the platform game
//!
//! Every boarding outcome maps to a fixed deduction; health only ever goes
//! down and stops at zero.

use std::collections::BTreeMap;

use super::boarding::BoardingResult;

/// Deduction tiers
pub const PENALTY_LOW: u32 = 2;
pub const PENALTY_MEDIUM: u32 = 4;
pub const PENALTY_BAD: u32 = 7;
pub const PENALTY_CATASTROPHIC: u32 = 10;

/// Deduction when an annoyed passenger's ideal train leaves without them
pub const MISSED_TRAIN_DEDUCTION: u32 = PENALTY_MEDIUM;

/// Starting health for levels that don't set one
pub const STARTING_HEALTH: u32 = 100;

pub fn health_deduction(result: BoardingResult) -> u32 {
    match result {
        BoardingResult::Success => 0,
        // Does not serve destination
        BoardingResult::NoService => PENALTY_CATASTROPHIC,
        // Women-only car
        BoardingResult::CarIllegal => PENALTY_BAD,
        BoardingResult::CostUndesired => PENALTY_BAD,
        BoardingResult::CostUnpaid => PENALTY_BAD,
        BoardingResult::CostOverpaid => PENALTY_BAD,
        BoardingResult::SlowLimitedExpress => PENALTY_BAD,
        BoardingResult::Slow => PENALTY_MEDIUM,
        // Accessibility passenger outside the accessible car
        BoardingResult::CarDelay => PENALTY_MEDIUM,
        BoardingResult::CostDidntGetDesired => PENALTY_MEDIUM,
        BoardingResult::CostReservedGotNonreserved => PENALTY_MEDIUM,
        BoardingResult::CarWrongReserved => PENALTY_LOW,
    }
}

/// Player health and a tally of what cost it
#[derive(Debug, Clone)]
pub struct HealthState {
    health: u32,
    starting_health: u32,
    /// Boardings by outcome
    pub outcomes: BTreeMap<BoardingResult, usize>,
    pub missed_trains: usize,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new(STARTING_HEALTH)
    }
}

impl HealthState {
    pub fn new(starting_health: u32) -> Self {
        Self {
            health: starting_health,
            starting_health,
            outcomes: BTreeMap::new(),
            missed_trains: 0,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn total_deducted(&self) -> u32 {
        self.starting_health - self.health
    }

    fn deduct(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Record a boarding and apply its deduction. Returns the deduction.
    pub fn record_boarding(&mut self, result: BoardingResult) -> u32 {
        *self.outcomes.entry(result).or_insert(0) += 1;
        let amount = health_deduction(result);
        self.deduct(amount);
        amount
    }

    pub fn record_missed_train(&mut self) -> u32 {
        self.missed_trains += 1;
        self.deduct(MISSED_TRAIN_DEDUCTION);
        MISSED_TRAIN_DEDUCTION
    }

    pub fn total_boardings(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn successful_boardings(&self) -> usize {
        self.outcomes
            .get(&BoardingResult::Success)
            .copied()
            .unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Health: {}/{} | Boardings: {} ({} correct) | Missed trains: {}",
            self.health,
            self.starting_health,
            self.total_boardings(),
            self.successful_boardings(),
            self.missed_trains
        )
    }
}
