//! Balance constants for the platform simulation
//!
//! Every timing and size tunable lives in [`BalanceConfig`], which is passed to
//! the world at construction so independent simulations can be tuned apart.

use anyhow::{bail, Result};

/// How long a train sits in the station, ms
pub const TRAIN_STALL_TIME: f64 = 10_000.0;

/// How long a train takes to decelerate or accelerate, ms
pub const TRAIN_ACCELERATE_TIME: f64 = 5_000.0;

/// Width of the platform, asu
pub const PLATFORM_WIDTH: f32 = 100.0;

/// Length of a single train car, asu
pub const CAR_LENGTH: f32 = 150.0;

/// Gap between the last door of one car and the first door of the next, asu
pub const CAR_GAP: f32 = 30.0;

/// Walking speed, asu per second
pub const WALK_SPEED: f32 = 40.0;

/// Time between deboarding pulses, ms
pub const PAX_DEBOARD_TIME: f64 = 500.0;

/// Length of the deboarding window at the start of a dwell, ms
pub const PAX_TOTAL_DEBOARD_TIME: f64 = 2_000.0;

/// Time between boarding pulses, ms
pub const PAX_BOARD_TIME: f64 = 500.0;

/// Spacing between passengers in an uncrowded queue, asu
pub const DEFAULT_QUEUE_GAP: f32 = 10.0;

/// Aisle kept free between the two sides' queues, asu
pub const QUEUE_AISLE: f32 = 10.0;

/// Width of a single boarding position lane, asu
pub const BOARDING_POS_WIDTH: f32 = 10.0;

/// Waiting time after which a passenger resents missing their train, ms
pub const ANNOYANCE_THRESHOLD: f64 = 15_000.0;

/// Tunable timing and geometry for one simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceConfig {
    pub stall_duration: f64,
    pub accelerate_duration: f64,
    pub platform_width: f32,
    pub car_length: f32,
    pub car_gap: f32,
    pub walk_speed: f32,
    pub deboard_pulse_interval: f64,
    pub total_deboard_duration: f64,
    pub board_pulse_interval: f64,
    pub default_queue_gap: f32,
    pub queue_aisle: f32,
    pub boarding_pos_width: f32,
    pub annoyance_threshold: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            stall_duration: TRAIN_STALL_TIME,
            accelerate_duration: TRAIN_ACCELERATE_TIME,
            platform_width: PLATFORM_WIDTH,
            car_length: CAR_LENGTH,
            car_gap: CAR_GAP,
            walk_speed: WALK_SPEED,
            deboard_pulse_interval: PAX_DEBOARD_TIME,
            total_deboard_duration: PAX_TOTAL_DEBOARD_TIME,
            board_pulse_interval: PAX_BOARD_TIME,
            default_queue_gap: DEFAULT_QUEUE_GAP,
            queue_aisle: QUEUE_AISLE,
            boarding_pos_width: BOARDING_POS_WIDTH,
            annoyance_threshold: ANNOYANCE_THRESHOLD,
        }
    }
}

impl BalanceConfig {
    /// Longest span a single queue may occupy before it is compacted
    pub fn max_queue_length(&self) -> f32 {
        (self.platform_width - self.queue_aisle) / 2.0
    }

    /// Shortest inter-train gap that fits one full arrive/dwell/depart cycle
    pub fn min_train_gap(&self) -> f64 {
        self.stall_duration + 2.0 * self.accelerate_duration
    }

    pub fn validate(&self) -> Result<()> {
        if self.deboard_pulse_interval <= 0.0 || self.board_pulse_interval <= 0.0 {
            bail!("Pulse intervals must be positive");
        }
        if self.total_deboard_duration >= self.stall_duration {
            bail!(
                "Deboard window ({} ms) must be shorter than the stall ({} ms)",
                self.total_deboard_duration,
                self.stall_duration
            );
        }
        if self.accelerate_duration < 0.0 {
            bail!("Accelerate duration cannot be negative");
        }
        if self.walk_speed <= 0.0 || self.default_queue_gap <= 0.0 {
            bail!("Walk speed and queue gap must be positive");
        }
        if self.max_queue_length() <= 0.0 {
            bail!("Platform too narrow for its queue aisle");
        }
        Ok(())
    }
}
