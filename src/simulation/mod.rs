//! Standalone platform simulation module
//!
//! This module contains all the core boarding simulation logic. It runs
//! without any presentation layer and can be driven headless or from tests.

mod boarding;
mod boarding_position;
mod config;
mod health;
mod layout;
mod level;
mod passenger;
mod snapshot;
mod track;
mod train;
mod types;
mod world;

// Re-export public types for external use
pub use boarding::{can_board, can_board_fast, BoardingResult};
pub use boarding_position::BoardingPosition;
pub use config::{
    BalanceConfig, ANNOYANCE_THRESHOLD, BOARDING_POS_WIDTH, CAR_GAP, CAR_LENGTH,
    DEFAULT_QUEUE_GAP, PAX_BOARD_TIME, PAX_DEBOARD_TIME, PAX_TOTAL_DEBOARD_TIME, PLATFORM_WIDTH,
    QUEUE_AISLE, TRAIN_ACCELERATE_TIME, TRAIN_STALL_TIME, WALK_SPEED,
};
pub use health::{
    health_deduction, HealthState, MISSED_TRAIN_DEDUCTION, PENALTY_BAD, PENALTY_CATASTROPHIC,
    PENALTY_LOW, PENALTY_MEDIUM, STARTING_HEALTH,
};
pub use layout::{compute_doors_for_pos, first_car_stopping_pos, PlatformLayout};
pub use level::{
    demo_level, generate_passengers, LevelConfig, PassengerSchedule, PassengerSpawn, StationKind,
    UpchargeStation,
};
pub use passenger::{
    ArrivalTag, Fare, Passenger, PassengerConfig, Timing, Upcharge, Upcharges, Waypoint,
};
pub use snapshot::{GameState, PassengerState, PlatformState, UnboardedState};
pub use track::{BoardingPosHandle, Track, TrackEvent, TrackState, TrainPhase};
pub use train::{ReservedCars, TrainConfig};
pub use types::{BoardingPosKind, PassengerId, Position, ServiceClass, SimId, TrackSide};
pub use world::{SimEvent, SimWorld};
