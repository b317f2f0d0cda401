//! Read-only snapshot handed to the presentation layer

use super::level::UpchargeStation;
use super::passenger::PassengerConfig;
use super::track::TrackState;
use super::types::PassengerId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerState {
    pub id: PassengerId,
    pub x: f32,
    pub y: f32,
    /// False for generic riders stepping off a train
    pub controllable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformState {
    /// Every spawned passenger: walking, queued, or heading for a door
    pub passengers: Vec<PassengerState>,
    pub upcharge_stations: Vec<UpchargeStation>,
}

/// A released passenger who has not been placed on the platform yet
#[derive(Debug, Clone, PartialEq)]
pub struct UnboardedState {
    pub id: PassengerId,
    pub config: PassengerConfig,
    /// Time waited since release, ms
    pub waited: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Near track, then far track
    pub tracks: [TrackState; 2],
    pub platform: PlatformState,
    pub unboarded: Vec<UnboardedState>,
    pub health: u32,
    pub time: f64,
}
