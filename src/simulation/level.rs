//! Level definitions: train schedules, passenger spawns, and stations
//!
//! Levels are plain in-memory values. The passenger list may be given up
//! front or produced by a generator when the world is built.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::health::STARTING_HEALTH;
use super::passenger::{PassengerConfig, Timing};
use super::train::{ReservedCars, TrainConfig};
use super::types::{Position, ServiceClass};

/// Which upcharge a station sells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationKind {
    Premium,
    Reservation,
    LimitedExpress,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpchargeStation {
    pub kind: StationKind,
    pub position: Position,
}

/// A passenger appearing at `spawn_time` ms
pub type PassengerSpawn = (f64, PassengerConfig);

/// Where a level's passengers come from
pub enum PassengerSchedule {
    Static(Vec<PassengerSpawn>),
    Generated(Box<dyn FnOnce() -> Vec<PassengerSpawn>>),
}

impl PassengerSchedule {
    pub fn resolve(self) -> Vec<PassengerSpawn> {
        match self {
            PassengerSchedule::Static(spawns) => spawns,
            PassengerSchedule::Generated(generate) => generate(),
        }
    }
}

impl std::fmt::Debug for PassengerSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassengerSchedule::Static(spawns) => {
                f.debug_tuple("Static").field(&spawns.len()).finish()
            }
            PassengerSchedule::Generated(_) => f.write_str("Generated"),
        }
    }
}

#[derive(Debug)]
pub struct LevelConfig {
    /// Train schedules for the near and far track, in order
    pub trains: [Vec<TrainConfig>; 2],
    /// Delay before each track's first train, ms
    pub time_initial: f64,
    /// Time between a train leaving and the next arriving, ms
    pub time_gap: f64,
    pub health: u32,
    pub passengers: PassengerSchedule,
    pub upcharge_stations: Vec<UpchargeStation>,
}

impl LevelConfig {
    pub fn new(trains: [Vec<TrainConfig>; 2], time_initial: f64, time_gap: f64) -> Self {
        Self {
            trains,
            time_initial,
            time_gap,
            health: STARTING_HEALTH,
            passengers: PassengerSchedule::Static(Vec::new()),
            upcharge_stations: Vec::new(),
        }
    }

    pub fn with_passengers(mut self, passengers: PassengerSchedule) -> Self {
        self.passengers = passengers;
        self
    }

    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    pub fn with_stations(mut self, stations: Vec<UpchargeStation>) -> Self {
        self.upcharge_stations = stations;
        self
    }
}

/// Random passengers for `destinations`, spawned every `interval` ms.
/// A non-positive interval spawns everyone at once.
pub fn generate_passengers(
    seed: u64,
    count: usize,
    destinations: &[&str],
    interval: f64,
) -> Vec<PassengerSpawn> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut spawns = Vec::with_capacity(count);

    for i in 0..count {
        let destination = destinations.choose(&mut rng).copied().unwrap_or("central");
        let timing = match rng.random_range(0..5) {
            0 => Timing::NoPreference,
            1 => Timing::RapidTolerant(rng.random_range(2.0..10.0_f64).floor()),
            2 => {
                let from_local = rng.random_range(8.0..20.0_f64).floor();
                let from_rapid = rng.random_range(2.0..from_local).floor();
                Timing::ExpressTolerant {
                    from_local,
                    from_rapid,
                }
            }
            3 => Timing::LimitedExpress,
            _ => Timing::Airport,
        };
        let mut config = PassengerConfig::new(destination, timing);
        config.premium = rng.random_bool(0.15);
        config.reservation = rng.random_bool(0.1);
        config.women = rng.random_bool(0.2);
        config.accessible = rng.random_bool(0.05);
        if interval > 0.0 {
            let jitter = rng.random_range(0.0..interval / 2.0);
            spawns.push((i as f64 * interval + jitter, config));
        } else {
            spawns.push((0.0, config));
        }
    }

    spawns
}

/// Small two-track level used by the headless runner
pub fn demo_level(seed: u64, passenger_count: usize) -> LevelConfig {
    let near = vec![
        TrainConfig::new("central", 0.0, ServiceClass::Local, 4, 3)
            .with_women_cars(vec![0])
            .with_accessible_car(1),
        TrainConfig::new("central", 6.0, ServiceClass::Rapid, 5, 4)
            .with_premium_cars(vec![2]),
        TrainConfig::new("central", 14.0, ServiceClass::Express, 5, 4)
            .with_reserved(ReservedCars::Cars(vec![0, 1])),
        TrainConfig::new("central", 20.0, ServiceClass::Local, 3, 3),
    ];
    let far = vec![
        TrainConfig::new("harbor", 2.0, ServiceClass::LimitedExpress, 5, 2)
            .with_airport()
            .with_reserved(ReservedCars::All),
        TrainConfig::new("harbor", 10.0, ServiceClass::Local, 4, 2),
        TrainConfig::new("harbor", 18.0, ServiceClass::Rapid, 4, 2)
            .with_airport(),
    ];

    let stations = vec![
        UpchargeStation {
            kind: StationKind::Premium,
            position: Position::new(40.0, 50.0),
        },
        UpchargeStation {
            kind: StationKind::Reservation,
            position: Position::new(120.0, 50.0),
        },
        UpchargeStation {
            kind: StationKind::LimitedExpress,
            position: Position::new(200.0, 50.0),
        },
    ];

    LevelConfig::new([near, far], 3_000.0, 25_000.0)
        .with_stations(stations)
        .with_passengers(PassengerSchedule::Generated(Box::new(move || {
            generate_passengers(seed, passenger_count, &["central", "harbor"], 1_500.0)
        })))
}
