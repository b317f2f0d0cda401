//! Main simulation world that ties both tracks and the platform together
//!
//! This is the entry point the presentation layer drives: it feeds time
//! deltas and player commands in, and reads snapshots and events out.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use sorted_vec::SortedVec;
use std::cmp::{Ordering, Reverse};

use super::boarding::{can_board_fast, BoardingResult};
use super::boarding_position::BoardingPosition;
use super::config::BalanceConfig;
use super::health::HealthState;
use super::level::{LevelConfig, UpchargeStation};
use super::passenger::{ArrivalTag, Passenger};
use super::snapshot::{GameState, PassengerState, PlatformState, UnboardedState};
use super::track::{BoardingPosHandle, Track, TrackEvent};
use super::train::TrainConfig;
use super::types::{PassengerId, Position, SimId, TrackSide};

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    TrainArrived {
        side: TrackSide,
        train: TrainConfig,
    },
    TrainDeparted {
        side: TrackSide,
        train: TrainConfig,
    },
    Boarded {
        side: TrackSide,
        passenger: PassengerId,
        result: BoardingResult,
        deduction: u32,
        door_position: Position,
    },
    MissedTrain {
        side: TrackSide,
        passenger: PassengerId,
        deduction: u32,
    },
    Arrived {
        passenger: PassengerId,
        tag: ArrivalTag,
    },
    PassengerReleased {
        passenger: PassengerId,
    },
}

/// A passenger waiting for their spawn time.
///
/// Ordered so the earliest spawn sorts last and is popped first; ties keep
/// level order.
#[derive(Debug, Clone)]
struct BacklogEntry {
    spawn_time: f64,
    passenger: Passenger,
}

impl BacklogEntry {
    fn key(&self) -> Reverse<(OrderedFloat<f64>, PassengerId)> {
        Reverse((OrderedFloat(self.spawn_time), self.passenger.id))
    }
}

impl PartialEq for BacklogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for BacklogEntry {}

impl PartialOrd for BacklogEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BacklogEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// The main simulation world
pub struct SimWorld {
    balance: BalanceConfig,

    /// Near track, then far track
    tracks: [Track; 2],

    /// Simulation time, ms
    pub time: f64,

    /// Passengers not yet released, earliest last
    backlog: SortedVec<BacklogEntry>,

    /// Released passengers waiting to be placed on the platform
    unboarded: Vec<Passenger>,

    /// Spawned passengers not standing in a queue
    platform: Vec<Passenger>,

    health: HealthState,

    upcharge_stations: Vec<UpchargeStation>,

    /// Where passengers enter and riders leave the platform
    entrance: Position,

    /// Next ID to assign
    next_id: usize,

    events: Vec<SimEvent>,
}

impl SimWorld {
    pub fn new(level: LevelConfig, balance: BalanceConfig) -> Result<Self> {
        balance.validate()?;

        let [near, far] = level.trains;
        let tracks = [
            Track::new(
                TrackSide::Near,
                level.time_initial,
                level.time_gap,
                near,
                balance,
            )
            .context("Invalid near track")?,
            Track::new(
                TrackSide::Far,
                level.time_initial,
                level.time_gap,
                far,
                balance,
            )
            .context("Invalid far track")?,
        ];

        let mut next_id = 0;
        let entries = level
            .passengers
            .resolve()
            .into_iter()
            .map(|(spawn_time, config)| {
                let id = PassengerId(SimId(next_id));
                next_id += 1;
                BacklogEntry {
                    spawn_time,
                    passenger: Passenger::new(id, config),
                }
            })
            .collect();

        Ok(Self {
            balance,
            tracks,
            time: 0.0,
            backlog: SortedVec::from_unsorted(entries),
            unboarded: Vec::new(),
            platform: Vec::new(),
            health: HealthState::new(level.health),
            upcharge_stations: level.upcharge_stations,
            entrance: Position::new(0.0, balance.platform_width / 2.0),
            next_id,
            events: Vec::new(),
        })
    }

    fn next_passenger_id(&mut self) -> PassengerId {
        let id = PassengerId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    pub fn balance(&self) -> &BalanceConfig {
        &self.balance
    }

    pub fn health(&self) -> u32 {
        self.health.health()
    }

    pub fn health_state(&self) -> &HealthState {
        &self.health
    }

    pub fn entrance(&self) -> Position {
        self.entrance
    }

    pub fn track(&self, side: TrackSide) -> &Track {
        &self.tracks[side.index()]
    }

    /// Boarding positions of one side with their handles, for click targets
    pub fn boarding_positions(&self, side: TrackSide) -> Vec<(BoardingPosHandle, &BoardingPosition)> {
        self.tracks[side.index()].boarding_positions()
    }

    pub fn unboarded(&self) -> &[Passenger] {
        &self.unboarded
    }

    /// Passengers whose spawn time has not come yet
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Spawned passengers not standing in a queue
    pub fn platform_passengers(&self) -> &[Passenger] {
        &self.platform
    }

    /// Drain events emitted since the last call
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every passenger the world can still hand out by id
    fn all_passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.backlog
            .iter()
            .map(|e| &e.passenger)
            .chain(self.unboarded.iter())
            .chain(self.platform.iter())
            .chain(self.tracks.iter().flat_map(|t| t.queued_passengers()))
    }

    pub fn passenger(&self, id: PassengerId) -> Option<&Passenger> {
        self.all_passengers().find(|p| p.id == id)
    }

    /// True once both schedules are exhausted and the station is clear
    pub fn is_finished(&self) -> bool {
        self.tracks
            .iter()
            .all(|t| t.phase().is_none() && t.remaining_trains().next().is_none())
    }

    /// Advance everything by `delta_ms`: tracks first, then loose passengers,
    /// then the unboarded queue and backlog.
    pub fn step(&mut self, delta_ms: f64) -> Result<()> {
        if delta_ms <= 0.0 {
            return Ok(());
        }
        self.time += delta_ms;

        for side in TrackSide::BOTH {
            let track_events = self.tracks[side.index()].step(delta_ms)?;
            for event in track_events {
                self.handle_track_event(side, event)?;
            }
        }

        self.step_platform(delta_ms);

        let walk_speed = self.balance.walk_speed;
        for passenger in &mut self.unboarded {
            passenger.step(delta_ms, walk_speed);
        }
        self.release_due_passengers();

        Ok(())
    }

    fn handle_track_event(&mut self, side: TrackSide, event: TrackEvent) -> Result<()> {
        match event {
            TrackEvent::TrainArrived { train } => {
                self.events.push(SimEvent::TrainArrived { side, train });
            }
            TrackEvent::Deboarded { door_position } => {
                self.spawn_rider(door_position)?;
            }
            TrackEvent::Boarded {
                passenger,
                result,
                door_position,
            } => {
                let deduction = self.health.record_boarding(result);
                if !result.is_success() {
                    info!(
                        "{} boarded on {:?} track: {:?} (-{} health, {} left)",
                        passenger,
                        side,
                        result,
                        deduction,
                        self.health.health()
                    );
                }
                self.events.push(SimEvent::Boarded {
                    side,
                    passenger,
                    result,
                    deduction,
                    door_position,
                });
            }
            TrackEvent::TrainDeparted {
                train,
                departure_board,
            } => {
                self.penalize_missed_train(side, &train, &departure_board);
                self.events.push(SimEvent::TrainDeparted { side, train });
            }
        }
        Ok(())
    }

    /// Annoyed passengers still on the platform whose ideal train just left
    /// cost health, once each.
    fn penalize_missed_train(
        &mut self,
        side: TrackSide,
        train: &TrainConfig,
        departure_board: &[TrainConfig],
    ) {
        let threshold = self.balance.annoyance_threshold;
        let missed: Vec<PassengerId> = self
            .unboarded
            .iter()
            .chain(self.platform.iter())
            .chain(self.tracks.iter().flat_map(|t| t.queued_passengers()))
            .filter(|p| p.is_annoyable(threshold))
            .filter(|p| {
                p.fare()
                    .is_some_and(|fare| can_board_fast(fare, train, departure_board))
            })
            .map(|p| p.id)
            .collect();

        for passenger in missed {
            let deduction = self.health.record_missed_train();
            info!(
                "{} missed their train to {} on {:?} track (-{} health)",
                passenger, train.destination, side, deduction
            );
            self.events.push(SimEvent::MissedTrain {
                side,
                passenger,
                deduction,
            });
        }
    }

    /// A generic rider steps off at a door and walks out via the aisle
    fn spawn_rider(&mut self, door_position: Position) -> Result<()> {
        let id = self.next_passenger_id();
        let mut rider = Passenger::extra(id);
        rider.spawn(door_position)?;
        let aisle = Position::new(door_position.x, self.balance.platform_width / 2.0);
        rider.queue_target(aisle, None);
        rider.queue_target(self.entrance, Some(ArrivalTag::Exit));
        self.platform.push(rider);
        Ok(())
    }

    fn step_platform(&mut self, delta_ms: f64) {
        let walk_speed = self.balance.walk_speed;
        let mut arrivals = Vec::new();
        for passenger in &mut self.platform {
            if let Some(tag) = passenger.step(delta_ms, walk_speed) {
                arrivals.push((passenger.id, tag));
            }
        }

        for (id, tag) in arrivals {
            match tag {
                ArrivalTag::Exit => {
                    self.platform.retain(|p| p.id != id);
                    continue;
                }
                ArrivalTag::Pay(upcharge) => {
                    let paid = self
                        .platform
                        .iter_mut()
                        .find(|p| p.id == id)
                        .and_then(|p| p.fare_mut())
                        .is_some_and(|fare| fare.pay(upcharge));
                    if !paid {
                        debug!("{} did not pay {:?}", id, upcharge);
                    }
                }
                ArrivalTag::BoardTrain => {
                    warn!("{} reached a door outside of boarding", id);
                }
                ArrivalTag::Notify(_) => {}
            }
            self.events.push(SimEvent::Arrived { passenger: id, tag });
        }
    }

    fn release_due_passengers(&mut self) {
        while self
            .backlog
            .last()
            .is_some_and(|entry| entry.spawn_time <= self.time)
        {
            let Some(entry) = self.backlog.pop() else {
                break;
            };
            let id = entry.passenger.id;
            self.unboarded.push(entry.passenger);
            self.events.push(SimEvent::PassengerReleased { passenger: id });
        }
    }

    /// Remove a passenger from wherever they are held
    fn take_passenger(&mut self, id: PassengerId) -> Result<Passenger> {
        if let Some(index) = self.unboarded.iter().position(|p| p.id == id) {
            return Ok(self.unboarded.remove(index));
        }
        if let Some(index) = self.platform.iter().position(|p| p.id == id) {
            return Ok(self.platform.remove(index));
        }
        for track in &mut self.tracks {
            if let Some(passenger) = track.remove_passenger(id) {
                return Ok(passenger);
            }
        }
        if let Some(index) = self.backlog.iter().position(|e| e.passenger.id == id) {
            return Ok(self.backlog.remove_index(index).passenger);
        }
        bail!("Passenger {} not found", id)
    }

    fn check_controllable(&self, id: PassengerId) -> Result<()> {
        let passenger = self
            .passenger(id)
            .with_context(|| format!("Passenger {} not found", id))?;
        if !passenger.is_controllable() {
            bail!("Passenger {} cannot be directed", id);
        }
        Ok(())
    }

    /// Take a passenger for a new destination, spawning them if needed
    fn claim_passenger(&mut self, id: PassengerId) -> Result<Passenger> {
        self.check_controllable(id)?;
        let mut passenger = self.take_passenger(id)?;
        if !passenger.is_spawned() {
            passenger.spawn(self.entrance)?;
        }
        Ok(passenger)
    }

    /// Walk a passenger somewhere on the platform. They leave any queue they
    /// were standing in.
    pub fn send_passenger_to_location(
        &mut self,
        id: PassengerId,
        target: Position,
        on_arrival: Option<ArrivalTag>,
    ) -> Result<()> {
        let mut passenger = self.claim_passenger(id)?;
        passenger.queue_target(target, on_arrival);
        self.platform.push(passenger);
        Ok(())
    }

    /// Put a passenger at the back of a boarding position's queue
    pub fn enqueue_passenger(&mut self, id: PassengerId, handle: BoardingPosHandle) -> Result<()> {
        self.tracks[handle.side.index()]
            .position(handle)
            .with_context(|| format!("No boarding position at {:?}", handle))?;
        let passenger = self.claim_passenger(id)?;
        self.tracks[handle.side.index()].enqueue(handle, passenger)
    }

    pub fn state(&self) -> GameState {
        let spawned = self
            .platform
            .iter()
            .chain(self.tracks.iter().flat_map(|t| t.queued_passengers()))
            .chain(self.tracks.iter().flat_map(|t| t.boarding_passengers()));
        let passengers = spawned
            .filter_map(|p| {
                p.position().map(|pos| PassengerState {
                    id: p.id,
                    x: pos.x,
                    y: pos.y,
                    controllable: p.is_controllable(),
                })
            })
            .collect();

        GameState {
            tracks: [self.tracks[0].state(), self.tracks[1].state()],
            platform: PlatformState {
                passengers,
                upcharge_stations: self.upcharge_stations.clone(),
            },
            unboarded: self
                .unboarded
                .iter()
                .filter_map(|p| {
                    p.fare().map(|fare| UnboardedState {
                        id: p.id,
                        config: fare.config.clone(),
                        waited: p.elapsed(),
                    })
                })
                .collect(),
            health: self.health.health(),
            time: self.time,
        }
    }

    /// Log a summary of the world state
    pub fn print_summary(&self) {
        info!("=== Platform Simulation Summary ===");
        info!("Time: {:.1}s", self.time / 1000.0);
        for track in &self.tracks {
            let train = track
                .current_train()
                .map(|t| format!("{:?} to {}", t.service, t.destination))
                .unwrap_or_else(|| "none".to_string());
            info!(
                "  {:?} track: phase={:?}, train={}, queued={}, trains left={}",
                track.side(),
                track.phase(),
                train,
                track.queued_passengers().count(),
                track.remaining_trains().count()
            );
        }
        info!(
            "Waiting to enter: {}, unboarded: {}, on platform: {}",
            self.backlog.len(),
            self.unboarded.len(),
            self.platform.len()
        );
        info!("{}", self.health.summary());
    }
}
