//! One side of the platform: its train schedule and the train in the station
//!
//! A track walks each scheduled train through arriving, idle and departing
//! purely on elapsed simulated time. During the idle (dwell) phase it first
//! lets riders off and then boards the front of every matching queue at a
//! fixed pulse rate.

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::collections::VecDeque;

use super::boarding::{can_board, BoardingResult};
use super::boarding_position::BoardingPosition;
use super::config::BalanceConfig;
use super::layout::{first_car_stopping_pos, PlatformLayout};
use super::passenger::{ArrivalTag, Passenger};
use super::train::TrainConfig;
use super::types::{BoardingPosKind, PassengerId, Position, TrackSide};

/// Phase of a train that is in the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainPhase {
    Arriving,
    Idle,
    Departing,
}

#[derive(Debug, Clone)]
enum StationTrain {
    /// `last_departure` is None until the first train has left
    Empty { last_departure: Option<f64> },
    Occupied {
        phase: TrainPhase,
        train: TrainConfig,
        elapsed: f64,
    },
}

/// Address of one boarding position on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardingPosHandle {
    pub side: TrackSide,
    pub car: usize,
    pub door: usize,
    pub lane: usize,
}

/// Something that happened on a track during a step
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    TrainArrived {
        train: TrainConfig,
    },
    /// A rider stepped off at this door
    Deboarded {
        door_position: Position,
    },
    /// A queued passenger reached the door and got judged
    Boarded {
        passenger: PassengerId,
        result: BoardingResult,
        door_position: Position,
    },
    TrainDeparted {
        train: TrainConfig,
        /// Trains still scheduled on this track, next first
        departure_board: Vec<TrainConfig>,
    },
}

/// Read-only projection of a track for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    /// None while no train is in the station
    pub phase: Option<TrainPhase>,
    pub active_car_count: usize,
    pub active_door_count: usize,
    /// Queue kinds by car, then door slot, then lane
    pub boarding_layout: Vec<Vec<Vec<BoardingPosKind>>>,
}

/// A passenger walking from the queue to the door
#[derive(Debug, Clone)]
struct Boarder {
    passenger: Passenger,
    train: TrainConfig,
    /// Car index counted from the front of the train
    car: usize,
    door_position: Position,
}

/// Number of pulses at multiples of `interval` within `[start, end)`
fn pulse_count(start: f64, end: f64, interval: f64) -> usize {
    let done = (start / interval).ceil();
    let todo = (end / interval).ceil();
    (todo - done).max(0.0) as usize
}

pub struct Track {
    side: TrackSide,
    balance: BalanceConfig,
    /// Remaining trains, next train first
    remaining: VecDeque<TrainConfig>,
    station: StationTrain,
    /// Timestamp of the last processed step
    time: f64,
    /// Time between a train leaving and the next arriving
    time_gap: f64,
    /// Time before the first train arrives
    time_initial: f64,
    layout: PlatformLayout,
    /// Boarding positions by car, then door slot, then lane
    positions: Vec<Vec<Vec<BoardingPosition>>>,
    layout_cache: Vec<Vec<Vec<BoardingPosKind>>>,
    boarders: Vec<Boarder>,
}

impl Track {
    pub fn new(
        side: TrackSide,
        time_initial: f64,
        time_gap: f64,
        trains: Vec<TrainConfig>,
        balance: BalanceConfig,
    ) -> Result<Self> {
        if time_gap < balance.min_train_gap() {
            bail!(
                "Train gap too small: {} ms, need at least {} ms",
                time_gap,
                balance.min_train_gap()
            );
        }

        let layout = PlatformLayout::from_trains(&trains)?;
        let positions = Self::build_positions(side, &layout, &balance)?;
        let layout_cache = positions
            .iter()
            .map(|car| {
                car.iter()
                    .map(|door| door.iter().map(|p| p.kind()).collect())
                    .collect()
            })
            .collect();

        Ok(Self {
            side,
            balance,
            remaining: trains.into(),
            station: StationTrain::Empty {
                last_departure: None,
            },
            time: 0.0,
            time_gap,
            time_initial,
            layout,
            positions,
            layout_cache,
            boarders: Vec::new(),
        })
    }

    fn build_positions(
        side: TrackSide,
        layout: &PlatformLayout,
        balance: &BalanceConfig,
    ) -> Result<Vec<Vec<Vec<BoardingPosition>>>> {
        let grows = side.grows_in_plus_y();
        let car_pitch = balance.car_length + balance.car_gap;
        let platform_length = layout.max_cars as f32 * car_pitch;
        let door_spacing = if layout.max_doors == 0 {
            0.0
        } else {
            (balance.car_length / layout.max_doors as f32).floor()
        };
        let y = if grows { 0.0 } else { balance.platform_width };
        let mirror = |x: f32| if grows { x } else { platform_length - x };

        let mut positions = Vec::with_capacity(layout.max_cars);
        for car_index in 0..layout.max_cars {
            let cars = layout.cars_for_slot(car_index)?;
            let mut by_door = Vec::with_capacity(layout.max_doors);
            for door_index in 0..layout.max_doors {
                let doors = layout.doors_for_slot(door_index);
                let x_door = balance.car_gap / 2.0
                    + car_index as f32 * car_pitch
                    + door_index as f32 * door_spacing;
                let lanes = layout
                    .kinds
                    .iter()
                    .enumerate()
                    .map(|(lane, &kind)| {
                        let x_pos = x_door + (lane + 1) as f32 * balance.boarding_pos_width;
                        BoardingPosition::new(
                            kind,
                            doors.iter().copied(),
                            cars.iter().copied(),
                            car_index,
                            Position::new(mirror(x_pos), y),
                            grows,
                            Position::new(mirror(x_door), y),
                            balance.default_queue_gap,
                            balance.max_queue_length(),
                        )
                    })
                    .collect();
                by_door.push(lanes);
            }
            positions.push(by_door);
        }
        Ok(positions)
    }

    pub fn side(&self) -> TrackSide {
        self.side
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn layout(&self) -> &PlatformLayout {
        &self.layout
    }

    pub fn phase(&self) -> Option<TrainPhase> {
        match &self.station {
            StationTrain::Empty { .. } => None,
            StationTrain::Occupied { phase, .. } => Some(*phase),
        }
    }

    pub fn current_train(&self) -> Option<&TrainConfig> {
        match &self.station {
            StationTrain::Empty { .. } => None,
            StationTrain::Occupied { train, .. } => Some(train),
        }
    }

    /// Time spent in the current phase, if a train is in the station
    pub fn elapsed_in_phase(&self) -> Option<f64> {
        match &self.station {
            StationTrain::Empty { .. } => None,
            StationTrain::Occupied { elapsed, .. } => Some(*elapsed),
        }
    }

    pub fn last_departure(&self) -> Option<f64> {
        match &self.station {
            StationTrain::Empty { last_departure } => *last_departure,
            StationTrain::Occupied { .. } => None,
        }
    }

    pub fn remaining_trains(&self) -> impl Iterator<Item = &TrainConfig> {
        self.remaining.iter()
    }

    pub fn state(&self) -> TrackState {
        let (cars, doors) = match &self.station {
            StationTrain::Occupied { train, .. } => (train.cars, train.doors),
            StationTrain::Empty { .. } => self
                .remaining
                .front()
                .map_or((0, 0), |next| (next.cars, next.doors)),
        };
        TrackState {
            phase: self.phase(),
            active_car_count: cars,
            active_door_count: doors,
            boarding_layout: self.layout_cache.clone(),
        }
    }

    pub fn position(&self, handle: BoardingPosHandle) -> Option<&BoardingPosition> {
        if handle.side != self.side {
            return None;
        }
        self.positions
            .get(handle.car)?
            .get(handle.door)?
            .get(handle.lane)
    }

    fn position_mut(&mut self, handle: BoardingPosHandle) -> Option<&mut BoardingPosition> {
        if handle.side != self.side {
            return None;
        }
        self.positions
            .get_mut(handle.car)?
            .get_mut(handle.door)?
            .get_mut(handle.lane)
    }

    /// Every boarding position with its handle, by car, door slot, then lane
    pub fn boarding_positions(&self) -> Vec<(BoardingPosHandle, &BoardingPosition)> {
        let side = self.side;
        self.positions
            .iter()
            .enumerate()
            .flat_map(|(car, doors)| {
                doors.iter().enumerate().flat_map(move |(door, lanes)| {
                    lanes.iter().enumerate().map(move |(lane, p)| {
                        (
                            BoardingPosHandle {
                                side,
                                car,
                                door,
                                lane,
                            },
                            p,
                        )
                    })
                })
            })
            .collect()
    }

    fn all_positions(&self) -> impl Iterator<Item = &BoardingPosition> {
        self.positions.iter().flatten().flatten()
    }

    pub fn enqueue(&mut self, handle: BoardingPosHandle, passenger: Passenger) -> Result<()> {
        let position = self
            .position_mut(handle)
            .with_context(|| format!("No boarding position at {:?}", handle))?;
        position.enqueue(passenger);
        Ok(())
    }

    /// Take a passenger out of whichever queue holds them
    pub fn remove_passenger(&mut self, id: PassengerId) -> Option<Passenger> {
        self.positions
            .iter_mut()
            .flatten()
            .flatten()
            .find(|p| p.contains(id))
            .and_then(|p| p.remove(id))
    }

    /// Passengers standing in this track's queues
    pub fn queued_passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.all_positions().flat_map(|p| p.passengers())
    }

    /// Passengers walking from a queue to a train door
    pub fn boarding_passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.boarders.iter().map(|b| &b.passenger)
    }

    fn pop_next_train(&mut self) -> Result<TrainConfig> {
        self.remaining
            .pop_front()
            .context("Out of trains to pop")
    }

    fn phase_duration(&self, phase: TrainPhase) -> f64 {
        match phase {
            TrainPhase::Arriving | TrainPhase::Departing => self.balance.accelerate_duration,
            TrainPhase::Idle => self.balance.stall_duration,
        }
    }

    /// Advance the track by `delta_ms`. A single step may cross several phase
    /// boundaries; time left over after a transition carries into the next
    /// phase.
    pub fn step(&mut self, delta_ms: f64) -> Result<Vec<TrackEvent>> {
        let mut events = Vec::new();
        if delta_ms <= 0.0 {
            return Ok(events);
        }

        let walk_speed = self.balance.walk_speed;
        for position in self.positions.iter_mut().flatten().flatten() {
            position.step(delta_ms, walk_speed);
        }
        self.step_boarders(delta_ms, &mut events);

        let end = self.time + delta_ms;
        let mut cursor = self.time;
        loop {
            let station = std::mem::replace(
                &mut self.station,
                StationTrain::Empty {
                    last_departure: None,
                },
            );
            let (next, transitioned) = match station {
                StationTrain::Empty { last_departure } => {
                    let arrive_at =
                        last_departure.map_or(self.time_initial, |left| left + self.time_gap);
                    if self.remaining.is_empty() || end < arrive_at {
                        (StationTrain::Empty { last_departure }, false)
                    } else {
                        cursor = cursor.max(arrive_at);
                        let train = self.pop_next_train()?;
                        debug!(
                            "{:?} track: {:?} train to {} arriving at {}",
                            self.side, train.service, train.destination, cursor
                        );
                        events.push(TrackEvent::TrainArrived {
                            train: train.clone(),
                        });
                        (
                            StationTrain::Occupied {
                                phase: TrainPhase::Arriving,
                                train,
                                elapsed: 0.0,
                            },
                            true,
                        )
                    }
                }
                StationTrain::Occupied {
                    phase,
                    train,
                    elapsed,
                } => {
                    let duration = self.phase_duration(phase);
                    let advance = (end - cursor).min(duration - elapsed).max(0.0);
                    let stop = elapsed + advance;
                    cursor += advance;

                    if phase == TrainPhase::Idle {
                        self.run_dwell(&train, elapsed, stop, &mut events)?;
                    }

                    if stop < duration {
                        (
                            StationTrain::Occupied {
                                phase,
                                train,
                                elapsed: stop,
                            },
                            false,
                        )
                    } else {
                        match phase {
                            TrainPhase::Arriving => (
                                StationTrain::Occupied {
                                    phase: TrainPhase::Idle,
                                    train,
                                    elapsed: 0.0,
                                },
                                true,
                            ),
                            TrainPhase::Idle => {
                                debug!(
                                    "{:?} track: train to {} departing at {}",
                                    self.side, train.destination, cursor
                                );
                                events.push(TrackEvent::TrainDeparted {
                                    train: train.clone(),
                                    departure_board: self.remaining.iter().cloned().collect(),
                                });
                                (
                                    StationTrain::Occupied {
                                        phase: TrainPhase::Departing,
                                        train,
                                        elapsed: 0.0,
                                    },
                                    true,
                                )
                            }
                            TrainPhase::Departing => (
                                StationTrain::Empty {
                                    last_departure: Some(cursor),
                                },
                                true,
                            ),
                        }
                    }
                }
            };
            self.station = next;
            if !transitioned {
                break;
            }
        }

        self.time = end;
        Ok(events)
    }

    /// Deboarding then boarding pulses for the dwell window `[start, stop)`
    fn run_dwell(
        &mut self,
        train: &TrainConfig,
        start: f64,
        stop: f64,
        events: &mut Vec<TrackEvent>,
    ) -> Result<()> {
        let deboard_window = self.balance.total_deboard_duration;

        let deboards = pulse_count(
            start.min(deboard_window),
            stop.min(deboard_window),
            self.balance.deboard_pulse_interval,
        );
        for _ in 0..deboards {
            self.deboard_pulse(train, events)?;
        }

        let boards = pulse_count(
            (start - deboard_window).max(0.0),
            (stop - deboard_window).max(0.0),
            self.balance.board_pulse_interval,
        );
        for _ in 0..boards {
            self.board_pulse(train)?;
        }
        Ok(())
    }

    /// Platform car slots `[start, end)` covered by the train
    fn train_car_range(&self, train: &TrainConfig) -> Result<std::ops::Range<usize>> {
        let start = first_car_stopping_pos(train.cars, self.positions.len())?;
        Ok(start..start + train.cars)
    }

    fn deboard_pulse(&self, train: &TrainConfig, events: &mut Vec<TrackEvent>) -> Result<()> {
        let cars = self.train_car_range(train)?;
        for doors in &self.positions[cars] {
            for position in doors.iter().flatten() {
                if position.has_door(train.doors) && train.serves_queue(position.kind()) {
                    events.push(TrackEvent::Deboarded {
                        door_position: position.door_position(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Send the front passenger of every matching queue to their door. The
    /// car they board is fixed here; judging happens when they reach it.
    fn board_pulse(&mut self, train: &TrainConfig) -> Result<()> {
        let cars = self.train_car_range(train)?;
        let first_car = cars.start;
        for doors in &mut self.positions[cars] {
            for position in doors.iter_mut().flatten() {
                if !position.has_door(train.doors) || !train.serves_queue(position.kind()) {
                    continue;
                }
                let Some(mut passenger) = position.dequeue() else {
                    continue;
                };
                let door_position = position.door_position();
                passenger.set_target(door_position, Some(ArrivalTag::BoardTrain));
                self.boarders.push(Boarder {
                    passenger,
                    train: train.clone(),
                    car: position.car_index() - first_car,
                    door_position,
                });
            }
        }
        Ok(())
    }

    fn step_boarders(&mut self, delta_ms: f64, events: &mut Vec<TrackEvent>) {
        let walk_speed = self.balance.walk_speed;
        let mut index = 0;
        while index < self.boarders.len() {
            let arrival = self.boarders[index].passenger.step(delta_ms, walk_speed);
            if arrival != Some(ArrivalTag::BoardTrain) {
                index += 1;
                continue;
            }

            let boarder = self.boarders.remove(index);
            let Some(fare) = boarder.passenger.fare() else {
                warn!(
                    "Passenger {} without a fare reached a train door",
                    boarder.passenger.id
                );
                continue;
            };
            let result = can_board(
                fare,
                &boarder.train,
                boarder.car,
                self.remaining.make_contiguous(),
                boarder.train.accessible_car,
            );
            events.push(TrackEvent::Boarded {
                passenger: boarder.passenger.id,
                result,
                door_position: boarder.door_position,
            });
        }
    }
}
