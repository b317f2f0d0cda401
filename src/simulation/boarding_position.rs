//! Queueing slot at one (car, door, service) location

use std::collections::{BTreeSet, VecDeque};

use super::passenger::Passenger;
use super::types::{BoardingPosKind, PassengerId, Position};

/// A line of passengers waiting at one door slot for one kind of train
#[derive(Debug, Clone)]
pub struct BoardingPosition {
    kind: BoardingPosKind,
    doors: BTreeSet<usize>,
    cars: BTreeSet<usize>,
    /// Zero-indexed car slot on the platform
    car_index: usize,
    position: Position,
    door_position: Position,
    grows_in_plus_y: bool,
    default_gap: f32,
    max_queue_length: f32,
    queue: VecDeque<Passenger>,
}

impl BoardingPosition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: BoardingPosKind,
        doors: impl IntoIterator<Item = usize>,
        cars: impl IntoIterator<Item = usize>,
        car_index: usize,
        position: Position,
        grows_in_plus_y: bool,
        door_position: Position,
        default_gap: f32,
        max_queue_length: f32,
    ) -> Self {
        Self {
            kind,
            doors: doors.into_iter().collect(),
            cars: cars.into_iter().collect(),
            car_index,
            position,
            door_position,
            grows_in_plus_y,
            default_gap,
            max_queue_length,
            queue: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> BoardingPosKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn door_position(&self) -> Position {
        self.door_position
    }

    pub fn car_index(&self) -> usize {
        self.car_index
    }

    pub fn doors(&self) -> impl Iterator<Item = usize> + '_ {
        self.doors.iter().copied()
    }

    pub fn cars(&self) -> impl Iterator<Item = usize> + '_ {
        self.cars.iter().copied()
    }

    pub fn has_door(&self, door_count: usize) -> bool {
        self.doors.contains(&door_count)
    }

    pub fn has_car(&self, car_count: usize) -> bool {
        self.cars.contains(&car_count)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.queue.iter()
    }

    pub fn contains(&self, id: PassengerId) -> bool {
        self.queue.iter().any(|p| p.id == id)
    }

    fn direction(&self) -> f32 {
        if self.grows_in_plus_y {
            1.0
        } else {
            -1.0
        }
    }

    /// Queue spot for the `index`-th member at the given spacing
    fn slot(&self, index: usize, gap: f32) -> Position {
        self.position.offset_y(gap * index as f32 * self.direction())
    }

    pub fn enqueue(&mut self, mut passenger: Passenger) {
        let len = self.queue.len() + 1;
        if len == 1 {
            passenger.set_target(self.position, None);
            self.queue.push_back(passenger);
        } else if len as f32 * self.default_gap <= self.max_queue_length {
            passenger.set_target(self.slot(len - 1, self.default_gap), None);
            self.queue.push_back(passenger);
        } else {
            // Too full; everyone shuffles closer together
            self.queue.push_back(passenger);
            self.compact();
        }
    }

    /// Pop the passenger closest to the door
    pub fn dequeue(&mut self) -> Option<Passenger> {
        let passenger = self.queue.pop_front()?;
        self.readjust();
        Some(passenger)
    }

    /// Take a passenger out of the line, e.g. when they are sent elsewhere
    pub fn remove(&mut self, id: PassengerId) -> Option<Passenger> {
        let index = self.queue.iter().position(|p| p.id == id)?;
        let passenger = self.queue.remove(index);
        self.readjust();
        passenger
    }

    fn readjust(&mut self) {
        if self.queue.len() as f32 * self.default_gap <= self.max_queue_length {
            let targets: Vec<Position> = (0..self.queue.len())
                .map(|i| self.slot(i, self.default_gap))
                .collect();
            for (p, target) in self.queue.iter_mut().zip(targets) {
                p.set_target(target, None);
            }
        } else {
            self.compact();
        }
    }

    /// PRECONDITION: more passengers than fit at the default gap
    fn compact(&mut self) {
        let gap = self.max_queue_length / self.queue.len() as f32;
        let targets: Vec<Position> = (0..self.queue.len()).map(|i| self.slot(i, gap)).collect();
        for (p, target) in self.queue.iter_mut().zip(targets) {
            p.set_target(target, None);
        }
    }

    pub fn step(&mut self, delta_ms: f64, walk_speed: f32) {
        for p in self.queue.iter_mut() {
            p.step(delta_ms, walk_speed);
        }
    }
}
