//! Passenger agents and their fare configuration
//!
//! A passenger is either fare-bearing (controllable by the player, judged when
//! boarding) or a generic extra stepping off a train. Both share the same
//! waypoint-based walking model.

use anyhow::{bail, Result};
use std::collections::VecDeque;

use super::types::{PassengerId, Position};

/// How selective a passenger is about train speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// Takes locals only
    NoPreference,
    /// Takes locals and rapids; waits for a rapid if it comes within the tolerance
    RapidTolerant(f64),
    /// Takes locals, rapids and expresses.
    ///
    /// `from_local` is how long a local rider would wait for an express,
    /// `from_rapid` how long a rapid rider would.
    ExpressTolerant { from_local: f64, from_rapid: f64 },
    /// Will only ride the premium-limited service
    LimitedExpress,
    /// Needs an airport train
    Airport,
}

/// Immutable travel requirements of a fare-bearing passenger
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerConfig {
    pub destination: String,
    pub timing: Timing,
    /// Wants a premium ("blue") car
    pub premium: bool,
    /// Wants a reserved seat
    pub reservation: bool,
    /// Prefers the women-only car
    pub women: bool,
    pub accessible: bool,
}

impl PassengerConfig {
    pub fn new(destination: impl Into<String>, timing: Timing) -> Self {
        Self {
            destination: destination.into(),
            timing,
            premium: false,
            reservation: false,
            women: false,
            accessible: false,
        }
    }
}

/// An upcharge the passenger can pay at a station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upcharge {
    Premium,
    Reserved { car: usize },
    LimitedExpress,
}

/// Paid upcharges. Flags only ever go from unpaid to paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Upcharges {
    premium: bool,
    reserved_car: Option<usize>,
    limited_express: bool,
}

impl Upcharges {
    pub fn premium_paid(&self) -> bool {
        self.premium
    }

    pub fn reserved_car(&self) -> Option<usize> {
        self.reserved_car
    }

    pub fn limited_express_paid(&self) -> bool {
        self.limited_express
    }
}

/// Fare configuration plus payment state
#[derive(Debug, Clone, PartialEq)]
pub struct Fare {
    pub config: PassengerConfig,
    pub upcharges: Upcharges,
}

impl Fare {
    pub fn new(config: PassengerConfig) -> Self {
        Self {
            config,
            upcharges: Upcharges::default(),
        }
    }

    /// Returns true if the payment was taken
    pub fn pay_premium(&mut self) -> bool {
        if !self.config.premium || self.upcharges.premium {
            return false;
        }
        self.upcharges.premium = true;
        true
    }

    /// Returns true if the payment was taken
    pub fn pay_limited_express(&mut self) -> bool {
        if !matches!(self.config.timing, Timing::LimitedExpress | Timing::Airport) {
            return false;
        }
        if self.upcharges.limited_express {
            return false;
        }
        self.upcharges.limited_express = true;
        true
    }

    /// Returns true if the reservation for `car` was taken
    pub fn pay_reserved(&mut self, car: usize) -> bool {
        if !self.config.reservation || self.upcharges.reserved_car.is_some() {
            return false;
        }
        self.upcharges.reserved_car = Some(car);
        true
    }

    pub fn pay(&mut self, upcharge: Upcharge) -> bool {
        match upcharge {
            Upcharge::Premium => self.pay_premium(),
            Upcharge::Reserved { car } => self.pay_reserved(car),
            Upcharge::LimitedExpress => self.pay_limited_express(),
        }
    }
}

/// What happens when a passenger reaches a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalTag {
    /// Reached the train door; boarding gets judged
    BoardTrain,
    /// Left the platform
    Exit,
    /// Reached an upcharge station
    Pay(Upcharge),
    /// Caller-defined marker, reported back as an event
    Notify(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub target: Position,
    pub on_arrival: Option<ArrivalTag>,
}

/// A walking passenger
#[derive(Debug, Clone)]
pub struct Passenger {
    pub id: PassengerId,
    fare: Option<Fare>,
    /// None until spawned onto the platform
    position: Option<Position>,
    waypoints: VecDeque<Waypoint>,
    /// Time waited since release, ms
    elapsed: f64,
}

impl Passenger {
    /// A controllable, fare-bearing passenger
    pub fn new(id: PassengerId, config: PassengerConfig) -> Self {
        Self {
            id,
            fare: Some(Fare::new(config)),
            position: None,
            waypoints: VecDeque::new(),
            elapsed: 0.0,
        }
    }

    /// A generic passenger stepping off a train
    pub fn extra(id: PassengerId) -> Self {
        Self {
            id,
            fare: None,
            position: None,
            waypoints: VecDeque::new(),
            elapsed: 0.0,
        }
    }

    pub fn fare(&self) -> Option<&Fare> {
        self.fare.as_ref()
    }

    pub fn fare_mut(&mut self) -> Option<&mut Fare> {
        self.fare.as_mut()
    }

    pub fn is_controllable(&self) -> bool {
        self.fare.is_some()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is_spawned(&self) -> bool {
        self.position.is_some()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    /// Whether missing the ideal train now costs health
    pub fn is_annoyable(&self, threshold: f64) -> bool {
        self.fare.is_some() && self.elapsed > threshold
    }

    pub fn spawn(&mut self, position: Position) -> Result<()> {
        if self.position.is_some() {
            bail!("Passenger {} already spawned", self.id);
        }
        self.position = Some(position);
        Ok(())
    }

    /// Append a waypoint; movement happens during `step`
    pub fn queue_target(&mut self, target: Position, on_arrival: Option<ArrivalTag>) {
        self.waypoints.push_back(Waypoint { target, on_arrival });
    }

    /// Drop any pending walk and head straight for `target`
    pub fn set_target(&mut self, target: Position, on_arrival: Option<ArrivalTag>) {
        self.waypoints.clear();
        self.queue_target(target, on_arrival);
    }

    /// Advance along the waypoint list.
    ///
    /// Returns the arrival tag of a waypoint completed during this step.
    pub fn step(&mut self, delta_ms: f64, walk_speed: f32) -> Option<ArrivalTag> {
        if self.fare.is_some() {
            self.elapsed += delta_ms;
        }

        let position = self.position?;
        let waypoint = *self.waypoints.front()?;

        let step_size = (delta_ms / 1000.0) as f32 * walk_speed;
        if position.distance(&waypoint.target) <= step_size {
            self.position = Some(waypoint.target);
            self.waypoints.pop_front();
            return waypoint.on_arrival;
        }

        self.position = Some(position.move_towards(&waypoint.target, step_size));
        None
    }
}
