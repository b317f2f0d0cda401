//! Scheduled train configuration

use super::types::{BoardingPosKind, ServiceClass};

/// Which cars of a train require a seat reservation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReservedCars {
    #[default]
    None,
    All,
    Cars(Vec<usize>),
}

/// A train as it appears on the departure board. Immutable once scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub destination: String,
    /// Departure time shown on the board; tolerances are in the same unit
    pub ui_time: f64,
    pub service: ServiceClass,
    pub airport: bool,
    pub cars: usize,
    pub doors: usize,
    /// Women-only cars (zero-indexed)
    pub women_cars: Vec<usize>,
    /// Premium ("blue") cars (zero-indexed)
    pub premium_cars: Vec<usize>,
    pub reserved: ReservedCars,
    /// Car that accessibility passengers are directed to during this dwell
    pub accessible_car: Option<usize>,
}

impl TrainConfig {
    pub fn new(
        destination: impl Into<String>,
        ui_time: f64,
        service: ServiceClass,
        cars: usize,
        doors: usize,
    ) -> Self {
        Self {
            destination: destination.into(),
            ui_time,
            service,
            airport: false,
            cars,
            doors,
            women_cars: Vec::new(),
            premium_cars: Vec::new(),
            reserved: ReservedCars::None,
            accessible_car: None,
        }
    }

    pub fn with_airport(mut self) -> Self {
        self.airport = true;
        self
    }

    pub fn with_women_cars(mut self, cars: Vec<usize>) -> Self {
        self.women_cars = cars;
        self
    }

    pub fn with_premium_cars(mut self, cars: Vec<usize>) -> Self {
        self.premium_cars = cars;
        self
    }

    pub fn with_reserved(mut self, reserved: ReservedCars) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn with_accessible_car(mut self, car: usize) -> Self {
        self.accessible_car = Some(car);
        self
    }

    pub fn is_premium_car(&self, car: usize) -> bool {
        self.premium_cars.contains(&car)
    }

    pub fn is_women_car(&self, car: usize) -> bool {
        self.women_cars.contains(&car)
    }

    pub fn is_reserved_car(&self, car: usize) -> bool {
        match &self.reserved {
            ReservedCars::None => false,
            ReservedCars::All => true,
            ReservedCars::Cars(cars) => cars.contains(&car),
        }
    }

    /// Whether any car on this train requires a reservation
    pub fn has_reserved_cars(&self) -> bool {
        !matches!(self.reserved, ReservedCars::None)
    }

    /// Queue kind this train contributes to a platform layout
    pub fn boarding_kind(&self) -> BoardingPosKind {
        if self.airport {
            BoardingPosKind::Airport
        } else {
            BoardingPosKind::Service(self.service)
        }
    }

    /// Whether passengers queued at a position of `kind` board this train
    pub fn serves_queue(&self, kind: BoardingPosKind) -> bool {
        match kind {
            BoardingPosKind::Service(service) => service == self.service,
            BoardingPosKind::Airport => self.airport,
        }
    }
}
