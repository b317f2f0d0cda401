//! Core types for the platform simulation
//!
//! Ids, positions and the service tiers shared by trains, passengers and
//! boarding positions.

use std::fmt;

/// A unique identifier for simulation entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for passenger IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassengerId(pub SimId);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pax#{}", self.0 .0)
    }
}

/// Which side of the island platform a track runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackSide {
    /// Track at y = 0; trains travel toward -x, queues grow toward +y
    Near,
    /// Track at y = platform width; mirrored in x, queues grow toward -y
    Far,
}

impl TrackSide {
    pub const BOTH: [TrackSide; 2] = [TrackSide::Near, TrackSide::Far];

    pub fn index(self) -> usize {
        match self {
            TrackSide::Near => 0,
            TrackSide::Far => 1,
        }
    }

    /// Queues on this side grow toward +y
    pub fn grows_in_plus_y(self) -> bool {
        self == TrackSide::Near
    }
}

/// Train service tier, ranked from least to most selective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceClass {
    Local,
    Rapid,
    Express,
    /// Premium-limited service, only for passengers who pay for it
    LimitedExpress,
}

/// Queue kind of a boarding position.
///
/// Ordering is the lane order on the platform: service tiers first, then
/// the airport lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardingPosKind {
    Service(ServiceClass),
    Airport,
}

/// A 2D position on the platform, in abstract spatial units (asu)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move `step` units in a straight line toward `target`
    pub fn move_towards(&self, target: &Position, step: f32) -> Position {
        let dist = self.distance(target);
        if dist <= step || dist == 0.0 {
            return *target;
        }
        let t = step / dist;
        Position {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    pub fn offset_y(&self, dy: f32) -> Position {
        Position::new(self.x, self.y + dy)
    }
}
