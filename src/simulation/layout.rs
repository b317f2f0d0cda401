//! Door and car layout for a platform shared by heterogeneous trains
//!
//! Trains of different lengths stop centred on the platform, and trains with
//! different door counts open a symmetric subset of a shared set of door slots.

use anyhow::{bail, Result};
use std::collections::BTreeSet;

use super::train::TrainConfig;
use super::types::BoardingPosKind;

/// Returns the ZERO-INDEXED platform car slot where the first car of a train stops
pub fn first_car_stopping_pos(train_cars: usize, platform_cars: usize) -> Result<usize> {
    if train_cars > platform_cars {
        bail!(
            "Train of {} cars does not fit a {} car platform",
            train_cars,
            platform_cars
        );
    }
    Ok((platform_cars - train_cars) / 2)
}

/// Door counts (from `door_counts`) that open at door slot `slot` on a
/// platform laid out for `max_doors` slots per car.
pub fn compute_doors_for_pos(
    slot: usize,
    door_counts: &BTreeSet<usize>,
    max_doors: usize,
) -> Vec<usize> {
    let slot = slot as i64;
    let max = max_doors as i64;
    let mut doors = Vec::new();

    for &candidate in door_counts {
        let c = candidate as i64;
        if slot == 0 || c == max {
            doors.push(candidate);
            continue;
        }
        if c <= 1 {
            continue;
        }
        if max % 2 != 0 && slot * 2 + 1 == max {
            // Middle slot of an odd layout opens for odd door counts
            if c % 2 != 0 {
                doors.push(candidate);
            }
            continue;
        }
        let mid = max / 2 - 1;
        if max % 2 == 0 && c % 2 != 0 && slot == mid {
            // Even layout, odd centre door
            doors.push(candidate);
            continue;
        }
        let equivalent_door = if slot > mid { max - slot - 1 } else { slot };
        if equivalent_door == 0 {
            doors.push(candidate);
            continue;
        }
        let num_doors_open = if max % 2 == 0 && c % 2 != 0 { mid - 1 } else { mid };
        let num_doors_left = c / 2 - 1;
        if num_doors_left <= 0 || num_doors_open <= 0 {
            continue;
        }
        let g = num_doors_open as f64 / num_doors_left as f64;
        let mut i = g;
        while i <= num_doors_open as f64 {
            if i.ceil() as i64 == equivalent_door {
                doors.push(candidate);
                break;
            }
            i += g;
        }
    }

    doors
}

/// Platform dimensions derived from every train scheduled on one track
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformLayout {
    pub max_cars: usize,
    pub max_doors: usize,
    pub car_counts: BTreeSet<usize>,
    pub door_counts: BTreeSet<usize>,
    /// Queue kinds in lane order
    pub kinds: Vec<BoardingPosKind>,
}

impl PlatformLayout {
    pub fn from_trains(trains: &[TrainConfig]) -> Result<Self> {
        let mut max_cars = 0;
        let mut max_doors = 0;
        let mut car_counts = BTreeSet::new();
        let mut door_counts = BTreeSet::new();
        let mut kinds = BTreeSet::new();

        for train in trains {
            if train.cars == 0 || train.doors == 0 {
                bail!(
                    "Train to {} at {} has {} cars and {} doors",
                    train.destination,
                    train.ui_time,
                    train.cars,
                    train.doors
                );
            }
            max_cars = max_cars.max(train.cars);
            max_doors = max_doors.max(train.doors);
            car_counts.insert(train.cars);
            door_counts.insert(train.doors);
            kinds.insert(train.boarding_kind());
        }

        // 3 and 4 door trains line up symmetrically on 5 slots
        if max_doors < 5 && door_counts.contains(&3) && door_counts.contains(&4) {
            max_doors = 5;
        }

        Ok(Self {
            max_cars,
            max_doors,
            car_counts,
            door_counts,
            kinds: kinds.into_iter().collect(),
        })
    }

    /// Door counts served by door slot `slot`
    pub fn doors_for_slot(&self, slot: usize) -> Vec<usize> {
        compute_doors_for_pos(slot, &self.door_counts, self.max_doors)
    }

    /// Train lengths that cover platform car slot `car_index`
    pub fn cars_for_slot(&self, car_index: usize) -> Result<Vec<usize>> {
        let mut cars = Vec::new();
        for &candidate in &self.car_counts {
            let start = first_car_stopping_pos(candidate, self.max_cars)?;
            if car_index >= start && car_index < start + candidate {
                cars.push(candidate);
            }
        }
        Ok(cars)
    }
}
