//! Boarding eligibility rules
//!
//! Decides whether a passenger boarding a given car of a given train did the
//! right thing, and if not, which violation it was. Checks run worst-first so
//! the most severe applicable outcome always wins.

use super::passenger::{Fare, Timing};
use super::train::TrainConfig;
use super::types::ServiceClass;

/// Outcome of a boarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardingResult {
    /// Right train, right car, right fare
    Success,
    /// Train does not serve the passenger at all
    NoService,
    /// A faster train was worth waiting for
    Slow,
    /// Wanted the premium-limited service but took something else
    SlowLimitedExpress,
    /// Boarded an upcharge car without paying
    CostUnpaid,
    /// Boarded an upcharge car the passenger never wanted
    CostUndesired,
    /// Paid for an upcharge but rode without it
    CostOverpaid,
    /// Wanted an upcharge but did not get it (had not paid yet)
    CostDidntGetDesired,
    /// Paid for a reservation but boarded a non-reserved car
    CostReservedGotNonreserved,
    /// Paid for a reservation in a different reserved car
    CarWrongReserved,
    /// Accessibility passenger not in the accessible car
    CarDelay,
    /// Women-only car
    CarIllegal,
}

impl BoardingResult {
    pub fn is_success(self) -> bool {
        self == BoardingResult::Success
    }
}

/// Whether the train serves the passenger's destination at a tier they accept
fn train_serves_dest(fare: &Fare, train: &TrainConfig) -> bool {
    let config = &fare.config;

    if train.destination != config.destination {
        return false;
    }
    if config.timing == Timing::Airport && !train.airport {
        return false;
    }

    if train.service == ServiceClass::LimitedExpress
        && config.timing != Timing::LimitedExpress
        && !(train.airport && config.timing == Timing::Airport)
    {
        return false;
    }

    match config.timing {
        Timing::NoPreference => train.service == ServiceClass::Local,
        Timing::RapidTolerant(_) => {
            matches!(train.service, ServiceClass::Local | ServiceClass::Rapid)
        }
        Timing::ExpressTolerant { .. } => matches!(
            train.service,
            ServiceClass::Local | ServiceClass::Rapid | ServiceClass::Express
        ),
        Timing::LimitedExpress | Timing::Airport => true,
    }
}

/// Upcharge checks. `Err` short-circuits; `Ok(Some(..))` is the missed
/// desired upcharge, reported only if nothing worse applies.
fn undesired_upcharge(
    fare: &Fare,
    train: &TrainConfig,
    car: usize,
) -> Result<Option<BoardingResult>, BoardingResult> {
    let config = &fare.config;
    let paid = &fare.upcharges;
    let mut didnt_get_desired = false;
    let mut wrong_reserved = false;

    if train.is_premium_car(car) {
        if !config.premium {
            return Err(BoardingResult::CostUndesired);
        }
        if !paid.premium_paid() {
            return Err(BoardingResult::CostUnpaid);
        }
    } else {
        if paid.premium_paid() {
            return Err(BoardingResult::CostOverpaid);
        }
        if config.premium {
            didnt_get_desired = true;
        }
    }

    if train.is_reserved_car(car) {
        if !config.reservation {
            return Err(BoardingResult::CostUndesired);
        }
        match paid.reserved_car() {
            None => return Err(BoardingResult::CostUnpaid),
            Some(reserved) if reserved != car => wrong_reserved = true,
            Some(_) => {}
        }
    } else {
        if paid.reserved_car().is_some() {
            return Err(if train.has_reserved_cars() {
                BoardingResult::CostReservedGotNonreserved
            } else {
                BoardingResult::CostOverpaid
            });
        }
        if config.reservation {
            didnt_get_desired = true;
        }
    }

    // Limited-express riders who miss the service are handled as slow
    if train.service == ServiceClass::LimitedExpress && !paid.limited_express_paid() {
        return Err(BoardingResult::CostUnpaid);
    }

    if wrong_reserved {
        return Err(BoardingResult::CarWrongReserved);
    }
    if didnt_get_desired {
        return Ok(Some(BoardingResult::CostDidntGetDesired));
    }
    Ok(None)
}

/// Wait until the next train of `service` on the board, if one is scheduled
fn wait_for_next(
    train: &TrainConfig,
    departure_board: &[TrainConfig],
    service: ServiceClass,
) -> Option<f64> {
    departure_board
        .iter()
        .find(|t| t.service == service)
        .map(|next| next.ui_time - train.ui_time)
}

/// Whether a faster upcoming train was worth waiting for
fn train_slow(
    fare: &Fare,
    train: &TrainConfig,
    departure_board: &[TrainConfig],
) -> Option<BoardingResult> {
    match fare.config.timing {
        Timing::Airport => None,
        Timing::LimitedExpress => {
            if train.service == ServiceClass::LimitedExpress {
                None
            } else {
                Some(BoardingResult::SlowLimitedExpress)
            }
        }
        Timing::NoPreference => None,
        Timing::RapidTolerant(tolerance) => {
            if train.service != ServiceClass::Local {
                return None;
            }
            match wait_for_next(train, departure_board, ServiceClass::Rapid) {
                Some(wait) if wait < tolerance => Some(BoardingResult::Slow),
                _ => None,
            }
        }
        Timing::ExpressTolerant {
            from_local,
            from_rapid,
        } => {
            let tolerance = match train.service {
                ServiceClass::Local => from_local,
                ServiceClass::Rapid => from_rapid,
                _ => return None,
            };
            if let Some(wait) = wait_for_next(train, departure_board, ServiceClass::Express) {
                if wait < tolerance {
                    return Some(BoardingResult::Slow);
                }
            }
            if train.service == ServiceClass::Local {
                if let Some(wait) = wait_for_next(train, departure_board, ServiceClass::Rapid) {
                    if wait < from_local - from_rapid {
                        return Some(BoardingResult::Slow);
                    }
                }
            }
            None
        }
    }
}

/// Cheap check of whether this was the passenger's ideal train, ignoring
/// payment and car choice. Used to judge passengers left behind.
pub fn can_board_fast(fare: &Fare, train: &TrainConfig, departure_board: &[TrainConfig]) -> bool {
    train_serves_dest(fare, train) && train_slow(fare, train, departure_board).is_none()
}

/// Judge a passenger boarding car `car` (zero-indexed from the front of the
/// train).
///
/// `departure_board` is the rest of this track's schedule in order.
/// `accessible_car` of `None` means accessibility passengers may use any car.
pub fn can_board(
    fare: &Fare,
    train: &TrainConfig,
    car: usize,
    departure_board: &[TrainConfig],
    accessible_car: Option<usize>,
) -> BoardingResult {
    let config = &fare.config;

    if !train_serves_dest(fare, train) {
        return BoardingResult::NoService;
    }

    let deferred = match undesired_upcharge(fare, train, car) {
        Ok(deferred) => deferred,
        Err(result) => return result,
    };

    if train.is_women_car(car) && !config.women && !config.accessible {
        return BoardingResult::CarIllegal;
    }

    if let Some(slow) = train_slow(fare, train, departure_board) {
        return slow;
    }

    if config.accessible && accessible_car.is_some_and(|c| c != car) {
        return BoardingResult::CarDelay;
    }

    deferred.unwrap_or(BoardingResult::Success)
}
