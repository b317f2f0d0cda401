//! Track state machine tests

use transit_platform::simulation::{
    BalanceConfig, BoardingPosHandle, BoardingResult, Passenger, PassengerConfig, PassengerId,
    ServiceClass, SimId, Timing, Track, TrackEvent, TrackSide, TrainConfig, TrainPhase,
};

fn local(destination: &str, ui_time: f64) -> TrainConfig {
    TrainConfig::new(destination, ui_time, ServiceClass::Local, 4, 2)
}

fn new_track(trains: Vec<TrainConfig>) -> Track {
    Track::new(
        TrackSide::Near,
        1_000.0,
        20_000.0,
        trains,
        BalanceConfig::default(),
    )
    .unwrap()
}

fn step_by(track: &mut Track, total: f64, delta: f64) -> Vec<TrackEvent> {
    let mut events = Vec::new();
    let mut done = 0.0;
    while done < total {
        events.extend(track.step(delta).unwrap());
        done += delta;
    }
    events
}

fn count_deboarded(events: &[TrackEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, TrackEvent::Deboarded { .. }))
        .count()
}

fn handle(car: usize, door: usize, lane: usize) -> BoardingPosHandle {
    BoardingPosHandle {
        side: TrackSide::Near,
        car,
        door,
        lane,
    }
}

/// A passenger already standing at the queue they are about to join
fn queued_pax(track: &Track, id: usize, destination: &str, at: BoardingPosHandle) -> Passenger {
    let mut p = Passenger::new(
        PassengerId(SimId(id)),
        PassengerConfig::new(destination, Timing::NoPreference),
    );
    p.spawn(track.position(at).unwrap().position()).unwrap();
    p
}

#[test]
fn test_train_gap_too_small_fails() {
    let result = Track::new(
        TrackSide::Near,
        0.0,
        19_999.0,
        vec![local("central", 0.0)],
        BalanceConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_phase_timeline() {
    let mut track = new_track(vec![local("central", 0.0), local("central", 10.0)]);

    step_by(&mut track, 900.0, 100.0);
    assert_eq!(track.phase(), None);
    assert_eq!(track.last_departure(), None);

    step_by(&mut track, 100.0, 100.0);
    assert_eq!(track.phase(), Some(TrainPhase::Arriving));
    assert_eq!(track.remaining_trains().count(), 1);

    step_by(&mut track, 5_000.0, 100.0);
    assert_eq!(track.phase(), Some(TrainPhase::Idle));

    step_by(&mut track, 10_000.0, 100.0);
    assert_eq!(track.phase(), Some(TrainPhase::Departing));

    step_by(&mut track, 5_000.0, 100.0);
    assert_eq!(track.phase(), None);
    assert_eq!(track.last_departure(), Some(21_000.0));

    // Next train comes one gap after the last one cleared the station
    step_by(&mut track, 19_900.0, 100.0);
    assert_eq!(track.phase(), None);
    step_by(&mut track, 100.0, 100.0);
    assert_eq!(track.phase(), Some(TrainPhase::Arriving));
    assert_eq!(track.current_train().unwrap().ui_time, 10.0);
}

#[test]
fn test_zero_step_is_noop() {
    let mut track = new_track(vec![local("central", 0.0)]);
    step_by(&mut track, 3_000.0, 100.0);
    let elapsed = track.elapsed_in_phase();

    assert!(track.step(0.0).unwrap().is_empty());
    assert!(track.step(-50.0).unwrap().is_empty());
    assert_eq!(track.time(), 3_000.0);
    assert_eq!(track.elapsed_in_phase(), elapsed);
}

#[test]
fn test_one_big_step_matches_many_small_steps() {
    let mut small = new_track(vec![local("central", 0.0), local("central", 10.0)]);
    let mut big = new_track(vec![local("central", 0.0), local("central", 10.0)]);
    let mut uneven = new_track(vec![local("central", 0.0), local("central", 10.0)]);

    let small_events = step_by(&mut small, 21_000.0, 100.0);
    let big_events = big.step(21_000.0).unwrap();
    let mut uneven_events = Vec::new();
    for delta in [250.0, 3_333.0, 77.0, 12_000.0, 5_340.0] {
        uneven_events.extend(uneven.step(delta).unwrap());
    }

    for (events, track) in [
        (&small_events, &small),
        (&big_events, &big),
        (&uneven_events, &uneven),
    ] {
        // 4 cars, 2 door slots, 1 lane, 4 pulses
        assert_eq!(count_deboarded(events), 32);
        assert!(matches!(events.first(), Some(TrackEvent::TrainArrived { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, TrackEvent::TrainDeparted { .. }))
                .count(),
            1
        );
        assert_eq!(track.phase(), None);
        assert_eq!(track.last_departure(), Some(21_000.0));
        assert_eq!(track.time(), 21_000.0);
    }
}

#[test]
fn test_big_step_lands_mid_phase() {
    let mut big = new_track(vec![local("central", 0.0)]);
    let mut small = new_track(vec![local("central", 0.0)]);
    big.step(7_500.0).unwrap();
    step_by(&mut small, 7_500.0, 100.0);

    assert_eq!(big.phase(), Some(TrainPhase::Idle));
    assert_eq!(big.elapsed_in_phase(), Some(1_500.0));
    assert_eq!(small.phase(), big.phase());
    assert_eq!(small.elapsed_in_phase(), big.elapsed_in_phase());
}

#[test]
fn test_departure_reports_remaining_board() {
    let mut track = new_track(vec![local("central", 0.0), local("central", 10.0)]);
    let events = track.step(16_000.0).unwrap();
    let board = events.iter().find_map(|e| match e {
        TrackEvent::TrainDeparted {
            departure_board, ..
        } => Some(departure_board.clone()),
        _ => None,
    });
    assert_eq!(board, Some(vec![local("central", 10.0)]));
}

#[test]
fn test_queued_passenger_boards_and_is_judged() {
    let mut track = new_track(vec![local("central", 0.0)]);
    let at = handle(0, 0, 0);
    let p = queued_pax(&track, 0, "central", at);
    track.enqueue(at, p).unwrap();
    assert_eq!(track.queued_passengers().count(), 1);

    // Boarding opens 2000 ms into the dwell, at 8000
    let events = step_by(&mut track, 8_000.0, 100.0);
    assert!(!events
        .iter()
        .any(|e| matches!(e, TrackEvent::Boarded { .. })));
    assert_eq!(track.queued_passengers().count(), 1);

    let events = step_by(&mut track, 1_000.0, 100.0);
    let door = track.position(at).unwrap().door_position();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, TrackEvent::Boarded { .. }))
            .collect::<Vec<_>>(),
        vec![&TrackEvent::Boarded {
            passenger: PassengerId(SimId(0)),
            result: BoardingResult::Success,
            door_position: door,
        }]
    );
    assert_eq!(track.queued_passengers().count(), 0);
    assert_eq!(track.boarding_passengers().count(), 0);
}

#[test]
fn test_wrong_destination_is_no_service() {
    let mut track = new_track(vec![local("central", 0.0)]);
    let at = handle(1, 1, 0);
    let p = queued_pax(&track, 3, "harbor", at);
    track.enqueue(at, p).unwrap();

    let events = step_by(&mut track, 9_000.0, 100.0);
    let result = events.iter().find_map(|e| match e {
        TrackEvent::Boarded { result, .. } => Some(*result),
        _ => None,
    });
    assert_eq!(result, Some(BoardingResult::NoService));
}

#[test]
fn test_other_lane_is_not_boarded() {
    let mut track = new_track(vec![
        local("central", 0.0),
        TrainConfig::new("central", 10.0, ServiceClass::Rapid, 4, 2),
    ]);
    // Lane 1 queues for the rapid
    let at = handle(0, 0, 1);
    let p = queued_pax(&track, 0, "central", at);
    track.enqueue(at, p).unwrap();

    let events = step_by(&mut track, 21_000.0, 100.0);
    assert!(!events
        .iter()
        .any(|e| matches!(e, TrackEvent::Boarded { .. })));
    assert_eq!(track.queued_passengers().count(), 1);
}

#[test]
fn test_remove_passenger_from_queue() {
    let mut track = new_track(vec![local("central", 0.0)]);
    let at = handle(2, 0, 0);
    let p = queued_pax(&track, 5, "central", at);
    track.enqueue(at, p).unwrap();

    assert!(track.remove_passenger(PassengerId(SimId(4))).is_none());
    let p = track.remove_passenger(PassengerId(SimId(5))).unwrap();
    assert_eq!(p.id, PassengerId(SimId(5)));
    assert_eq!(track.queued_passengers().count(), 0);
}

#[test]
fn test_enqueue_on_missing_position_fails() {
    let mut track = new_track(vec![local("central", 0.0)]);
    let p = Passenger::new(
        PassengerId(SimId(0)),
        PassengerConfig::new("central", Timing::NoPreference),
    );
    assert!(track.enqueue(handle(9, 0, 0), p).is_err());

    let far = BoardingPosHandle {
        side: TrackSide::Far,
        car: 0,
        door: 0,
        lane: 0,
    };
    assert!(track.position(far).is_none());
}

#[test]
fn test_empty_track_state() {
    let mut track = new_track(vec![TrainConfig::new("central", 0.0, ServiceClass::Local, 3, 3)]);

    let state = track.state();
    assert_eq!(state.phase, None);
    assert_eq!(state.active_car_count, 3);
    assert_eq!(state.active_door_count, 3);
    assert_eq!(state.boarding_layout.len(), 3);
    assert_eq!(state.boarding_layout[0].len(), 3);
    assert_eq!(state.boarding_layout[0][0].len(), 1);

    track.step(21_000.0).unwrap();
    let state = track.state();
    assert_eq!(state.phase, None);
    assert_eq!(state.active_car_count, 0);
    assert_eq!(state.active_door_count, 0);
}

#[test]
fn test_far_side_mirrors_positions() {
    let trains = vec![local("central", 0.0)];
    let near = Track::new(
        TrackSide::Near,
        0.0,
        20_000.0,
        trains.clone(),
        BalanceConfig::default(),
    )
    .unwrap();
    let far = Track::new(TrackSide::Far, 0.0, 20_000.0, trains, BalanceConfig::default()).unwrap();

    let near_pos = near.boarding_positions()[0].1.position();
    let far_pos = far.boarding_positions()[0].1.position();
    assert_eq!(near_pos.y, 0.0);
    assert_eq!(far_pos.y, BalanceConfig::default().platform_width);
    // 4 cars at 180 asu each
    assert_eq!(near_pos.x + far_pos.x, 720.0);
}
