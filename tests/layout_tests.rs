//! Door and car layout tests

use std::collections::BTreeSet;

use transit_platform::simulation::{
    compute_doors_for_pos, first_car_stopping_pos, BoardingPosKind, PlatformLayout, ServiceClass,
    TrainConfig,
};

fn check_all_doors(all_doors: &[usize], max_doors: usize, expected: &[&[usize]]) {
    let candidates: BTreeSet<usize> = all_doors.iter().copied().collect();
    for (slot, e) in expected.iter().enumerate() {
        let got: BTreeSet<usize> = compute_doors_for_pos(slot, &candidates, max_doors)
            .into_iter()
            .collect();
        let want: BTreeSet<usize> = e.iter().copied().collect();
        assert_eq!(got, want, "slot {} of {} doors", slot, max_doors);
    }
}

#[test]
fn test_first_car_stopping_pos_five_car_platform() {
    let expected = [(5, 0), (4, 0), (3, 1), (2, 1), (1, 2)];
    for (cars, pos) in expected {
        assert_eq!(first_car_stopping_pos(cars, 5).unwrap(), pos, "{} cars", cars);
    }
}

#[test]
fn test_first_car_stopping_pos_six_car_platform() {
    let expected = [(6, 0), (5, 0), (4, 1), (3, 1), (2, 2), (1, 2)];
    for (cars, pos) in expected {
        assert_eq!(first_car_stopping_pos(cars, 6).unwrap(), pos, "{} cars", cars);
    }
}

#[test]
fn test_train_longer_than_platform_fails() {
    assert!(first_car_stopping_pos(7, 6).is_err());
}

#[test]
fn test_distributes_one_door_trains() {
    check_all_doors(&[1], 1, &[&[1]]);
}

#[test]
fn test_distributes_two_door_trains() {
    check_all_doors(&[1, 2], 2, &[&[1, 2], &[2]]);
}

#[test]
fn test_distributes_three_door_trains() {
    check_all_doors(&[1, 2, 3], 3, &[&[1, 2, 3], &[3], &[2, 3]]);
}

#[test]
fn test_distributes_four_door_trains_on_five_slots() {
    check_all_doors(
        &[1, 2, 3, 4],
        5,
        &[&[1, 2, 3, 4], &[4], &[3], &[4], &[2, 3, 4]],
    );
}

#[test]
fn test_distributes_five_door_trains() {
    check_all_doors(
        &[1, 2, 3, 4, 5],
        5,
        &[&[1, 2, 3, 4, 5], &[4, 5], &[3, 5], &[4, 5], &[2, 3, 4, 5]],
    );
}

#[test]
fn test_distributes_seven_door_trains() {
    check_all_doors(
        &[1, 2, 3, 4, 5, 6, 7],
        7,
        &[
            &[1, 2, 3, 4, 5, 6, 7],
            &[6, 7],
            &[4, 5, 6, 7],
            &[3, 5, 7],
            &[4, 5, 6, 7],
            &[6, 7],
            &[2, 3, 4, 5, 6, 7],
        ],
    );
}

#[test]
fn test_odd_layouts_are_mirror_symmetric() {
    for max_doors in [3usize, 5, 7] {
        let candidates: BTreeSet<usize> = (2..=max_doors).collect();
        for slot in 0..max_doors {
            let mirror = max_doors - 1 - slot;
            let mut left = compute_doors_for_pos(slot, &candidates, max_doors);
            let mut right = compute_doors_for_pos(mirror, &candidates, max_doors);
            left.sort_unstable();
            right.sort_unstable();
            assert_eq!(left, right, "slots {} and {} of {}", slot, mirror, max_doors);
        }
    }
}

#[test]
fn test_every_slot_serves_the_full_door_count() {
    let candidates: BTreeSet<usize> = (1..=6).collect();
    for slot in 0..6 {
        assert!(compute_doors_for_pos(slot, &candidates, 6).contains(&6));
    }
}

#[test]
fn test_layout_widens_three_and_four_door_mix_to_five_slots() {
    let trains = vec![
        TrainConfig::new("a", 0.0, ServiceClass::Local, 4, 3),
        TrainConfig::new("a", 5.0, ServiceClass::Rapid, 6, 4),
    ];
    let layout = PlatformLayout::from_trains(&trains).unwrap();
    assert_eq!(layout.max_cars, 6);
    assert_eq!(layout.max_doors, 5);
    assert_eq!(
        layout.kinds,
        vec![
            BoardingPosKind::Service(ServiceClass::Local),
            BoardingPosKind::Service(ServiceClass::Rapid),
        ]
    );
}

#[test]
fn test_layout_orders_airport_lane_last() {
    let trains = vec![
        TrainConfig::new("a", 0.0, ServiceClass::Rapid, 2, 2).with_airport(),
        TrainConfig::new("a", 5.0, ServiceClass::Express, 2, 2),
        TrainConfig::new("a", 9.0, ServiceClass::Local, 2, 2),
    ];
    let layout = PlatformLayout::from_trains(&trains).unwrap();
    assert_eq!(
        layout.kinds,
        vec![
            BoardingPosKind::Service(ServiceClass::Local),
            BoardingPosKind::Service(ServiceClass::Express),
            BoardingPosKind::Airport,
        ]
    );
}

#[test]
fn test_layout_cars_for_slot_follow_centering() {
    let trains = vec![
        TrainConfig::new("a", 0.0, ServiceClass::Local, 5, 2),
        TrainConfig::new("a", 5.0, ServiceClass::Local, 3, 2),
    ];
    let layout = PlatformLayout::from_trains(&trains).unwrap();
    assert_eq!(layout.cars_for_slot(0).unwrap(), vec![5]);
    assert_eq!(layout.cars_for_slot(1).unwrap(), vec![3, 5]);
    assert_eq!(layout.cars_for_slot(3).unwrap(), vec![3, 5]);
    assert_eq!(layout.cars_for_slot(4).unwrap(), vec![5]);
}

#[test]
fn test_layout_rejects_doorless_trains() {
    let trains = vec![TrainConfig::new("a", 0.0, ServiceClass::Local, 3, 0)];
    assert!(PlatformLayout::from_trains(&trains).is_err());
}
