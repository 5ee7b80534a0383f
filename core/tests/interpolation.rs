//! Interpolation engine tests.
//!
//! Cover: endpoint reproduction, linear blending of continuous fields,
//! rounding of integer stats, fade-out/fade-in windows, and the fields
//! that must never blend.

use observer_core::{
    interpolation::interpolate,
    snapshot::{Asteroid, FadeDirection, Player, Ship, ShipClass, Snapshot, Wormhole},
    types::{EntityId, Vec2},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

fn ship(id: EntityId, x: f64, y: f64) -> Ship {
    Ship::new(id, 0, ShipClass::Drill, Vec2::new(x, y))
}

fn source() -> Snapshot {
    let mut leaving = ship(3, -200.0, 0.0);
    leaving.health = 40;

    let mut stayer = ship(1, 0.0, 0.0);
    stayer.vector = Vec2::new(10.0, 0.0);
    stayer.health = 100;
    stayer.fuel = 50.0;
    stayer.cargo = 0;

    Snapshot::new(3000.0)
        .with_player(Player::new(0, "alpha", "#ff0000"))
        .with_ship(stayer)
        .with_ship(leaving)
        .with_asteroid(Asteroid::new(10, Vec2::new(100.0, 100.0), 30.0))
        .with_wormhole(Wormhole::new(20, 21, Vec2::new(500.0, 500.0)))
}

fn target() -> Snapshot {
    let mut stayer = Ship::new(1, 0, ShipClass::Battleship, Vec2::new(100.0, 50.0));
    stayer.vector = Vec2::new(20.0, -10.0);
    stayer.health = 61;
    stayer.fuel = 45.5;
    stayer.cargo = 9;

    let mut shrunk = Asteroid::new(10, Vec2::new(200.0, 100.0), 5.0);
    shrunk.kind = 1;

    let mut player = Player::new(0, "alpha", "#ff0000");
    player.rock = 999.0;

    Snapshot::new(3000.0)
        .with_player(player)
        .with_ship(stayer)
        .with_ship(ship(4, 300.0, 0.0))
        .with_asteroid(shrunk)
        .with_wormhole(Wormhole::new(21, 20, Vec2::new(-500.0, -500.0)))
}

fn find(snapshot: &Snapshot, id: EntityId) -> Option<&Ship> {
    snapshot.ships.iter().find(|s| s.id == id)
}

#[test]
fn zero_ratio_reproduces_source() {
    let (s, t) = (source(), target());
    let blended = interpolate(&s, &t, 0.0);
    assert_eq!(blended, s);
}

#[test]
fn negative_or_nan_ratio_reproduces_source() {
    let (s, t) = (source(), target());
    assert_eq!(interpolate(&s, &t, -0.3), s);
    assert_eq!(interpolate(&s, &t, f64::NAN), s);
}

#[test]
fn unit_ratio_reproduces_target_entities() {
    let (s, t) = (source(), target());
    let blended = interpolate(&s, &t, 1.0);
    assert_eq!(blended.ships, t.ships);
    assert_eq!(blended.asteroids, t.asteroids);
    // Players and wormholes stay with the source.
    assert_eq!(blended.players, s.players);
    assert_eq!(blended.wormholes, s.wormholes);
}

#[test]
fn midpoint_position_and_vector() {
    let blended = interpolate(&source(), &target(), 0.5);
    let stayer = find(&blended, 1).expect("ship 1 present on both sides");
    assert_eq!(stayer.position, Vec2::new(50.0, 25.0));
    assert_eq!(stayer.vector, Vec2::new(15.0, -5.0));
    assert!(stayer.fade.is_none());
}

#[test]
fn integer_stats_are_rounded() {
    let blended = interpolate(&source(), &target(), 0.5);
    let stayer = find(&blended, 1).unwrap();
    // 100 -> 61 at 0.5 is 80.5
    assert_eq!(stayer.health, 81);
    // 50 -> 45.5 at 0.5 is 47.75
    assert_eq!(stayer.fuel, 48.0);
    // 0 -> 9 at 0.5 is 4.5
    assert_eq!(stayer.cargo, 5);
}

#[test]
fn discrete_fields_come_from_source() {
    let blended = interpolate(&source(), &target(), 0.9);
    let stayer = find(&blended, 1).unwrap();
    assert_eq!(stayer.class, ShipClass::Drill);

    let asteroid = &blended.asteroids[0];
    assert_eq!(asteroid.size, 30.0);
    assert_eq!(asteroid.kind, 0);
    assert!((asteroid.position.x - 190.0).abs() < 1e-9);

    assert_eq!(blended.players[0].rock, 0.0);
    assert_eq!(blended.wormholes[0].id, 20);
}

#[test]
fn departing_entity_fades_out_in_first_half() {
    let (s, t) = (source(), target());
    let mut rng = Pcg64Mcg::seed_from_u64(0x5EED_0001);
    let mut ratios: Vec<f64> = (0..200).map(|_| rng.gen_range(0.0001..0.5)).collect();
    ratios.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut last_alpha = 1.0;
    for ratio in ratios {
        let blended = interpolate(&s, &t, ratio);
        let leaving = find(&blended, 3).unwrap_or_else(|| panic!("ship 3 missing at t={ratio}"));
        let fade = leaving.fade.expect("departing ship carries a fade");
        assert_eq!(fade.direction, FadeDirection::Out);
        assert!((fade.alpha - (1.0 - 2.0 * ratio)).abs() < 1e-12);
        assert!(fade.alpha <= last_alpha, "alpha rose at t={ratio}");
        last_alpha = fade.alpha;
        // Departing entities keep their source state.
        assert_eq!(leaving.position, Vec2::new(-200.0, 0.0));
        assert_eq!(leaving.health, 40);
    }

    for ratio in [0.5, 0.51, 0.75, 0.99] {
        let blended = interpolate(&s, &t, ratio);
        assert!(find(&blended, 3).is_none(), "ship 3 visible at t={ratio}");
    }
}

#[test]
fn arriving_entity_fades_in_in_second_half() {
    let (s, t) = (source(), target());
    for ratio in [0.01, 0.25, 0.49, 0.4999] {
        let blended = interpolate(&s, &t, ratio);
        assert!(find(&blended, 4).is_none(), "ship 4 visible at t={ratio}");
    }

    let mut rng = Pcg64Mcg::seed_from_u64(0x5EED_0002);
    let mut ratios: Vec<f64> = (0..200).map(|_| rng.gen_range(0.5..0.9999)).collect();
    ratios.push(0.5);
    ratios.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut last_alpha = 0.0;
    for ratio in ratios {
        let blended = interpolate(&s, &t, ratio);
        let arriving = find(&blended, 4).unwrap_or_else(|| panic!("ship 4 missing at t={ratio}"));
        let fade = arriving.fade.expect("arriving ship carries a fade");
        assert_eq!(fade.direction, FadeDirection::In);
        assert!((fade.alpha - 2.0 * (ratio - 0.5)).abs() < 1e-12);
        assert!(fade.alpha >= last_alpha, "alpha fell at t={ratio}");
        last_alpha = fade.alpha;
    }
}

#[test]
fn arrival_fade_starts_at_zero() {
    let blended = interpolate(&source(), &target(), 0.5);
    let fade = find(&blended, 4).unwrap().fade.unwrap();
    assert_eq!(fade.alpha, 0.0);
}

#[test]
fn output_order_is_source_then_arrivals() {
    let early: Vec<EntityId> = interpolate(&source(), &target(), 0.2)
        .ships
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(early, vec![1, 3]);

    let late: Vec<EntityId> = interpolate(&source(), &target(), 0.8)
        .ships
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(late, vec![1, 4]);
}
