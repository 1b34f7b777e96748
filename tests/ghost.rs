use bevy_ecs::system::RunSystemOnce;
use powerpac::constants::{mode, speed};
use powerpac::map::builder::Map;
use powerpac::map::direction::Direction;
use powerpac::map::graph::Access;
use powerpac::systems::{
    frighten, ghost_mode_system, ghost_movement_system, Ghost, GhostHome, GhostMode, ModeController, Position, Velocity,
};
use speculoos::prelude::*;

mod common;

fn home_for(map: &Map, ghost: Ghost) -> GhostHome {
    GhostHome {
        start: ghost.start_node(&map.start_positions),
        spawn: map.start_positions.spawn,
    }
}

#[test]
fn test_freight_ends_into_scheduled_main_mode() {
    let map = common::maze1();
    let home = home_for(&map, Ghost::Blinky);
    let mut world = common::create_test_world(map);
    let ghost = common::spawn_test_ghost(&mut world, Ghost::Blinky, Position::Stopped { node: home.start }, home);

    world.get_mut::<ModeController>(ghost).unwrap().start_freight();
    world.get_mut::<Velocity>(ghost).unwrap().speed = speed::GHOST_FREIGHT;

    common::set_delta(&mut world, mode::FREIGHT - 1.0);
    world.run_system_once(ghost_mode_system).expect("System should run successfully");
    assert_that(&world.get::<ModeController>(ghost).unwrap().current()).is_equal_to(GhostMode::Freight);
    assert_that(&world.get::<ModeController>(ghost).unwrap().is_flashing()).is_true();

    common::set_delta(&mut world, 1.0);
    world.run_system_once(ghost_mode_system).expect("System should run successfully");

    // The scatter timer kept running underneath, so the ghost comes out chasing.
    assert_that(&world.get::<ModeController>(ghost).unwrap().current()).is_equal_to(GhostMode::Chase);
    assert_that(&world.get::<Velocity>(ghost).unwrap().speed).is_equal_to(speed::GHOST);
}

#[test]
fn test_frighten_reverses_once() {
    let graph = common::graph_from("+.+");
    let mut controller = ModeController::new();
    let mut position = Position::Moving {
        from: 0,
        to: 1,
        remaining_distance: 10.0,
    };
    let mut velocity = Velocity {
        speed: speed::GHOST,
        direction: Direction::Right,
    };

    frighten(&graph, &mut controller, &mut position, &mut velocity);
    assert_that(&position.target_node()).is_equal_to(0);
    assert_that(&velocity.direction).is_equal_to(Direction::Left);
    assert_that(&velocity.speed).is_equal_to(speed::GHOST_FREIGHT);

    frighten(&graph, &mut controller, &mut position, &mut velocity);
    assert_that(&position.target_node()).is_equal_to(0);
}

#[test]
fn test_spawn_ends_on_reaching_spawn_node() {
    let mut map = common::maze1();
    let home = home_for(&map, Ghost::Pinky);
    let entry = map.home;
    map.graph.allow_home_access(Access::PINKY);
    let pacman_start = map.start_positions.pacman;

    let mut world = common::create_test_world(map);
    common::spawn_test_pacman(&mut world, Position::Stopped { node: pacman_start });
    let ghost = common::spawn_test_ghost(
        &mut world,
        Ghost::Pinky,
        Position::Moving {
            from: entry,
            to: home.spawn,
            remaining_distance: 15.0,
        },
        home,
    );
    {
        let mut controller = world.get_mut::<ModeController>(ghost).unwrap();
        controller.start_freight();
        controller.start_spawn();
    }
    world.get_mut::<Velocity>(ghost).unwrap().speed = 120.0;
    common::set_delta(&mut world, 0.125);

    world.run_system_once(ghost_movement_system).expect("System should run successfully");

    assert_that(world.get::<Position>(ghost).unwrap()).is_equal_to(Position::Stopped { node: home.spawn });
    assert_that(&world.get::<ModeController>(ghost).unwrap().current()).is_not_equal_to(GhostMode::Spawn);
    assert_that(&world.get::<Velocity>(ghost).unwrap().speed).is_equal_to(speed::GHOST);
    let map = world.resource::<Map>();
    assert_that(&map.graph.can_traverse(entry, Direction::Down, Access::PINKY)).is_false();
}

#[test]
fn test_ghosts_never_enter_home_uninvited() {
    let map = common::maze1();
    let entry = map.home;
    let left = common::node_at(&map, 12.0, 14.0);
    let home = home_for(&map, Ghost::Blinky);
    let pacman_start = map.start_positions.pacman;

    let mut world = common::create_test_world(map);
    common::spawn_test_pacman(&mut world, Position::Stopped { node: pacman_start });
    let ghost = common::spawn_test_ghost(
        &mut world,
        Ghost::Blinky,
        Position::Moving {
            from: left,
            to: entry,
            remaining_distance: 1.0,
        },
        home,
    );
    world.get_mut::<Velocity>(ghost).unwrap().direction = Direction::Right;
    common::set_delta(&mut world, 0.05);

    world.run_system_once(ghost_movement_system).expect("System should run successfully");

    let position = *world.get::<Position>(ghost).unwrap();
    let map = world.resource::<Map>();
    assert_that(&map.graph.is_home_node(position.target_node())).is_false();
}
