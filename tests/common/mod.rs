#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    world::World,
};
use glam::Vec2;
use powerpac::{
    config::GameConfig,
    constants::{collider, speed},
    error::GameError,
    events::GameEvent,
    highscore::HighScoreStore,
    map::{
        builder::{Map, StartPositions},
        direction::Direction,
        graph::{Graph, NodeId},
        layout::{Maze, MAZE1},
        parser::TileGrid,
    },
    systems::{
        AbilitySlot, AudioEvent, AudioSink, AudioState, BackgroundFlash, Banner, BufferedDirection, Collider, DeltaTime,
        GameRng, Ghost, GhostBounty, GhostHome, GlobalState, Hud, HudEvent, ModeController, Pause, PelletGroup,
        PelletsEaten, PlayerControlled, PlayerLifecycle, PlayerModifiers, Position, Session, TextId, Velocity,
    },
};

/// Parses maze text into a bare graph.
pub fn graph_from(text: &str) -> Graph {
    Graph::from_tiles(&TileGrid::parse(text).unwrap())
}

/// Wraps a small maze into a `Map`, with every start position on the first node.
pub fn test_map(text: &str) -> Map {
    let grid = TileGrid::parse(text).unwrap();
    let graph = Graph::from_tiles(&grid);
    let first = graph.first_node().unwrap();
    Map {
        graph,
        grid,
        layout: &MAZE1,
        home: first,
        start_positions: StartPositions {
            pacman: first,
            blinky: first,
            pinky: first,
            inky: first,
            clyde: first,
            spawn: first,
            fruit: first,
        },
    }
}

/// The first shipped maze.
pub fn maze1() -> Map {
    Map::load(Maze::Maze1, None).unwrap()
}

pub fn node_at(map: &Map, col: f32, row: f32) -> NodeId {
    map.graph.node_at_tile(Vec2::new(col, row)).unwrap()
}

/// A unique scratch file path for this test process.
pub fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("powerpac-test-{}-{name}", std::process::id()))
}

pub fn test_config(name: &str) -> GameConfig {
    GameConfig {
        high_score_path: scratch_file(name),
        seed: Some(7),
        ..GameConfig::default()
    }
}

/// A running (unpaused) world with every resource and event the gameplay systems use.
pub fn create_test_world(map: Map) -> World {
    let mut world = World::new();

    EventRegistry::register_event::<GameError>(&mut world);
    EventRegistry::register_event::<GameEvent>(&mut world);
    EventRegistry::register_event::<AudioEvent>(&mut world);
    EventRegistry::register_event::<HudEvent>(&mut world);
    EventRegistry::register_event::<PelletsEaten>(&mut world);

    let config = test_config("world");
    world.insert_resource(PelletGroup::from_grid(&map.grid));
    world.insert_resource(map);
    world.insert_resource(Session::new(&config, 0));
    world.insert_resource(HighScoreStore::new(&config.high_score_path));
    world.insert_resource(config);
    world.insert_resource(Pause::new(false));
    world.insert_resource(Banner::None);
    world.insert_resource(GhostBounty::default());
    world.insert_resource(BackgroundFlash::default());
    world.insert_resource(AudioState::default());
    world.insert_resource(GameRng::new(Some(7)));
    world.insert_resource(GlobalState { exit: false });
    world.insert_resource(DeltaTime::from_seconds(1.0 / 60.0));

    world
}

pub fn spawn_test_pacman(world: &mut World, position: Position) -> Entity {
    world
        .spawn((
            PlayerControlled,
            PlayerLifecycle::Alive,
            PlayerModifiers::default(),
            AbilitySlot::default(),
            position,
            Velocity {
                speed: speed::PACMAN,
                direction: Direction::Left,
            },
            BufferedDirection::None,
            Collider::new(collider::PACMAN),
        ))
        .id()
}

pub fn spawn_test_ghost(world: &mut World, ghost: Ghost, position: Position, home: GhostHome) -> Entity {
    world
        .spawn((
            ghost,
            home,
            ModeController::new(),
            position,
            Velocity {
                speed: speed::GHOST,
                direction: Direction::Left,
            },
            Collider::new(collider::GHOST),
        ))
        .id()
}

pub fn set_delta(world: &mut World, seconds: f32) {
    world.insert_resource(DeltaTime::from_seconds(seconds));
}

pub fn send_event<E: bevy_ecs::event::Event>(world: &mut World, event: E) {
    world.resource_mut::<Events<E>>().send(event);
}

/// Every event of type `E` still buffered in the world.
pub fn buffered<E: bevy_ecs::event::Event + Clone>(world: &World) -> Vec<E> {
    let events = world.resource::<Events<E>>();
    events.iter_current_update_events().cloned().collect()
}

/// Audio backend recording the names it is asked to play.
#[derive(Clone, Default)]
pub struct RecordingAudio {
    pub played: Rc<RefCell<Vec<String>>>,
}

impl AudioSink for RecordingAudio {
    fn play_sound(&mut self, name: &str) {
        self.played.borrow_mut().push(name.to_string());
    }

    fn play_background_music(&mut self, name: &str, _loops: i32) {
        self.played.borrow_mut().push(format!("music:{name}"));
    }

    fn stop_music(&mut self) {
        self.played.borrow_mut().push("music:stop".to_string());
    }
}

/// HUD backend recording what it was last told.
#[derive(Clone, Default)]
pub struct RecordingHud {
    pub state: Rc<RefCell<HudState>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct HudState {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub text: Option<TextId>,
    pub popups: Vec<u32>,
}

impl Hud for RecordingHud {
    fn update_score(&mut self, score: u32) {
        self.state.borrow_mut().score = score;
    }

    fn update_level(&mut self, level: u32) {
        self.state.borrow_mut().level = level;
    }

    fn show_text(&mut self, text: TextId) {
        self.state.borrow_mut().text = Some(text);
    }

    fn hide_text(&mut self) {
        self.state.borrow_mut().text = None;
    }

    fn update_lives(&mut self, lives: u32) {
        self.state.borrow_mut().lives = lives;
    }

    fn add_popup(&mut self, points: u32, _position: Vec2, _duration: f32) {
        self.state.borrow_mut().popups.push(points);
    }
}
