//! Render snapshots handed to the drawing backend once per frame.

use glam::Vec2;

use crate::map::direction::Direction;
use crate::map::layout::Maze;
use crate::systems::ghost::{Ghost, GhostMode};
use crate::systems::hud::TextId;
use crate::systems::item::Pellet;

/// Pac-Man as drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacmanView {
    pub position: Vec2,
    pub direction: Direction,
    pub visible: bool,
    pub alive: bool,
    /// Drawn translucent while true.
    pub invisible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostView {
    pub ghost: Ghost,
    pub position: Vec2,
    pub direction: Direction,
    pub mode: GhostMode,
    /// FREIGHT is about to run out.
    pub flashing: bool,
    pub visible: bool,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub maze: Maze,
    pub pacman: Option<PacmanView>,
    pub ghosts: Vec<GhostView>,
    pub pellets: Vec<Pellet>,
    pub fruit: Option<Vec2>,
    pub bullets: Vec<Vec2>,
    /// The maze background is showing its flash color.
    pub background_lit: bool,
    pub paused: bool,
    pub banner: Option<TextId>,
}

impl Frame {
    /// Pellets that should be drawn; blinking power pellets drop out on their off phase.
    pub fn visible_pellets(&self) -> impl Iterator<Item = &Pellet> {
        self.pellets.iter().filter(|pellet| pellet.visible)
    }
}

/// The drawing backend.
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}
