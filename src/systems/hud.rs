//! HUD updates: score, lives and level readouts, banner text and score popups.

use bevy_ecs::{
    event::{Event, EventReader, EventWriter},
    system::{Local, NonSendMut, Res},
};
use glam::Vec2;
use strum_macros::AsRefStr;
use tracing::trace;

use crate::constants::timing;
use crate::systems::state::Session;

/// Banner texts the HUD can show. Only one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TextId {
    Ready,
    Pause,
    GameOver,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum HudEvent {
    Score(u32),
    HighScore(u32),
    Level(u32),
    Lives(u32),
    ShowText(TextId),
    HideText,
    /// Points awarded at a spot on the board.
    Popup {
        points: u32,
        position: Vec2,
    },
    /// A fruit was eaten, worth the given points.
    FruitCaptured(u32),
}

/// The HUD backend.
pub trait Hud {
    fn update_score(&mut self, score: u32);
    fn update_level(&mut self, level: u32);
    fn show_text(&mut self, text: TextId);
    fn hide_text(&mut self);

    fn update_high_score(&mut self, _score: u32) {}
    fn update_lives(&mut self, _lives: u32) {}
    fn add_popup(&mut self, _points: u32, _position: Vec2, _duration: f32) {}
    fn add_captured_fruit(&mut self, _points: u32) {}
}

/// Non-send resource wrapper for the HUD backend.
pub struct HudResource(pub Box<dyn Hud>);

/// Forwards HUD events to the backend.
pub fn hud_system(mut hud: NonSendMut<HudResource>, mut events: EventReader<HudEvent>) {
    for event in events.read() {
        trace!(?event, "HUD event");
        match *event {
            HudEvent::Score(score) => hud.0.update_score(score),
            HudEvent::HighScore(score) => hud.0.update_high_score(score),
            HudEvent::Level(level) => hud.0.update_level(level),
            HudEvent::Lives(lives) => hud.0.update_lives(lives),
            HudEvent::ShowText(text) => hud.0.show_text(text),
            HudEvent::HideText => hud.0.hide_text(),
            HudEvent::Popup { points, position } => hud.0.add_popup(points, position, timing::POPUP),
            HudEvent::FruitCaptured(points) => hud.0.add_captured_fruit(points),
        }
    }
}

/// Last readouts sent to the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudReadout {
    score: u32,
    high_score: u32,
    lives: u32,
    level: u32,
}

/// Emits readout events whenever the session's numbers change.
pub fn hud_sync_system(session: Res<Session>, mut last: Local<Option<HudReadout>>, mut hud: EventWriter<HudEvent>) {
    let current = HudReadout {
        score: session.score,
        high_score: session.high_score,
        lives: session.lives,
        level: session.level,
    };
    let previous = last.replace(current);
    let changed = |field: fn(&HudReadout) -> u32| previous.is_none_or(|previous| field(&previous) != field(&current));

    if changed(|r| r.score) {
        hud.write(HudEvent::Score(current.score));
    }
    if changed(|r| r.high_score) {
        hud.write(HudEvent::HighScore(current.high_score));
    }
    if changed(|r| r.lives) {
        hud.write(HudEvent::Lives(current.lives));
    }
    if changed(|r| r.level) {
        hud.write(HudEvent::Level(current.level));
    }
}
