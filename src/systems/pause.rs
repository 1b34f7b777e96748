//! The pause timer: a pause can be open-ended or timed, and a timed pause hands back
//! the action to run when it expires.

use bevy_ecs::resource::Resource;
use tracing::trace;

/// What the game does when a timed pause expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    NextLevel,
    ResetLevel,
    RestartGame,
    ShowEntities,
}

#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub struct Pause {
    paused: bool,
    timer: f32,
    duration: Option<f32>,
    action: Option<PauseAction>,
}

impl Pause {
    /// A pause in the given state, with no timer armed.
    pub fn new(paused: bool) -> Self {
        Self {
            paused,
            ..Default::default()
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a timed pause is counting down.
    pub fn is_timed(&self) -> bool {
        self.paused && self.duration.is_some()
    }

    /// Advances a timed pause. Returns the armed action exactly once, when the timer runs out.
    pub fn update(&mut self, seconds: f32) -> Option<PauseAction> {
        let duration = self.duration?;
        if !self.paused {
            return None;
        }

        self.timer += seconds;
        if self.timer < duration {
            return None;
        }

        trace!(duration, action = ?self.action, "Pause expired");
        self.timer = 0.0;
        self.paused = false;
        self.duration = None;
        self.action.take()
    }

    /// Re-arms the pause. Any action pending from an earlier timed pause is discarded.
    pub fn set_pause(&mut self, paused: bool, duration: Option<f32>, action: Option<PauseAction>) {
        self.timer = 0.0;
        self.paused = paused;
        self.duration = duration;
        self.action = action;
    }

    /// Starts a timed pause that yields `action` after `duration` seconds.
    pub fn pause_for(&mut self, duration: f32, action: PauseAction) {
        self.set_pause(true, Some(duration), Some(action));
    }

    /// Toggles between paused and running.
    pub fn flip(&mut self) {
        self.timer = 0.0;
        self.paused = !self.paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timed_pause_fires_once() {
        let mut pause = Pause::new(false);
        pause.pause_for(3.0, PauseAction::NextLevel);
        assert_eq!(pause.update(2.0), None);
        assert!(pause.is_paused());
        assert_eq!(pause.update(1.0), Some(PauseAction::NextLevel));
        assert!(!pause.is_paused());
        assert_eq!(pause.update(5.0), None);
    }

    #[test]
    fn test_open_pause_never_expires() {
        let mut pause = Pause::new(true);
        assert_eq!(pause.update(100.0), None);
        assert!(pause.is_paused());
        assert!(!pause.is_timed());
    }

    #[test]
    fn test_rearming_discards_pending_action() {
        let mut pause = Pause::new(false);
        pause.pause_for(1.0, PauseAction::ShowEntities);
        pause.update(0.5);
        pause.pause_for(3.0, PauseAction::ResetLevel);
        assert_eq!(pause.update(1.0), None);
        assert_eq!(pause.update(2.0), Some(PauseAction::ResetLevel));
    }

    #[test]
    fn test_flip_toggles() {
        let mut pause = Pause::new(true);
        pause.flip();
        assert!(!pause.is_paused());
        pause.flip();
        assert!(pause.is_paused());
    }
}
