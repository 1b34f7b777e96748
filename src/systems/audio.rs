//! Audio events and the system that hands them to the sound backend.
//!
//! Game systems only ever write [`AudioEvent`]s. The backend implements [`AudioSink`] and lives in a
//! NonSend resource, so it is free to hold handles that cannot cross threads.

use bevy_ecs::{
    event::{Event, EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{NonSendMut, Query, Res, ResMut},
};
use strum_macros::{AsRefStr, EnumIter, IntoStaticStr};
use tracing::{debug, trace};

use crate::systems::{
    components::PlayerControlled,
    ghost::{Ghost, GhostMode, ModeController},
    pause::Pause,
    player::PlayerLifecycle,
    state::Banner,
};

/// Sound effects and music tracks, named as the backend knows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Sound {
    #[strum(serialize = "munch_1")]
    Munch,
    PowerPellet,
    EatGhost,
    PacmanDeath,
    EatFruit,
    Extend,
    GameStart,
    #[strum(serialize = "pacman_intermission")]
    Intermission,
    #[strum(serialize = "pacman_extrapac")]
    LevelClear,
    Retreating,
    #[strum(serialize = "pacman_beginning")]
    Background,
}

/// Events for triggering audio playback
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// Play a one-shot sound effect
    PlaySound(Sound),
    /// Start a music track; a negative loop count repeats forever
    PlayMusic { track: Sound, loops: i32 },
    StopMusic,
}

/// The sound backend.
pub trait AudioSink {
    fn play_sound(&mut self, name: &str);
    fn play_background_music(&mut self, name: &str, loops: i32);
    fn stop_music(&mut self);
}

/// Non-send resource wrapper for the sound backend.
pub struct AudioResource(pub Box<dyn AudioSink>);

/// Resource for tracking audio state
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioState {
    /// The music track currently playing
    pub music: Option<Sound>,
}

/// System that processes audio events and forwards them to the backend
pub fn audio_system(mut audio: NonSendMut<AudioResource>, mut state: ResMut<AudioState>, mut events: EventReader<AudioEvent>) {
    for event in events.read() {
        match *event {
            AudioEvent::PlaySound(sound) => {
                trace!(sound = sound.as_ref(), "Playing sound");
                audio.0.play_sound(sound.as_ref());
            }
            AudioEvent::PlayMusic { track, loops } => {
                if state.music == Some(track) {
                    continue;
                }
                debug!(track = track.as_ref(), loops, "Starting music");
                state.music = Some(track);
                audio.0.play_background_music(track.as_ref(), loops);
            }
            AudioEvent::StopMusic => {
                if state.music.take().is_some() {
                    debug!("Stopping music");
                }
                audio.0.stop_music();
            }
        }
    }
}

/// Keeps the right music track playing: the retreat theme while any ghost is frightened, the
/// regular theme otherwise. Nothing changes while the game is paused or the player is dead.
pub fn background_music_system(
    pause: Res<Pause>,
    banner: Res<Banner>,
    state: Res<AudioState>,
    players: Query<&PlayerLifecycle, With<PlayerControlled>>,
    ghosts: Query<&ModeController, With<Ghost>>,
    mut audio: EventWriter<AudioEvent>,
) {
    if *banner == Banner::GameOver {
        if state.music.is_some() {
            audio.write(AudioEvent::StopMusic);
        }
        return;
    }

    let alive = players.iter().any(|lifecycle| lifecycle.is_alive());
    if pause.is_paused() || !alive {
        return;
    }

    let track = if ghosts.iter().any(|controller| controller.current() == GhostMode::Freight) {
        Sound::Retreating
    } else {
        Sound::Background
    };
    if state.music != Some(track) {
        audio.write(AudioEvent::PlayMusic { track, loops: -1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_sound_names() {
        let names: Vec<&'static str> = Sound::iter().map(<&'static str>::from).collect();
        assert_eq!(
            names,
            vec![
                "munch_1",
                "power_pellet",
                "eat_ghost",
                "pacman_death",
                "eat_fruit",
                "extend",
                "game_start",
                "pacman_intermission",
                "pacman_extrapac",
                "retreating",
                "pacman_beginning",
            ]
        );
    }
}
