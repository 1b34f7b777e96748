use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::{
    constants::timing,
    error::GameError,
    highscore::HighScoreStore,
    map::{builder::Map, graph::Graph},
    systems::{
        ability::{AbilitySlot, Bullet},
        audio::{AudioEvent, Sound},
        components::{Collider, Hidden, PlayerControlled},
        ghost::{send_home, Ghost, GhostBounty, GhostMode, ModeController},
        hud::HudEvent,
        movement::{Position, Velocity},
        pause::{Pause, PauseAction},
        player::{PlayerLifecycle, PlayerModifiers},
        state::{award_points, Banner, Session},
    },
};

/// Everything a ghost capture touches besides the ghost itself.
pub struct CaptureContext<'a, 'w, 'h> {
    pub graph: &'a mut Graph,
    pub session: &'a mut Session,
    pub bounty: &'a mut GhostBounty,
    pub pause: &'a mut Pause,
    pub audio: &'a mut EventWriter<'w, AudioEvent>,
    pub hud: &'a mut EventWriter<'h, HudEvent>,
}

impl CaptureContext<'_, '_, '_> {
    /// Scores a captured ghost, sends it home and holds the game for a moment.
    pub fn capture(&mut self, ghost: Ghost, controller: &mut ModeController, velocity: &mut Velocity, at: Vec2) {
        send_home(ghost, self.graph, controller, velocity);
        let points = self.bounty.claim();
        award_points(self.session, points, self.audio);
        self.audio.write(AudioEvent::PlaySound(Sound::EatGhost));
        self.hud.write(HudEvent::Popup { points, position: at });
        self.pause.pause_for(timing::CAPTURE_DELAY, PauseAction::ShowEntities);
    }
}

/// Resolves Pac-Man touching a ghost.
///
/// A frightened ghost is captured and a returning one is ignored. Any other ghost is captured if an
/// active shield absorbs the hit, and kills Pac-Man otherwise. Invisible Pac-Man touches nothing.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::type_complexity)]
pub fn ghost_collision_system(
    mut commands: Commands,
    mut map: ResMut<Map>,
    mut session: ResMut<Session>,
    mut pause: ResMut<Pause>,
    mut bounty: ResMut<GhostBounty>,
    mut banner: ResMut<Banner>,
    high_scores: Res<HighScoreStore>,
    mut players: Query<
        (
            Entity,
            &mut PlayerLifecycle,
            &PlayerModifiers,
            &mut AbilitySlot,
            &Position,
            &Collider,
        ),
        (With<PlayerControlled>, Without<Hidden>),
    >,
    mut ghosts: Query<
        (Entity, &Ghost, &mut ModeController, &Position, &mut Velocity, &Collider),
        (Without<PlayerControlled>, Without<Hidden>),
    >,
    mut audio: EventWriter<AudioEvent>,
    mut hud: EventWriter<HudEvent>,
    mut errors: EventWriter<GameError>,
) {
    let Ok((player, mut lifecycle, modifiers, mut slot, position, collider)) = players.single_mut() else {
        return;
    };
    if !lifecycle.is_alive() || modifiers.is_invisible() {
        return;
    }
    let pacman = match position.get_pixel_position(&map.graph) {
        Ok(pixel) => pixel,
        Err(e) => {
            errors.write(e);
            return;
        }
    };

    let mut died = false;
    for (entity, ghost, mut controller, ghost_position, mut velocity, ghost_collider) in ghosts.iter_mut() {
        let at = match ghost_position.get_pixel_position(&map.graph) {
            Ok(pixel) => pixel,
            Err(e) => {
                errors.write(e);
                continue;
            }
        };
        if !collider.collides(pacman, ghost_collider, at) {
            continue;
        }

        let captured = match controller.current() {
            GhostMode::Freight => true,
            GhostMode::Spawn => continue,
            _ => slot.0.as_mut().is_some_and(|ability| ability.on_ghost_collide()),
        };

        if captured {
            CaptureContext {
                graph: &mut map.graph,
                session: &mut session,
                bounty: &mut bounty,
                pause: &mut pause,
                audio: &mut audio,
                hud: &mut hud,
            }
            .capture(*ghost, &mut controller, &mut velocity, at);
            commands.entity(player).insert(Hidden);
            commands.entity(entity).insert(Hidden);
            continue;
        }

        died = true;
        break;
    }

    if !died {
        return;
    }

    *lifecycle = PlayerLifecycle::Dying;
    audio.write(AudioEvent::StopMusic);
    audio.write(AudioEvent::PlaySound(Sound::PacmanDeath));
    for (entity, ..) in ghosts.iter() {
        commands.entity(entity).insert(Hidden);
    }

    if session.lose_life() {
        info!(score = session.score, level = session.level, "Game over");
        banner.set(Banner::GameOver, &mut hud);
        if let Err(e) = high_scores.save(session.high_score) {
            warn!(error = %e, "Failed to save high score");
        }
        pause.pause_for(timing::DEATH_DELAY, PauseAction::RestartGame);
    } else {
        debug!(lives = session.lives, "Pac-Man died");
        pause.pause_for(timing::DEATH_DELAY, PauseAction::ResetLevel);
    }
}

/// Bullets capture any visible ghost they touch unless it is already returning home.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::type_complexity)]
pub fn bullet_collision_system(
    mut commands: Commands,
    mut map: ResMut<Map>,
    mut session: ResMut<Session>,
    mut pause: ResMut<Pause>,
    mut bounty: ResMut<GhostBounty>,
    bullets: Query<(Entity, &Bullet, &Collider)>,
    mut ghosts: Query<(Entity, &Ghost, &mut ModeController, &Position, &mut Velocity, &Collider), Without<Hidden>>,
    mut audio: EventWriter<AudioEvent>,
    mut hud: EventWriter<HudEvent>,
) {
    let mut captured: SmallVec<[Entity; 4]> = SmallVec::new();

    for (bullet_entity, bullet, bullet_collider) in bullets.iter() {
        for (entity, ghost, mut controller, position, mut velocity, ghost_collider) in ghosts.iter_mut() {
            if captured.contains(&entity) || controller.current() == GhostMode::Spawn {
                continue;
            }
            let Ok(at) = position.get_pixel_position(&map.graph) else {
                continue;
            };
            if !bullet_collider.collides(bullet.position, ghost_collider, at) {
                continue;
            }

            debug!(ghost = ghost.as_ref(), "Ghost shot");
            CaptureContext {
                graph: &mut map.graph,
                session: &mut session,
                bounty: &mut bounty,
                pause: &mut pause,
                audio: &mut audio,
                hud: &mut hud,
            }
            .capture(*ghost, &mut controller, &mut velocity, at);
            commands.entity(entity).insert(Hidden);
            commands.entity(bullet_entity).despawn();
            captured.push(entity);
            break;
        }
    }
}
