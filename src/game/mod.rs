//! The main game module for the bubble popper.
//!
//! This module contains all the gameplay logic including:
//! - The rectangular bubble grid and its descent
//! - Bubble colors and the level-driven palette
//! - Launch input and projectile flight
//! - Scoring, levels, and the terminal game over transition
//! - High score persistence

mod bubble;
mod debug;
mod grid;
pub mod highscore;
mod polish;
mod projectile;
mod shooter;
pub mod state;

use bevy::prelude::*;

use crate::{asset_tracking::LoadResource, audio::music, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<GameAssets>();
    app.load_resource::<GameAssets>();

    app.add_plugins((
        bubble::plugin,
        grid::plugin,
        shooter::plugin,
        projectile::plugin,
        state::plugin,
        highscore::plugin,
        polish::plugin,
        debug::plugin,
    ));
}

/// Sound cues and music for a round.
#[derive(Resource, Asset, Clone, Reflect)]
#[reflect(Resource)]
pub struct GameAssets {
    #[dependency]
    pub shoot_sound: Handle<AudioSource>,
    #[dependency]
    pub pop_sound: Handle<AudioSource>,
    #[dependency]
    music: Handle<AudioSource>,
}

impl FromWorld for GameAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self {
            shoot_sound: assets.load("audio/sound_effects/shoot.ogg"),
            pop_sound: assets.load("audio/sound_effects/pop.ogg"),
            music: assets.load("audio/music/gameplay.ogg"),
        }
    }
}

/// System to spawn the level scaffolding when entering gameplay.
/// Called from `screens/gameplay.rs` on `OnEnter(Screen::Gameplay)`.
pub fn spawn_level(mut commands: Commands, game_assets: Res<GameAssets>) {
    commands.spawn((
        Name::new("Level"),
        Transform::default(),
        Visibility::default(),
        DespawnOnExit(Screen::Gameplay),
        children![(
            Name::new("Gameplay Music"),
            music(game_assets.music.clone())
        )],
    ));

    info!("Level spawned - bubble popper ready!");
}
