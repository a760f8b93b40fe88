//! Launch input. A click both aims and fires: the direction runs from the
//! projectile's current position toward the pointer, so a bubble parked at
//! the top wall launches its next shot from up there.

use bevy::{prelude::*, window::PrimaryWindow};

use super::{
    bubble::{ActivePalette, BubbleColor, GameRng},
    projectile::{AwaitingReload, FireProjectile, Projectile},
    state::ScoringSystems,
};
use crate::{AppSystems, PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        handle_fire_input
            .in_set(AppSystems::RecordInput)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );

    // Reload runs after scoring so a level-up's expanded palette is already
    // in place when the fresh color is rolled.
    app.add_systems(
        Update,
        reload_projectile
            .after(ScoringSystems)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Where the projectile waits between shots, near the bottom of the field.
pub const LAUNCH_POSITION: Vec2 = Vec2::new(0.0, -290.0);

/// Fire toward the pointer on click.
fn handle_fire_input(
    mouse_input: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    projectile_query: Query<(&Transform, &Projectile)>,
    mut fire_events: MessageWriter<FireProjectile>,
) {
    if !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok((transform, projectile)) = projectile_query.single() else {
        return;
    };
    if projectile.moving {
        return;
    }

    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    // Get the cursor position in world coordinates.
    let Some(cursor_position) = window
        .cursor_position()
        .and_then(|p| camera.viewport_to_world_2d(camera_transform, p).ok())
    else {
        return;
    };

    let origin = transform.translation.truncate();
    let direction = (cursor_position - origin).normalize_or_zero();
    if direction == Vec2::ZERO {
        return;
    }

    fire_events.write(FireProjectile { direction });
}

/// Roll a fresh color for a projectile that just popped a bubble.
fn reload_projectile(
    mut commands: Commands,
    mut materials: ResMut<Assets<ColorMaterial>>,
    palette: Res<ActivePalette>,
    mut rng: ResMut<GameRng>,
    mut projectile_query: Query<
        (Entity, &mut Projectile, &mut MeshMaterial2d<ColorMaterial>),
        With<AwaitingReload>,
    >,
) {
    let Ok((entity, mut projectile, mut material)) = projectile_query.single_mut() else {
        return;
    };

    projectile.color = BubbleColor::random_from(&palette.colors, &mut rng.0);
    material.0 = materials.add(ColorMaterial::from_color(projectile.color.to_color()));
    commands.entity(entity).remove::<AwaitingReload>();

    info!("Reloaded with {:?}", projectile.color);
}
