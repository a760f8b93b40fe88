//! Pop feedback: a short flash that swells and collapses where a bubble
//! popped.

use bevy::prelude::*;

use super::{grid::BUBBLE_RADIUS, projectile::BubblePopped};
use crate::{PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (spawn_pop_flash, animate_pop_flash)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Peak scale the flash swells to before collapsing.
const FLASH_PEAK_SCALE: f32 = 1.4;

/// Component for the transient flash left behind by a popped bubble.
#[derive(Component)]
struct PopFlash {
    /// Time elapsed in the animation.
    timer: f32,
    /// Total animation duration.
    duration: f32,
}

impl PopFlash {
    fn new() -> Self {
        Self {
            timer: 0.0,
            duration: 0.15,
        }
    }
}

/// Spawn a flash at every popped cell.
fn spawn_pop_flash(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut popped_events: MessageReader<BubblePopped>,
) {
    for event in popped_events.read() {
        commands.spawn((
            Name::new("Pop Flash"),
            PopFlash::new(),
            Transform::from_translation(event.position.extend(2.0)),
            Mesh2d(meshes.add(Circle::new(BUBBLE_RADIUS))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(event.color.to_color()))),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

/// Animate flashes and despawn them when done.
fn animate_pop_flash(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut PopFlash)>,
) {
    for (entity, mut transform, mut flash) in &mut query {
        flash.timer += time.delta_secs();
        let progress = (flash.timer / flash.duration).min(1.0);

        // Swell to the peak, then collapse to nothing.
        let scale = if progress < 0.5 {
            1.0 + (FLASH_PEAK_SCALE - 1.0) * progress * 2.0
        } else {
            FLASH_PEAK_SCALE * (1.0 - (progress - 0.5) * 2.0)
        };
        transform.scale = Vec3::splat(scale);

        if progress >= 1.0 {
            commands.entity(entity).despawn();
        }
    }
}
