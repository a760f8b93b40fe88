//! Projectile - the bubble being shot.
//!
//! The projectile travels in a straight line, bouncing off the side walls,
//! until it pops the first grid bubble it touches or parks at the top wall.
//! Only a pop sends it back to the launch position; a bubble parked at the
//! top launches its next shot from up there.

use bevy::prelude::*;

use super::{
    GameAssets,
    bubble::{ActivePalette, BubbleColor, GameRng, reset_palette},
    grid::{BUBBLE_RADIUS, BubbleGrid},
    shooter::LAUNCH_POSITION,
    state::GameScore,
};
use crate::{AppSystems, PausableSystems, audio::sound_effect, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Projectile>();
    app.add_message::<FireProjectile>();
    app.add_message::<BubblePopped>();

    app.add_systems(
        OnEnter(Screen::Gameplay),
        spawn_projectile.after(reset_palette),
    );

    app.add_systems(
        Update,
        (
            launch_projectile,
            move_projectile,
            check_wall_collision,
            check_grid_collision,
        )
            .chain()
            .in_set(AppSystems::Update)
            .in_set(PausableSystems)
            .in_set(ProjectileSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// System set for projectile flight and collision.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectileSystems;

/// Message to launch the projectile toward a direction.
#[derive(Message, Debug, Clone)]
pub struct FireProjectile {
    /// Normalized launch direction.
    pub direction: Vec2,
}

/// Message sent when the projectile pops a grid bubble.
#[derive(Message, Debug, Clone)]
pub struct BubblePopped {
    pub position: Vec2,
    pub color: BubbleColor,
}

/// The single player-controlled bubble.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    /// Current velocity (direction * speed). Zero while parked.
    pub velocity: Vec2,
    /// The bubble color.
    pub color: BubbleColor,
    /// Whether the projectile is in flight.
    pub moving: bool,
}

/// Marker for a projectile waiting on a fresh color after a pop.
#[derive(Component)]
pub struct AwaitingReload;

/// Left wall X position.
pub const LEFT_WALL: f32 = -240.0;

/// Right wall X position.
pub const RIGHT_WALL: f32 = 240.0;

/// Top wall Y position (where projectiles park).
pub const TOP_WALL: f32 = 320.0;

/// Base speed of the projectile in world units per second.
const BASE_PROJECTILE_SPEED: f32 = 300.0;

/// Extra speed gained per level.
const SPEED_PER_LEVEL: f32 = 60.0;

/// Projectile speed at the given level.
pub(super) fn projectile_speed(level: u32) -> f32 {
    BASE_PROJECTILE_SPEED + SPEED_PER_LEVEL * level as f32
}

/// Spawn the projectile at the launch position when entering gameplay.
fn spawn_projectile(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    palette: Res<ActivePalette>,
    mut rng: ResMut<GameRng>,
) {
    let color = BubbleColor::random_from(&palette.colors, &mut rng.0);

    commands.spawn((
        Name::new("Projectile"),
        Projectile {
            velocity: Vec2::ZERO,
            color,
            moving: false,
        },
        Transform::from_translation(LAUNCH_POSITION.extend(5.0)),
        Mesh2d(meshes.add(Circle::new(BUBBLE_RADIUS))),
        MeshMaterial2d(materials.add(ColorMaterial::from_color(color.to_color()))),
        DespawnOnExit(Screen::Gameplay),
    ));

    info!("Projectile spawned with {:?} loaded", color);
}

/// Set the projectile in motion when a fire message arrives.
fn launch_projectile(
    mut commands: Commands,
    mut fire_events: MessageReader<FireProjectile>,
    mut projectile_query: Query<&mut Projectile>,
    score: Res<GameScore>,
    game_assets: Res<GameAssets>,
) {
    for event in fire_events.read() {
        let Ok(mut projectile) = projectile_query.single_mut() else {
            continue;
        };
        if projectile.moving {
            continue;
        }

        projectile.velocity = event.direction * projectile_speed(score.level);
        projectile.moving = true;
        commands.spawn(sound_effect(game_assets.shoot_sound.clone()));

        info!(
            "Launched {:?} bubble toward {:?}",
            projectile.color, event.direction
        );
    }
}

/// Advance the projectile along its velocity.
fn move_projectile(time: Res<Time>, mut query: Query<(&mut Transform, &Projectile)>) {
    for (mut transform, projectile) in &mut query {
        if !projectile.moving {
            continue;
        }
        transform.translation += projectile.velocity.extend(0.0) * time.delta_secs();
    }
}

/// Reflect off the side walls and park at the top wall.
fn check_wall_collision(mut query: Query<(&mut Transform, &mut Projectile)>) {
    for (mut transform, mut projectile) in &mut query {
        if !projectile.moving {
            continue;
        }

        let (position, velocity, stopped) =
            clip_to_walls(transform.translation.truncate(), projectile.velocity);

        transform.translation.x = position.x;
        transform.translation.y = position.y;
        projectile.velocity = velocity;

        if stopped {
            projectile.moving = false;
            projectile.velocity = Vec2::ZERO;
            info!("Projectile parked at the top wall");
        }

        // A shot that dives below the field has nothing left to hit; recall
        // it instead of letting it fly forever.
        if transform.translation.y < LAUNCH_POSITION.y - 50.0 {
            transform.translation = LAUNCH_POSITION.extend(5.0);
            projectile.moving = false;
            projectile.velocity = Vec2::ZERO;
            warn!("Projectile left the field, recalled to launch");
        }
    }
}

/// Clamp a projectile position inside the walls, flipping the horizontal
/// velocity on a side wall and stopping flight at the top wall.
fn clip_to_walls(mut position: Vec2, mut velocity: Vec2) -> (Vec2, Vec2, bool) {
    if position.x - BUBBLE_RADIUS < LEFT_WALL {
        position.x = LEFT_WALL + BUBBLE_RADIUS;
        velocity.x = velocity.x.abs();
    }

    if position.x + BUBBLE_RADIUS > RIGHT_WALL {
        position.x = RIGHT_WALL - BUBBLE_RADIUS;
        velocity.x = -velocity.x.abs();
    }

    let stopped = position.y + BUBBLE_RADIUS >= TOP_WALL;
    if stopped {
        position.y = TOP_WALL - BUBBLE_RADIUS;
    }

    (position, velocity, stopped)
}

/// Pop the first grid bubble the projectile touches.
///
/// On a hit the projectile snaps back to the launch position and waits for a
/// fresh color; scoring picks up the [`BubblePopped`] message afterwards.
fn check_grid_collision(
    mut commands: Commands,
    mut grid: ResMut<BubbleGrid>,
    mut query: Query<(Entity, &mut Transform, &mut Projectile)>,
    mut popped_events: MessageWriter<BubblePopped>,
    game_assets: Res<GameAssets>,
) {
    let Ok((entity, mut transform, mut projectile)) = query.single_mut() else {
        return;
    };
    if !projectile.moving {
        return;
    }

    let position = transform.translation.truncate();
    let Some(hit) = grid.first_hit(position, BUBBLE_RADIUS) else {
        return;
    };

    let cell_position = grid.cell_position(hit);
    let Some(color) = grid.pop(hit) else {
        return;
    };

    popped_events.write(BubblePopped {
        position: cell_position,
        color,
    });
    commands.spawn(sound_effect(game_assets.pop_sound.clone()));

    projectile.moving = false;
    projectile.velocity = Vec2::ZERO;
    transform.translation = LAUNCH_POSITION.extend(5.0);
    commands.entity(entity).insert(AwaitingReload);

    info!("Popped {:?} bubble at {:?}", color, cell_position);
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::super::grid::INITIAL_ROWS;
    use super::*;

    #[test]
    fn side_walls_reflect_and_preserve_speed() {
        let (position, velocity, stopped) =
            clip_to_walls(Vec2::new(LEFT_WALL + 5.0, 0.0), Vec2::new(-120.0, 80.0));
        assert_eq!(position.x, LEFT_WALL + BUBBLE_RADIUS);
        assert_eq!(velocity, Vec2::new(120.0, 80.0));
        assert!(!stopped);

        let (position, velocity, stopped) =
            clip_to_walls(Vec2::new(RIGHT_WALL - 5.0, 0.0), Vec2::new(120.0, 80.0));
        assert_eq!(position.x, RIGHT_WALL - BUBBLE_RADIUS);
        assert_eq!(velocity, Vec2::new(-120.0, 80.0));
        assert!(!stopped);
    }

    #[test]
    fn top_wall_parks_the_projectile() {
        let (position, _, stopped) =
            clip_to_walls(Vec2::new(0.0, TOP_WALL - 10.0), Vec2::new(0.0, 300.0));
        assert!(stopped);
        assert_eq!(position.y, TOP_WALL - BUBBLE_RADIUS);
    }

    #[test]
    fn interior_flight_is_untouched() {
        let position = Vec2::new(40.0, -100.0);
        let velocity = Vec2::new(90.0, 250.0);
        assert_eq!(clip_to_walls(position, velocity), (position, velocity, false));
    }

    #[test]
    fn speed_grows_with_level() {
        assert!(projectile_speed(2) > projectile_speed(1));
        assert!(projectile_speed(5) > projectile_speed(2));
    }

    /// Step a simulated flight until it either pops a cell or parks at the
    /// top, mirroring the per-frame systems.
    fn fly(
        grid: &BubbleGrid,
        mut position: Vec2,
        direction: Vec2,
    ) -> (Vec2, Option<super::super::grid::CellIndex>, bool) {
        let mut velocity = direction * projectile_speed(1);
        let dt = 1.0 / 60.0;
        for _ in 0..10_000 {
            position += velocity * dt;
            let (clipped, clipped_velocity, stopped) = clip_to_walls(position, velocity);
            position = clipped;
            velocity = clipped_velocity;
            if stopped {
                return (position, None, true);
            }
            if let Some(hit) = grid.first_hit(position, BUBBLE_RADIUS) {
                return (position, Some(hit), false);
            }
        }
        panic!("flight never terminated");
    }

    #[test]
    fn straight_shot_stops_on_the_first_bubble_it_touches() {
        let mut rng = StdRng::seed_from_u64(23);
        let palette = BubbleColor::palette_for_level(1);
        let grid = BubbleGrid::generate(&palette, &mut rng);

        let (_, hit, parked) = fly(&grid, LAUNCH_POSITION, Vec2::Y);
        assert!(!parked);
        // The bottom row of the grid is hit first.
        assert_eq!(hit.unwrap().row, INITIAL_ROWS - 1);
    }

    #[test]
    fn shot_through_an_empty_grid_parks_at_the_top() {
        let grid = BubbleGrid::default();

        let (position, hit, parked) = fly(&grid, LAUNCH_POSITION, Vec2::Y);
        assert!(parked);
        assert_eq!(hit, None);
        assert_eq!(position.y, TOP_WALL - BUBBLE_RADIUS);
    }
}
