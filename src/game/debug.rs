//! Debug visualization for the bubble grid.
//!
//! Toggle with the 'D' key during gameplay. Live cells draw green outlines,
//! popped cells faint white. The walls and the danger line are always drawn.

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    grid::{BUBBLE_RADIUS, BubbleGrid, DANGER_LINE_Y},
    projectile::{LEFT_WALL, RIGHT_WALL, TOP_WALL},
    shooter::LAUNCH_POSITION,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugGridVisible>();

    // Toggle debug with 'D' key
    app.add_systems(
        Update,
        toggle_debug.run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    // Draw debug grid when visible
    app.add_systems(
        Update,
        draw_debug_grid.run_if(in_state(Screen::Gameplay).and(debug_visible)),
    );

    // Always draw walls during gameplay
    app.add_systems(Update, draw_walls.run_if(in_state(Screen::Gameplay)));
}

/// Resource to track if debug visualization is visible.
#[derive(Resource, Default)]
pub struct DebugGridVisible(pub bool);

fn debug_visible(debug: Res<DebugGridVisible>) -> bool {
    debug.0
}

fn toggle_debug(mut debug: ResMut<DebugGridVisible>) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug grid: {}", state);
}

/// Draw cell outlines using Bevy's Gizmos.
fn draw_debug_grid(mut gizmos: Gizmos, grid: Res<BubbleGrid>) {
    for (position, popped) in grid.iter_cells() {
        let color = if popped {
            css::WHITE.with_alpha(0.15)
        } else {
            css::LIMEGREEN.with_alpha(0.5)
        };
        gizmos.circle_2d(Isometry2d::from_translation(position), BUBBLE_RADIUS, color);
    }

    // Mark the launch position.
    gizmos.circle_2d(
        Isometry2d::from_translation(LAUNCH_POSITION),
        BUBBLE_RADIUS,
        css::GOLD.with_alpha(0.4),
    );
}

/// Draw the walls and play area boundaries (always visible during gameplay).
fn draw_walls(mut gizmos: Gizmos) {
    let wall_color = css::ORANGE.with_alpha(0.8);
    let danger_color = css::RED.with_alpha(0.6);
    let bottom = LAUNCH_POSITION.y - 30.0;

    // Left wall
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, bottom),
        Vec2::new(LEFT_WALL, TOP_WALL),
        wall_color,
    );

    // Right wall
    gizmos.line_2d(
        Vec2::new(RIGHT_WALL, bottom),
        Vec2::new(RIGHT_WALL, TOP_WALL),
        wall_color,
    );

    // Top wall
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, TOP_WALL),
        Vec2::new(RIGHT_WALL, TOP_WALL),
        wall_color,
    );

    // Danger line (game over threshold)
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, DANGER_LINE_Y),
        Vec2::new(RIGHT_WALL, DANGER_LINE_Y),
        danger_color,
    );
}
