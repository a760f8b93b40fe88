//! The rectangular grid that holds all bubbles.
//!
//! Rows are stored top to bottom in a deque: a fresh row is pushed at the
//! front whenever the grid descends, and the oldest row falls off the back
//! when the grid grows past its height budget. Popped cells are only flagged,
//! never removed, so row-major scan order stays stable.

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::Rng;

use super::{
    bubble::{ActivePalette, BubbleColor, GameRng, reset_palette},
    projectile::TOP_WALL,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<BubbleGrid>();
    app.register_type::<BubbleGrid>();

    app.add_systems(
        OnEnter(Screen::Gameplay),
        regenerate_grid.after(reset_palette),
    );

    app.add_systems(
        Update,
        sync_bubble_visuals.run_if(in_state(Screen::Gameplay)),
    );
}

/// Number of columns in every row.
pub const COL_COUNT: usize = 12;

/// Radius of a single bubble in world units.
pub const BUBBLE_RADIUS: f32 = 15.0;

/// Distance between the centers of two adjacent cells.
pub const BUBBLE_DIAMETER: f32 = BUBBLE_RADIUS * 2.0;

/// Number of rows the grid starts with.
pub const INITIAL_ROWS: usize = 5;

/// Rows whose centers drop below this line end the game.
pub const DANGER_LINE_Y: f32 = -220.0;

/// Total grid height allowed before the bottom-most row is discarded.
pub const MAX_GRID_HEIGHT: f32 = 580.0;

/// X coordinate of the grid's left edge (the grid is centered on x = 0).
const GRID_LEFT: f32 = -(COL_COUNT as f32 * BUBBLE_DIAMETER) / 2.0;

/// One grid position holding a bubble's color and popped state.
#[derive(Debug, Clone, Copy)]
pub struct BubbleCell {
    pub color: BubbleColor,
    pub popped: bool,
}

/// A full row of cells sharing one vertical position.
#[derive(Debug, Clone)]
pub struct GridRow {
    pub y: f32,
    pub cells: Vec<BubbleCell>,
}

impl GridRow {
    fn random(y: f32, palette: &[BubbleColor], rng: &mut impl Rng) -> Self {
        let cells = (0..COL_COUNT)
            .map(|_| BubbleCell {
                color: BubbleColor::random_from(palette, rng),
                popped: false,
            })
            .collect();
        Self { y, cells }
    }
}

/// Position of a cell in the grid, row-major from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

/// Outcome of a grid descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShift {
    /// A row crossed the danger line: the game is over.
    pub reached_danger: bool,
    /// The bottom-most row was discarded to stay within the height budget.
    pub dropped_row: bool,
}

/// The main grid resource holding all bubbles.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct BubbleGrid {
    #[reflect(ignore)]
    rows: VecDeque<GridRow>,
}

impl BubbleGrid {
    /// Generate a fresh grid with [`INITIAL_ROWS`] rows hanging from the top
    /// wall.
    pub fn generate(palette: &[BubbleColor], rng: &mut impl Rng) -> Self {
        let mut rows = VecDeque::with_capacity(INITIAL_ROWS);
        for r in 0..INITIAL_ROWS {
            let y = TOP_WALL - BUBBLE_RADIUS - r as f32 * BUBBLE_DIAMETER;
            rows.push_back(GridRow::random(y, palette, rng));
        }
        Self { rows }
    }

    /// X coordinate of a column's center.
    pub fn column_x(col: usize) -> f32 {
        GRID_LEFT + BUBBLE_RADIUS + col as f32 * BUBBLE_DIAMETER
    }

    /// World position of a cell's center.
    pub fn cell_position(&self, index: CellIndex) -> Vec2 {
        Vec2::new(Self::column_x(index.col), self.rows[index.row].y)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Vertical extent occupied by the grid.
    pub fn total_height(&self) -> f32 {
        self.rows.len() as f32 * BUBBLE_DIAMETER
    }

    /// Find the first unpopped cell whose center lies within
    /// `radius + BUBBLE_RADIUS` of `center`.
    ///
    /// Ties are broken by row-major scan order, top row first.
    pub fn first_hit(&self, center: Vec2, radius: f32) -> Option<CellIndex> {
        for (row, grid_row) in self.rows.iter().enumerate() {
            for (col, cell) in grid_row.cells.iter().enumerate() {
                if cell.popped {
                    continue;
                }
                let cell_center = Vec2::new(Self::column_x(col), grid_row.y);
                if center.distance(cell_center) < radius + BUBBLE_RADIUS {
                    return Some(CellIndex { row, col });
                }
            }
        }
        None
    }

    /// Flag the cell as popped and return its color.
    ///
    /// Returns `None` if the cell is out of bounds or already popped.
    pub fn pop(&mut self, index: CellIndex) -> Option<BubbleColor> {
        let cell = self.rows.get_mut(index.row)?.cells.get_mut(index.col)?;
        if cell.popped {
            return None;
        }
        cell.popped = true;
        Some(cell.color)
    }

    /// Shift every row down one bubble diameter and prepend a fresh row at
    /// the top wall.
    ///
    /// The danger check runs before the height bound: a row that crosses the
    /// danger line ends the game even if it would have been discarded.
    pub fn insert_row(&mut self, palette: &[BubbleColor], rng: &mut impl Rng) -> RowShift {
        for row in &mut self.rows {
            row.y -= BUBBLE_DIAMETER;
        }
        self.rows
            .push_front(GridRow::random(TOP_WALL - BUBBLE_RADIUS, palette, rng));

        let reached_danger = self.rows.iter().any(|row| row.y < DANGER_LINE_Y);

        let mut dropped_row = false;
        if self.total_height() > MAX_GRID_HEIGHT {
            self.rows.pop_back();
            dropped_row = true;
        }

        RowShift {
            reached_danger,
            dropped_row,
        }
    }

    /// Iterate every unpopped cell's world position and color.
    pub fn unpopped(&self) -> impl Iterator<Item = (Vec2, BubbleColor)> + '_ {
        self.rows.iter().flat_map(|row| {
            row.cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.popped)
                .map(move |(col, cell)| (Vec2::new(Self::column_x(col), row.y), cell.color))
        })
    }

    /// Iterate every cell's world position and popped flag.
    /// Used by the debug overlay.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Vec2, bool)> + '_ {
        self.rows.iter().flat_map(|row| {
            row.cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (Vec2::new(Self::column_x(col), row.y), cell.popped))
        })
    }
}

/// Build a fresh grid when starting a new game.
fn regenerate_grid(
    mut grid: ResMut<BubbleGrid>,
    palette: Res<ActivePalette>,
    mut rng: ResMut<GameRng>,
) {
    *grid = BubbleGrid::generate(&palette.colors, &mut rng.0);
    info!("Generated {} rows of bubbles", grid.row_count());
}

/// Marker component for grid bubble visuals.
#[derive(Component)]
struct BubbleVisual;

/// Rebuild bubble visuals whenever the grid changes.
///
/// The grid only changes on generation, a pop, or a descent, so a full
/// rebuild stays cheap.
fn sync_bubble_visuals(
    mut commands: Commands,
    grid: Res<BubbleGrid>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    visual_query: Query<Entity, With<BubbleVisual>>,
) {
    if !grid.is_changed() {
        return;
    }

    for entity in &visual_query {
        commands.entity(entity).despawn();
    }

    for (position, color) in grid.unpopped() {
        commands.spawn((
            Name::new(format!("Bubble {:?}", color)),
            BubbleVisual,
            Transform::from_translation(position.extend(0.0)),
            Mesh2d(meshes.add(Circle::new(BUBBLE_RADIUS))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(color.to_color()))),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn test_palette() -> Vec<BubbleColor> {
        BubbleColor::palette_for_level(1)
    }

    #[test]
    fn generated_grid_has_fixed_columns() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = BubbleGrid::generate(&test_palette(), &mut rng);

        assert_eq!(grid.row_count(), INITIAL_ROWS);
        assert!(grid.unpopped().count() == INITIAL_ROWS * COL_COUNT);
    }

    #[test]
    fn insert_row_shifts_every_cell_down_one_diameter() {
        let mut rng = StdRng::seed_from_u64(7);
        let palette = test_palette();
        let mut grid = BubbleGrid::generate(&palette, &mut rng);

        let before: Vec<f32> = grid.rows.iter().map(|row| row.y).collect();
        grid.insert_row(&palette, &mut rng);

        // The old rows sit behind the new front row, each one diameter lower.
        for (i, y) in before.iter().enumerate() {
            assert_eq!(grid.rows[i + 1].y, y - BUBBLE_DIAMETER);
        }
        assert_eq!(grid.rows[0].y, TOP_WALL - BUBBLE_RADIUS);
        assert!(grid.rows.iter().all(|row| row.cells.len() == COL_COUNT));
    }

    #[test]
    fn descent_flags_danger_exactly_when_a_row_crosses_the_line() {
        let mut rng = StdRng::seed_from_u64(3);
        let palette = test_palette();
        let mut grid = BubbleGrid::generate(&palette, &mut rng);

        // Starting from 5 rows at the top wall, the 14th descent pushes the
        // oldest row past the danger line.
        for i in 1..=13 {
            let shift = grid.insert_row(&palette, &mut rng);
            assert!(!shift.reached_danger, "descent {i} should be safe");
        }
        let shift = grid.insert_row(&palette, &mut rng);
        assert!(shift.reached_danger);
    }

    #[test]
    fn grid_height_is_bounded_by_dropping_the_bottom_row() {
        let mut rng = StdRng::seed_from_u64(5);
        let palette = test_palette();
        let mut grid = BubbleGrid::generate(&palette, &mut rng);

        let mut dropped = false;
        for _ in 0..16 {
            dropped |= grid.insert_row(&palette, &mut rng).dropped_row;
            assert!(grid.total_height() <= MAX_GRID_HEIGHT);
        }
        assert!(dropped);
    }

    #[test]
    fn first_hit_prefers_row_major_order_and_skips_popped() {
        let mut rng = StdRng::seed_from_u64(11);
        let palette = test_palette();
        let mut grid = BubbleGrid::generate(&palette, &mut rng);

        // Midway between the first two cells of the top row: both are in
        // range, the scan order decides.
        let a = CellIndex { row: 0, col: 0 };
        let b = CellIndex { row: 0, col: 1 };
        let midpoint = (grid.cell_position(a) + grid.cell_position(b)) / 2.0;

        assert_eq!(grid.first_hit(midpoint, BUBBLE_RADIUS), Some(a));
        grid.pop(a).unwrap();
        assert_eq!(grid.first_hit(midpoint, BUBBLE_RADIUS), Some(b));
    }

    #[test]
    fn far_projectile_hits_nothing() {
        let mut rng = StdRng::seed_from_u64(13);
        let grid = BubbleGrid::generate(&test_palette(), &mut rng);

        assert_eq!(grid.first_hit(Vec2::new(0.0, -290.0), BUBBLE_RADIUS), None);
    }

    #[test]
    fn pop_marks_cell_and_returns_color_only_once() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut grid = BubbleGrid::generate(&test_palette(), &mut rng);
        let index = CellIndex { row: 2, col: 3 };

        assert!(grid.pop(index).is_some());
        assert_eq!(grid.pop(index), None);
        // The cell stays in place, it is only flagged.
        assert_eq!(grid.row_count(), INITIAL_ROWS);
        assert_eq!(
            grid.unpopped().count(),
            INITIAL_ROWS * COL_COUNT - 1
        );
    }
}
