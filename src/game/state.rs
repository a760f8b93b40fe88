//! Game state management - score, levels, and the terminal game over.
//!
//! Every pop is worth 10 points. Crossing `50 * level` points raises the
//! level, which drops a new row onto the grid and widens the color palette.
//! The game ends for good when the descending grid reaches the danger line.

use bevy::prelude::*;

use super::{
    bubble::{ActivePalette, GameRng},
    grid::BubbleGrid,
    highscore::HighScore,
    projectile::{BubblePopped, ProjectileSystems},
};
use crate::{
    AppSystems, Pause, PausableSystems, menus::Menu, screens::Screen, theme::palette::LABEL_TEXT,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameScore>();
    app.register_type::<GameScore>();

    app.configure_sets(Update, ScoringSystems.after(ProjectileSystems));

    app.add_systems(OnEnter(Screen::Gameplay), (reset_score, spawn_score_ui));

    app.add_systems(
        Update,
        update_score
            .in_set(AppSystems::Update)
            .in_set(PausableSystems)
            .in_set(ScoringSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
    app.add_systems(Update, update_score_ui.run_if(in_state(Screen::Gameplay)));
}

/// System set for score and level bookkeeping. Runs after projectile
/// collision so pops land in the same frame they happen.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoringSystems;

/// Points awarded per popped bubble.
pub const POINTS_PER_POP: u32 = 10;

/// Points per level needed to advance: level N ends at `N * LEVEL_STEP`.
const LEVEL_STEP: u32 = 50;

/// Resource tracking the current score and level.
#[derive(Resource, Debug, Reflect)]
#[reflect(Resource)]
pub struct GameScore {
    pub score: u32,
    pub level: u32,
}

impl Default for GameScore {
    fn default() -> Self {
        Self { score: 0, level: 1 }
    }
}

impl GameScore {
    /// The score at which the current level ends.
    pub fn level_target(&self) -> u32 {
        self.level * LEVEL_STEP
    }

    /// Award the points for one pop.
    ///
    /// Returns true when the pop crossed the level threshold; the caller is
    /// responsible for the level-up side effects (grid descent, palette).
    pub fn record_pop(&mut self) -> bool {
        self.score += POINTS_PER_POP;
        if self.score >= self.level_target() {
            self.level += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Reset score when starting a new game.
fn reset_score(mut score: ResMut<GameScore>) {
    score.reset();
    info!("Score reset");
}

/// Apply each pop: points, high score, level-ups, and the game over check.
fn update_score(
    mut popped_events: MessageReader<BubblePopped>,
    mut score: ResMut<GameScore>,
    mut high_score: ResMut<HighScore>,
    mut grid: ResMut<BubbleGrid>,
    mut palette: ResMut<ActivePalette>,
    mut rng: ResMut<GameRng>,
    mut next_menu: ResMut<NextState<Menu>>,
    mut next_pause: ResMut<NextState<Pause>>,
) {
    for _event in popped_events.read() {
        let leveled_up = score.record_pop();

        if high_score.raise_to(score.score) {
            high_score.save();
        }

        if !leveled_up {
            continue;
        }

        // The new row rolls from the palette in play before the level-up;
        // the widened palette applies from the next reload onward.
        let shift = grid.insert_row(&palette.colors, &mut rng.0);
        palette.expand_for(score.level);

        info!(
            "Level {} reached at {} points, new row inserted",
            score.level, score.score
        );

        if shift.dropped_row {
            info!("Bottom row discarded to keep the grid in bounds");
        }

        if shift.reached_danger {
            info!("GAME OVER! Grid reached the danger line. Final score: {}", score.score);
            next_menu.set(Menu::GameOver);
            next_pause.set(Pause(true));
        }
    }
}

#[derive(Component)]
struct ScoreLabel;

#[derive(Component)]
struct HighScoreLabel;

#[derive(Component)]
struct LevelLabel;

/// Spawn the in-game score readout.
fn spawn_score_ui(mut commands: Commands) {
    commands.spawn((
        Name::new("Score Display"),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(8.0),
            flex_direction: FlexDirection::Column,
            ..default()
        },
        GlobalZIndex(1),
        DespawnOnExit(Screen::Gameplay),
        children![
            (
                Name::new("Score Label"),
                ScoreLabel,
                Text::new("Score: 0"),
                TextFont::from_font_size(18.0),
                TextColor(LABEL_TEXT),
            ),
            (
                Name::new("High Score Label"),
                HighScoreLabel,
                Text::new("High Score: 0"),
                TextFont::from_font_size(18.0),
                TextColor(LABEL_TEXT),
            ),
        ],
    ));

    commands.spawn((
        Name::new("Level Display"),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(12.0),
            bottom: Val::Px(8.0),
            ..default()
        },
        GlobalZIndex(1),
        DespawnOnExit(Screen::Gameplay),
        children![(
            Name::new("Level Label"),
            LevelLabel,
            Text::new("Level: 1"),
            TextFont::from_font_size(18.0),
            TextColor(LABEL_TEXT),
        )],
    ));
}

/// Keep the readout in sync with the score resources.
fn update_score_ui(
    score: Res<GameScore>,
    high_score: Res<HighScore>,
    mut score_label: Single<&mut Text, With<ScoreLabel>>,
    mut high_score_label: Single<&mut Text, (With<HighScoreLabel>, Without<ScoreLabel>)>,
    mut level_label: Single<
        &mut Text,
        (With<LevelLabel>, Without<ScoreLabel>, Without<HighScoreLabel>),
    >,
) {
    score_label.0 = format!("Score: {}", score.score);
    high_score_label.0 = format!("High Score: {}", high_score.value);
    level_label.0 = format!("Level: {}", score.level);
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::super::{
        bubble::BubbleColor,
        grid::{BubbleGrid, INITIAL_ROWS},
    };
    use super::*;

    #[test]
    fn score_is_a_multiple_of_ten() {
        let mut score = GameScore::default();
        for n in 1..=20 {
            score.record_pop();
            assert_eq!(score.score, n * POINTS_PER_POP);
            assert_eq!(score.score % 10, 0);
        }
    }

    #[test]
    fn level_up_exactly_at_fifty_times_level() {
        let mut score = GameScore::default();

        // Level 1 ends at 50 points: the fifth pop levels up.
        for i in 1..=4 {
            assert!(!score.record_pop(), "pop {i} should not level up");
        }
        assert!(score.record_pop());
        assert_eq!(score.level, 2);

        // Level 2 ends at 100 points: the tenth pop levels up.
        for i in 6..=9 {
            assert!(!score.record_pop(), "pop {i} should not level up");
        }
        assert!(score.record_pop());
        assert_eq!(score.level, 3);
    }

    #[test]
    fn five_pops_reach_level_two_and_insert_one_row() {
        let mut rng = StdRng::seed_from_u64(29);
        let palette = BubbleColor::palette_for_level(1);
        let mut grid = BubbleGrid::generate(&palette, &mut rng);
        let mut score = GameScore::default();

        let mut inserted = 0;
        for _ in 0..5 {
            if score.record_pop() {
                grid.insert_row(&palette, &mut rng);
                inserted += 1;
            }
        }

        assert_eq!(score.score, 50);
        assert_eq!(score.level, 2);
        assert_eq!(inserted, 1);
        assert_eq!(grid.row_count(), INITIAL_ROWS + 1);
    }
}
