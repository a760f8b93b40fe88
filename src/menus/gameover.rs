//! The game over menu. Shown when the grid reaches the danger line; the only
//! way out is back to the title screen.

use bevy::prelude::*;

use crate::{
    game::{highscore::HighScore, state::GameScore},
    menus::Menu,
    screens::Screen,
    theme::widget,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::GameOver), spawn_gameover_menu);
}

fn spawn_gameover_menu(mut commands: Commands, score: Res<GameScore>, high_score: Res<HighScore>) {
    commands.spawn((
        widget::ui_root("Game Over Menu"),
        BackgroundColor(Color::srgba(0.05, 0.05, 0.1, 0.9)),
        GlobalZIndex(2),
        DespawnOnExit(Menu::GameOver),
        children![
            widget::header("Game Over!"),
            widget::label(format!("Score: {}", score.score)),
            widget::label(format!("High Score: {}", high_score.value)),
            widget::button("Quit to title", quit_to_title),
        ],
    ));
}

fn quit_to_title(_: On<Pointer<Click>>, mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Title);
}
