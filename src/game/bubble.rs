//! Bubble colors and the active palette.
//!
//! The palette starts with three colors and widens as the player levels up:
//! yellow joins at level 2, then purple, cyan and orange at level 3.

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleColor>();
    app.register_type::<ActivePalette>();
    app.init_resource::<ActivePalette>();
    app.init_resource::<GameRng>();

    app.add_systems(OnEnter(Screen::Gameplay), reset_palette);
}

/// Source of randomness for all gameplay rolls.
///
/// Kept as a resource so tests and replays can seed it deterministically.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}

/// The different bubble colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum BubbleColor {
    #[default]
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
    Orange,
}

impl BubbleColor {
    /// The colors every game starts with.
    pub const BASE: [BubbleColor; 3] = [BubbleColor::Red, BubbleColor::Green, BubbleColor::Blue];

    /// The colors that join the rotation at higher levels.
    pub const ADVANCED: [BubbleColor; 4] = [
        BubbleColor::Yellow,
        BubbleColor::Purple,
        BubbleColor::Cyan,
        BubbleColor::Orange,
    ];

    /// Get the actual color for rendering.
    pub fn to_color(self) -> Color {
        match self {
            BubbleColor::Red => Color::srgb(0.9, 0.2, 0.2),
            BubbleColor::Green => Color::srgb(0.2, 0.8, 0.3),
            BubbleColor::Blue => Color::srgb(0.2, 0.4, 0.9),
            BubbleColor::Yellow => Color::srgb(0.95, 0.85, 0.2),
            BubbleColor::Purple => Color::srgb(0.7, 0.3, 0.8),
            BubbleColor::Cyan => Color::srgb(0.2, 0.8, 0.85),
            BubbleColor::Orange => Color::srgb(0.95, 0.5, 0.1),
        }
    }

    /// The set of colors in play at the given level.
    ///
    /// Levels 1 and below get the base trio, level 2 adds yellow, and level 3
    /// onward uses the full rotation.
    pub fn palette_for_level(level: u32) -> Vec<BubbleColor> {
        match level {
            0 | 1 => Self::BASE.to_vec(),
            2 => Self::BASE
                .iter()
                .copied()
                .chain([BubbleColor::Yellow])
                .collect(),
            _ => Self::BASE.iter().copied().chain(Self::ADVANCED).collect(),
        }
    }

    /// Draw a random color from the given palette.
    pub fn random_from(palette: &[BubbleColor], rng: &mut impl Rng) -> Self {
        palette[rng.random_range(0..palette.len())]
    }
}

/// Resource holding the colors currently in rotation.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct ActivePalette {
    pub colors: Vec<BubbleColor>,
}

impl Default for ActivePalette {
    fn default() -> Self {
        Self {
            colors: BubbleColor::palette_for_level(1),
        }
    }
}

impl ActivePalette {
    /// Swap in the palette for the given level.
    pub fn expand_for(&mut self, level: u32) {
        self.colors = BubbleColor::palette_for_level(level);
    }
}

/// Reset the palette when starting a new game.
pub(super) fn reset_palette(mut palette: ResMut<ActivePalette>) {
    *palette = ActivePalette::default();
    info!("Palette reset to {} colors", palette.colors.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_palette_is_the_starting_trio() {
        assert_eq!(BubbleColor::palette_for_level(1), BubbleColor::BASE);
    }

    #[test]
    fn yellow_joins_at_level_two() {
        let palette = BubbleColor::palette_for_level(2);
        assert_eq!(palette.len(), 4);
        assert!(palette.contains(&BubbleColor::Yellow));
        assert!(!palette.contains(&BubbleColor::Purple));
    }

    #[test]
    fn full_rotation_from_level_three_onward() {
        let palette = BubbleColor::palette_for_level(3);
        assert_eq!(palette.len(), 7);
        for color in [BubbleColor::Purple, BubbleColor::Cyan, BubbleColor::Orange] {
            assert!(palette.contains(&color));
        }
        assert_eq!(BubbleColor::palette_for_level(9), palette);
    }

    #[test]
    fn random_color_comes_from_the_palette() {
        let mut rng = StdRng::seed_from_u64(42);
        let palette = BubbleColor::palette_for_level(2);
        for _ in 0..32 {
            let color = BubbleColor::random_from(&palette, &mut rng);
            assert!(palette.contains(&color));
        }
    }
}
