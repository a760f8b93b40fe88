use bevy::prelude::*;

/// Off-white text for labels on the dark playfield backdrop.
pub const LABEL_TEXT: Color = Color::srgb(0.92, 0.92, 0.92);

/// Off-white text for headers.
pub const HEADER_TEXT: Color = Color::srgb(0.95, 0.95, 0.95);

/// White text for buttons.
pub const BUTTON_TEXT: Color = Color::srgb(0.95, 0.95, 0.95);
/// #4666bf
pub const BUTTON_BACKGROUND: Color = Color::srgb(0.275, 0.400, 0.750);
/// #6299d1
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgb(0.384, 0.600, 0.820);
/// #3d4999
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgb(0.239, 0.286, 0.600);
