//! High score persistence.
//!
//! A single number, saved as JSON in the user's local data directory. Loaded
//! on startup and written whenever the current score beats it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HighScore>();

    // Load the saved high score on startup.
    app.add_systems(Startup, load_high_score);
}

/// Resource holding the best score reached on this machine.
#[derive(Resource, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct HighScore {
    pub value: u32,
}

impl HighScore {
    /// Raise the high score to `score` if it beats the current value.
    ///
    /// Returns true when the value changed; the caller decides when to save.
    pub fn raise_to(&mut self, score: u32) -> bool {
        if score > self.value {
            self.value = score;
            true
        } else {
            false
        }
    }

    /// Get the file path for storing the high score.
    fn file_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("popdrop").join("highscore.json"))
    }

    /// Load the high score from disk. Missing or unreadable files count as
    /// zero.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for the high score");
            return Self::default();
        };

        if !path.exists() {
            info!("No high score file found at {:?}, starting fresh", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(high_score) => {
                    info!("Loaded high score from {:?}", path);
                    high_score
                }
                Err(e) => {
                    warn!("Failed to parse high score: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read high score file: {}", e);
                Self::default()
            }
        }
    }

    /// Save the high score to disk.
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for saving the high score");
            return;
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("Failed to create high score directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(&path, json) {
                Ok(()) => info!("Saved high score to {:?}", path),
                Err(e) => warn!("Failed to write high score: {}", e),
            },
            Err(e) => warn!("Failed to serialize high score: {}", e),
        }
    }
}

/// Load the high score on startup.
fn load_high_score(mut high_score: ResMut<HighScore>) {
    *high_score = HighScore::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_score_is_monotonically_non_decreasing() {
        let mut high_score = HighScore::default();

        assert!(high_score.raise_to(50));
        assert_eq!(high_score.value, 50);

        assert!(!high_score.raise_to(30));
        assert_eq!(high_score.value, 50);

        assert!(!high_score.raise_to(50));
        assert_eq!(high_score.value, 50);

        assert!(high_score.raise_to(60));
        assert_eq!(high_score.value, 60);
    }
}
