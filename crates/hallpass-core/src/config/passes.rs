//! Pass creation configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the creation guard.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PassConfig {
    /// How many times a creation transaction is attempted before the
    /// caller is told to try again.
    #[serde(default = "default_max_creation_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_creation_attempts: u32,
    /// Maximum length of the free-text note on a pass request.
    #[serde(default = "default_max_note_length")]
    #[validate(range(min = 1, max = 4000))]
    pub max_note_length: usize,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            max_creation_attempts: default_max_creation_attempts(),
            max_note_length: default_max_note_length(),
        }
    }
}

fn default_max_creation_attempts() -> u32 {
    3
}

fn default_max_note_length() -> usize {
    500
}
