use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Session settings, passed from the page as a plain JS object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Countdown length of every turn, in seconds.
    pub turn_seconds: u32,
    /// Pause the host should wait before triggering the computer's move.
    pub opponent_delay_ms: u32,
    /// End the game when the player to move has pieces but no legal move.
    pub stalemate_ends_game: bool,
    /// Fixed seed for the random opponent. Seeded from the OS when absent.
    pub opponent_seed: Option<u64>,
    pub max_room_id_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_seconds: 30,
            opponent_delay_ms: 800,
            stalemate_ends_game: false,
            opponent_seed: None,
            max_room_id_len: 64,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_seconds == 0 {
            return Err(ConfigError::Validation("turnSeconds must be > 0".into()));
        }
        if self.max_room_id_len == 0 {
            return Err(ConfigError::Validation("maxRoomIdLen must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.turn_seconds, 30);
    }

    #[test]
    fn partial_object_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"turnSeconds": 10, "opponentSeed": 5}"#).unwrap();
        assert_eq!(config.turn_seconds, 10);
        assert_eq!(config.opponent_seed, Some(5));
        assert_eq!(config.opponent_delay_ms, 800);
        assert!(!config.stalemate_ends_game);
    }

    #[test]
    fn empty_object_uses_all_defaults() {
        let config: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn validation_rejects_zero_turn_length() {
        let config = GameConfig {
            turn_seconds: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_zero_room_id_bound() {
        let config = GameConfig {
            max_room_id_len: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
