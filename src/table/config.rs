//! Table configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{GameSettings, constants};

/// Configuration for a single table actor.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableConfig {
    /// Display name used in logs.
    pub name: String,
    /// Sizing and economy settings handed to the game core.
    pub settings: GameSettings,
    /// How long votes stay open when the caller doesn't specify a timeout.
    pub vote_timeout: Duration,
    /// Inbox depth before senders start waiting.
    pub inbox_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "coup".to_string(),
            settings: GameSettings::default(),
            vote_timeout: constants::DEFAULT_VOTE_TIMEOUT,
            inbox_capacity: 100,
        }
    }
}
