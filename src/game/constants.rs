//! Table sizing and coin-economy constants.

use super::entities::Coins;
use std::time::Duration;

/// Maximum number of seated players.
pub const MAX_PLAYERS: usize = 6;

/// Number of card slots in a player's hand.
pub const HAND_SIZE: usize = 2;

/// Copies of each character in a fresh deck.
pub const COPIES_PER_CHARACTER: usize = 3;

/// Coins granted to a player at registration, paid out of the treasury.
pub const STARTING_COINS: Coins = 2;

/// Total coins in the game. The treasury starts with all of them, so
/// `treasury + sum(player coins)` equals this at every point.
pub const STARTING_TREASURY: Coins = 50;

pub const MIN_NAME_LENGTH: usize = 1;
pub const MAX_NAME_LENGTH: usize = 19;

pub const INCOME_AMOUNT: Coins = 1;
pub const FOREIGN_AID_AMOUNT: Coins = 2;
pub const TAX_AMOUNT: Coins = 3;
pub const COUP_COST: Coins = 7;
pub const ASSASSINATE_COST: Coins = 3;

/// How long a vote stays open when the caller doesn't say otherwise.
pub const DEFAULT_VOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Fraction of eligible voters that must vote yes for a vote to pass.
pub const DEFAULT_VOTE_THRESHOLD: f64 = 0.5;
