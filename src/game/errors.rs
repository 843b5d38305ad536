//! Game error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while driving the game. All of them are
/// recoverable and are reported only to the player who issued the
/// operation; none is ever broadcast or fatal to the process.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("please register yourself before you can join")]
    UnregisteredPlayer,
    #[error("you have already registered")]
    AlreadyRegistered,
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("the table is full")]
    TableFull,
    #[error("it is not your turn to move yet")]
    NotYourTurn,
    #[error("you do not have enough coins to perform this action")]
    InsufficientPlayerCoins,
    #[error("there are not enough coins in the treasury to perform this action")]
    InsufficientTreasury,
    #[error("you need to specify a target player by name")]
    MissingTarget,
    #[error("you cannot target yourself; nice try")]
    InvalidTarget,
    #[error("failed to find a player with the name {0}")]
    NoSuchPlayer(String),
    #[error("the deck has no cards left to deal")]
    DeckExhausted,
    #[error("a vote named '{0}' is already running")]
    VoteAlreadyRunning(String),
    #[error("you are not eligible to vote in this poll")]
    NotEligibleVoter,
    #[error("you already voted in this poll")]
    AlreadyVoted,
    #[error("there is no vote named '{0}'")]
    VoteNotFound(String),
}
