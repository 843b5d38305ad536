//! Events produced by successful state changes.
//!
//! Every mutating operation returns the events it caused, in order. The
//! table actor renders them through `Display` and broadcasts them to all
//! subscribed players; the core never transmits anything itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Character, PlayerName};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameEvent {
    Joined(PlayerName),
    Left(PlayerName),
    Ready(PlayerName),
    NotReady(PlayerName),
    Income(PlayerName),
    ForeignAid(PlayerName),
    Tax(PlayerName),
    Coup(PlayerName, PlayerName),
    Assassinate(PlayerName, PlayerName),
    CardKilled(PlayerName, Character),
    NoLivingCards(PlayerName),
    TurnAdvanced(PlayerName),
    TurnEnded(PlayerName),
    VotePassed(String),
    VoteFailed(String),
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Joined(name) => format!("{name} joined the game!"),
            Self::Left(name) => format!("{name} left the game."),
            Self::Ready(name) => format!("{name} is READY!"),
            Self::NotReady(name) => format!("{name} is NOT READY!"),
            Self::Income(name) => format!("{name} collected INCOME."),
            Self::ForeignAid(name) => format!("{name} collected FOREIGN AID."),
            Self::Tax(name) => format!("{name} called a TAX, the Duke ability."),
            Self::Coup(actor, target) => format!("{actor} called a COUP on {target}."),
            Self::Assassinate(actor, target) => {
                format!("{actor} assassinated one of {target}'s cards!")
            }
            Self::CardKilled(name, character) => {
                format!("{name}'s {character} was just killed!")
            }
            Self::NoLivingCards(name) => format!("{name} has no living cards!"),
            Self::TurnAdvanced(name) => format!("It is now {name}'s turn to move."),
            Self::TurnEnded(name) => {
                format!("{name} is done moving. You may now accept or challenge the move.")
            }
            Self::VotePassed(name) => format!("vote '{name}' passed"),
            Self::VoteFailed(name) => format!("vote '{name}' failed"),
        };
        write!(f, "{repr}")
    }
}
