//! Coup game core: entities, turn rotation, the coin economy, and the
//! time-boxed vote coordinator.
//!
//! Everything in this module is synchronous. Concurrency is handled one
//! layer up by the table actor, which owns a [`GameState`] exclusively.

pub mod constants;
pub mod entities;
pub mod errors;
pub mod events;
pub mod state;
pub mod turns;
pub mod vote;

pub use errors::GameError;
pub use events::GameEvent;
pub use state::{GameSettings, GameState};
pub use turns::TurnQueue;
pub use vote::{Ballot, BallotBox, Verdict, VoteCallback, VoteChoice};
