//! Table actor message types.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    GameError,
    entities::{ActionKind, Coins, SessionId},
    vote::{VoteCallback, VoteChoice},
};

/// Errors surfaced by [`crate::table::TableHandle`] calls.
#[derive(Debug, Error)]
pub enum TableError {
    /// The game rejected the operation; reported only to the caller.
    #[error(transparent)]
    Game(#[from] GameError),
    /// The table actor is gone and can no longer answer.
    #[error("table is closed")]
    Closed,
}

/// Reply channel carried by request messages.
pub type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Messages that can be sent to a table actor. Errors travel back through
/// the oneshot to the initiating caller only; successful mutations are
/// additionally broadcast to every subscribed session.
pub enum TableMessage {
    /// Seat a new player under `name`.
    Register {
        session: SessionId,
        name: String,
        response: Reply<()>,
    },

    /// Remove a player; their coins return to the treasury.
    Deregister {
        session: SessionId,
        response: Reply<()>,
    },

    /// Resolve one of the five coin actions for the current player.
    TakeAction {
        session: SessionId,
        action: ActionKind,
        target: Option<String>,
        response: Reply<()>,
    },

    /// Declare the current player's move finished (does not rotate).
    EndTurn {
        session: SessionId,
        response: Reply<()>,
    },

    /// Render the viewer's own hand, or another player's with alive cards
    /// hidden.
    QueryHand {
        session: SessionId,
        target: Option<String>,
        response: Reply<String>,
    },

    /// `(name, coins)` pairs in turn order.
    ListPlayers {
        response: oneshot::Sender<Vec<(String, Coins)>>,
    },

    /// The caller's own coin count.
    Coins {
        session: SessionId,
        response: Reply<Coins>,
    },

    /// Flip the informational ready flag.
    ToggleReady {
        session: SessionId,
        response: Reply<()>,
    },

    /// Open a named vote among everyone currently registered. `None`
    /// timeout uses the table default.
    CreateVote {
        name: String,
        timeout: Option<Duration>,
        threshold: f64,
        on_success: VoteCallback,
        on_fail: VoteCallback,
        response: Reply<()>,
    },

    /// Cast a yes/no vote on a pending ballot.
    CastVote {
        name: String,
        session: SessionId,
        choice: VoteChoice,
        response: Reply<()>,
    },

    /// Internal: a vote's timer elapsed. Ignored if the vote already
    /// concluded via casting.
    VoteExpired { name: String },

    /// Start receiving broadcast event lines on `sender`.
    Subscribe {
        session: SessionId,
        sender: mpsc::Sender<String>,
    },

    /// Stop receiving broadcasts.
    Unsubscribe { session: SessionId },

    /// Connection loss: implicit deregister plus unsubscribe.
    Disconnect { session: SessionId },

    /// Shut the table down.
    Close { response: oneshot::Sender<()> },
}
