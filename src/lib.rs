//! # Coup Engine
//!
//! An authoritative in-memory game-state engine for the bluffing card game
//! Coup, played by up to six players over persistent client connections.
//!
//! The engine is split in two layers:
//!
//! - [`game`]: a synchronous core holding the deck, the turn queue, the
//!   treasury, and the pending-vote registry. Every state-changing operation
//!   returns an ordered list of [`game::GameEvent`]s for the caller to
//!   broadcast, and every failure is a recoverable [`game::GameError`]
//!   reported only to the initiating player.
//! - [`table`]: a tokio actor that owns the game core exclusively and drains
//!   a message inbox, so connection workers and vote timers all observe
//!   action resolution, turn rotation, vote casting, and vote expiry as
//!   atomic operations.
//!
//! All state is process-memory-resident and is lost on restart. There is no
//! persistence, reconnection, or multi-table support.
//!
//! ## Example
//!
//! ```
//! use coup_engine::{GameSettings, GameState, entities::SessionId};
//!
//! let mut game = GameState::new(GameSettings::default());
//! let alice = SessionId::new();
//! game.register(alice, "alice").unwrap();
//! ```

/// Core game logic: entities, turn queue, action resolver, vote coordinator.
pub mod game;
pub use game::{
    GameError, GameEvent, GameSettings, GameState,
    constants::{self, MAX_PLAYERS, STARTING_TREASURY},
    entities,
};

/// Table actor providing serialized access to the game core.
pub mod table;
pub use table::{TableActor, TableConfig, TableError, TableHandle, TableMessage};
