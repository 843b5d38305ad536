//! Table actor providing serialized access to the game core.
//!
//! One [`TableActor`] task owns a [`crate::game::GameState`] exclusively and
//! drains an mpsc inbox; connection workers hold a cloneable [`TableHandle`]
//! and submit messages carrying a oneshot reply channel. Vote timers are
//! independent tokio tasks that post an expiry message back into the same
//! inbox, so action resolution, turn rotation, vote casting, and vote expiry
//! are all observed as atomic operations.

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use messages::{TableError, TableMessage};
