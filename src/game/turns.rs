//! Ordered turn queue. The player at the front is the current player.

use std::collections::VecDeque;

use super::{
    constants,
    entities::{Player, SessionId},
    errors::GameError,
    events::GameEvent,
};

/// Ordered collection of seated players with an implicit rotation pointer:
/// the front player is the one whose turn it is.
#[derive(Clone, Debug)]
pub struct TurnQueue {
    players: VecDeque<Player>,
    capacity: usize,
}

impl TurnQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(constants::MAX_PLAYERS)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            players: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a player to the back of the rotation.
    pub fn push(&mut self, player: Player) -> Result<(), GameError> {
        if self.players.len() >= self.capacity {
            return Err(GameError::TableFull);
        }
        self.players.push_back(player);
        Ok(())
    }

    /// Removes the player registered under `session`, if any. Removing the
    /// front player makes the next player in order current, with no
    /// explicit rotation.
    pub fn remove_by_session(&mut self, session: SessionId) -> Option<Player> {
        let idx = self
            .players
            .iter()
            .position(|player| player.session() == session)?;
        self.players.remove(idx)
    }

    /// The player whose turn it is.
    pub fn current(&self) -> Option<&Player> {
        self.players.front()
    }

    pub fn current_mut(&mut self) -> Option<&mut Player> {
        self.players.front_mut()
    }

    pub fn is_current_turn(&self, session: SessionId) -> bool {
        self.current()
            .is_some_and(|player| player.session() == session)
    }

    /// Rotates the front player to the back and announces whose turn it is
    /// now. Empty queue is a silent no-op.
    pub fn advance(&mut self) -> Option<GameEvent> {
        let front = self.players.pop_front()?;
        self.players.push_back(front);
        self.current()
            .map(|player| GameEvent::TurnAdvanced(player.name().clone()))
    }

    pub fn get_by_session(&self, session: SessionId) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| player.session() == session)
    }

    pub fn get_mut_by_session(&mut self, session: SessionId) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.session() == session)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| player.name().as_str() == name)
    }

    pub fn get_mut_by_name(&mut self, name: &str) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.name().as_str() == name)
    }

    /// Players in current turn order, front first.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }
}

impl Default for TurnQueue {
    fn default() -> Self {
        Self::new()
    }
}
