//! Game state and action resolver.
//!
//! Owns the treasury, the deck, the turn queue, and the pending-vote
//! registry, plus the seeded random source used for shuffling and random
//! card kills. All methods are synchronous; the table actor serializes
//! access from connection workers and vote timers.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::AbortHandle;

use super::{
    constants,
    entities::{ActionKind, Coins, Deck, Player, PlayerName, SessionId},
    errors::GameError,
    events::GameEvent,
    turns::TurnQueue,
    vote::{Ballot, BallotBox, Verdict, VoteCallback, VoteChoice},
};

/// Table sizing and economy configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub max_players: usize,
    pub starting_coins: Coins,
    pub starting_treasury: Coins,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(
            constants::MAX_PLAYERS,
            constants::STARTING_COINS,
            constants::STARTING_TREASURY,
        )
    }
}

impl GameSettings {
    #[must_use]
    pub const fn new(max_players: usize, starting_coins: Coins, starting_treasury: Coins) -> Self {
        Self {
            max_players,
            starting_coins,
            starting_treasury,
        }
    }
}

/// The authoritative game state.
///
/// Coin conservation is a hard invariant: registration moves the starting
/// coins from the treasury to the player and deregistration refunds them,
/// so `treasury + sum(player coins)` always equals the starting treasury.
#[derive(Debug)]
pub struct GameState {
    treasury: Coins,
    deck: Deck,
    players: TurnQueue,
    ballots: BallotBox,
    rng: StdRng,
    settings: GameSettings,
}

impl GameState {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    /// Builds a game with an injected random source, for deterministic
    /// shuffles and card kills in tests.
    #[must_use]
    pub fn with_rng(settings: GameSettings, mut rng: StdRng) -> Self {
        let mut deck = Deck::new();
        deck.shuffle(&mut rng);
        Self {
            treasury: settings.starting_treasury,
            deck,
            players: TurnQueue::with_capacity(settings.max_players),
            ballots: BallotBox::default(),
            rng,
            settings,
        }
    }

    pub const fn treasury(&self) -> Coins {
        self.treasury
    }

    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub const fn players(&self) -> &TurnQueue {
        &self.players
    }

    pub const fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Treasury plus every player's coins. Constant for the lifetime of a
    /// game; exposed so tests can assert conservation directly.
    pub fn total_coins(&self) -> Coins {
        self.treasury + self.players.iter().map(Player::coins).sum::<Coins>()
    }

    pub fn has_pending_vote(&self, name: &str) -> bool {
        self.ballots.contains(name)
    }

    // === Registration ===

    /// Seats a new player: deals two cards from the shared deck and moves
    /// the starting coins out of the treasury. Nothing is mutated on any
    /// error path.
    pub fn register(
        &mut self,
        session: SessionId,
        name: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.players.get_by_session(session).is_some() {
            return Err(GameError::AlreadyRegistered);
        }
        let name = PlayerName::new(name)?;
        if self.players.get_by_name(name.as_str()).is_some() {
            return Err(GameError::InvalidName(format!(
                "a player with the name {name} is already registered"
            )));
        }
        if self.players.len() >= self.settings.max_players {
            return Err(GameError::TableFull);
        }
        if self.deck.remaining() < constants::HAND_SIZE {
            return Err(GameError::DeckExhausted);
        }
        if self.treasury < self.settings.starting_coins {
            return Err(GameError::InsufficientTreasury);
        }

        let hand = [self.deck.deal()?, self.deck.deal()?];
        self.treasury -= self.settings.starting_coins;
        let player = Player::new(session, name.clone(), self.settings.starting_coins, hand);
        self.players.push(player)?;
        Ok(vec![GameEvent::Joined(name)])
    }

    /// Removes the player at `session` if present, refunding their coins to
    /// the treasury. Connection loss is an implicit deregister, so an
    /// unknown session is not an error.
    pub fn deregister(&mut self, session: SessionId) -> Vec<GameEvent> {
        match self.players.remove_by_session(session) {
            Some(player) => {
                self.treasury += player.coins();
                vec![GameEvent::Left(player.name().clone())]
            }
            None => vec![],
        }
    }

    // === Actions ===

    /// Resolves one of the five coin actions for `session`. The actor must
    /// be the current player; on success the balance mutation and the turn
    /// rotation happen in the same operation, and the announcements come
    /// back in broadcast order. Errors mutate nothing.
    pub fn take_action(
        &mut self,
        session: SessionId,
        action: ActionKind,
        target: Option<&str>,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.players.get_by_session(session).is_none() {
            return Err(GameError::UnregisteredPlayer);
        }
        if !self.players.is_current_turn(session) {
            return Err(GameError::NotYourTurn);
        }
        match action {
            ActionKind::Income => self.draw_from_treasury(constants::INCOME_AMOUNT, GameEvent::Income),
            ActionKind::ForeignAid => {
                self.draw_from_treasury(constants::FOREIGN_AID_AMOUNT, GameEvent::ForeignAid)
            }
            ActionKind::Tax => self.draw_from_treasury(constants::TAX_AMOUNT, GameEvent::Tax),
            ActionKind::Coup => self.strike(constants::COUP_COST, target, GameEvent::Coup),
            ActionKind::Assassinate => {
                self.strike(constants::ASSASSINATE_COST, target, GameEvent::Assassinate)
            }
        }
    }

    /// income / foreign aid / tax: move coins from the treasury to the
    /// current player, then rotate the turn.
    fn draw_from_treasury(
        &mut self,
        amount: Coins,
        make_event: fn(PlayerName) -> GameEvent,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.treasury < amount {
            return Err(GameError::InsufficientTreasury);
        }
        let player = self.players.current_mut().ok_or(GameError::NotYourTurn)?;
        player.add_coins(amount);
        self.treasury -= amount;
        let mut events = vec![make_event(player.name().clone())];
        events.extend(self.players.advance());
        Ok(events)
    }

    /// coup / assassinate: the actor pays the fee into the treasury and the
    /// target loses one random alive card. Target validation happens before
    /// any coin movement, so a failed lookup never charges the actor.
    fn strike(
        &mut self,
        cost: Coins,
        target: Option<&str>,
        make_event: fn(PlayerName, PlayerName) -> GameEvent,
    ) -> Result<Vec<GameEvent>, GameError> {
        let target_name = target.ok_or(GameError::MissingTarget)?;
        let actor_name = self
            .players
            .current()
            .ok_or(GameError::NotYourTurn)?
            .name()
            .clone();
        if actor_name.as_str() == target_name {
            return Err(GameError::InvalidTarget);
        }
        let target_name = self
            .players
            .get_by_name(target_name)
            .ok_or_else(|| GameError::NoSuchPlayer(target_name.to_string()))?
            .name()
            .clone();

        let actor = self.players.current_mut().ok_or(GameError::NotYourTurn)?;
        if actor.coins() < cost {
            return Err(GameError::InsufficientPlayerCoins);
        }
        actor.remove_coins(cost);
        self.treasury += cost;

        let mut events = vec![make_event(actor_name, target_name.clone())];
        let kill_event = match self.players.get_mut_by_name(target_name.as_str()) {
            Some(target_player) => target_player.kill_random_alive_card(&mut self.rng),
            None => GameEvent::NoLivingCards(target_name),
        };
        events.push(kill_event);
        events.extend(self.players.advance());
        Ok(events)
    }

    /// Declares the current player's move finished so the table can accept
    /// or challenge it. Does not rotate the turn; rotation happens on the
    /// next resolved action or a vote outcome.
    pub fn end_turn(&mut self, session: SessionId) -> Result<GameEvent, GameError> {
        let player = self
            .players
            .get_by_session(session)
            .ok_or(GameError::UnregisteredPlayer)?;
        if !self.players.is_current_turn(session) {
            return Err(GameError::NotYourTurn);
        }
        Ok(GameEvent::TurnEnded(player.name().clone()))
    }

    // === Queries ===

    /// Renders a hand. Viewers see their own hand fully revealed and other
    /// players' hands with only dead cards face up.
    pub fn query_hand(
        &self,
        viewer: SessionId,
        target: Option<&str>,
    ) -> Result<String, GameError> {
        let player = self
            .players
            .get_by_session(viewer)
            .ok_or(GameError::UnregisteredPlayer)?;
        match target {
            None => Ok(player.render_hand(true)),
            Some(name) if name == player.name().as_str() => Ok(player.render_hand(true)),
            Some(name) => self
                .players
                .get_by_name(name)
                .map(|other| other.render_hand(false))
                .ok_or_else(|| GameError::NoSuchPlayer(name.to_string())),
        }
    }

    /// Rotates the turn outside of action resolution, e.g. from a vote
    /// outcome callback that accepts the current player's move.
    pub fn advance_turn(&mut self) -> Vec<GameEvent> {
        self.players.advance().into_iter().collect()
    }

    /// `(name, coins)` pairs in current turn order.
    pub fn list_players(&self) -> Vec<(PlayerName, Coins)> {
        self.players
            .iter()
            .map(|player| (player.name().clone(), player.coins()))
            .collect()
    }

    pub fn coins(&self, session: SessionId) -> Result<Coins, GameError> {
        self.players
            .get_by_session(session)
            .map(Player::coins)
            .ok_or(GameError::UnregisteredPlayer)
    }

    pub fn toggle_ready(&mut self, session: SessionId) -> Result<GameEvent, GameError> {
        self.players
            .get_mut_by_session(session)
            .map(Player::toggle_ready)
            .ok_or(GameError::UnregisteredPlayer)
    }

    // === Votes ===

    /// Opens a named vote among everyone registered right now. The caller
    /// (the table actor) schedules the timeout and hands the ballot its
    /// abort handle via [`GameState::set_vote_timer`].
    pub fn create_vote(
        &mut self,
        name: &str,
        timeout: Duration,
        threshold: f64,
        on_success: VoteCallback,
        on_fail: VoteCallback,
    ) -> Result<(), GameError> {
        let eligible = self.players.iter().map(Player::session).collect();
        self.ballots.open(Ballot::new(
            name, eligible, timeout, threshold, on_success, on_fail,
        ))
    }

    pub fn set_vote_timer(&mut self, name: &str, timer: AbortHandle) {
        if let Some(ballot) = self.ballots.get_mut(name) {
            ballot.set_timer(timer);
        }
    }

    /// Casts a vote. If the cast settles the ballot, the vote concludes
    /// immediately: the ballot leaves the registry, its timer is cancelled,
    /// and the outcome callback's events follow the verdict announcement.
    pub fn cast_vote(
        &mut self,
        name: &str,
        session: SessionId,
        choice: VoteChoice,
    ) -> Result<Vec<GameEvent>, GameError> {
        let ballot = self
            .ballots
            .get_mut(name)
            .ok_or_else(|| GameError::VoteNotFound(name.to_string()))?;
        match ballot.record(session, choice)? {
            Verdict::Pending => Ok(vec![]),
            Verdict::Passed => Ok(self.conclude_vote(name, true)),
            Verdict::Failed => Ok(self.conclude_vote(name, false)),
        }
    }

    /// Concludes a still-pending vote as failed when its timer fires. A
    /// vote that already concluded via casting is a silent no-op, which is
    /// what makes a racing timer harmless.
    pub fn expire_vote(&mut self, name: &str) -> Vec<GameEvent> {
        if !self.ballots.contains(name) {
            return vec![];
        }
        self.conclude_vote(name, false)
    }

    /// Single conclusion point. Removing the ballot from the registry first
    /// guarantees at most one of the two callbacks ever runs, even if the
    /// callback itself casts or expires votes reentrantly.
    fn conclude_vote(&mut self, name: &str, passed: bool) -> Vec<GameEvent> {
        let Some(ballot) = self.ballots.close(name) else {
            return vec![];
        };
        let (event, callback, timer) = ballot.into_outcome(passed);
        if let Some(timer) = timer {
            timer.abort();
        }
        let mut events = vec![event];
        events.extend(callback(self));
        events
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}
