use rand::{Rng, seq::IndexedRandom, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::VecDeque,
    fmt::{self},
};
use uuid::Uuid;

use super::{constants, errors::GameError, events::GameEvent};

/// The five character kinds in the deck.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

impl Character {
    pub const ALL: [Self; 5] = [
        Self::Duke,
        Self::Assassin,
        Self::Captain,
        Self::Ambassador,
        Self::Contessa,
    ];
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Duke => "Duke",
            Self::Assassin => "Assassin",
            Self::Captain => "Captain",
            Self::Ambassador => "Ambassador",
            Self::Contessa => "Contessa",
        };
        write!(f, "{repr}")
    }
}

/// A single card in a hand or the deck. `alive` flips to false exactly once
/// when the card is killed and never comes back.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    character: Character,
    alive: bool,
}

impl Card {
    #[must_use]
    pub const fn new(character: Character) -> Self {
        Self {
            character,
            alive: true,
        }
    }

    pub const fn character(&self) -> Character {
        self.character
    }

    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Draw the card as a small ASCII block. Dead cards are always shown
    /// face up; living cards only reveal their character when `reveal` is
    /// set (i.e. the owner is looking at their own hand).
    #[must_use]
    pub fn render(&self, reveal: bool) -> String {
        let status = if self.alive { "ALIVE" } else { "DEAD" };
        if !self.alive || reveal {
            let name = self.character.to_string();
            let short = &name[..4];
            format!("______\n|     |\n|{short}.| ({status})\n|     |\n|_____|\n")
        } else {
            format!("______\n|     | ({status})\n|     |\n|     |\n|_____|\n")
        }
    }
}

/// The shared draw pile: three copies of each of the five characters.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    #[must_use]
    pub fn new() -> Self {
        let mut cards = VecDeque::with_capacity(Character::ALL.len() * constants::COPIES_PER_CHARACTER);
        for character in Character::ALL {
            for _ in 0..constants::COPIES_PER_CHARACTER {
                cards.push_back(Card::new(character));
            }
        }
        Self { cards }
    }

    /// Permutes the not-yet-dealt cards uniformly at random. Only meaningful
    /// before dealing starts; there is no ordering guarantee afterwards.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// Removes and returns the top card.
    pub fn deal(&mut self) -> Result<Card, GameError> {
        self.cards.pop_front().ok_or(GameError::DeckExhausted)
    }

    /// Returns a card to the bottom of the deck.
    pub fn put_back(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for coin counts. The treasury holds 50, so overflow is not a
/// concern anyone needs to lose sleep over.
pub type Coins = u32;

/// A registered player's display name, 1 to 19 characters.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Result<Self, GameError> {
        let length = s.chars().count();
        if !(constants::MIN_NAME_LENGTH..=constants::MAX_NAME_LENGTH).contains(&length) {
            return Err(GameError::InvalidName(format!(
                "name must be between {} and {} characters in length",
                constants::MIN_NAME_LENGTH,
                constants::MAX_NAME_LENGTH
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque stable identity for a connected client. Decoupled from the
/// transport so the core never touches a socket handle.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The five coin actions a current player can declare.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ActionKind {
    Income,
    ForeignAid,
    Tax,
    Coup,
    Assassinate,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Income => "income",
            Self::ForeignAid => "foreign aid",
            Self::Tax => "tax",
            Self::Coup => "coup",
            Self::Assassinate => "assassinate",
        };
        write!(f, "{repr}")
    }
}

/// A seated player. Owned by the turn queue for its lifetime.
#[derive(Clone, Debug)]
pub struct Player {
    session: SessionId,
    name: PlayerName,
    coins: Coins,
    hand: [Card; constants::HAND_SIZE],
    ready: bool,
}

impl Player {
    #[must_use]
    pub fn new(
        session: SessionId,
        name: PlayerName,
        coins: Coins,
        hand: [Card; constants::HAND_SIZE],
    ) -> Self {
        Self {
            session,
            name,
            coins,
            hand,
            ready: false,
        }
    }

    pub const fn session(&self) -> SessionId {
        self.session
    }

    pub const fn name(&self) -> &PlayerName {
        &self.name
    }

    pub const fn coins(&self) -> Coins {
        self.coins
    }

    pub const fn hand(&self) -> &[Card; constants::HAND_SIZE] {
        &self.hand
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Count of cards still alive.
    pub fn influence(&self) -> usize {
        self.hand.iter().filter(|card| card.is_alive()).count()
    }

    pub(crate) fn add_coins(&mut self, amount: Coins) {
        self.coins += amount;
    }

    pub(crate) fn remove_coins(&mut self, amount: Coins) {
        self.coins -= amount;
    }

    /// Flips the informational ready flag and announces the change.
    pub fn toggle_ready(&mut self) -> GameEvent {
        self.ready = !self.ready;
        if self.ready {
            GameEvent::Ready(self.name.clone())
        } else {
            GameEvent::NotReady(self.name.clone())
        }
    }

    /// Both card renders under a header naming the player.
    #[must_use]
    pub fn render_hand(&self, reveal: bool) -> String {
        let mut hand = format!("\n{}'s hand:\n", self.name);
        for card in &self.hand {
            hand.push_str(&card.render(reveal));
        }
        hand
    }

    /// Kills one of the player's alive cards, chosen uniformly at random,
    /// and announces the revealed character. With no alive cards left this
    /// is a no-op that returns the "no living cards" event, so repeated
    /// calls on an eliminated player never mutate anything.
    pub fn kill_random_alive_card<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameEvent {
        let alive: Vec<usize> = self
            .hand
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_alive())
            .map(|(i, _)| i)
            .collect();
        match alive.choose(rng) {
            Some(&idx) => {
                self.hand[idx].kill();
                GameEvent::CardKilled(self.name.clone(), self.hand[idx].character())
            }
            None => GameEvent::NoLivingCards(self.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn hand(first: Character, second: Character) -> [Card; 2] {
        [Card::new(first), Card::new(second)]
    }

    fn sample_player() -> Player {
        Player::new(
            SessionId::new(),
            PlayerName::new("alice").unwrap(),
            constants::STARTING_COINS,
            hand(Character::Duke, Character::Captain),
        )
    }

    // === Card tests ===

    #[test]
    fn test_card_starts_alive_and_kill_is_permanent() {
        let mut card = Card::new(Character::Contessa);
        assert!(card.is_alive());
        card.kill();
        assert!(!card.is_alive());
        card.kill();
        assert!(!card.is_alive());
    }

    #[test]
    fn test_alive_card_is_hidden_without_reveal() {
        let card = Card::new(Character::Duke);
        let rendered = card.render(false);
        assert!(rendered.contains("(ALIVE)"));
        assert!(!rendered.contains("Duke"));
    }

    #[test]
    fn test_alive_card_is_shown_with_reveal() {
        let card = Card::new(Character::Duke);
        let rendered = card.render(true);
        assert!(rendered.contains("(ALIVE)"));
        assert!(rendered.contains("Duke"));
    }

    #[test]
    fn test_dead_card_is_always_revealed() {
        let mut card = Card::new(Character::Ambassador);
        card.kill();
        let rendered = card.render(false);
        assert!(rendered.contains("(DEAD)"));
        assert!(rendered.contains("Amba"));
    }

    // === Deck tests ===

    #[test]
    fn test_deck_has_three_copies_of_each_character() {
        let mut deck = Deck::new();
        assert_eq!(deck.remaining(), 15);
        let mut counts = std::collections::HashMap::new();
        while let Ok(card) = deck.deal() {
            *counts.entry(card.character()).or_insert(0) += 1;
        }
        for character in Character::ALL {
            assert_eq!(counts[&character], constants::COPIES_PER_CHARACTER);
        }
    }

    #[test]
    fn test_deal_from_empty_deck_fails() {
        let mut deck = Deck::new();
        for _ in 0..15 {
            deck.deal().unwrap();
        }
        assert_eq!(deck.deal(), Err(GameError::DeckExhausted));
    }

    #[test]
    fn test_put_back_goes_to_the_bottom() {
        let mut deck = Deck::new();
        let first = deck.deal().unwrap();
        deck.put_back(first);
        assert_eq!(deck.remaining(), 15);
        // Dealing everything else first means the returned card comes last.
        for _ in 0..14 {
            deck.deal().unwrap();
        }
        assert_eq!(deck.deal().unwrap(), first);
    }

    #[test]
    fn test_shuffle_keeps_the_same_multiset() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::new();
        deck.shuffle(&mut rng);
        assert_eq!(deck.remaining(), 15);
        let mut counts = std::collections::HashMap::new();
        while let Ok(card) = deck.deal() {
            *counts.entry(card.character()).or_insert(0) += 1;
        }
        assert!(counts.values().all(|&n| n == 3));
    }

    // === PlayerName tests ===

    #[test]
    fn test_name_length_bounds() {
        assert!(PlayerName::new("").is_err());
        assert!(PlayerName::new(&"x".repeat(20)).is_err());
        assert!(PlayerName::new("a").is_ok());
        assert!(PlayerName::new(&"x".repeat(19)).is_ok());
    }

    #[test]
    fn test_name_rejection_is_invalid_name() {
        match PlayerName::new("") {
            Err(GameError::InvalidName(_)) => {}
            other => panic!("expected InvalidName, got {other:?}"),
        }
    }

    // === Player tests ===

    #[test]
    fn test_toggle_ready_announcements() {
        let mut player = sample_player();
        assert!(!player.is_ready());
        let event = player.toggle_ready();
        assert_eq!(event.to_string(), "alice is READY!");
        let event = player.toggle_ready();
        assert_eq!(event.to_string(), "alice is NOT READY!");
    }

    #[test]
    fn test_render_hand_hides_alive_cards_of_others() {
        let player = sample_player();
        let visible = player.render_hand(true);
        assert!(visible.contains("alice's hand:"));
        assert!(visible.contains("Duke"));
        let hidden = player.render_hand(false);
        assert!(!hidden.contains("Duke"));
        assert!(!hidden.contains("Capt"));
    }

    #[test]
    fn test_kill_random_alive_card_eliminates_both_then_idempotent() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut player = sample_player();

        let first = player.kill_random_alive_card(&mut rng);
        assert!(matches!(first, GameEvent::CardKilled(_, _)));
        assert_eq!(player.influence(), 1);

        let second = player.kill_random_alive_card(&mut rng);
        assert!(matches!(second, GameEvent::CardKilled(_, _)));
        assert_eq!(player.influence(), 0);

        // Fully eliminated: repeated kills change nothing.
        let hand_before = *player.hand();
        for _ in 0..3 {
            let event = player.kill_random_alive_card(&mut rng);
            assert_eq!(event.to_string(), "alice has no living cards!");
        }
        assert_eq!(*player.hand(), hand_before);
    }
}
