//! Time-boxed votes used to challenge or accept a declared move.
//!
//! A ballot's electorate is a snapshot of everyone registered at creation
//! time; later joins and leaves don't change it. Conclusion is a one-way
//! `Pending -> Passed | Failed` transition: the ballot is removed from the
//! registry before either outcome callback runs, so a cast verdict and a
//! racing timer expiry can never both fire.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    time::{Duration, Instant},
};
use tokio::task::AbortHandle;

use super::{
    entities::SessionId,
    errors::GameError,
    events::GameEvent,
    state::GameState,
};

/// Outcome action supplied by whoever opens the vote. Runs against the game
/// state after the ballot has already been removed from the registry, and
/// returns any follow-up events to broadcast.
pub type VoteCallback = Box<dyn FnOnce(&mut GameState) -> Vec<GameEvent> + Send>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum VoteChoice {
    Yes,
    No,
}

/// Where a ballot stands after a cast.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    Pending,
    Passed,
    Failed,
}

/// A single pending vote.
pub struct Ballot {
    name: String,
    eligible: HashSet<SessionId>,
    yes: HashSet<SessionId>,
    no: HashSet<SessionId>,
    threshold: f64,
    timeout: Duration,
    opened_at: Instant,
    on_success: VoteCallback,
    on_fail: VoteCallback,
    timer: Option<AbortHandle>,
}

impl Ballot {
    #[must_use]
    pub fn new(
        name: &str,
        eligible: HashSet<SessionId>,
        timeout: Duration,
        threshold: f64,
        on_success: VoteCallback,
        on_fail: VoteCallback,
    ) -> Self {
        Self {
            name: name.to_string(),
            eligible,
            yes: HashSet::new(),
            no: HashSet::new(),
            threshold,
            timeout,
            opened_at: Instant::now(),
            on_success,
            on_fail,
            timer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Instant {
        self.opened_at + self.timeout
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }

    /// Hands the ballot the abort handle of its timeout task so an early
    /// conclusion can cancel the timer.
    pub fn set_timer(&mut self, timer: AbortHandle) {
        self.timer = Some(timer);
    }

    /// Records a vote and reports where the ballot now stands.
    pub fn record(&mut self, session: SessionId, choice: VoteChoice) -> Result<Verdict, GameError> {
        if !self.eligible.contains(&session) {
            return Err(GameError::NotEligibleVoter);
        }
        if self.yes.contains(&session) || self.no.contains(&session) {
            return Err(GameError::AlreadyVoted);
        }
        match choice {
            VoteChoice::Yes => self.yes.insert(session),
            VoteChoice::No => self.no.insert(session),
        };
        Ok(self.verdict())
    }

    /// Passes as soon as yes votes reach the threshold; fails as soon as
    /// passing is mathematically impossible even if every undecided voter
    /// turned yes. Undecided voters are never counted as no votes.
    pub fn verdict(&self) -> Verdict {
        let eligible = self.eligible.len() as f64;
        if eligible == 0.0 {
            return Verdict::Failed;
        }
        let yes = self.yes.len() as f64;
        let no = self.no.len() as f64;
        if yes / eligible >= self.threshold {
            Verdict::Passed
        } else if (eligible - no) / eligible < self.threshold {
            Verdict::Failed
        } else {
            Verdict::Pending
        }
    }

    /// Consumes the ballot into its verdict announcement, the single
    /// outcome callback to run, and the timer to cancel if still scheduled.
    pub(crate) fn into_outcome(self, passed: bool) -> (GameEvent, VoteCallback, Option<AbortHandle>) {
        let Self {
            name,
            on_success,
            on_fail,
            timer,
            ..
        } = self;
        let event = if passed {
            GameEvent::VotePassed(name)
        } else {
            GameEvent::VoteFailed(name)
        };
        let callback = if passed { on_success } else { on_fail };
        (event, callback, timer)
    }
}

impl fmt::Debug for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ballot")
            .field("name", &self.name)
            .field("eligible", &self.eligible.len())
            .field("yes", &self.yes.len())
            .field("no", &self.no.len())
            .field("threshold", &self.threshold)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Registry of pending ballots, keyed by name. Owned by the game state so
/// vote conclusion and turn/treasury mutation are linearized together.
#[derive(Debug, Default)]
pub struct BallotBox {
    pending: HashMap<String, Ballot>,
}

impl BallotBox {
    /// Opens a ballot; at most one ballot per name may be pending.
    pub fn open(&mut self, ballot: Ballot) -> Result<(), GameError> {
        if self.pending.contains_key(ballot.name()) {
            return Err(GameError::VoteAlreadyRunning(ballot.name().to_string()));
        }
        self.pending.insert(ballot.name().to_string(), ballot);
        Ok(())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Ballot> {
        self.pending.get_mut(name)
    }

    /// Removes and returns a pending ballot. This removal is the
    /// single-conclusion guard: whoever takes the ballot out concludes it.
    pub fn close(&mut self, name: &str) -> Option<Ballot> {
        self.pending.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
