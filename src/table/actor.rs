//! Table actor implementation with async message handling.

use std::{collections::HashMap, time::Duration};
use tokio::sync::{mpsc, oneshot};

use super::{
    config::TableConfig,
    messages::{Reply, TableError, TableMessage},
};
use crate::game::{
    GameError, GameEvent, GameState,
    entities::{ActionKind, Coins, SessionId},
    vote::{VoteCallback, VoteChoice},
};

/// Cloneable handle for sending messages to a table actor.
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
}

impl TableHandle {
    pub async fn register(&self, session: SessionId, name: &str) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::Register {
            session,
            name: name.to_string(),
            response,
        })
        .await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn deregister(&self, session: SessionId) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::Deregister { session, response }).await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn take_action(
        &self,
        session: SessionId,
        action: ActionKind,
        target: Option<&str>,
    ) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::TakeAction {
            session,
            action,
            target: target.map(str::to_string),
            response,
        })
        .await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn end_turn(&self, session: SessionId) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::EndTurn { session, response }).await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn query_hand(
        &self,
        session: SessionId,
        target: Option<&str>,
    ) -> Result<String, TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::QueryHand {
            session,
            target: target.map(str::to_string),
            response,
        })
        .await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn list_players(&self) -> Result<Vec<(String, Coins)>, TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::ListPlayers { response }).await?;
        Self::recv(rx).await
    }

    pub async fn coins(&self, session: SessionId) -> Result<Coins, TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::Coins { session, response }).await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn toggle_ready(&self, session: SessionId) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::ToggleReady { session, response }).await?;
        Ok(Self::recv(rx).await??)
    }

    /// Opens a named vote. The actor schedules the timeout timer; `None`
    /// falls back to the table's configured default.
    pub async fn create_vote(
        &self,
        name: &str,
        timeout: Option<Duration>,
        threshold: f64,
        on_success: VoteCallback,
        on_fail: VoteCallback,
    ) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::CreateVote {
            name: name.to_string(),
            timeout,
            threshold,
            on_success,
            on_fail,
            response,
        })
        .await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn cast_vote(
        &self,
        name: &str,
        session: SessionId,
        choice: VoteChoice,
    ) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::CastVote {
            name: name.to_string(),
            session,
            choice,
            response,
        })
        .await?;
        Ok(Self::recv(rx).await??)
    }

    /// Starts streaming broadcast event lines for `session` into `sender`.
    pub async fn subscribe(
        &self,
        session: SessionId,
        sender: mpsc::Sender<String>,
    ) -> Result<(), TableError> {
        self.send(TableMessage::Subscribe { session, sender }).await
    }

    pub async fn unsubscribe(&self, session: SessionId) -> Result<(), TableError> {
        self.send(TableMessage::Unsubscribe { session }).await
    }

    /// Connection loss: implicit deregister plus unsubscribe.
    pub async fn disconnect(&self, session: SessionId) -> Result<(), TableError> {
        self.send(TableMessage::Disconnect { session }).await
    }

    pub async fn close(&self) -> Result<(), TableError> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::Close { response }).await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    pub async fn send(&self, message: TableMessage) -> Result<(), TableError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::Closed)
    }

    async fn recv<T>(rx: oneshot::Receiver<T>) -> Result<T, TableError> {
        rx.await.map_err(|_| TableError::Closed)
    }
}

/// Actor owning the game state for a single table.
pub struct TableActor {
    config: TableConfig,
    state: GameState,
    inbox: mpsc::Receiver<TableMessage>,
    /// Clone of the inbox sender, handed to vote timer tasks so expiry goes
    /// through the same serialized inbox as everything else.
    sender: mpsc::Sender<TableMessage>,
    /// Broadcast subscribers, one outbound channel per session.
    subscribers: HashMap<SessionId, mpsc::Sender<String>>,
    is_closed: bool,
}

impl TableActor {
    #[must_use]
    pub fn new(config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);
        let state = GameState::new(config.settings.clone());
        let actor = Self {
            config,
            state,
            inbox,
            sender: sender.clone(),
            subscribers: HashMap::new(),
            is_closed: false,
        };
        (actor, TableHandle { sender })
    }

    /// Runs the actor until closed or until every handle is dropped.
    pub async fn run(mut self) {
        log::info!("table '{}' starting", self.config.name);
        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.is_closed {
                break;
            }
        }
        log::info!("table '{}' closed", self.config.name);
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Register {
                session,
                name,
                response,
            } => {
                let result = self.state.register(session, &name);
                if result.is_ok() {
                    log::info!("table '{}': {} registered as {}", self.config.name, session, name);
                }
                self.reply_and_broadcast(result, response);
            }

            TableMessage::Deregister { session, response } => {
                let events = self.state.deregister(session);
                self.broadcast(&events);
                let _ = response.send(Ok(()));
            }

            TableMessage::TakeAction {
                session,
                action,
                target,
                response,
            } => {
                let result = self.state.take_action(session, action, target.as_deref());
                if let Err(err) = &result {
                    log::debug!(
                        "table '{}': {} rejected for {}: {}",
                        self.config.name,
                        action,
                        session,
                        err
                    );
                }
                self.reply_and_broadcast(result, response);
            }

            TableMessage::EndTurn { session, response } => {
                let result = self.state.end_turn(session).map(|event| vec![event]);
                self.reply_and_broadcast(result, response);
            }

            TableMessage::QueryHand {
                session,
                target,
                response,
            } => {
                let _ = response.send(self.state.query_hand(session, target.as_deref()));
            }

            TableMessage::ListPlayers { response } => {
                let players = self
                    .state
                    .list_players()
                    .into_iter()
                    .map(|(name, coins)| (name.to_string(), coins))
                    .collect();
                let _ = response.send(players);
            }

            TableMessage::Coins { session, response } => {
                let _ = response.send(self.state.coins(session));
            }

            TableMessage::ToggleReady { session, response } => {
                let result = self.state.toggle_ready(session).map(|event| vec![event]);
                self.reply_and_broadcast(result, response);
            }

            TableMessage::CreateVote {
                name,
                timeout,
                threshold,
                on_success,
                on_fail,
                response,
            } => {
                let timeout = timeout.unwrap_or(self.config.vote_timeout);
                let result = self
                    .state
                    .create_vote(&name, timeout, threshold, on_success, on_fail);
                if result.is_ok() {
                    self.schedule_vote_timer(&name, timeout);
                    log::debug!(
                        "table '{}': vote '{}' open for {:?} at threshold {}",
                        self.config.name,
                        name,
                        timeout,
                        threshold
                    );
                }
                let _ = response.send(result);
            }

            TableMessage::CastVote {
                name,
                session,
                choice,
                response,
            } => {
                let result = self.state.cast_vote(&name, session, choice);
                self.reply_and_broadcast(result, response);
            }

            TableMessage::VoteExpired { name } => {
                let events = self.state.expire_vote(&name);
                if events.is_empty() {
                    // Already concluded by a cast; the late timer loses.
                    log::debug!(
                        "table '{}': expiry for settled vote '{}' ignored",
                        self.config.name,
                        name
                    );
                } else {
                    log::debug!("table '{}': vote '{}' timed out", self.config.name, name);
                    self.broadcast(&events);
                }
            }

            TableMessage::Subscribe { session, sender } => {
                self.subscribers.insert(session, sender);
                log::debug!("table '{}': {} subscribed", self.config.name, session);
            }

            TableMessage::Unsubscribe { session } => {
                self.subscribers.remove(&session);
                log::debug!("table '{}': {} unsubscribed", self.config.name, session);
            }

            TableMessage::Disconnect { session } => {
                self.subscribers.remove(&session);
                let events = self.state.deregister(session);
                if !events.is_empty() {
                    log::info!("table '{}': {} disconnected", self.config.name, session);
                }
                self.broadcast(&events);
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Spawns the vote's timeout task and hands its abort handle to the
    /// ballot so an early conclusion can cancel it. Expiry is posted into
    /// the actor's own inbox rather than applied directly, which keeps the
    /// timer serialized with casts.
    fn schedule_vote_timer(&mut self, name: &str, timeout: Duration) {
        let sender = self.sender.clone();
        let vote_name = name.to_string();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = sender.send(TableMessage::VoteExpired { name: vote_name }).await;
        });
        self.state.set_vote_timer(name, task.abort_handle());
    }

    fn reply_and_broadcast(
        &mut self,
        result: Result<Vec<GameEvent>, GameError>,
        response: Reply<()>,
    ) {
        match result {
            Ok(events) => {
                self.broadcast(&events);
                let _ = response.send(Ok(()));
            }
            Err(err) => {
                let _ = response.send(Err(err));
            }
        }
    }

    /// Sends each event line to every subscriber, in order. Full channels
    /// drop the line for that subscriber; closed channels drop the
    /// subscriber.
    fn broadcast(&mut self, events: &[GameEvent]) {
        for event in events {
            let line = event.to_string();
            let table = &self.config.name;
            self.subscribers.retain(|session, sender| {
                match sender.try_send(line.clone()) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!("table '{table}': subscriber {session} is full, dropping line");
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        log::debug!("table '{table}': subscriber {session} went away");
                        false
                    }
                }
            });
        }
    }
}
