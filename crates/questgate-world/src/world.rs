//! World actor: an isolated Tokio task that owns the player roster.
//!
//! The roster is process-wide shared state with many potential mutators
//! (every connection's join and leave). Instead of a lock around a `Vec`,
//! one task owns it and everyone else sends commands through an mpsc
//! channel. Commands are processed one at a time, so two joins can never
//! interleave and no update is ever lost.

use questgate_protocol::{Player, PlayerId, WorldSnapshot};
use tokio::sync::{mpsc, oneshot};

use crate::{WorldAssets, WorldError};

/// Default command channel size for the world actor.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Result of a successful join, produced in the same actor step that
/// inserted the player.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Welcome payload for the joining connection.
    pub snapshot: WorldSnapshot,
    /// The full roster after the insertion, in join order.
    pub roster: Vec<Player>,
}

/// Result of a successful removal.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// The roster entry that was removed.
    pub player: Player,
    /// The roster after the removal, in join order.
    pub roster: Vec<Player>,
}

/// Commands sent to the world actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and awaits the answer on it.
pub(crate) enum WorldCommand {
    /// Add a player to the roster and build their snapshot.
    Join {
        player: Player,
        reply: oneshot::Sender<Result<JoinOutcome, WorldError>>,
    },

    /// Remove a player from the roster.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<LeaveOutcome, WorldError>>,
    },

    /// Request a copy of the roster.
    Roster { reply: oneshot::Sender<Vec<Player>> },

    /// Request a fresh snapshot for a player already in the roster.
    Snapshot {
        player_id: PlayerId,
        reply: oneshot::Sender<Option<WorldSnapshot>>,
    },

    /// Stop the actor.
    Shutdown,
}

/// Handle to the running world actor.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. Every clone
/// talks to the same roster.
#[derive(Clone)]
pub struct WorldHandle {
    sender: mpsc::Sender<WorldCommand>,
}

impl WorldHandle {
    /// Adds a player to the roster.
    ///
    /// The returned snapshot and roster are taken right after the
    /// insertion, before any other command is processed.
    ///
    /// # Errors
    /// - [`WorldError::AlreadyJoined`] — same player id already present
    /// - [`WorldError::ConnectionInUse`] — same connection already present
    /// - [`WorldError::Unavailable`] — the actor has stopped
    pub async fn add_player(&self, player: Player) -> Result<JoinOutcome, WorldError> {
        let (reply, rx) = oneshot::channel();
        self.request(WorldCommand::Join { player, reply }, rx).await?
    }

    /// Removes a player from the roster.
    ///
    /// # Errors
    /// - [`WorldError::NotFound`] — the player isn't in the roster
    /// - [`WorldError::Unavailable`] — the actor has stopped
    pub async fn remove_player(&self, player_id: PlayerId) -> Result<LeaveOutcome, WorldError> {
        let (reply, rx) = oneshot::channel();
        self.request(WorldCommand::Leave { player_id, reply }, rx)
            .await?
    }

    /// Returns a copy of the roster, in join order.
    pub async fn players(&self) -> Result<Vec<Player>, WorldError> {
        let (reply, rx) = oneshot::channel();
        self.request(WorldCommand::Roster { reply }, rx).await
    }

    /// Builds a fresh snapshot for a player who is already in the world
    /// (e.g. to resend the welcome payload). `None` if they aren't.
    pub async fn snapshot_for(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<WorldSnapshot>, WorldError> {
        let (reply, rx) = oneshot::channel();
        self.request(WorldCommand::Snapshot { player_id, reply }, rx)
            .await
    }

    /// Returns the number of players in the world.
    pub async fn len(&self) -> Result<usize, WorldError> {
        Ok(self.players().await?.len())
    }

    /// Tells the actor to stop. Later requests fail with
    /// [`WorldError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), WorldError> {
        self.sender
            .send(WorldCommand::Shutdown)
            .await
            .map_err(|_| WorldError::Unavailable)
    }

    /// Sends a command and waits for its reply.
    async fn request<T>(
        &self,
        command: WorldCommand,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, WorldError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| WorldError::Unavailable)?;
        reply.await.map_err(|_| WorldError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct WorldActor {
    /// Connected players, in join order.
    roster: Vec<Player>,
    assets: WorldAssets,
    receiver: mpsc::Receiver<WorldCommand>,
}

impl WorldActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!("world actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                WorldCommand::Join { player, reply } => {
                    let _ = reply.send(self.handle_join(player));
                }
                WorldCommand::Leave { player_id, reply } => {
                    let _ = reply.send(self.handle_leave(player_id));
                }
                WorldCommand::Roster { reply } => {
                    let _ = reply.send(self.roster.clone());
                }
                WorldCommand::Snapshot { player_id, reply } => {
                    let snapshot = self
                        .roster
                        .iter()
                        .find(|p| p.id() == player_id)
                        .map(|p| self.snapshot(p.clone()));
                    let _ = reply.send(snapshot);
                }
                WorldCommand::Shutdown => {
                    tracing::info!(players = self.roster.len(), "world shutting down");
                    break;
                }
            }
        }

        tracing::info!("world actor stopped");
    }

    fn handle_join(&mut self, player: Player) -> Result<JoinOutcome, WorldError> {
        if self.roster.iter().any(|p| p.id() == player.id()) {
            return Err(WorldError::AlreadyJoined(player.id()));
        }
        if self.roster.iter().any(|p| p.connection == player.connection) {
            return Err(WorldError::ConnectionInUse(player.connection));
        }

        self.roster.push(player.clone());
        tracing::info!(
            player_id = %player.id(),
            connection = %player.connection,
            players = self.roster.len(),
            "player joined world"
        );

        Ok(JoinOutcome {
            snapshot: self.snapshot(player),
            roster: self.roster.clone(),
        })
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<LeaveOutcome, WorldError> {
        let index = self
            .roster
            .iter()
            .position(|p| p.id() == player_id)
            .ok_or(WorldError::NotFound(player_id))?;

        // `remove` (not `swap_remove`) keeps the rest in join order.
        let player = self.roster.remove(index);
        tracing::info!(
            %player_id,
            players = self.roster.len(),
            "player left world"
        );

        Ok(LeaveOutcome {
            player,
            roster: self.roster.clone(),
        })
    }

    fn snapshot(&self, player: Player) -> WorldSnapshot {
        WorldSnapshot {
            player,
            players: self.roster.clone(),
            map: self.assets.map.clone(),
            npcs: self.assets.npcs.clone(),
            dropped_items: self.assets.items.clone(),
        }
    }
}

/// Spawns the world actor task and returns a handle to it.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_world(assets: WorldAssets) -> WorldHandle {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);

    let actor = WorldActor {
        roster: Vec::new(),
        assets,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    WorldHandle { sender: tx }
}
