//! The game client controller.
//!
//! [`GameClient`] owns exactly one [`NetClient`] and one
//! [`ClientViewState`], providing the shared dispatch logic:
//!
//! - Routing inbound [`ServerMessage`]s into the view-state reducer.
//! - Translating user intents into outbound [`ClientMessage`]s, with local
//!   input validation before anything touches the wire.
//! - Reconnect-on-mount: if a stored session exists, a rejoin is scheduled
//!   shortly after construction so the transport can finish connecting.
//! - Driving the deadline-based timers (error auto-clear, deferred session
//!   wipe) from the poll loop.
//!
//! The controller is constructed explicitly by the application and torn
//! down by `Drop` — no ambient global connection state. Dropping it closes
//! the transport exactly once and abandons every scheduled deadline.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use parques_core::protocol::{self, ClientMessage, ServerMessage};
use parques_core::view_state::{ClientViewState, StateChanged};

use crate::net_client::NetClient;
use crate::session::{SessionStore, StoredSession};
#[cfg(feature = "native")]
use crate::transport::Transport;

/// Delay between mounting with a stored session and sending the rejoin,
/// giving the transport time to finish connecting.
pub const RECONNECT_JOIN_DELAY: Duration = Duration::from_millis(500);

/// Lifecycle of the single transport the controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Outcome of processing a single network event.
#[derive(Debug)]
pub enum PollResult {
    /// A server message was applied; the returned [`StateChanged`] flags
    /// describe which view slots were modified.
    Updated(StateChanged),
    /// The server closed the connection.
    Disconnected,
    /// No event was available (channel empty).
    Empty,
}

/// A stored-session rejoin waiting for its send deadline.
#[derive(Debug)]
struct PendingRejoin {
    game_id: String,
    player_name: String,
    due: Instant,
}

/// Owns the network client, view state, and session store.
pub struct GameClient<S: SessionStore> {
    net: NetClient,
    pub view: ClientViewState,
    store: S,
    status: ConnectionStatus,
    pending_rejoin: Option<PendingRejoin>,
}

impl<S: SessionStore> GameClient<S> {
    /// Create a controller over any [`Transport`] implementation.
    ///
    /// If the store holds a previous session, a rejoin is scheduled after
    /// [`RECONNECT_JOIN_DELAY`] and the reconnecting flag goes up until
    /// the server confirms the join.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T, store: S) -> Self {
        Self::with_net(NetClient::from_transport(transport), store)
    }

    /// Connect to a WebSocket server (see [`crate::config::resolve_server_url`]).
    #[cfg(any(feature = "native", feature = "web"))]
    pub async fn connect_ws(url: &str, store: S) -> Result<Self, Box<dyn std::error::Error>> {
        let net = NetClient::connect_ws(url).await?;
        Ok(Self::with_net(net, store))
    }

    fn with_net(net: NetClient, store: S) -> Self {
        let mut client = Self {
            net,
            view: ClientViewState::new(),
            store,
            status: ConnectionStatus::Connecting,
            pending_rejoin: None,
        };
        if let Some(session) = client.store.load() {
            info!(game_id = %session.game_id, "found stored session, scheduling rejoin");
            client.pending_rejoin = Some(PendingRejoin {
                game_id: session.game_id,
                player_name: session.player_name,
                due: Instant::now() + RECONNECT_JOIN_DELAY,
            });
            client.view.begin_reconnecting();
        }
        client
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// The session currently on record, if any.
    pub fn stored_session(&self) -> Option<StoredSession> {
        self.store.load()
    }

    // ------------------------------------------------------------------
    // Polling
    // ------------------------------------------------------------------

    /// Try to receive and process one network event (non-blocking).
    ///
    /// Also advances the scheduled rejoin and deadline timers; flags from
    /// an expired deadline are folded into the result, so an error window
    /// closing surfaces as [`PollResult::Updated`] even when the channel is
    /// empty. Frontends should call this in a loop until
    /// [`PollResult::Empty`] is returned.
    pub fn try_recv(&mut self) -> PollResult {
        let ticked = self.tick(Instant::now());
        match self.net.incoming.try_recv() {
            Ok(msg) => self.handle_server_message(msg, ticked),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) if ticked.any() => {
                PollResult::Updated(ticked)
            }
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) => PollResult::Empty,
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected) => self.on_channel_closed(),
        }
    }

    /// Await the next network event or deadline, whichever comes first.
    ///
    /// On native targets the wait is capped at the nearest pending deadline
    /// (error window, session wipe, scheduled rejoin), so timers fire on
    /// schedule even while the server is silent. Useful in
    /// `tokio::select!` loops.
    pub async fn recv(&mut self) -> PollResult {
        let ticked = self.tick(Instant::now());
        if ticked.any() {
            return PollResult::Updated(ticked);
        }
        loop {
            #[cfg(feature = "native")]
            if let Some(deadline) = self.next_deadline() {
                tokio::select! {
                    msg = self.net.incoming.recv() => {
                        return match msg {
                            Some(msg) => self.handle_server_message(msg, StateChanged::default()),
                            None => self.on_channel_closed(),
                        };
                    }
                    _ = tokio::time::sleep_until(deadline.into()) => {
                        let changed = self.tick(Instant::now());
                        if changed.any() {
                            return PollResult::Updated(changed);
                        }
                        // A flushed rejoin changes no view slot; keep waiting.
                        continue;
                    }
                }
            }
            return match self.net.incoming.recv().await {
                Some(msg) => self.handle_server_message(msg, StateChanged::default()),
                None => self.on_channel_closed(),
            };
        }
    }

    /// Advance time-driven behavior to `now`: flush a due rejoin, expire
    /// the error display window, and honor a due session wipe.
    ///
    /// Deadlines are last-write-wins and owned by this client; dropping
    /// the client cancels everything.
    pub fn tick(&mut self, now: Instant) -> StateChanged {
        let changed = self.view.expire_timers(now);

        if self.view.take_session_clear_due(now) {
            debug!("game finished grace period over, clearing stored session");
            self.store.clear();
        }

        if self.pending_rejoin.as_ref().is_some_and(|r| r.due <= now)
            && let Some(rejoin) = self.pending_rejoin.take()
        {
            info!(game_id = %rejoin.game_id, "sending stored-session rejoin");
            self.send(ClientMessage::JoinGame {
                game_id: rejoin.game_id,
                player_name: rejoin.player_name,
            });
        }

        changed
    }

    /// Nearest pending deadline across the view timers and the scheduled
    /// rejoin, if any.
    #[cfg(feature = "native")]
    fn next_deadline(&self) -> Option<Instant> {
        let rejoin_due = self.pending_rejoin.as_ref().map(|r| r.due);
        match (self.view.next_deadline(), rejoin_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ------------------------------------------------------------------
    // Outbound intents
    // ------------------------------------------------------------------

    /// Ask the server to create a room. The confirmation arrives as
    /// `gameCreated`.
    pub fn create_game(&self) {
        self.send(ClientMessage::CreateGame);
    }

    /// Create-and-join flow: generate a room code locally, clear any
    /// previous game, and join the new room. Returns the new code.
    pub fn create_and_join(&mut self, player_name: &str) -> Result<String, String> {
        protocol::validate_player_name(player_name)?;
        self.leave_game();
        let game_id = protocol::generate_game_id();
        self.join_game(&game_id, player_name)?;
        Ok(game_id)
    }

    /// Join a room. Validates inputs synchronously; nothing is sent on
    /// rejection. Persists the session immediately with the locally known
    /// name — the join confirmation overwrites it with the server-assigned
    /// player id.
    ///
    /// A manual join supersedes a scheduled rejoin that has not been sent
    /// yet; one already on the wire races normally and the server's last
    /// answer wins.
    pub fn join_game(&mut self, game_id: &str, player_name: &str) -> Result<(), String> {
        protocol::validate_player_name(player_name)?;
        protocol::validate_game_id(game_id)?;

        self.pending_rejoin = None;
        self.send(ClientMessage::JoinGame {
            game_id: game_id.to_string(),
            player_name: player_name.to_string(),
        });
        self.store.save(&StoredSession {
            game_id: game_id.to_string(),
            player_name: player_name.to_string(),
            player_id: String::new(),
        });
        Ok(())
    }

    pub fn start_game(&self, game_id: &str) {
        self.send(ClientMessage::StartGame {
            game_id: game_id.to_string(),
        });
    }

    pub fn roll_dice(&self, game_id: &str) {
        self.send(ClientMessage::RollDice {
            game_id: game_id.to_string(),
        });
    }

    pub fn move_piece(&self, game_id: &str, piece_id: u8) {
        self.send(ClientMessage::MovePiece {
            game_id: game_id.to_string(),
            piece_id,
        });
    }

    pub fn skip_turn(&self, game_id: &str) {
        self.send(ClientMessage::SkipTurn {
            game_id: game_id.to_string(),
        });
    }

    /// Leave the current game: wipe the stored session and reset every
    /// view slot. Idempotent; does not tear down the transport (that
    /// happens when the client is dropped).
    pub fn leave_game(&mut self) {
        self.store.clear();
        self.view.reset();
        self.pending_rejoin = None;
    }

    /// Send a raw [`ClientMessage`] to the server.
    ///
    /// A send after disconnect is silently dropped; the poll side reports
    /// [`PollResult::Disconnected`] separately.
    pub fn send(&self, msg: ClientMessage) {
        let _ = self.net.send(msg);
    }

    // -- private -----------------------------------------------------------

    fn handle_server_message(&mut self, msg: ServerMessage, pending: StateChanged) -> PollResult {
        match &msg {
            ServerMessage::Connect => {
                info!("connected to game server");
                self.status = ConnectionStatus::Connected;
            }
            ServerMessage::Disconnect => {
                info!("server announced disconnect");
                self.status = ConnectionStatus::Disconnected;
            }
            ServerMessage::GameCreated { game_id } => {
                debug!(%game_id, "game created");
            }
            _ => {}
        }

        let mut changed = pending;
        changed.merge(self.view.apply_server_message(&msg, Instant::now()));

        // Join confirmed: persist the server-assigned identity.
        if changed.identity
            && let (Some(player), Some(game)) = (&self.view.current_player, &self.view.game_state)
        {
            self.store.save(&StoredSession {
                game_id: game.id.clone(),
                player_name: player.name.clone(),
                player_id: player.id.clone(),
            });
        }

        PollResult::Updated(changed)
    }

    fn on_channel_closed(&mut self) -> PollResult {
        self.status = ConnectionStatus::Disconnected;
        PollResult::Disconnected
    }
}
