//! Client view state: the projection of server events into the handful of
//! slots the UI reads.
//!
//! [`ClientViewState`] owns six named slots — game snapshot, our player
//! identity, the active dice roll, the valid-move set, a transient error,
//! and the reconnecting flag — and updates them from one exhaustive match
//! over [`ServerMessage`]. Handlers are synchronous and run to completion,
//! so no two events ever race on a slot.
//!
//! Timer-driven behavior (the auto-clearing error and the deferred session
//! wipe after a finished game) is modeled as deadline fields expired from
//! the owner's poll loop, not as detached timers: dropping the state
//! abandons every pending deadline.

use std::time::{Duration, Instant};

use crate::protocol::ServerMessage;
use crate::types::{DiceRoll, GameState, Move, Player};

/// How long a server error stays visible before clearing itself.
pub const ERROR_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

/// Grace period between `gameFinished` and wiping the persisted session,
/// so the end-of-game UI stays addressable.
pub const SESSION_CLEAR_GRACE: Duration = Duration::from_secs(5);

/// Describes which view slots changed after applying a server message.
///
/// Frontends inspect these flags to decide what to re-render. All flags
/// default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanged {
    /// The game snapshot was replaced.
    pub game: bool,
    /// Our player identity changed (join confirmation arrived).
    pub identity: bool,
    /// The active dice roll or valid-move set changed.
    pub dice: bool,
    /// The transient error message changed (set or cleared).
    pub error: bool,
}

impl StateChanged {
    /// Returns `true` if any flag is set.
    pub fn any(self) -> bool {
        self.game || self.identity || self.dice || self.error
    }

    /// Fold another change set into this one.
    pub fn merge(&mut self, other: StateChanged) {
        self.game |= other.game;
        self.identity |= other.identity;
        self.dice |= other.dice;
        self.error |= other.error;
    }
}

/// The local view of one game session.
#[derive(Debug, Clone, Default)]
pub struct ClientViewState {
    /// Latest authoritative snapshot. Last write wins; never merged.
    pub game_state: Option<GameState>,
    /// Our own player record, set by the join confirmation.
    pub current_player: Option<Player>,
    /// The active roll, from `diceRolled` until the next move clears it.
    pub dice_roll: Option<DiceRoll>,
    /// Server-computed legal moves for the active roll.
    pub valid_moves: Vec<Move>,
    /// Transient, auto-dismissing error notice.
    pub error: Option<String>,
    /// True from a scheduled rejoin until the join confirmation arrives.
    pub is_reconnecting: bool,

    error_clear_at: Option<Instant>,
    session_clear_at: Option<Instant>,
}

impl ClientViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one server message. Returns the changed-slot flags.
    ///
    /// `now` anchors the deadlines this message may schedule (error
    /// auto-clear, deferred session wipe).
    pub fn apply_server_message(&mut self, msg: &ServerMessage, now: Instant) -> StateChanged {
        let mut changed = StateChanged::default();

        match msg {
            // Connection lifecycle is the controller's concern.
            ServerMessage::Connect | ServerMessage::Disconnect => {}

            // Room creation is confirmed by the joinedGame that follows.
            ServerMessage::GameCreated { .. } => {}

            ServerMessage::JoinedGame { player, game } => {
                self.current_player = Some(player.clone());
                self.game_state = Some(game.clone());
                self.is_reconnecting = false;
                changed.identity = true;
                changed.game = true;
            }

            ServerMessage::GameState { game } | ServerMessage::GameStarted { game } => {
                self.game_state = Some(game.clone());
                changed.game = true;
            }

            ServerMessage::DiceRolled {
                dice_roll,
                valid_moves,
            } => {
                self.dice_roll = Some(dice_roll.clone());
                self.valid_moves = valid_moves.clone();
                changed.dice = true;
            }

            // The server follows up with a fresh snapshot carrying the new
            // piece position; here we only retire the spent roll.
            ServerMessage::PieceMoved { .. } => {
                self.dice_roll = None;
                self.valid_moves.clear();
                changed.dice = true;
            }

            ServerMessage::GameFinished { .. } => {
                self.session_clear_at = Some(now + SESSION_CLEAR_GRACE);
            }

            ServerMessage::Error { message } => {
                self.set_error(message.clone(), now);
                changed.error = true;
            }
        }

        changed
    }

    /// Set the transient error and restart its display window. A later
    /// error replaces the message and the deadline (last write wins).
    pub fn set_error(&mut self, message: String, now: Instant) {
        self.error = Some(message);
        self.error_clear_at = Some(now + ERROR_DISPLAY_WINDOW);
    }

    /// Expire any due deadlines. Call from the owner's poll loop.
    pub fn expire_timers(&mut self, now: Instant) -> StateChanged {
        let mut changed = StateChanged::default();
        if self.error_clear_at.is_some_and(|at| at <= now) {
            self.error = None;
            self.error_clear_at = None;
            changed.error = true;
        }
        changed
    }

    /// Whether the deferred session wipe has come due. Consumes the
    /// deadline; the caller clears the persistent store.
    pub fn take_session_clear_due(&mut self, now: Instant) -> bool {
        if self.session_clear_at.is_some_and(|at| at <= now) {
            self.session_clear_at = None;
            true
        } else {
            false
        }
    }

    /// The earliest pending deadline, if any. Poll loops can sleep until
    /// this instant instead of ticking blindly.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.error_clear_at, self.session_clear_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Mark a stored-session rejoin as in flight.
    pub fn begin_reconnecting(&mut self) {
        self.is_reconnecting = true;
    }

    /// Reset every slot and abandon all deadlines. Used by leave-game;
    /// idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The id of the game we are in, if any.
    pub fn game_id(&self) -> Option<&str> {
        self.game_state.as_ref().map(|g| g.id.as_str())
    }

    // ------------------------------------------------------------------
    // Derived eligibility — never stored, always recomputed
    // ------------------------------------------------------------------

    /// Whether the seat at `currentPlayerIndex` is ours.
    pub fn is_my_turn(&self) -> bool {
        match (&self.game_state, &self.current_player) {
            (Some(game), Some(me)) => game.current_player().is_some_and(|p| p.id == me.id),
            _ => false,
        }
    }

    /// A roll is allowed only on our turn, with no roll already active, in
    /// an unfinished game.
    pub fn can_roll_dice(&self) -> bool {
        self.is_my_turn()
            && self.dice_roll.is_none()
            && self.game_state.as_ref().is_some_and(|g| !g.game_finished)
    }

    /// A piece click is actionable only for our own pieces with a legal
    /// move under the active roll.
    pub fn can_move_piece(&self, player_id: &str, piece_id: u8) -> bool {
        self.current_player
            .as_ref()
            .is_some_and(|me| me.id == player_id)
            && self.valid_moves.iter().any(|m| m.piece_id == piece_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Piece, PlayerColor};

    fn piece(id: u8) -> Piece {
        Piece {
            id,
            position: -1,
            is_in_jail: true,
            is_in_home: false,
            is_finished: false,
        }
    }

    fn player(id: &str, name: &str, color: PlayerColor) -> Player {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            color,
            pieces: (0..4).map(piece).collect(),
            is_active: true,
            consecutive_turns: 0,
            consecutive_doubles: 0,
            roll_attempts: 0,
        }
    }

    fn game(id: &str, players: Vec<Player>) -> GameState {
        GameState {
            id: id.to_string(),
            players,
            current_player_index: 0,
            dice_value: None,
            available_colors: Vec::new(),
            game_started: true,
            game_finished: false,
            winner: None,
            last_roll: None,
        }
    }

    fn joined(view: &mut ClientViewState, now: Instant) {
        let ana = player("p1", "Ana", PlayerColor::Red);
        let beto = player("p2", "Beto", PlayerColor::Blue);
        let msg = ServerMessage::JoinedGame {
            player: ana.clone(),
            game: game("AB12CD", vec![ana, beto]),
        };
        view.apply_server_message(&msg, now);
    }

    #[test]
    fn joined_game_sets_identity_and_clears_reconnecting() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        view.begin_reconnecting();
        assert!(view.is_reconnecting);

        joined(&mut view, now);
        assert!(!view.is_reconnecting);
        assert_eq!(view.game_id(), Some("AB12CD"));
        assert_eq!(view.current_player.as_ref().unwrap().name, "Ana");
        assert!(view.is_my_turn());
    }

    #[test]
    fn snapshots_replace_wholesale() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        joined(&mut view, now);

        let mut replacement = game("AB12CD", vec![player("p2", "Beto", PlayerColor::Blue)]);
        replacement.current_player_index = 0;
        let changed =
            view.apply_server_message(&ServerMessage::GameState { game: replacement }, now);
        assert!(changed.game);
        assert_eq!(view.game_state.as_ref().unwrap().players.len(), 1);
        // Our seat is gone from the snapshot, so it is no longer our turn.
        assert!(!view.is_my_turn());
    }

    #[test]
    fn dice_roll_blocks_further_rolls_until_a_move_clears_it() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        joined(&mut view, now);
        assert!(view.can_roll_dice());

        let roll = DiceRoll::Single {
            value: 5,
            can_roll_again: false,
        };
        let moves = vec![Move {
            piece_id: 1,
            from_position: 4,
            to_position: 9,
            captured: None,
        }];
        let changed = view.apply_server_message(
            &ServerMessage::DiceRolled {
                dice_roll: roll.clone(),
                valid_moves: moves,
            },
            now,
        );
        assert!(changed.dice);
        assert_eq!(view.dice_roll, Some(roll));
        assert!(!view.can_roll_dice());
        assert!(view.can_move_piece("p1", 1));
        assert!(!view.can_move_piece("p1", 2));
        assert!(!view.can_move_piece("p2", 1));

        let changed = view.apply_server_message(
            &ServerMessage::PieceMoved {
                piece_move: Move {
                    piece_id: 1,
                    from_position: 4,
                    to_position: 9,
                    captured: None,
                },
            },
            now,
        );
        assert!(changed.dice);
        assert!(view.dice_roll.is_none());
        assert!(view.valid_moves.is_empty());
        assert!(view.can_roll_dice());
    }

    #[test]
    fn no_rolls_once_the_game_is_finished() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        joined(&mut view, now);

        let mut finished = view.game_state.clone().unwrap();
        finished.game_finished = true;
        finished.winner = Some("Ana".to_string());
        view.apply_server_message(&ServerMessage::GameState { game: finished }, now);
        assert!(view.is_my_turn());
        assert!(!view.can_roll_dice());
    }

    #[test]
    fn error_auto_clears_after_the_display_window() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        let changed = view.apply_server_message(
            &ServerMessage::Error {
                message: "Room full".to_string(),
            },
            now,
        );
        assert!(changed.error);
        assert_eq!(view.error.as_deref(), Some("Room full"));

        // Not yet due.
        let changed = view.expire_timers(now + Duration::from_secs(2));
        assert!(!changed.error);
        assert_eq!(view.error.as_deref(), Some("Room full"));

        let changed = view.expire_timers(now + ERROR_DISPLAY_WINDOW);
        assert!(changed.error);
        assert!(view.error.is_none());
    }

    #[test]
    fn a_later_error_restarts_its_own_window() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        view.apply_server_message(
            &ServerMessage::Error {
                message: "Room full".to_string(),
            },
            now,
        );
        let later = now + Duration::from_secs(2);
        view.apply_server_message(
            &ServerMessage::Error {
                message: "Not your turn".to_string(),
            },
            later,
        );
        assert_eq!(view.error.as_deref(), Some("Not your turn"));

        // The first window's deadline has passed, but the second error's
        // window is still open.
        view.expire_timers(now + ERROR_DISPLAY_WINDOW);
        assert_eq!(view.error.as_deref(), Some("Not your turn"));

        view.expire_timers(later + ERROR_DISPLAY_WINDOW);
        assert!(view.error.is_none());
    }

    #[test]
    fn game_finished_schedules_the_session_wipe() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        view.apply_server_message(
            &ServerMessage::GameFinished {
                winner: "Ana".to_string(),
            },
            now,
        );
        assert!(!view.take_session_clear_due(now + Duration::from_secs(4)));
        assert!(view.take_session_clear_due(now + SESSION_CLEAR_GRACE));
        // Consumed: asking again reports nothing due.
        assert!(!view.take_session_clear_due(now + Duration::from_secs(60)));
    }

    #[test]
    fn next_deadline_tracks_the_earliest_pending_timer() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        assert!(view.next_deadline().is_none());

        view.apply_server_message(
            &ServerMessage::GameFinished {
                winner: "Ana".to_string(),
            },
            now,
        );
        assert_eq!(view.next_deadline(), Some(now + SESSION_CLEAR_GRACE));

        // The error window closes sooner than the session wipe.
        view.set_error("Room full".to_string(), now);
        assert_eq!(view.next_deadline(), Some(now + ERROR_DISPLAY_WINDOW));

        view.expire_timers(now + ERROR_DISPLAY_WINDOW);
        assert_eq!(view.next_deadline(), Some(now + SESSION_CLEAR_GRACE));
    }

    #[test]
    fn reset_is_idempotent() {
        let now = Instant::now();
        let mut view = ClientViewState::new();
        joined(&mut view, now);
        view.apply_server_message(
            &ServerMessage::Error {
                message: "x".to_string(),
            },
            now,
        );

        view.reset();
        let snapshot = format!("{view:?}");
        view.reset();
        assert_eq!(format!("{view:?}"), snapshot);
        assert!(view.game_state.is_none());
        assert!(view.current_player.is_none());
        assert!(view.dice_roll.is_none());
        assert!(view.valid_moves.is_empty());
        assert!(view.error.is_none());
        assert!(!view.is_reconnecting);
    }
}
