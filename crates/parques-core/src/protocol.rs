//! Wire protocol between the Parqués client and the game server.
//!
//! Every frame is a JSON object with a `type` tag naming the event and the
//! remaining fields carrying the payload, exactly mirroring the server's
//! event vocabulary. Having both directions as exhaustive enums means an
//! unhandled message type is a compile error in the reducer, not a silently
//! dropped callback.

use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::types::{DiceRoll, GameState, Move, Player};

/// Messages sent from client to server.
///
/// Intents are fire-and-forget: there is no per-call response correlation,
/// the server answers by event type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Ask the server to create a new game room.
    CreateGame,

    /// Join an existing game (also used to rejoin after a disconnect).
    JoinGame { game_id: String, player_name: String },

    /// Start the game once enough players have joined.
    StartGame { game_id: String },

    /// Roll the dice for the current turn.
    RollDice { game_id: String },

    /// Move the given piece using the active roll.
    MovePiece { game_id: String, piece_id: u8 },

    /// Give up the current turn (no legal move available).
    SkipTurn { game_id: String },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Transport-level connect acknowledgment.
    Connect,

    /// A game room was created.
    GameCreated { game_id: String },

    /// Join confirmation: our player record plus the full game snapshot.
    JoinedGame { player: Player, game: GameState },

    /// Full game snapshot (authoritative, replaces local state wholesale).
    GameState { game: GameState },

    /// The game has started; payload is the fresh snapshot.
    GameStarted { game: GameState },

    /// The current player rolled; the move set is server-computed.
    DiceRolled {
        dice_roll: DiceRoll,
        valid_moves: Vec<Move>,
    },

    /// A validated piece displacement was applied on the server.
    PieceMoved {
        #[serde(rename = "move")]
        piece_move: Move,
    },

    /// The game ended with a winner.
    GameFinished { winner: String },

    /// A rejected intent or other server-side complaint.
    Error { message: String },

    /// Transport-level disconnect notification.
    Disconnect,
}

// ---------------------------------------------------------------------------
// Room codes and local input validation
// ---------------------------------------------------------------------------

/// Room codes are 6 uppercase alphanumerics, generated client-side when a
/// player creates a room.
pub const GAME_ID_LEN: usize = 6;

const GAME_ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Longest accepted player name.
pub const MAX_PLAYER_NAME_LEN: usize = 15;

/// Generate a fresh 6-character uppercase room code.
pub fn generate_game_id() -> String {
    let mut rng = rand::rng();
    (0..GAME_ID_LEN)
        .map(|_| GAME_ID_CHARS[rng.random_range(0..GAME_ID_CHARS.len())] as char)
        .collect()
}

/// Validate a player name before sending any intent.
///
/// Rejections are synchronous and user-facing; nothing goes over the wire.
pub fn validate_player_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Please enter your name".to_string());
    }
    if trimmed.len() > MAX_PLAYER_NAME_LEN {
        return Err(format!(
            "Name must be at most {MAX_PLAYER_NAME_LEN} characters"
        ));
    }
    Ok(())
}

/// Validate a room code before sending any intent.
pub fn validate_game_id(game_id: &str) -> Result<(), String> {
    let trimmed = game_id.trim();
    if trimmed.is_empty() {
        return Err("Please enter the room code".to_string());
    }
    if trimmed.len() > GAME_ID_LEN {
        return Err(format!("Room code must be at most {GAME_ID_LEN} characters"));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Room code must be alphanumeric".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_use_camel_case_tags() {
        let msg = ClientMessage::JoinGame {
            game_id: "AB12CD".to_string(),
            player_name: "Ana".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"joinGame","gameId":"AB12CD","playerName":"Ana"}"#
        );

        let json = serde_json::to_string(&ClientMessage::MovePiece {
            game_id: "AB12CD".to_string(),
            piece_id: 3,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"movePiece","gameId":"AB12CD","pieceId":3}"#);
    }

    #[test]
    fn server_messages_round_trip() {
        let frames = [
            r#"{"type":"connect"}"#,
            r#"{"type":"gameCreated","gameId":"XY99ZZ"}"#,
            r#"{"type":"gameFinished","winner":"Ana"}"#,
            r#"{"type":"error","message":"Room full"}"#,
            r#"{"type":"disconnect"}"#,
        ];
        for frame in frames {
            let msg: ServerMessage = serde_json::from_str(frame).unwrap();
            let back = serde_json::to_string(&msg).unwrap();
            assert_eq!(back, frame);
        }
    }

    #[test]
    fn piece_moved_payload_uses_move_field() {
        let json = r#"{"type":"pieceMoved","move":{"pieceId":1,"fromPosition":4,"toPosition":9,"captured":true}}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        match msg {
            ServerMessage::PieceMoved { piece_move } => {
                assert_eq!(piece_move.piece_id, 1);
                assert_eq!(piece_move.to_position, 9);
                assert_eq!(piece_move.captured, Some(true));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn generated_game_ids_are_six_uppercase_alphanumerics() {
        for _ in 0..100 {
            let id = generate_game_id();
            assert_eq!(id.len(), GAME_ID_LEN);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
            assert!(validate_game_id(&id).is_ok());
        }
    }

    #[test]
    fn name_validation() {
        assert!(validate_player_name("Ana").is_ok());
        assert!(validate_player_name("  ").is_err());
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name(&"x".repeat(16)).is_err());
    }

    #[test]
    fn game_id_validation() {
        assert!(validate_game_id("AB12CD").is_ok());
        assert!(validate_game_id("").is_err());
        assert!(validate_game_id("   ").is_err());
        assert!(validate_game_id("TOOLONG1").is_err());
        assert!(validate_game_id("AB-12C").is_err());
    }
}
