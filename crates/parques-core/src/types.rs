use serde::{Deserialize, Serialize};
use std::fmt;

/// The four seat colors. One player per color per game; assignment is
/// server-owned, the client only displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    Yellow,
    Green,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Yellow,
        PlayerColor::Green,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::Yellow => "yellow",
            PlayerColor::Green => "green",
        }
    }

    /// Display color for UI layers.
    pub fn hex(self) -> &'static str {
        match self {
            PlayerColor::Red => "#E63946",
            PlayerColor::Blue => "#457B9D",
            PlayerColor::Yellow => "#F4A261",
            PlayerColor::Green => "#2A9D8F",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a piece currently sits. Derived from the piece flags; the four
/// zones are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceZone {
    Jail,
    MainTrack,
    HomeStretch,
    Finished,
}

/// A single token on the board.
///
/// `position` is an index into the shared coordinate space defined by the
/// board layout (see [`crate::board`]). It is meaningful only while the
/// piece is on the main track or its home stretch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: u8,
    pub position: i32,
    pub is_in_jail: bool,
    pub is_in_home: bool,
    pub is_finished: bool,
}

impl Piece {
    /// Classify the piece by its state flags. Precedence handles the (never
    /// expected) case of conflicting flags deterministically.
    pub fn zone(&self) -> PieceZone {
        if self.is_finished {
            PieceZone::Finished
        } else if self.is_in_jail {
            PieceZone::Jail
        } else if self.is_in_home {
            PieceZone::HomeStretch
        } else {
            PieceZone::MainTrack
        }
    }

    /// Whether the piece occupies a cell (main track or home stretch).
    pub fn is_on_board(&self) -> bool {
        matches!(self.zone(), PieceZone::MainTrack | PieceZone::HomeStretch)
    }
}

/// One seated player as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub color: PlayerColor,
    pub pieces: Vec<Piece>,
    pub is_active: bool,
    pub consecutive_turns: u32,
    pub consecutive_doubles: u32,
    pub roll_attempts: u32,
}

impl Player {
    /// Number of pieces that have reached the goal.
    pub fn finished_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_finished).count()
    }
}

/// A dice roll as reported by the server.
///
/// The server speaks two shapes: the full two-die roll used during play,
/// and a reduced single-die form. Deserialization picks the two-die variant
/// whenever `dice1`/`dice2`/`total` are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum DiceRoll {
    Pair {
        dice1: u8,
        dice2: u8,
        total: u8,
        can_roll_again: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        released_from_jail: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        three_doubles_reward: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attempts_remaining: Option<u8>,
    },
    Single {
        value: u8,
        can_roll_again: bool,
    },
}

impl DiceRoll {
    /// The display value of the roll (the total for a two-die roll).
    pub fn value(&self) -> u8 {
        match self {
            DiceRoll::Pair { total, .. } => *total,
            DiceRoll::Single { value, .. } => *value,
        }
    }

    pub fn can_roll_again(&self) -> bool {
        match self {
            DiceRoll::Pair { can_roll_again, .. } | DiceRoll::Single { can_roll_again, .. } => {
                *can_roll_again
            }
        }
    }

    /// Whether a two-die roll came up doubles. `None` for single-die rolls.
    pub fn is_doubles(&self) -> Option<bool> {
        match self {
            DiceRoll::Pair { dice1, dice2, .. } => Some(dice1 == dice2),
            DiceRoll::Single { .. } => None,
        }
    }
}

/// A completed, server-validated displacement. The client never computes
/// destinations itself; it only renders moves and clears the active roll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub piece_id: u8,
    pub from_position: i32,
    pub to_position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<bool>,
}

/// Full game snapshot. Snapshots are authoritative and replace the local
/// copy wholesale; they are never diffed or merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: String,
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub dice_value: Option<u8>,
    pub available_colors: Vec<PlayerColor>,
    pub game_started: bool,
    pub game_finished: bool,
    pub winner: Option<String>,
    pub last_roll: Option<DiceRoll>,
}

impl GameState {
    /// The player whose turn it is, if the index is in range.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// Look up a player by id.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_zone_follows_flags() {
        let mut piece = Piece {
            id: 0,
            position: 12,
            is_in_jail: false,
            is_in_home: false,
            is_finished: false,
        };
        assert_eq!(piece.zone(), PieceZone::MainTrack);
        assert!(piece.is_on_board());

        piece.is_in_home = true;
        assert_eq!(piece.zone(), PieceZone::HomeStretch);

        piece.is_in_jail = true;
        assert_eq!(piece.zone(), PieceZone::Jail);
        assert!(!piece.is_on_board());

        piece.is_finished = true;
        assert_eq!(piece.zone(), PieceZone::Finished);
    }

    #[test]
    fn piece_uses_camel_case_on_the_wire() {
        let json = r#"{"id":2,"position":-1,"isInJail":true,"isInHome":false,"isFinished":false}"#;
        let piece: Piece = serde_json::from_str(json).unwrap();
        assert_eq!(piece.id, 2);
        assert_eq!(piece.zone(), PieceZone::Jail);

        let back = serde_json::to_string(&piece).unwrap();
        assert!(back.contains("\"isInJail\":true"));
    }

    #[test]
    fn dice_roll_picks_pair_variant_when_both_dice_present() {
        let json = r#"{"dice1":3,"dice2":3,"total":6,"canRollAgain":true,"releasedFromJail":true}"#;
        let roll: DiceRoll = serde_json::from_str(json).unwrap();
        assert_eq!(roll.value(), 6);
        assert_eq!(roll.is_doubles(), Some(true));
        assert!(roll.can_roll_again());
        match roll {
            DiceRoll::Pair {
                released_from_jail, ..
            } => assert_eq!(released_from_jail, Some(true)),
            DiceRoll::Single { .. } => panic!("expected two-die variant"),
        }
    }

    #[test]
    fn dice_roll_falls_back_to_single_variant() {
        let json = r#"{"value":5,"canRollAgain":false}"#;
        let roll: DiceRoll = serde_json::from_str(json).unwrap();
        assert_eq!(roll, DiceRoll::Single { value: 5, can_roll_again: false });
        assert_eq!(roll.value(), 5);
        assert_eq!(roll.is_doubles(), None);
    }

    #[test]
    fn current_player_index_out_of_range_is_none() {
        let game = GameState {
            id: "AB12CD".to_string(),
            players: Vec::new(),
            current_player_index: 0,
            dice_value: None,
            available_colors: PlayerColor::ALL.to_vec(),
            game_started: false,
            game_finished: false,
            winner: None,
            last_roll: None,
        };
        assert!(game.current_player().is_none());
    }
}
