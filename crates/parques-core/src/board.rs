//! Board coordinate mapping.
//!
//! The server tracks every piece as a single integer position. This module
//! defines that coordinate space and translates it into the segmented
//! visual structure of the board. Two layout generations coexist behind the
//! [`BoardLayout`] trait:
//!
//! - [`FourCornerLayout`] — the classic board: a 68-cell main track with a
//!   fixed set of safe squares, plus an 8-cell home stretch per color.
//! - [`NHouseLayout`] — the generalized board divided into symmetric
//!   "houses", each contributing 17 main-path ids and 9 home-stretch ids to
//!   the global space. Cells inside a house live in a 4×4 sub-grid whose
//!   positions carry zero or more local ids.
//!
//! Gameplay code selects a layout at configuration time and never branches
//! on the generation afterwards.

use thiserror::Error;

use crate::types::{Piece, Player, PlayerColor};

// ---------------------------------------------------------------------------
// Cell classification
// ---------------------------------------------------------------------------

/// What kind of cell a global position denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Holding area before a piece enters the track (no real cell; pieces
    /// in jail carry a sentinel position below the track range).
    Jail,
    /// An ordinary main-track cell where captures are possible.
    MainTrack,
    /// A main-track cell where a piece cannot be captured.
    SafeSquare,
    /// A cell on one color's private final approach.
    HomeStretch,
}

/// A board layout: the mapping between the linear position space and the
/// visual segments of the board.
pub trait BoardLayout {
    /// Classify a global position.
    ///
    /// # Panics
    ///
    /// Panics if `position` is above the layout's coordinate space. Feeding
    /// an out-of-range position is a programming error, not a recoverable
    /// condition; positions below the track range classify as jail.
    fn classify(&self, position: i32) -> CellKind;

    /// The ordered cells of one color's home stretch, nearest-first.
    fn home_stretch(&self, color: PlayerColor) -> Vec<i32>;

    /// Whether a main-track position is a safe square.
    fn is_safe_square(&self, position: i32) -> bool {
        self.classify(position) == CellKind::SafeSquare
    }
}

/// All pieces occupying a cell, paired with their owners.
///
/// Order is deterministic: players in list order, then pieces in id order.
/// The UI uses this for stacking offsets; it has no gameplay meaning.
pub fn pieces_at<'a>(position: i32, players: &'a [Player]) -> Vec<(&'a Player, &'a Piece)> {
    let mut out = Vec::new();
    for player in players {
        let mut on_cell: Vec<&Piece> = player
            .pieces
            .iter()
            .filter(|p| p.is_on_board() && p.position == position)
            .collect();
        on_cell.sort_by_key(|p| p.id);
        out.extend(on_cell.into_iter().map(|p| (player, p)));
    }
    out
}

// ---------------------------------------------------------------------------
// Four-corner layout
// ---------------------------------------------------------------------------

/// Number of cells on the shared main track.
pub const MAIN_TRACK_LEN: i32 = 68;

/// Main-track cells where a piece cannot be captured.
pub const SAFE_SQUARES: [i32; 12] = [0, 5, 12, 17, 22, 29, 34, 39, 46, 51, 56, 63];

/// First home-stretch position. Home-stretch cells are shared numerically
/// across colors; ownership makes them private.
pub const HOME_STRETCH_START: i32 = 68;

/// Cells in one color's home stretch.
pub const HOME_STRETCH_LEN: i32 = 8;

/// The classic four-corner board: positions `0..68` on the main track and
/// `68..76` on the home stretch. A finished piece has no position at all
/// (it is flagged, not placed).
#[derive(Debug, Clone, Copy, Default)]
pub struct FourCornerLayout;

impl BoardLayout for FourCornerLayout {
    fn classify(&self, position: i32) -> CellKind {
        if position < 0 {
            CellKind::Jail
        } else if position < MAIN_TRACK_LEN {
            if SAFE_SQUARES.contains(&position) {
                CellKind::SafeSquare
            } else {
                CellKind::MainTrack
            }
        } else if position < HOME_STRETCH_START + HOME_STRETCH_LEN {
            CellKind::HomeStretch
        } else {
            panic!("position {position} outside the four-corner layout");
        }
    }

    fn home_stretch(&self, _color: PlayerColor) -> Vec<i32> {
        (HOME_STRETCH_START..HOME_STRETCH_START + HOME_STRETCH_LEN).collect()
    }
}

// ---------------------------------------------------------------------------
// Generalized n-house layout
// ---------------------------------------------------------------------------

/// Main-path ids contributed by each house.
pub const MAIN_IDS_PER_HOUSE: i32 = 17;

/// Home-stretch ids reserved per house. Local id 20 has no grid cell, but
/// its slot in the global id space is kept so house segments stay uniform.
pub const HOME_IDS_PER_HOUSE: i32 = 9;

/// Ids per house across both segments.
pub const IDS_PER_HOUSE: i32 = MAIN_IDS_PER_HOUSE + HOME_IDS_PER_HOUSE;

/// Houses the 2×2 board grid can hold.
pub const MAX_HOUSES: u8 = 4;

/// Local ids carried by each position of a house's 4×4 sub-grid, row by
/// row. Local ids `1..=17` are main-path cells, `18..=26` home-stretch
/// cells; an empty slice is a structural cell no token can occupy.
pub const HOUSE_GRID: [&[u8]; 16] = [
    &[26, 25, 24],
    &[9, 10],
    &[11, 12, 13],
    &[14, 15, 16, 17],
    &[23, 22, 21],
    &[8, 7, 6],
    &[],
    &[],
    &[19, 18, 1],
    &[5, 4, 3, 2],
    &[],
    &[],
    &[],
    &[],
    &[],
    &[],
];

/// Largest local id on the main path.
pub const LAST_MAIN_LOCAL_ID: u8 = 17;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("house count must be between 1 and {MAX_HOUSES}, got {0}")]
    InvalidHouseCount(u8),
}

/// The generalized board: `total_houses` symmetric houses whose main-path
/// segments come first in the global space (`1..=total*17`), followed by
/// all home-stretch segments (`total*17+1..=total*26`).
#[derive(Debug, Clone, Copy)]
pub struct NHouseLayout {
    total_houses: u8,
}

impl NHouseLayout {
    /// House configuration is validated here, once; per-query inputs are
    /// trusted after that.
    pub fn new(total_houses: u8) -> Result<Self, LayoutError> {
        if total_houses == 0 || total_houses > MAX_HOUSES {
            return Err(LayoutError::InvalidHouseCount(total_houses));
        }
        Ok(Self { total_houses })
    }

    pub fn total_houses(&self) -> u8 {
        self.total_houses
    }

    /// Length of the shared main track.
    pub fn main_track_len(&self) -> i32 {
        i32::from(self.total_houses) * MAIN_IDS_PER_HOUSE
    }

    /// Highest global id in the layout.
    pub fn capacity(&self) -> i32 {
        i32::from(self.total_houses) * IDS_PER_HOUSE
    }

    /// Translate a house-local id into the global position space.
    ///
    /// Main-path ids are consecutive per house; home-stretch ids for every
    /// house come after all main paths:
    ///
    /// ```text
    /// localId <= 17:  (houseNumber - 1) * 17 + localId
    /// localId  > 17:  totalHouses * 17 + (houseNumber - 1) * 9 + (localId - 17)
    /// ```
    ///
    /// `house_number` is 1-indexed.
    pub fn global_id(&self, house_number: u8, local_id: u8) -> i32 {
        debug_assert!(house_number >= 1 && house_number <= self.total_houses);
        let house = i32::from(house_number) - 1;
        let local = i32::from(local_id);
        if local_id <= LAST_MAIN_LOCAL_ID {
            house * MAIN_IDS_PER_HOUSE + local
        } else {
            i32::from(self.total_houses) * MAIN_IDS_PER_HOUSE
                + house * HOME_IDS_PER_HOUSE
                + (local - i32::from(LAST_MAIN_LOCAL_ID))
        }
    }

    /// Global ids for every position of one house's 4×4 sub-grid, in grid
    /// order. Rendering consumes this directly.
    pub fn house_cells(&self, house_number: u8) -> Vec<Vec<i32>> {
        HOUSE_GRID
            .iter()
            .map(|ids| {
                ids.iter()
                    .map(|&local| self.global_id(house_number, local))
                    .collect()
            })
            .collect()
    }

    /// Which house a color's home stretch lives in. Fixed seating order
    /// around the grid: yellow, blue, green, red.
    pub fn house_of(&self, color: PlayerColor) -> u8 {
        let seat = match color {
            PlayerColor::Yellow => 1,
            PlayerColor::Blue => 2,
            PlayerColor::Green => 3,
            PlayerColor::Red => 4,
        };
        debug_assert!(seat <= self.total_houses, "color {color} has no house");
        seat
    }
}

impl BoardLayout for NHouseLayout {
    fn classify(&self, position: i32) -> CellKind {
        if position <= 0 {
            CellKind::Jail
        } else if position <= self.main_track_len() {
            // The generalized board designates no safe squares (yet).
            CellKind::MainTrack
        } else if position <= self.capacity() {
            CellKind::HomeStretch
        } else {
            panic!("position {position} outside the {}-house layout", self.total_houses);
        }
    }

    fn home_stretch(&self, color: PlayerColor) -> Vec<i32> {
        let house = self.house_of(color);
        (LAST_MAIN_LOCAL_ID + 1..=LAST_MAIN_LOCAL_ID + HOME_IDS_PER_HOUSE as u8)
            .map(|local| self.global_id(house, local))
            .collect()
    }
}
