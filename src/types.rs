use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const BOARD_SIZE: usize = 8;

/// The two sides. Red is player 1 and moves toward row 0; Black is player 2
/// and moves toward row 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    Red,
    Black,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::Red => Player::Black,
            Player::Black => Player::Red,
        }
    }

    /// 1 for Red, 2 for Black. Matches the relay's player index.
    pub fn index(self) -> u8 {
        match self {
            Player::Red => 1,
            Player::Black => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Player> {
        match index {
            1 => Some(Player::Red),
            2 => Some(Player::Black),
            _ => None,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Player::Red => Cell::Red,
            Player::Black => Cell::Black,
        }
    }

    /// Row delta of a forward step.
    pub fn forward(self) -> i8 {
        match self {
            Player::Red => -1,
            Player::Black => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Red => "Red",
            Player::Black => "Black",
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> u8 {
        player.index()
    }
}

impl TryFrom<u8> for Player {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Player::from_index(value).ok_or_else(|| format!("invalid player index: {value}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Black,
}

impl Cell {
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Player::Red),
            Cell::Black => Some(Player::Black),
        }
    }

    /// 0=empty, 1=red, 2=black.
    pub fn to_u8(self) -> u8 {
        self.owner().map_or(0, Player::index)
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, GameError> {
        if row as usize >= BOARD_SIZE || col as usize >= BOARD_SIZE {
            return Err(GameError::OutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    /// Shifts by `(dr, dc)`, returning `None` when the result leaves the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row as i16 + dr as i16;
        let col = self.col as i16 + dc as i16;
        let range = 0..BOARD_SIZE as i16;
        if range.contains(&row) && range.contains(&col) {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    pub fn row_delta(&self) -> u8 {
        self.from.row.abs_diff(self.to.row)
    }

    pub fn is_capture(&self) -> bool {
        self.row_delta() == 2
    }

    /// The jumped cell of a capture.
    pub fn midpoint(&self) -> Option<Position> {
        if !self.is_capture() {
            return None;
        }
        Some(Position {
            row: (self.from.row + self.to.row) / 2,
            col: (self.from.col + self.to.col) / 2,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Offline,
    Ai,
    Online,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Offline => "offline",
            GameMode::Ai => "ai",
            GameMode::Online => "online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WinReason {
    /// The loser has no pieces left.
    Elimination,
    /// The loser's turn countdown ran out.
    Timeout,
    /// The loser had pieces but no legal move (opt-in rule).
    Stalemate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Winner { player: Player, reason: WinReason },
    Draw,
}

impl Outcome {
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Winner { player, .. } => Some(*player),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner {
                player,
                reason: WinReason::Timeout,
            } => write!(f, "{} ran out of time!", player.other().name()),
            Outcome::Winner { player, .. } => write!(f, "{} wins!", player.name()),
            Outcome::Draw => write!(f, "Draw!"),
        }
    }
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub board: Vec<u8>,
    pub mode: Option<GameMode>,
    pub current_player: u8,
    pub local_may_act: bool,
    pub red_count: u8,
    pub black_count: u8,
    pub time_left: u32,
    pub player_names: [String; 2],
    pub selected: Option<Position>,
    pub highlighted: Vec<Position>,
    pub room_id: Option<String>,
    pub player_index: Option<u8>,
    pub is_game_over: bool,
    pub outcome: Option<Outcome>,
    pub end_message: Option<String>,
    pub turn_text: String,
    pub timer_text: String,
}
