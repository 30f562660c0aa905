use crate::error::GameError;
use crate::types::{BOARD_SIZE, Cell, Move, Player, Position};

const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
const HOME_ROWS: usize = 3;

/// Checkers board: an 8x8 grid of cells, row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates the starting layout: Black on the dark cells of rows 0..3,
    /// Red on the dark cells of rows 5..8.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if (row + col) % 2 == 0 {
                    continue;
                }
                if row < HOME_ROWS {
                    board.cells[row][col] = Cell::Black;
                } else if row >= BOARD_SIZE - HOME_ROWS {
                    board.cells[row][col] = Cell::Red;
                }
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row as usize][pos.col as usize]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.row as usize][pos.col as usize] = cell;
    }

    /// Moves the piece at `mv.from` to `mv.to`, clearing the jumped cell of a
    /// capture. Only the shape of the move is checked here; direction and
    /// turn order belong to the rule engine.
    pub fn apply(&mut self, mv: Move) -> Result<(), GameError> {
        let illegal = GameError::IllegalMove {
            from: mv.from,
            to: mv.to,
        };
        for pos in [mv.from, mv.to] {
            Position::new(pos.row, pos.col)?;
        }

        let Some(mover) = self.get(mv.from).owner() else {
            return Err(illegal);
        };
        if self.get(mv.to) != Cell::Empty {
            return Err(illegal);
        }
        let delta = mv.row_delta();
        if !(1..=2).contains(&delta) || mv.from.col.abs_diff(mv.to.col) != delta {
            return Err(illegal);
        }

        if let Some(mid) = mv.midpoint() {
            if self.get(mid).owner() != Some(mover.other()) {
                return Err(illegal);
            }
            self.set(mid, Cell::Empty);
        }
        self.set(mv.to, mover.to_cell());
        self.set(mv.from, Cell::Empty);
        Ok(())
    }

    /// Returns `(red_count, black_count)`.
    pub fn count(&self) -> (u8, u8) {
        let mut red = 0;
        let mut black = 0;
        for cell in self.cells.iter().flatten() {
            match cell {
                Cell::Red => red += 1,
                Cell::Black => black += 1,
                Cell::Empty => {}
            }
        }
        (red, black)
    }

    pub fn count_for(&self, player: Player) -> u8 {
        let (red, black) = self.count();
        match player {
            Player::Red => red,
            Player::Black => black,
        }
    }

    /// Positions holding a piece of `player`, in row-major order.
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = Position> + '_ {
        all_positions().filter(move |&pos| self.get(pos).owner() == Some(player))
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=red, 2=black.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (cell, out) in self.cells.iter().flatten().zip(board.iter_mut()) {
            *out = cell.to_u8();
        }
        board
    }

    /// CRC32 of the flat cell array. Two peers holding the same position
    /// produce the same value.
    pub fn fingerprint(&self) -> u32 {
        crc32fast::hash(&self.to_array())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn all_positions() -> impl Iterator<Item = Position> {
    (0..BOARD_SIZE as u8)
        .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Position { row, col }))
}
