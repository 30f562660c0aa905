//! Move rule engine: forward diagonal steps and single forward captures.
//!
//! There is no promotion, no chained jumps, no backward capture and no forced
//! capture. A piece only ever moves toward the opponent's home rows.

use crate::board::Board;
use crate::types::{Cell, Move, Player, Position};

const SIDES: [i8; 2] = [-1, 1];

/// Destinations reachable in one ply by the piece at `from`. Empty when the
/// cell does not hold a piece of `player`.
pub fn legal_destinations(board: &Board, from: Position, player: Player) -> Vec<Position> {
    let mut out = Vec::with_capacity(4);
    if board.get(from).owner() != Some(player) {
        return out;
    }

    let dr = player.forward();
    for dc in SIDES {
        let Some(step) = from.offset(dr, dc) else {
            continue;
        };
        match board.get(step) {
            Cell::Empty => out.push(step),
            cell if cell.owner() == Some(player.other()) => {
                if let Some(landing) = from.offset(2 * dr, 2 * dc) {
                    if board.get(landing) == Cell::Empty {
                        out.push(landing);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Every legal move for `player`, grouped by origin in row-major order.
pub fn legal_moves(board: &Board, player: Player) -> Vec<Move> {
    board
        .pieces(player)
        .flat_map(|from| {
            legal_destinations(board, from, player)
                .into_iter()
                .map(move |to| Move::new(from, to))
        })
        .collect()
}

pub fn is_legal(board: &Board, mv: Move, player: Player) -> bool {
    legal_destinations(board, mv.from, player).contains(&mv.to)
}

pub fn has_legal_move(board: &Board, player: Player) -> bool {
    board
        .pieces(player)
        .any(|from| !legal_destinations(board, from, player).is_empty())
}
