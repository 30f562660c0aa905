use crate::board::Board;
use crate::rules;
use crate::types::{Outcome, Player, WinReason};

/// Piece-count end check run after every committed move.
///
/// A side with no pieces loses. One piece each is scored as a draw; this is a
/// fixed simplification, not a stalemate search.
pub fn check_win(board: &Board) -> Option<Outcome> {
    let (red, black) = board.count();
    if red == 0 {
        Some(Outcome::Winner {
            player: Player::Black,
            reason: WinReason::Elimination,
        })
    } else if black == 0 {
        Some(Outcome::Winner {
            player: Player::Red,
            reason: WinReason::Elimination,
        })
    } else if red == 1 && black == 1 {
        Some(Outcome::Draw)
    } else {
        None
    }
}

/// Opt-in check: `to_move` still has pieces but cannot move.
pub fn check_stalemate(board: &Board, to_move: Player) -> Option<Outcome> {
    if board.count_for(to_move) == 0 || rules::has_legal_move(board, to_move) {
        return None;
    }
    Some(Outcome::Winner {
        player: to_move.other(),
        reason: WinReason::Stalemate,
    })
}
