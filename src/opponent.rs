use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::Board;
use crate::rules;
use crate::types::{Move, Player};

/// Chooses the computer's move. `None` means there is nothing to play.
pub trait MoveSelector: Send + Sync {
    fn select_move(&mut self, board: &Board, player: Player) -> Option<Move>;

    fn name(&self) -> &str;
}

/// Plays the first legal move in row-major order. Deterministic; used where a
/// predictable opponent is wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        rules::legal_moves(board, player).into_iter().next()
    }

    fn name(&self) -> &str {
        "FirstLegal"
    }
}

/// Picks uniformly among every legal move of every piece.
#[derive(Debug)]
pub struct RandomMoveSelector {
    rng: StdRng,
}

impl RandomMoveSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMoveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelector for RandomMoveSelector {
    fn select_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        let moves = rules::legal_moves(board, player);
        if moves.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..moves.len());
        Some(moves[idx])
    }

    fn name(&self) -> &str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::{Cell, Position};

    #[test]
    fn random_selector_only_picks_legal_moves() {
        let mut selector = RandomMoveSelector::with_seed(7);
        let board = Board::new();
        let legal = rules::legal_moves(&board, Player::Black);

        for _ in 0..100 {
            let mv = selector.select_move(&board, Player::Black).unwrap();
            assert!(legal.contains(&mv), "move {mv} is not legal");
        }
    }

    #[test]
    fn random_selector_covers_every_candidate() {
        let mut selector = RandomMoveSelector::with_seed(42);
        let board = Board::new();
        let seen: HashSet<Move> = (0..500)
            .filter_map(|_| selector.select_move(&board, Player::Black))
            .collect();

        assert_eq!(seen.len(), rules::legal_moves(&board, Player::Black).len());
    }

    #[test]
    fn same_seed_same_choices() {
        let board = Board::new();
        let mut a = RandomMoveSelector::with_seed(3);
        let mut b = RandomMoveSelector::with_seed(3);
        for _ in 0..20 {
            assert_eq!(
                a.select_move(&board, Player::Black),
                b.select_move(&board, Player::Black)
            );
        }
    }

    #[test]
    fn no_candidates_yields_none() {
        let mut board = Board::empty();
        board.set(Position { row: 7, col: 0 }, Cell::Black);

        assert_eq!(
            RandomMoveSelector::with_seed(1).select_move(&board, Player::Black),
            None
        );
        assert_eq!(FirstLegalMoveSelector.select_move(&board, Player::Black), None);
    }

    #[test]
    fn first_legal_is_row_major() {
        let board = Board::new();
        let mv = FirstLegalMoveSelector
            .select_move(&board, Player::Black)
            .unwrap();
        assert_eq!(mv.from, Position { row: 2, col: 1 });
        assert_eq!(mv.to, Position { row: 3, col: 0 });
    }
}
