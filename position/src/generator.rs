use rand::Rng;

use crate::{
    board::{BoardState, SIZE},
    piece::{Color, PieceKind},
};

pub const DEFAULT_MAX_MOVES: u32 = 20;

/// A piece on a display square: `file` 0 is the a-file, `rank` 0 is the first rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub kind: PieceKind,
    pub file: u8,
    pub rank: u8,
}

/// Flattens a board into placements, rank 8 first, files a..h within a rank.
pub fn placements(board: &BoardState) -> Vec<Placement> {
    board
        .occupied()
        .map(|(cell, kind)| Placement {
            kind,
            file: cell.file as u8,
            rank: (SIZE - 1 - cell.rank) as u8,
        })
        .collect()
}

/// Random walk of pseudo-legal moves away from the starting position.
pub struct RandomPositionGenerator {
    pub max_moves: u32,
}

impl Default for RandomPositionGenerator {
    fn default() -> Self {
        Self {
            max_moves: DEFAULT_MAX_MOVES,
        }
    }
}

impl RandomPositionGenerator {
    pub fn new(max_moves: u32) -> Self {
        Self { max_moves }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Placement> {
        placements(&self.generate_board(rng))
    }

    pub fn generate_board<R: Rng + ?Sized>(&self, rng: &mut R) -> BoardState {
        let num_moves = rng.random_range(0..=self.max_moves);
        Self::walk(num_moves, rng)
    }

    /// Plays `num_moves` random pseudo-legal moves, White first, then repairs missing kings.
    pub fn walk<R: Rng + ?Sized>(num_moves: u32, rng: &mut R) -> BoardState {
        let mut board = BoardState::starting();
        let mut mover = Color::White;
        for _ in 0..num_moves {
            let moves = board.pseudo_legal_moves(mover);
            if moves.is_empty() {
                break;
            }
            board.apply(moves[rng.random_range(0..moves.len())]);
            mover = mover.opposite();
        }
        board.ensure_kings();
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Role;
    use rand::{SeedableRng, rngs::SmallRng};
    use std::collections::HashSet;

    #[test]
    fn zero_moves_is_the_initial_setup() {
        let mut rng = SmallRng::seed_from_u64(1);
        let board = RandomPositionGenerator::walk(0, &mut rng);
        let placed = placements(&board);
        assert_eq!(placed.len(), 32);

        let at = |file, rank| placed.iter().find(|p| p.file == file && p.rank == rank);
        assert_eq!(at(0, 0).unwrap().kind, PieceKind::new(Color::White, Role::Rook));
        assert_eq!(at(4, 0).unwrap().kind, PieceKind::WHITE_KING);
        assert_eq!(at(3, 7).unwrap().kind, PieceKind::new(Color::Black, Role::Queen));
        assert_eq!(at(4, 7).unwrap().kind, PieceKind::BLACK_KING);
        assert_eq!(at(5, 1).unwrap().kind, PieceKind::new(Color::White, Role::Pawn));
        assert_eq!(at(5, 6).unwrap().kind, PieceKind::new(Color::Black, Role::Pawn));
        assert!(at(0, 3).is_none());
    }

    #[test]
    fn zero_bound_never_moves() {
        let generator = RandomPositionGenerator::new(0);
        let mut rng = SmallRng::seed_from_u64(9);
        assert_eq!(generator.generate_board(&mut rng), BoardState::starting());
    }

    #[test]
    fn generated_positions_hold_invariants() {
        let generator = RandomPositionGenerator::default();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..500 {
            let board = generator.generate_board(&mut rng);
            assert_eq!(board.count(PieceKind::WHITE_KING), 1);
            assert_eq!(board.count(PieceKind::BLACK_KING), 1);

            let placed = placements(&board);
            assert!(!placed.is_empty() && placed.len() <= 32);
            let mut seen = HashSet::new();
            for p in &placed {
                assert!(p.file < 8 && p.rank < 8);
                assert!(seen.insert((p.file, p.rank)), "duplicate cell {p:?}");
            }
        }
    }

    #[test]
    fn same_seed_same_position() {
        let generator = RandomPositionGenerator::default();
        let a = generator.generate(&mut SmallRng::seed_from_u64(7));
        let b = generator.generate(&mut SmallRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn long_walks_only_lose_pieces() {
        let mut rng = SmallRng::seed_from_u64(3);
        let board = RandomPositionGenerator::walk(200, &mut rng);
        assert!(board.occupied().count() <= 32);
        assert!(board.occupied().count() >= 2);
    }
}
