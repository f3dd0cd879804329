use std::fmt;

use crate::{
    PositionError,
    piece::{Color, PieceKind, Role},
};

pub const SIZE: usize = 8;
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const BACK_RANK: [Role; SIZE] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

/// Cell index in FEN order: `rank` 0 is the eighth rank (top of the diagram).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub rank: usize,
    pub file: usize,
}

impl Cell {
    pub const fn new(rank: usize, file: usize) -> Self {
        Self { rank, file }
    }

    pub fn iter() -> impl Iterator<Item = Cell> {
        (0..SIZE).flat_map(|rank| (0..SIZE).map(move |file| Cell::new(rank, file)))
    }
}

/// Home cell of the White king (e1).
pub const WHITE_KING_HOME: Cell = Cell::new(7, 4);
/// Home cell of the Black king (e8).
pub const BLACK_KING_HOME: Cell = Cell::new(0, 4);

/// A piece moved from one cell to another; the destination's occupant is captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Cell,
    pub to: Cell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardState {
    pub(crate) grid: [[Option<PieceKind>; SIZE]; SIZE],
}

impl Default for BoardState {
    fn default() -> Self {
        Self::starting()
    }
}

impl BoardState {
    pub fn empty() -> Self {
        Self {
            grid: [[None; SIZE]; SIZE],
        }
    }

    pub fn starting() -> Self {
        let mut board = Self::empty();
        for (file, role) in BACK_RANK.into_iter().enumerate() {
            board.grid[0][file] = Some(PieceKind::new(Color::Black, role));
            board.grid[1][file] = Some(PieceKind::new(Color::Black, Role::Pawn));
            board.grid[6][file] = Some(PieceKind::new(Color::White, Role::Pawn));
            board.grid[7][file] = Some(PieceKind::new(Color::White, role));
        }
        board
    }

    /// Parses the piece-placement field of a FEN record (the part before the first space).
    pub fn from_fen_placement(fen: &str) -> Result<Self, PositionError> {
        let field = fen.split_whitespace().next().unwrap_or_default();
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != SIZE {
            return Err(PositionError::BadRankCount(ranks.len()));
        }

        let mut board = Self::empty();
        for (rank, text) in ranks.into_iter().enumerate() {
            let mut file = 0;
            for ch in text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                } else {
                    let kind = PieceKind::from_fen_char(ch)?;
                    if file < SIZE {
                        board.grid[rank][file] = Some(kind);
                    }
                    file += 1;
                }
            }
            if file != SIZE {
                return Err(PositionError::BadRankWidth { rank, width: file });
            }
        }
        Ok(board)
    }

    pub fn to_fen_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (rank, row) in self.grid.iter().enumerate() {
            if rank > 0 {
                out.push('/');
            }
            let mut gap = 0;
            for cell in row {
                match cell {
                    Some(kind) => {
                        if gap > 0 {
                            out.push_str(&gap.to_string());
                            gap = 0;
                        }
                        out.push(kind.fen_char());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push_str(&gap.to_string());
            }
        }
        out
    }

    pub fn get(&self, cell: Cell) -> Option<PieceKind> {
        self.grid[cell.rank][cell.file]
    }

    pub fn set(&mut self, cell: Cell, piece: Option<PieceKind>) {
        self.grid[cell.rank][cell.file] = piece;
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Cell, PieceKind)> + '_ {
        Cell::iter().filter_map(|cell| self.get(cell).map(|kind| (cell, kind)))
    }

    pub fn count(&self, kind: PieceKind) -> usize {
        self.occupied().filter(|(_, k)| *k == kind).count()
    }

    pub fn contains(&self, kind: PieceKind) -> bool {
        self.occupied().any(|(_, k)| k == kind)
    }

    /// Every relocation of a `color` piece that does not land on its own color or on a king.
    ///
    /// Piece movement geometry is ignored on purpose: any cell is reachable.
    pub fn pseudo_legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, piece) in self.occupied() {
            if piece.color != color {
                continue;
            }
            for to in Cell::iter() {
                match self.get(to) {
                    Some(target) if target.color == color || target.is_king() => continue,
                    _ => moves.push(Move { from, to }),
                }
            }
        }
        moves
    }

    /// Moves the piece, returning whatever it captured.
    pub fn apply(&mut self, mv: Move) -> Option<PieceKind> {
        let piece = self.grid[mv.from.rank][mv.from.file].take();
        std::mem::replace(&mut self.grid[mv.to.rank][mv.to.file], piece)
    }

    /// Puts a missing king back on its home cell, overwriting that cell.
    ///
    /// Kings that are present are left where they are, wherever that is.
    pub fn ensure_kings(&mut self) {
        if !self.contains(PieceKind::WHITE_KING) {
            self.set(WHITE_KING_HOME, Some(PieceKind::WHITE_KING));
        }
        if !self.contains(PieceKind::BLACK_KING) {
            self.set(BLACK_KING_HOME, Some(PieceKind::BLACK_KING));
        }
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            for cell in row {
                write!(f, "{} ", cell.map_or('.', PieceKind::fen_char))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_layout() {
        let board = BoardState::starting();
        assert_eq!(board.occupied().count(), 32);
        assert_eq!(board.get(WHITE_KING_HOME), Some(PieceKind::WHITE_KING));
        assert_eq!(board.get(BLACK_KING_HOME), Some(PieceKind::BLACK_KING));
        assert_eq!(
            board.get(Cell::new(7, 0)),
            Some(PieceKind::new(Color::White, Role::Rook))
        );
        assert_eq!(board.to_fen_placement(), START_PLACEMENT);
        assert_eq!(BoardState::from_fen_placement(START_PLACEMENT).unwrap(), board);
    }

    #[test]
    fn fen_errors() {
        assert!(matches!(
            BoardState::from_fen_placement("8/8/8"),
            Err(PositionError::BadRankCount(3))
        ));
        assert!(matches!(
            BoardState::from_fen_placement("9/8/8/8/8/8/8/8"),
            Err(PositionError::BadRankWidth { rank: 0, width: 9 })
        ));
        assert!(matches!(
            BoardState::from_fen_placement("7x/8/8/8/8/8/8/8"),
            Err(PositionError::UnknownPieceChar('x'))
        ));
    }

    #[test]
    fn fen_with_extra_fields() {
        let board =
            BoardState::from_fen_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert_eq!(board, BoardState::starting());
    }

    #[test]
    fn start_position_move_count() {
        // 16 pieces, 48 targets each: 32 empty cells + 16 enemy pieces minus the enemy king.
        let board = BoardState::starting();
        assert_eq!(board.pseudo_legal_moves(Color::White).len(), 16 * 47);
        assert_eq!(board.pseudo_legal_moves(Color::Black).len(), 16 * 47);
    }

    #[test]
    fn kings_are_never_targets() {
        let board = BoardState::from_fen_placement("4k3/8/8/8/8/8/8/4K3").unwrap();
        let moves = board.pseudo_legal_moves(Color::White);
        assert_eq!(moves.len(), 62);
        assert!(moves.iter().all(|m| m.to != BLACK_KING_HOME));
    }

    #[test]
    fn apply_captures() {
        let mut board = BoardState::starting();
        let captured = board.apply(Move {
            from: Cell::new(7, 0),
            to: Cell::new(1, 0),
        });
        assert_eq!(captured, Some(PieceKind::new(Color::Black, Role::Pawn)));
        assert_eq!(board.get(Cell::new(7, 0)), None);
        assert_eq!(board.occupied().count(), 31);
    }

    #[test]
    fn ensure_kings_restores_home_cells() {
        let mut board = BoardState::from_fen_placement("4q3/8/8/8/8/8/8/8").unwrap();
        board.ensure_kings();
        assert_eq!(board.get(BLACK_KING_HOME), Some(PieceKind::BLACK_KING));
        assert_eq!(board.get(WHITE_KING_HOME), Some(PieceKind::WHITE_KING));
        assert_eq!(board.occupied().count(), 2);
    }

    #[test]
    fn ensure_kings_keeps_relocated_king() {
        let mut board = BoardState::from_fen_placement("8/8/3k4/8/8/8/8/8").unwrap();
        board.ensure_kings();
        assert_eq!(board.count(PieceKind::BLACK_KING), 1);
        assert_eq!(board.get(Cell::new(2, 3)), Some(PieceKind::BLACK_KING));
        assert_eq!(board.get(BLACK_KING_HOME), None);
        assert_eq!(board.count(PieceKind::WHITE_KING), 1);
    }
}
