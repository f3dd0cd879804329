pub mod board;
pub mod generator;
pub mod piece;

pub use board::{BoardState, Cell, Move};
pub use generator::{Placement, RandomPositionGenerator};
pub use piece::{Color, PieceKind, Role};

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("unknown piece name: '{0}'")]
    UnknownPieceName(String),
    #[error("unknown piece character: '{0}'")]
    UnknownPieceChar(char),
    #[error("expected 8 ranks separated by '/', got {0}")]
    BadRankCount(usize),
    #[error("rank {rank} spans {width} files instead of 8")]
    BadRankWidth { rank: usize, width: usize },
}
