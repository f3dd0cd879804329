use std::fmt;

use crate::PositionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::White => "White",
        }
    }
}

/// Piece role, ordered alphabetically so that class ids follow the label table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Bishop,
    King,
    Knight,
    Pawn,
    Queen,
    Rook,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Bishop,
        Role::King,
        Role::Knight,
        Role::Pawn,
        Role::Queen,
        Role::Rook,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Bishop => "bishop",
            Role::King => "king",
            Role::Knight => "knight",
            Role::Pawn => "pawn",
            Role::Queen => "queen",
            Role::Rook => "rook",
        }
    }

    /// Lowercase FEN letter.
    pub fn letter(self) -> char {
        match self {
            Role::Bishop => 'b',
            Role::King => 'k',
            Role::Knight => 'n',
            Role::Pawn => 'p',
            Role::Queen => 'q',
            Role::Rook => 'r',
        }
    }

    /// Proxy height relative to a square-sized base, per role.
    pub fn height_multiplier(self) -> f32 {
        match self {
            Role::King => 1.6,
            Role::Queen => 1.5,
            Role::Rook => 1.2,
            Role::Bishop => 1.4,
            Role::Knight => 1.1,
            Role::Pawn => 0.8,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|r| r.name() == name)
    }
}

/// One of the twelve colored chess pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceKind {
    pub color: Color,
    pub role: Role,
}

impl PieceKind {
    pub const COUNT: usize = 12;

    pub const WHITE_KING: PieceKind = PieceKind::new(Color::White, Role::King);
    pub const BLACK_KING: PieceKind = PieceKind::new(Color::Black, Role::King);

    pub const fn new(color: Color, role: Role) -> Self {
        Self { color, role }
    }

    /// All kinds in class-id order.
    pub fn all() -> impl Iterator<Item = PieceKind> {
        [Color::Black, Color::White]
            .into_iter()
            .flat_map(|c| Role::ALL.into_iter().map(move |r| PieceKind::new(c, r)))
    }

    /// Detector class id: Black bishop..rook are 0..=5, White bishop..rook are 6..=11.
    pub fn class_id(self) -> u8 {
        let base = match self.color {
            Color::Black => 0,
            Color::White => 6,
        };
        base + self.role as u8
    }

    pub fn from_class_id(id: u8) -> Option<Self> {
        PieceKind::all().nth(id as usize)
    }

    pub fn is_king(self) -> bool {
        self.role == Role::King
    }

    /// FEN character: uppercase for White.
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.role.letter().to_ascii_uppercase(),
            Color::Black => self.role.letter(),
        }
    }

    pub fn from_fen_char(ch: char) -> Result<Self, PositionError> {
        let role = Role::ALL
            .into_iter()
            .find(|r| r.letter() == ch.to_ascii_lowercase())
            .ok_or(PositionError::UnknownPieceChar(ch))?;
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self::new(color, role))
    }

    /// Parses display names such as `"White king"`.
    pub fn from_name(name: &str) -> Result<Self, PositionError> {
        let unknown = || PositionError::UnknownPieceName(name.to_string());
        let (color, role) = name.trim().split_once(' ').ok_or_else(unknown)?;
        let color = match color {
            "Black" => Color::Black,
            "White" => Color::White,
            _ => return Err(unknown()),
        };
        let role = Role::from_name(role.trim()).ok_or_else(unknown)?;
        Ok(Self::new(color, role))
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color.name(), self.role.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_table_matches_label_convention() {
        let expected = [
            ("Black bishop", 0),
            ("Black king", 1),
            ("Black knight", 2),
            ("Black pawn", 3),
            ("Black queen", 4),
            ("Black rook", 5),
            ("White bishop", 6),
            ("White king", 7),
            ("White knight", 8),
            ("White pawn", 9),
            ("White queen", 10),
            ("White rook", 11),
        ];
        for (name, id) in expected {
            let kind = PieceKind::from_name(name).unwrap();
            assert_eq!(kind.class_id(), id, "{name}");
            assert_eq!(kind.to_string(), name);
            assert_eq!(PieceKind::from_class_id(id), Some(kind));
        }
        assert_eq!(PieceKind::all().count(), PieceKind::COUNT);
        assert_eq!(PieceKind::from_class_id(12), None);
    }

    #[test]
    fn unknown_names_are_rejected() {
        for name in ["Board", "Red king", "White dragon", "White", ""] {
            assert!(matches!(
                PieceKind::from_name(name),
                Err(PositionError::UnknownPieceName(_))
            ));
        }
    }

    #[test]
    fn fen_chars() {
        assert_eq!(PieceKind::from_fen_char('K').unwrap(), PieceKind::WHITE_KING);
        assert_eq!(PieceKind::from_fen_char('k').unwrap(), PieceKind::BLACK_KING);
        assert_eq!(
            PieceKind::from_fen_char('n').unwrap(),
            PieceKind::new(Color::Black, Role::Knight)
        );
        assert_eq!(PieceKind::new(Color::White, Role::Queen).fen_char(), 'Q');
        assert!(PieceKind::from_fen_char('x').is_err());
    }
}
