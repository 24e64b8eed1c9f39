//! Immutable board snapshots backed by shakmaty.
//!
//! A [`BoardState`] is a value: applying a move produces a *new* snapshot
//! and never mutates the old one. The game loop swaps the current snapshot
//! atomically, so any concurrent reader (the assistant panel, an in-flight
//! AI resolution) always sees a fully applied position.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{
    CastlingMode, Chess, Color, EnPassantMode, File, Move, Piece, Position, Role, Square,
};
use thiserror::Error;

/// Errors from board and game operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// FEN string rejected by the rules library.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// Candidate move rejected by the rules library.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The game has already ended; no further moves are accepted.
    #[error("game is already over")]
    GameOver,
}

/// Terminal state of a game, as reported by the rules library
/// (plus the fifty-move and repetition draws tracked by [`crate::GameState`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawKind),
}

/// Why a drawn game is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    InsufficientMaterial,
    FiftyMove,
    Repetition,
}

/// A legal move in the current position, pre-rendered for display and for
/// membership checks against model output.
#[derive(Debug, Clone)]
pub struct LegalMove {
    /// Bare SAN, no check/mate suffix (e.g. "e4", "Nf3", "exd5", "O-O").
    pub san: String,
    pub uci: String,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    pub is_capture: bool,
}

/// Descriptor of a move that has just been applied.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    pub san: String,
    pub uci: String,
    pub from: Square,
    pub to: Square,
    pub role: Role,
    pub color: Color,
    pub is_capture: bool,
    pub promotion: Option<Role>,
}

/// An immutable chess position snapshot.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    position: Chess,
}

impl BoardState {
    /// The standard starting position.
    pub fn new() -> Self {
        Self {
            position: Chess::default(),
        }
    }

    /// Parse a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| GameError::InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| GameError::InvalidFen(format!("{e}")))?;
        Ok(Self { position })
    }

    /// Serialize the position to FEN.
    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.position.board().piece_at(sq)
    }

    /// Halfmove clock for the fifty-move rule.
    pub fn halfmove_clock(&self) -> u32 {
        self.position.halfmoves()
    }

    /// Position hash for repetition tracking.
    pub fn position_hash(&self) -> u64 {
        self.position
            .zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
            .0
    }

    /// Terminal status derivable from this snapshot alone. Repetition draws
    /// need move history and are layered on by `GameState`.
    pub fn status(&self) -> GameStatus {
        if self.position.is_checkmate() {
            // The side to move is the side that got mated.
            let winner = match self.position.turn() {
                Color::White => Color::Black,
                Color::Black => Color::White,
            };
            GameStatus::Checkmate { winner }
        } else if self.position.is_stalemate() {
            GameStatus::Stalemate
        } else if self.position.is_insufficient_material() {
            GameStatus::Draw(DrawKind::InsufficientMaterial)
        } else if self.position.halfmoves() >= 100 {
            GameStatus::Draw(DrawKind::FiftyMove)
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status() != GameStatus::InProgress
    }

    /// All legal moves in this position.
    pub fn legal_moves(&self) -> Vec<LegalMove> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| self.describe(m))
            .collect()
    }

    /// Bare SAN for every legal move. This is the list model output is
    /// validated against and the pool the random fallback draws from.
    pub fn legal_sans(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| San::from_move(&self.position, m).to_string())
            .collect()
    }

    /// Destination squares of legal moves starting on `from`
    /// (castling reported as the king's destination).
    pub fn legal_targets_from(&self, from: Square) -> Vec<Square> {
        self.position
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(from))
            .map(destination)
            .collect()
    }

    /// Apply a SAN token, returning the successor snapshot and a move
    /// descriptor. `self` is left untouched.
    pub fn play_san(&self, token: &str) -> Result<(Self, AppliedMove), GameError> {
        let san: San = token
            .parse()
            .map_err(|_| GameError::IllegalMove(token.to_string()))?;
        let m = san
            .to_move(&self.position)
            .map_err(|_| GameError::IllegalMove(token.to_string()))?;
        self.play(&m)
    }

    /// Apply a move given as source and destination squares. A pawn reaching
    /// the back rank promotes to `promotion`, defaulting to a queen.
    pub fn play_from_to(
        &self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<(Self, AppliedMove), GameError> {
        let choice = promotion.unwrap_or(Role::Queen);
        let moves = self.position.legal_moves();
        let m = moves
            .iter()
            .find(|&m| {
                m.from() == Some(from)
                    && destination(m) == to
                    && (m.promotion().is_none() || m.promotion() == Some(choice))
            })
            .ok_or_else(|| GameError::IllegalMove(format!("{from}{to}")))?;
        self.play(m)
    }

    fn play(&self, m: &Move) -> Result<(Self, AppliedMove), GameError> {
        if !self.position.is_legal(m) {
            return Err(GameError::IllegalMove(format!("{m:?}")));
        }
        let applied = self.describe_applied(m);
        let next = self
            .position
            .clone()
            .play(m)
            .map_err(|_| GameError::IllegalMove(applied.san.clone()))?;
        Ok((Self { position: next }, applied))
    }

    fn describe(&self, m: &Move) -> LegalMove {
        LegalMove {
            san: San::from_move(&self.position, m).to_string(),
            uci: m.to_uci(CastlingMode::Standard).to_string(),
            from: origin(m),
            to: destination(m),
            promotion: m.promotion(),
            is_capture: m.is_capture(),
        }
    }

    fn describe_applied(&self, m: &Move) -> AppliedMove {
        AppliedMove {
            san: San::from_move(&self.position, m).to_string(),
            uci: m.to_uci(CastlingMode::Standard).to_string(),
            from: origin(m),
            to: destination(m),
            role: m.role(),
            color: self.position.turn(),
            is_capture: m.is_capture(),
            promotion: m.promotion(),
        }
    }
}

/// Source square of a move. Castling is reported from the king's square.
fn origin(m: &Move) -> Square {
    match m {
        Move::Castle { king, .. } => *king,
        _ => m.from().unwrap_or(m.to()),
    }
}

/// Destination square of a move. shakmaty encodes castling as king-takes-rook;
/// report the square the king actually lands on instead.
fn destination(m: &Move) -> Square {
    match m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position() {
        let board = BoardState::new();
        assert_eq!(board.turn(), Color::White);
        assert!(!board.is_check());
        assert_eq!(board.status(), GameStatus::InProgress);
        assert_eq!(board.legal_moves().len(), 20);
    }

    #[test]
    fn snapshots_are_immutable() {
        let board = BoardState::new();
        let before = board.fen();
        let (next, applied) = board.play_san("e4").unwrap();
        assert_eq!(board.fen(), before);
        assert_eq!(applied.san, "e4");
        assert_eq!(next.turn(), Color::Black);
    }

    #[test]
    fn fen_round_trip() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let board = BoardState::from_fen(fen).unwrap();
        let reparsed = BoardState::from_fen(&board.fen()).unwrap();
        assert_eq!(reparsed.fen(), board.fen());
        assert_eq!(reparsed.turn(), Color::Black);
    }

    #[test]
    fn rejects_invalid_fen() {
        assert!(matches!(
            BoardState::from_fen("definitely not a fen"),
            Err(GameError::InvalidFen(_))
        ));
    }

    #[test]
    fn rejects_illegal_san() {
        let board = BoardState::new();
        assert!(matches!(
            board.play_san("e5"),
            Err(GameError::IllegalMove(_))
        ));
        assert!(matches!(
            board.play_san("Qh5"),
            Err(GameError::IllegalMove(_))
        ));
    }

    #[test]
    fn from_to_defaults_promotion_to_queen() {
        let board = BoardState::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let (_, applied) = board
            .play_from_to(Square::A7, Square::A8, None)
            .unwrap();
        assert_eq!(applied.san, "a8=Q");
        assert_eq!(applied.promotion, Some(Role::Queen));
    }

    #[test]
    fn from_to_honors_underpromotion() {
        let board = BoardState::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let (_, applied) = board
            .play_from_to(Square::A7, Square::A8, Some(Role::Knight))
            .unwrap();
        assert_eq!(applied.san, "a8=N");
    }

    #[test]
    fn castling_targets_use_king_destination() {
        let board =
            BoardState::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let targets = board.legal_targets_from(Square::E1);
        assert!(targets.contains(&Square::G1));
        assert!(targets.contains(&Square::C1));

        let (next, applied) = board
            .play_from_to(Square::E1, Square::G1, None)
            .unwrap();
        assert_eq!(applied.san, "O-O");
        assert_eq!(next.turn(), Color::Black);
    }

    #[test]
    fn legal_sans_carry_no_check_suffix() {
        // Qh5+ is available; the bare list must hold "Qh5".
        let board =
            BoardState::from_fen("rnbqkbnr/ppppp1pp/8/5p2/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let sans = board.legal_sans();
        assert!(sans.iter().any(|s| s == "Qh5"));
        assert!(!sans.iter().any(|s| s.contains('+')));
    }

    #[test]
    fn detects_checkmate() {
        // Scholar's mate, black to move and mated.
        let board = BoardState::from_fen(
            "r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4",
        )
        .unwrap();
        assert_eq!(
            board.status(),
            GameStatus::Checkmate {
                winner: Color::White
            }
        );
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn detects_stalemate() {
        let board = BoardState::from_fen("8/8/8/8/8/6q1/5k2/7K w - - 0 1").unwrap();
        assert_eq!(board.status(), GameStatus::Stalemate);
        assert!(board.legal_sans().is_empty());
    }

    #[test]
    fn detects_insufficient_material() {
        let board = BoardState::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            board.status(),
            GameStatus::Draw(DrawKind::InsufficientMaterial)
        );
    }

    #[test]
    fn detects_fifty_move_draw() {
        let board = BoardState::from_fen("r6k/8/8/8/8/8/8/R6K w - - 100 80").unwrap();
        assert_eq!(board.status(), GameStatus::Draw(DrawKind::FiftyMove));
    }

    #[test]
    fn en_passant_capture_is_legal() {
        let board =
            BoardState::from_fen("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3")
                .unwrap();
        let (_, applied) = board
            .play_from_to(Square::F5, Square::E6, None)
            .unwrap();
        assert!(applied.is_capture);
        assert_eq!(applied.san, "fxe6");
    }
}
