//! Game state: current board snapshot plus the append-only move history.

use crate::board::{AppliedMove, BoardState, DrawKind, GameError, GameStatus};
use shakmaty::{Color, Role, Square};

/// Who produced a move.
#[derive(Debug, Clone)]
pub enum MoveOrigin {
    Human,
    Ai(AiMeta),
}

/// Diagnostics attached to an AI-originated move.
#[derive(Debug, Clone, Default)]
pub struct AiMeta {
    /// Raw model reply. `None` when the API call itself failed.
    pub raw_reply: Option<String>,
    /// True when the move was drawn at random instead of taken from the reply.
    pub fallback: bool,
    /// Why the reply was unusable. `None` on a pure API failure, which is a
    /// fallback without a parse verdict ("could not ask" vs "got nonsense").
    pub fallback_reason: Option<FallbackReason>,
    /// Pretty-printed outbound request, kept for display only.
    pub request: Option<String>,
}

/// Why a model reply could not be turned into a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The first reply line held nothing shaped like a move.
    NoMoveFound,
    /// A move-shaped token was found but is not in the legal set.
    NotLegalMove,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NoMoveFound => write!(f, "no-move-found"),
            FallbackReason::NotLegalMove => write!(f, "not-legal-move"),
        }
    }
}

/// One entry of the move history. Append-only; index = ply number.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub role: Role,
    pub color: Color,
    pub san: String,
    pub origin: MoveOrigin,
}

impl MoveRecord {
    pub fn is_ai(&self) -> bool {
        matches!(self.origin, MoveOrigin::Ai(_))
    }

    pub fn ai_meta(&self) -> Option<&AiMeta> {
        match &self.origin {
            MoveOrigin::Ai(meta) => Some(meta),
            MoveOrigin::Human => None,
        }
    }
}

/// A proposed move, before legality is known.
#[derive(Debug, Clone)]
pub enum MoveCandidate {
    /// An algebraic-notation token, e.g. "Nf3".
    San(String),
    /// Source and destination squares from board input.
    FromTo {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
}

/// The live game: current snapshot, history and derived status.
///
/// The record sequence is always a strict prefix of a legal game; a rejected
/// candidate changes nothing, and only [`GameState::reset`] ever removes
/// records.
#[derive(Debug, Clone)]
pub struct GameState {
    board: BoardState,
    moves: Vec<MoveRecord>,
    /// Position hashes since the start, for threefold repetition.
    position_history: Vec<u64>,
    status: GameStatus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::with_board(BoardState::new())
    }

    /// Start a game from an arbitrary position.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::with_board(BoardState::from_fen(fen)?))
    }

    fn with_board(board: BoardState) -> Self {
        let initial_hash = board.position_hash();
        let status = board.status();
        Self {
            board,
            moves: Vec::new(),
            position_history: vec![initial_hash],
            status,
        }
    }

    /// Current position snapshot.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// SAN tokens of the history, oldest first.
    pub fn sans(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.san.clone()).collect()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    /// Ply count (= history length).
    pub fn ply(&self) -> usize {
        self.moves.len()
    }

    /// Validate and apply a candidate move.
    ///
    /// On success the board snapshot is replaced, a record is appended and
    /// returned. On failure the state is exactly as before.
    pub fn apply(
        &mut self,
        candidate: MoveCandidate,
        origin: MoveOrigin,
    ) -> Result<&MoveRecord, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }

        let (next, applied) = match candidate {
            MoveCandidate::San(token) => self.board.play_san(&token)?,
            MoveCandidate::FromTo {
                from,
                to,
                promotion,
            } => self.board.play_from_to(from, to, promotion)?,
        };

        self.board = next;
        self.position_history.push(self.board.position_hash());
        self.moves.push(record_from(applied, origin));
        self.status = self.derive_status();

        Ok(self.moves.last().expect("record just appended"))
    }

    /// Reset to the starting position, clearing the history.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn derive_status(&self) -> GameStatus {
        let status = self.board.status();
        if status != GameStatus::InProgress {
            return status;
        }
        if self.is_threefold_repetition() {
            return GameStatus::Draw(DrawKind::Repetition);
        }
        GameStatus::InProgress
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = self.board.position_hash();
        self.position_history
            .iter()
            .filter(|&&h| h == current)
            .count()
            >= 3
    }
}

fn record_from(applied: AppliedMove, origin: MoveOrigin) -> MoveRecord {
    MoveRecord {
        from: applied.from,
        to: applied.to,
        role: applied.role,
        color: applied.color,
        san: applied.san,
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_move_appends_record() {
        let mut game = GameState::new();
        let record = game
            .apply(MoveCandidate::San("e4".into()), MoveOrigin::Human)
            .unwrap();
        assert_eq!(record.san, "e4");
        assert_eq!(record.color, Color::White);
        assert!(!record.is_ai());
        assert_eq!(game.ply(), 1);
        assert_eq!(game.board().turn(), Color::Black);
    }

    #[test]
    fn rejected_candidate_leaves_state_unchanged() {
        let mut game = GameState::new();
        let fen_before = game.board().fen();

        let result = game.apply(MoveCandidate::San("Qh5".into()), MoveOrigin::Human);
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
        assert_eq!(game.board().fen(), fen_before);
        assert_eq!(game.ply(), 0);

        let result = game.apply(
            MoveCandidate::FromTo {
                from: Square::E2,
                to: Square::E5,
                promotion: None,
            },
            MoveOrigin::Human,
        );
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
        assert_eq!(game.board().fen(), fen_before);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn ai_record_carries_metadata() {
        let mut game = GameState::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        let meta = AiMeta {
            raw_reply: Some("e5\n\nA classical reply.".into()),
            fallback: false,
            fallback_reason: None,
            request: None,
        };
        let record = game
            .apply(MoveCandidate::San("e5".into()), MoveOrigin::Ai(meta))
            .unwrap();
        assert!(record.is_ai());
        let meta = record.ai_meta().unwrap();
        assert!(!meta.fallback);
        assert_eq!(meta.raw_reply.as_deref(), Some("e5\n\nA classical reply."));
    }

    #[test]
    fn one_ai_move_from_black_to_move_position() {
        // After the AI's single reply the history holds exactly one record
        // and White is to move again.
        let mut game = GameState::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        game.apply(
            MoveCandidate::San("Nf6".into()),
            MoveOrigin::Ai(AiMeta::default()),
        )
        .unwrap();
        assert_eq!(game.ply(), 1);
        assert_eq!(game.board().turn(), Color::White);
    }

    #[test]
    fn reset_clears_history_and_position() {
        let mut game = GameState::new();
        game.apply(MoveCandidate::San("e4".into()), MoveOrigin::Human)
            .unwrap();
        game.apply(
            MoveCandidate::San("e5".into()),
            MoveOrigin::Ai(AiMeta::default()),
        )
        .unwrap();
        assert_eq!(game.ply(), 2);

        game.reset();
        assert_eq!(game.ply(), 0);
        assert_eq!(game.board().fen(), BoardState::new().fen());
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn no_moves_accepted_after_checkmate() {
        let mut game = GameState::new();
        for san in ["f3", "e5", "g4", "Qh4"] {
            game.apply(MoveCandidate::San(san.into()), MoveOrigin::Human)
                .unwrap();
        }
        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        let result = game.apply(MoveCandidate::San("a3".into()), MoveOrigin::Human);
        assert!(matches!(result, Err(GameError::GameOver)));
        assert_eq!(game.ply(), 4);
    }

    #[test]
    fn threefold_repetition_is_a_draw() {
        let mut game = GameState::new();
        // Shuffle knights back and forth until the start position repeats.
        for san in [
            "Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8",
        ] {
            game.apply(MoveCandidate::San(san.into()), MoveOrigin::Human)
                .unwrap();
        }
        assert_eq!(game.status(), GameStatus::Draw(DrawKind::Repetition));
    }

    #[test]
    fn applier_accepts_exactly_the_legal_set() {
        let game = GameState::new();
        for legal in game.board().legal_sans() {
            let mut copy = game.clone();
            assert!(
                copy.apply(MoveCandidate::San(legal.clone()), MoveOrigin::Human)
                    .is_ok(),
                "legal move {legal} was rejected"
            );
        }
        let mut copy = game.clone();
        assert!(copy
            .apply(MoveCandidate::San("Ke2".into()), MoveOrigin::Human)
            .is_err());
    }
}
