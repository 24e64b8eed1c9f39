//! Core game state for LLM-chess.
//!
//! Everything rules-related (legal move generation, check and mate
//! detection, FEN, SAN) is delegated to `shakmaty`; this crate wraps it in
//! an immutable-snapshot board type and an append-only move history so the
//! GUI and the AI opponent share one well-defined view of the game.

pub mod board;
pub mod game;

pub use board::*;
pub use game::*;

// Re-export the rule library's primitive types so downstream crates don't
// need a direct shakmaty dependency for squares and pieces.
pub use shakmaty::{Color, Piece, Role, Square};
