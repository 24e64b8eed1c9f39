//! Styling constants and theme configuration

use game_core::{Color as PieceColor, Role};
use iced::Color;

// Board colors
pub const LIGHT_SQUARE: Color = Color::from_rgb(0.94, 0.85, 0.71); // Wheat
pub const DARK_SQUARE: Color = Color::from_rgb(0.71, 0.53, 0.39); // Sienna
pub const SELECTED_SQUARE: Color = Color::from_rgb(0.68, 0.85, 0.37); // Yellow-green
pub const LAST_MOVE_SQUARE: Color = Color::from_rgba(0.9, 0.9, 0.0, 0.4); // Yellow overlay

// Text colors
pub const MUTED_TEXT: Color = Color::from_rgb(0.6, 0.6, 0.6);
pub const ERROR_TEXT: Color = Color::from_rgb(0.9, 0.35, 0.35);
pub const ACCENT_TEXT: Color = Color::from_rgb(0.45, 0.7, 1.0);

// Dimensions
pub const SQUARE_SIZE: f32 = 70.0;
pub const PANEL_WIDTH: f32 = 340.0;

/// Unicode glyph for a piece.
pub fn piece_char(color: PieceColor, role: Role) -> &'static str {
    match (color, role) {
        (PieceColor::White, Role::King) => "♔",
        (PieceColor::White, Role::Queen) => "♕",
        (PieceColor::White, Role::Rook) => "♖",
        (PieceColor::White, Role::Bishop) => "♗",
        (PieceColor::White, Role::Knight) => "♘",
        (PieceColor::White, Role::Pawn) => "♙",
        (PieceColor::Black, Role::King) => "♚",
        (PieceColor::Black, Role::Queen) => "♛",
        (PieceColor::Black, Role::Rook) => "♜",
        (PieceColor::Black, Role::Bishop) => "♝",
        (PieceColor::Black, Role::Knight) => "♞",
        (PieceColor::Black, Role::Pawn) => "♟",
    }
}
