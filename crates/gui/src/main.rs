//! LLM-chess GUI Application
//!
//! A graphical interface for:
//! - Playing White against a chat-model opponent
//! - Asking the model free-form questions about the position
//! - Inspecting the raw prompts and replies behind every AI move

mod app;
mod assistant_view;
mod board;
mod settings_view;
mod styles;

use app::ChessApp;
use iced::application;

fn main() -> iced::Result {
    env_logger::init();

    application("LLM Chess", ChessApp::update, ChessApp::view)
        .subscription(ChessApp::subscription)
        .theme(ChessApp::theme)
        .window_size((1200.0, 800.0))
        .run_with(ChessApp::new)
}
