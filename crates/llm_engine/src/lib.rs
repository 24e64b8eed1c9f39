//! Chat-model opponent for LLM-chess.
//!
//! The model plays Black over a chat-completion API: we send the move
//! history, ask for a move in algebraic notation on the first reply line,
//! and validate the extracted token against the legal-move list. Anything
//! that goes wrong — transport failure, no token, illegal suggestion —
//! degrades to a uniformly random legal move, so a legal move is always
//! played whenever one exists.
//!
//! The same client backs the assistant panel, which forwards free-form
//! questions about the position without any validation or fallback.

mod assistant;
mod client;
mod extract;
mod prompt;
mod resolver;


pub use assistant::{ask, AssistantExchange, GameSnapshot};
pub use client::{ApiError, ChatClient, ChatMessage, ChatRequest};
pub use extract::extract_move_token;
pub use prompt::{format_move_history, move_system_prompt, move_user_prompt};
pub use resolver::{request_move, resolve_outcome, select_reply_move, MoveResolution};
