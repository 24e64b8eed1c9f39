//! Free-form analysis chat about the current game.
//!
//! Unlike the move resolver there is no validation and no fallback: the
//! reply is shown as-is and an [`ApiError`] surfaces directly to the panel.

use crate::client::{ApiError, ChatClient, ChatMessage};
use crate::prompt;

const ASSISTANT_MAX_TOKENS: u32 = 1000;
const ASSISTANT_TEMPERATURE: f32 = 0.7;

/// Read-only view of the game the assistant reasons about.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub fen: String,
    /// "White" or "Black".
    pub turn: String,
    /// Human-readable status line ("Normal", "Check", "Checkmate", ...).
    pub status: String,
    /// SAN history, oldest first.
    pub history: Vec<String>,
}

/// One completed question/answer round, with the raw request kept for the
/// details view.
#[derive(Debug, Clone)]
pub struct AssistantExchange {
    pub question: String,
    pub reply: String,
    pub system_prompt: String,
    /// Pretty-printed outbound request body.
    pub request: String,
}

/// Send a question about the position and return the exchange.
pub async fn ask(
    client: &ChatClient,
    snapshot: &GameSnapshot,
    question: &str,
) -> Result<AssistantExchange, ApiError> {
    let system_prompt = prompt::assistant_system_prompt(
        &snapshot.fen,
        &snapshot.turn,
        &snapshot.status,
        &snapshot.history,
    );

    let messages = vec![
        ChatMessage::system(system_prompt.clone()),
        ChatMessage::user(question),
    ];
    let request = client.chat_request(messages, ASSISTANT_MAX_TOKENS, ASSISTANT_TEMPERATURE);
    let echo = serde_json::to_string_pretty(&request).unwrap_or_default();

    let reply = client.send(&request).await?;

    Ok(AssistantExchange {
        question: question.to_string(),
        reply,
        system_prompt,
        request: echo,
    })
}
