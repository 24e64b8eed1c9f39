//! Assistant view: free-form chat about the current game.
//!
//! The panel reads the live game state but never mutates it; API failures
//! show up as inline error bubbles instead of a fallback.

use game_core::{Color, GameState};
use iced::widget::{
    button, column, horizontal_rule, row, scrollable, text, text_input, vertical_space,
};
use iced::{Element, Length};
use llm_engine::AssistantExchange;

use crate::styles;

/// Canned questions offered above the input box.
pub const QUICK_QUESTIONS: [&str; 5] = [
    "What's the best move here?",
    "Analyze this position",
    "What's my opponent's plan?",
    "How can I improve my position?",
    "What are the tactical opportunities?",
];

/// Who wrote a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Model,
}

/// Raw request data behind a model reply, shown in the details view.
#[derive(Debug, Clone)]
pub struct ExchangeDetails {
    pub system_prompt: String,
    pub question: String,
    pub request: String,
}

/// One transcript entry.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub sender: Sender,
    pub text: String,
    pub is_error: bool,
    pub details: Option<ExchangeDetails>,
}

/// Assistant panel state
#[derive(Debug, Clone, Default)]
pub struct AssistantState {
    pub entries: Vec<ChatEntry>,
    pub input: String,
    pub loading: bool,
    pub show_details: bool,
}

impl AssistantState {
    pub fn push_question(&mut self, question: String) {
        self.entries.push(ChatEntry {
            sender: Sender::User,
            text: question,
            is_error: false,
            details: None,
        });
    }

    pub fn push_reply(&mut self, exchange: AssistantExchange) {
        self.entries.push(ChatEntry {
            sender: Sender::Model,
            text: exchange.reply,
            is_error: false,
            details: Some(ExchangeDetails {
                system_prompt: exchange.system_prompt,
                question: exchange.question,
                request: exchange.request,
            }),
        });
    }

    pub fn push_error(&mut self, message: String) {
        self.entries.push(ChatEntry {
            sender: Sender::Model,
            text: message,
            is_error: true,
            details: None,
        });
    }
}

/// Messages for the assistant view
#[derive(Debug, Clone)]
pub enum AssistantMessage {
    InputChanged(String),
    Send,
    Ask(String),
    ReplyReady(Result<AssistantExchange, String>),
    ToggleDetails,
}

/// Render the assistant view. `status` is the human-readable game status line.
pub fn assistant_view<'a>(
    state: &'a AssistantState,
    game: &'a GameState,
    status: &str,
) -> Element<'a, AssistantMessage> {
    let title = text("Ask the model").size(28);

    let details_button = if state.show_details {
        button(text("Hide details"))
            .on_press(AssistantMessage::ToggleDetails)
            .style(button::primary)
    } else {
        button(text("Show details"))
            .on_press(AssistantMessage::ToggleDetails)
            .style(button::secondary)
    };

    // Game state summary
    let turn = match game.board().turn() {
        Color::White => "White (You)",
        Color::Black => "Black (AI)",
    };
    let summary = column![
        row![
            text("Turn:").size(13).color(styles::MUTED_TEXT),
            text(turn).size(13),
            text("Status:").size(13).color(styles::MUTED_TEXT),
            text(status.to_string()).size(13),
        ]
        .spacing(8),
        row![
            text("Legal moves:").size(13).color(styles::MUTED_TEXT),
            text(game.board().legal_moves().len().to_string()).size(13),
            text("Moves made:").size(13).color(styles::MUTED_TEXT),
            text(game.ply().to_string()).size(13),
        ]
        .spacing(8),
        text(format!("FEN: {}", game.board().fen()))
            .size(12)
            .color(styles::ACCENT_TEXT),
        text(if game.ply() == 0 {
            "No moves yet".to_string()
        } else {
            game.sans().join(", ")
        })
        .size(12)
        .color(styles::MUTED_TEXT),
    ]
    .spacing(4);

    // Quick questions
    let mut quick_row = row![].spacing(6);
    for question in QUICK_QUESTIONS {
        quick_row = quick_row.push(
            button(text(question).size(12))
                .on_press(AssistantMessage::Ask(question.to_string()))
                .style(button::secondary),
        );
    }

    // Transcript
    let mut transcript = column![].spacing(8);
    if state.entries.is_empty() {
        transcript = transcript.push(
            text("Ask anything about the current position.")
                .size(14)
                .color(styles::MUTED_TEXT),
        );
    }
    for entry in &state.entries {
        transcript = transcript.push(render_entry(entry, state.show_details));
    }
    if state.loading {
        transcript = transcript.push(text("Thinking...").size(13).color(styles::MUTED_TEXT));
    }

    let transcript_scroll = scrollable(transcript).height(Length::Fill);

    // Input row
    let input = text_input("Ask about the position, strategy, or anything chess-related...", &state.input)
        .on_input(AssistantMessage::InputChanged)
        .on_submit(AssistantMessage::Send)
        .width(Length::Fill);

    let send_button = button(text("Send"))
        .on_press(AssistantMessage::Send)
        .style(button::primary);

    column![
        row![title, iced::widget::Space::with_width(Length::Fill), details_button].spacing(10),
        vertical_space().height(10),
        summary,
        vertical_space().height(10),
        quick_row,
        vertical_space().height(10),
        horizontal_rule(1),
        vertical_space().height(10),
        transcript_scroll,
        vertical_space().height(10),
        row![input, send_button].spacing(10),
    ]
    .spacing(5)
    .padding(20)
    .into()
}

fn render_entry(entry: &ChatEntry, show_details: bool) -> Element<'_, AssistantMessage> {
    let label = match entry.sender {
        Sender::User => text("You").size(12).color(styles::ACCENT_TEXT),
        Sender::Model => text("Model").size(12).color(styles::MUTED_TEXT),
    };

    let body = if entry.is_error {
        text(&entry.text).size(14).color(styles::ERROR_TEXT)
    } else {
        text(&entry.text).size(14)
    };

    let mut block = column![label, body].spacing(2);

    if show_details {
        if let Some(details) = &entry.details {
            block = block.push(
                column![
                    text("System prompt:").size(11).color(styles::MUTED_TEXT),
                    text(&details.system_prompt).size(11).color(styles::MUTED_TEXT),
                    text(format!("User message: {}", details.question))
                        .size(11)
                        .color(styles::MUTED_TEXT),
                    text("Request body:").size(11).color(styles::MUTED_TEXT),
                    text(&details.request).size(11).color(styles::MUTED_TEXT),
                ]
                .spacing(2),
            );
        }
    }

    block.into()
}
