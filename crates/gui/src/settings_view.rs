//! Settings view: API key and model selection.
//!
//! Both values live in memory only and are never persisted. Play against
//! the AI stays disabled until a key is entered.

use iced::widget::{button, column, pick_list, row, text, text_input, vertical_space};
use iced::{Element, Length};

use crate::styles;

/// Chat models offered in the picker.
const MODELS: [&str; 8] = [
    "gpt-4.1-nano",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-16k",
    "gpt-4",
    "gpt-4-turbo",
    "gpt-4-turbo-preview",
    "gpt-4o",
    "gpt-4o-mini",
];

/// Settings state: held in memory for the session, nothing persisted.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub api_key: String,
    pub model: String,
    pub show_key: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsState {
    pub fn new() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4.1-nano".to_string(),
            show_key: false,
        }
    }

    /// AI play is allowed once a key is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Messages for the settings view
#[derive(Debug, Clone)]
pub enum SettingsMessage {
    ApiKeyChanged(String),
    ModelChanged(String),
    ToggleShowKey,
}

/// Render the settings view
pub fn settings_view(state: &SettingsState) -> Element<'_, SettingsMessage> {
    let title = text("Settings").size(28);

    let key_input = text_input("sk-...", &state.api_key)
        .on_input(SettingsMessage::ApiKeyChanged)
        .secure(!state.show_key)
        .width(Length::Fixed(380.0));

    let show_key_button = if state.show_key {
        button(text("Hide"))
            .on_press(SettingsMessage::ToggleShowKey)
            .style(button::secondary)
    } else {
        button(text("Show"))
            .on_press(SettingsMessage::ToggleShowKey)
            .style(button::secondary)
    };

    let key_row = row![key_input, show_key_button].spacing(10);

    let models: Vec<String> = MODELS.iter().map(|m| m.to_string()).collect();
    let model_picker = pick_list(
        models,
        Some(state.model.clone()),
        SettingsMessage::ModelChanged,
    )
    .width(Length::Fixed(250.0));

    let key_hint = text("Your API key is kept in memory and never written to disk.")
        .size(12)
        .color(styles::MUTED_TEXT);

    let model_hint = text("The model that will play Black against you.")
        .size(12)
        .color(styles::MUTED_TEXT);

    let status = if state.has_api_key() {
        text("Ready to play.").size(14)
    } else {
        text("Enter an API key to enable the AI opponent.")
            .size(14)
            .color(styles::ERROR_TEXT)
    };

    column![
        title,
        vertical_space().height(20),
        text("OpenAI API Key").size(14),
        key_row,
        key_hint,
        vertical_space().height(15),
        text("Model").size(14),
        model_picker,
        model_hint,
        vertical_space().height(20),
        status,
    ]
    .spacing(5)
    .padding(20)
    .into()
}
