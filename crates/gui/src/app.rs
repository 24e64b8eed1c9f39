//! Main application state and logic

use crate::assistant_view::{self, AssistantMessage, AssistantState};
use crate::board::{BoardMessage, BoardView};
use crate::settings_view::{self, SettingsMessage, SettingsState};
use crate::styles::{self, PANEL_WIDTH};

use game_core::{
    Color, GameState, GameStatus, MoveCandidate, MoveOrigin, MoveRecord, Square,
};
use iced::widget::{
    button, column, container, horizontal_rule, row, scrollable, text, vertical_space,
};
use iced::{Element, Length, Subscription, Task, Theme};
use llm_engine::{ask, ChatClient, GameSnapshot, MoveResolution};
use std::collections::HashSet;
use std::time::Duration;

/// Application tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Play,
    Assistant,
    Settings,
}

/// Main application state
pub struct ChessApp {
    /// Current tab
    tab: Tab,
    /// Game state
    game: GameState,
    /// Board flipped?
    board_flipped: bool,
    /// Square selected for move input
    selected: Option<Square>,
    /// Destinations of legal moves from the selected square
    legal_targets: HashSet<Square>,
    /// Play against the model?
    ai_enabled: bool,
    /// One resolution at a time. This flag, not the turn color, is the
    /// source of truth for re-entrancy.
    ai_task_running: bool,
    /// History indices with their AI explanation expanded
    expanded_moves: HashSet<usize>,
    /// Assistant panel state
    assistant: AssistantState,
    /// Settings (API key, model)
    settings: SettingsState,
}

/// Application messages
#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    TabSelected(Tab),

    // Board interaction
    Board(BoardMessage),

    // Game controls
    NewGame,
    FlipBoard,
    ToggleAi,
    ToggleMoveDetails(usize),

    // AI opponent
    AiMoveResolved(Option<MoveResolution>),

    // Panels
    Assistant(AssistantMessage),
    Settings(SettingsMessage),
}

impl ChessApp {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                tab: Tab::Play,
                game: GameState::new(),
                board_flipped: false,
                selected: None,
                legal_targets: HashSet::new(),
                ai_enabled: true,
                ai_task_running: false,
                expanded_moves: HashSet::new(),
                assistant: AssistantState::default(),
                settings: SettingsState::new(),
            },
            Task::none(),
        )
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::none()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.tab = tab;
                Task::none()
            }

            Message::Board(BoardMessage::SquareClicked(sq)) => {
                // White is the only human side; input is ignored while the
                // model is thinking or once the game has ended.
                if self.game.board().turn() == Color::White
                    && !self.game.is_over()
                    && !self.ai_task_running
                {
                    return self.handle_square_click(sq);
                }
                Task::none()
            }

            Message::NewGame => {
                // An in-flight resolution is allowed to finish; its target
                // FEN will no longer match and it gets discarded on arrival.
                self.game.reset();
                self.selected = None;
                self.legal_targets.clear();
                self.expanded_moves.clear();
                self.maybe_request_ai_move()
            }

            Message::FlipBoard => {
                self.board_flipped = !self.board_flipped;
                Task::none()
            }

            Message::ToggleAi => {
                self.ai_enabled = !self.ai_enabled;
                self.maybe_request_ai_move()
            }

            Message::ToggleMoveDetails(idx) => {
                if !self.expanded_moves.remove(&idx) {
                    self.expanded_moves.insert(idx);
                }
                Task::none()
            }

            Message::AiMoveResolved(resolution) => {
                self.ai_task_running = false;

                if let Some(MoveResolution {
                    san,
                    target_fen,
                    meta,
                }) = resolution
                {
                    if target_fen == self.game.board().fen() {
                        if let Err(err) = self
                            .game
                            .apply(MoveCandidate::San(san), MoveOrigin::Ai(meta))
                        {
                            log::error!("resolved AI move was rejected: {err}");
                        }
                    } else {
                        log::info!("discarding stale AI resolution for {target_fen}");
                    }
                }
                // Covers the reset-while-thinking case, where Black may be
                // to move again without a resolution outstanding.
                self.maybe_request_ai_move()
            }

            Message::Assistant(msg) => self.handle_assistant_message(msg),

            Message::Settings(msg) => {
                match msg {
                    SettingsMessage::ApiKeyChanged(key) => self.settings.api_key = key,
                    SettingsMessage::ModelChanged(model) => self.settings.model = model,
                    SettingsMessage::ToggleShowKey => {
                        self.settings.show_key = !self.settings.show_key
                    }
                }
                // Entering a key while Black is to move should wake the AI.
                self.maybe_request_ai_move()
            }
        }
    }

    fn handle_square_click(&mut self, sq: Square) -> Task<Message> {
        // Clicking an own piece (re)selects it.
        if let Some(piece) = self.game.board().piece_at(sq) {
            if piece.color == self.game.board().turn() {
                self.selected = Some(sq);
                self.legal_targets = self
                    .game
                    .board()
                    .legal_targets_from(sq)
                    .into_iter()
                    .collect();
                return Task::none();
            }
        }

        // Clicking a highlighted destination plays the move.
        if let Some(from) = self.selected {
            if self.legal_targets.contains(&sq) {
                let applied = self
                    .game
                    .apply(
                        MoveCandidate::FromTo {
                            from,
                            to: sq,
                            promotion: None,
                        },
                        MoveOrigin::Human,
                    )
                    .map(|_| ());
                self.selected = None;
                self.legal_targets.clear();

                match applied {
                    Ok(()) => return self.maybe_request_ai_move(),
                    Err(err) => log::warn!("human move rejected: {err}"),
                }
                return Task::none();
            }
        }

        self.selected = None;
        self.legal_targets.clear();
        Task::none()
    }

    /// Is everything in place for the model to move?
    fn ai_move_needed(&self) -> bool {
        !self.ai_task_running
            && self.ai_enabled
            && !self.game.is_over()
            && self.game.board().turn() == Color::Black
            && self.settings.has_api_key()
    }

    /// Kick off a move resolution if the model is due to play.
    fn maybe_request_ai_move(&mut self) -> Task<Message> {
        if !self.ai_move_needed() {
            return Task::none();
        }

        // Snapshots taken now; the resolution validates against these, not
        // against whatever the position is when the reply arrives.
        let legal = self.game.board().legal_sans();
        if legal.is_empty() {
            return Task::none();
        }
        let history = self.game.sans();
        let target_fen = self.game.board().fen();

        let client = match ChatClient::new(
            self.settings.api_key.clone(),
            self.settings.model.clone(),
        ) {
            Ok(client) => client,
            Err(err) => {
                log::error!("failed to build chat client: {err}");
                return Task::none();
            }
        };

        self.ai_task_running = true;

        Task::perform(
            async move {
                // Short pause so the thinking indicator is visible.
                tokio::time::sleep(Duration::from_millis(500)).await;
                llm_engine::request_move(&client, &history, &legal, target_fen).await
            },
            Message::AiMoveResolved,
        )
    }

    fn handle_assistant_message(&mut self, msg: AssistantMessage) -> Task<Message> {
        match msg {
            AssistantMessage::InputChanged(input) => {
                self.assistant.input = input;
                Task::none()
            }
            AssistantMessage::Send => {
                let question = self.assistant.input.trim().to_string();
                self.assistant.input.clear();
                self.ask_assistant(question)
            }
            AssistantMessage::Ask(question) => self.ask_assistant(question),
            AssistantMessage::ReplyReady(result) => {
                self.assistant.loading = false;
                match result {
                    Ok(exchange) => self.assistant.push_reply(exchange),
                    Err(message) => self.assistant.push_error(message),
                }
                Task::none()
            }
            AssistantMessage::ToggleDetails => {
                self.assistant.show_details = !self.assistant.show_details;
                Task::none()
            }
        }
    }

    fn ask_assistant(&mut self, question: String) -> Task<Message> {
        if question.is_empty() || self.assistant.loading {
            return Task::none();
        }
        if !self.settings.has_api_key() {
            self.assistant
                .push_error("Set an API key in Settings first.".to_string());
            return Task::none();
        }

        let client = match ChatClient::new(
            self.settings.api_key.clone(),
            self.settings.model.clone(),
        ) {
            Ok(client) => client,
            Err(err) => {
                self.assistant.push_error(format!("{err}"));
                return Task::none();
            }
        };

        self.assistant.push_question(question.clone());
        self.assistant.loading = true;

        let snapshot = self.game_snapshot();
        Task::perform(
            async move {
                ask(&client, &snapshot, &question)
                    .await
                    .map_err(|e| e.to_string())
            },
            |result| Message::Assistant(AssistantMessage::ReplyReady(result)),
        )
    }

    /// Read-only view of the game for the assistant prompt.
    fn game_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            fen: self.game.board().fen(),
            turn: match self.game.board().turn() {
                Color::White => "White".to_string(),
                Color::Black => "Black".to_string(),
            },
            status: self.status_label(),
            history: self.game.sans(),
        }
    }

    /// Short status word in the original app's vocabulary.
    fn status_label(&self) -> String {
        match self.game.status() {
            GameStatus::Checkmate { .. } => "Checkmate".to_string(),
            GameStatus::Stalemate => "Stalemate".to_string(),
            GameStatus::Draw(_) => "Draw".to_string(),
            GameStatus::InProgress => {
                if self.game.board().is_check() {
                    "Check".to_string()
                } else {
                    "Normal".to_string()
                }
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let tabs = row![
            tab_button("Play", Tab::Play, self.tab),
            tab_button("Assistant", Tab::Assistant, self.tab),
            tab_button("Settings", Tab::Settings, self.tab),
        ]
        .spacing(5)
        .padding(10);

        let content: Element<'_, Message> = match self.tab {
            Tab::Play => self.play_view(),
            Tab::Assistant => {
                let status = self.status_label();
                assistant_view::assistant_view(&self.assistant, &self.game, &status)
                    .map(Message::Assistant)
            }
            Tab::Settings => settings_view::settings_view(&self.settings).map(Message::Settings),
        };

        column![tabs, horizontal_rule(2), content].into()
    }

    /// Render the play/game view
    fn play_view(&self) -> Element<'_, Message> {
        // Chess board
        let board = BoardView::new(
            &self.game,
            self.board_flipped,
            self.selected,
            &self.legal_targets,
        )
        .view()
        .map(Message::Board);

        // Side panel
        let panel = self.control_panel();

        row![
            board,
            container(panel)
                .width(PANEL_WIDTH)
                .height(Length::Fill)
                .padding(15),
        ]
        .spacing(20)
        .padding(20)
        .into()
    }

    /// Render the control panel
    fn control_panel(&self) -> Element<'_, Message> {
        // Game controls
        let new_game_btn = button(text("New Game"))
            .on_press(Message::NewGame)
            .style(button::primary)
            .width(Length::Fill);

        let flip_btn = button(text("Flip Board"))
            .on_press(Message::FlipBoard)
            .style(button::secondary)
            .width(Length::Fill);

        let ai_btn = if self.ai_enabled {
            button(text("AI Opponent: On"))
                .on_press(Message::ToggleAi)
                .style(button::success)
                .width(Length::Fill)
        } else {
            button(text("AI Opponent: Off"))
                .on_press(Message::ToggleAi)
                .style(button::secondary)
                .width(Length::Fill)
        };

        // Status
        let status = if self.ai_task_running {
            "AI is thinking...".to_string()
        } else {
            match self.game.status() {
                GameStatus::InProgress => {
                    let side = match self.game.board().turn() {
                        Color::White => "White (You)",
                        Color::Black => "Black (AI)",
                    };
                    if self.game.board().is_check() {
                        format!("Check! {side} to move")
                    } else {
                        format!("{side} to move")
                    }
                }
                GameStatus::Checkmate {
                    winner: Color::White,
                } => "Checkmate! White wins".to_string(),
                GameStatus::Checkmate {
                    winner: Color::Black,
                } => "Checkmate! Black wins".to_string(),
                GameStatus::Stalemate => "Stalemate".to_string(),
                GameStatus::Draw(_) => "Draw".to_string(),
            }
        };

        let key_warning: Element<'_, Message> = if !self.settings.has_api_key() {
            text("No API key set - the AI cannot move. See Settings.")
                .size(13)
                .color(styles::ERROR_TEXT)
                .into()
        } else {
            vertical_space().height(0).into()
        };

        // Move history
        let moves_title = text("Moves").size(16);
        let mut moves_list = column![].spacing(2);

        for (i, chunk) in self.game.moves().chunks(2).enumerate() {
            moves_list = moves_list.push(self.history_row(i, chunk));

            let black_idx = i * 2 + 1;
            if self.expanded_moves.contains(&black_idx) {
                if let Some(record) = chunk.get(1) {
                    moves_list = moves_list.push(ai_move_details(record));
                }
            }
        }

        let moves_scroll = scrollable(moves_list).height(Length::Fill);

        let fen_text = text(format!("FEN: {}", self.game.board().fen()))
            .size(11)
            .color(styles::MUTED_TEXT);

        column![
            new_game_btn,
            flip_btn,
            ai_btn,
            vertical_space().height(15),
            horizontal_rule(1),
            vertical_space().height(10),
            text(status).size(16),
            key_warning,
            vertical_space().height(10),
            horizontal_rule(1),
            vertical_space().height(10),
            moves_title,
            moves_scroll,
            fen_text,
        ]
        .spacing(5)
        .into()
    }

    /// One numbered row of the move list; the black half toggles the AI
    /// explanation when there is one.
    fn history_row<'a>(&self, pair_index: usize, chunk: &'a [MoveRecord]) -> Element<'a, Message> {
        let white_san = chunk[0].san.as_str();
        let mut line = row![text(format!("{}. {}", pair_index + 1, white_san)).size(13)].spacing(8);

        if let Some(black) = chunk.get(1) {
            let marker = match black.ai_meta() {
                Some(meta) if meta.fallback => " ✗",
                Some(_) => " ◆",
                None => "",
            };
            let label = format!("{}{}", black.san, marker);

            if black.is_ai() {
                line = line.push(
                    button(text(label).size(13))
                        .style(button::text)
                        .on_press(Message::ToggleMoveDetails(pair_index * 2 + 1)),
                );
            } else {
                line = line.push(text(label).size(13));
            }
        }

        line.into()
    }
}

/// Expanded diagnostics under an AI move in the history.
fn ai_move_details(record: &MoveRecord) -> Element<'_, Message> {
    let Some(meta) = record.ai_meta() else {
        return text("").into();
    };

    let header = match (meta.fallback, meta.fallback_reason) {
        (false, _) => "Model reply:".to_string(),
        (true, Some(reason)) => format!("Random fallback ({reason}). Model reply:"),
        (true, None) => "Random fallback (API call failed).".to_string(),
    };

    let mut details = column![text(header).size(11).color(styles::ACCENT_TEXT)].spacing(2);

    if let Some(reply) = &meta.raw_reply {
        details = details.push(text(reply).size(11).color(styles::MUTED_TEXT));
    }

    container(details).padding(10).into()
}

/// Create a tab button
fn tab_button(label: &str, tab: Tab, current: Tab) -> Element<'static, Message> {
    let is_active = tab == current;

    button(text(label.to_string()))
        .on_press(Message::TabSelected(tab))
        .style(if is_active {
            button::primary
        } else {
            button::secondary
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::AiMeta;

    fn app_with_key() -> ChessApp {
        let (mut app, _) = ChessApp::new();
        app.settings.api_key = "sk-test".to_string();
        app
    }

    fn play_white_e4(app: &mut ChessApp) {
        app.game
            .apply(MoveCandidate::San("e4".into()), MoveOrigin::Human)
            .unwrap();
    }

    fn resolution(san: &str, target_fen: String) -> MoveResolution {
        MoveResolution {
            san: san.to_string(),
            target_fen,
            meta: AiMeta::default(),
        }
    }

    #[test]
    fn only_one_resolution_in_flight() {
        let mut app = app_with_key();
        play_white_e4(&mut app);
        assert!(app.ai_move_needed());

        let _task = app.maybe_request_ai_move();
        assert!(app.ai_task_running);
        // A second trigger (e.g. a redundant update) must be a no-op while
        // the first resolution is outstanding.
        assert!(!app.ai_move_needed());
        let _task = app.maybe_request_ai_move();
        assert!(app.ai_task_running);
        assert_eq!(app.game.ply(), 1);
    }

    #[test]
    fn matching_resolution_is_applied() {
        let mut app = app_with_key();
        play_white_e4(&mut app);
        let _task = app.maybe_request_ai_move();
        let target = app.game.board().fen();

        let _task = app.update(Message::AiMoveResolved(Some(resolution("e5", target))));

        assert!(!app.ai_task_running);
        assert_eq!(app.game.ply(), 2);
        assert_eq!(app.game.board().turn(), Color::White);
        assert!(app.game.moves()[1].is_ai());
    }

    #[test]
    fn stale_resolution_after_reset_is_discarded() {
        let mut app = app_with_key();
        play_white_e4(&mut app);
        let _task = app.maybe_request_ai_move();
        let stale_target = app.game.board().fen();

        // Reset while the resolution is in flight.
        let _task = app.update(Message::NewGame);
        assert_eq!(app.game.ply(), 0);
        assert!(app.ai_task_running);

        let _task = app.update(Message::AiMoveResolved(Some(resolution(
            "e5",
            stale_target,
        ))));

        // Discarded: the board is untouched and the guard is released.
        assert_eq!(app.game.ply(), 0);
        assert!(!app.ai_task_running);
    }

    #[test]
    fn no_trigger_without_api_key() {
        let (mut app, _) = ChessApp::new();
        play_white_e4(&mut app);
        assert!(!app.ai_move_needed());
        let _task = app.maybe_request_ai_move();
        assert!(!app.ai_task_running);
    }

    #[test]
    fn no_trigger_on_whites_turn_or_when_disabled() {
        let mut app = app_with_key();
        assert!(!app.ai_move_needed());

        play_white_e4(&mut app);
        app.ai_enabled = false;
        assert!(!app.ai_move_needed());
    }

    #[test]
    fn white_input_ignored_while_thinking() {
        let mut app = app_with_key();
        play_white_e4(&mut app);
        let _task = app.maybe_request_ai_move();

        // Black to move and a resolution outstanding: clicks change nothing.
        let _task = app.update(Message::Board(BoardMessage::SquareClicked(Square::D2)));
        assert_eq!(app.selected, None);
        assert_eq!(app.game.ply(), 1);
    }

    #[test]
    fn click_to_select_then_move() {
        let (mut app, _) = ChessApp::new();

        let _task = app.update(Message::Board(BoardMessage::SquareClicked(Square::E2)));
        assert_eq!(app.selected, Some(Square::E2));
        assert!(app.legal_targets.contains(&Square::E4));

        let _task = app.update(Message::Board(BoardMessage::SquareClicked(Square::E4)));
        assert_eq!(app.game.ply(), 1);
        assert_eq!(app.selected, None);
        assert_eq!(app.game.moves()[0].san, "e4");
    }
}
