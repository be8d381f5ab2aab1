//! Application state and update logic for the VoxMate TUI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

use voxmate_engine::{
    validate_pdf_path, validate_prompt, validate_speech_text, ApiClient, ApiError, AssistantReply,
    Attachment, AudioPlayer, ChatSession, Config, Credentials, FileStore, KeyValueStore,
    MediaRef, Role, SpeechPad, StoreError, SummaryPad, TurnError, TurnRequest, UserSession,
    LANGUAGES,
};

use crate::commands::{self, Command};
use crate::theme::Theme;
use crate::widgets::{StatusBarContent, TextInputState, TranscriptState};

/// The current screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Login,
    Chat,
    Speak,
    Summarize,
}

impl Screen {
    /// Screen titles in tab order.
    pub const TITLES: [&'static str; 4] = ["Chat", "Speak", "Summarize", "Login"];

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Speak => "Speak",
            Self::Summarize => "Summarize",
            Self::Login => "Login",
        }
    }

    /// Index into [`Screen::TITLES`].
    pub fn index(self) -> usize {
        match self {
            Self::Chat => 0,
            Self::Speak => 1,
            Self::Summarize => 2,
            Self::Login => 3,
        }
    }

    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Chat,
            1 => Self::Speak,
            2 => Self::Summarize,
            _ => Self::Login,
        }
    }
}

/// Focused field on the speak screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeakFocus {
    #[default]
    Text,
    Language,
}

/// Focused field on the summarize screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizeFocus {
    #[default]
    File,
    Prompt,
}

/// Focused field on the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginFocus {
    #[default]
    Email,
    Password,
}

/// Background work requested by the UI, executed by the event loop.
#[derive(Debug, Clone)]
pub enum Work {
    /// A chat turn (text or image).
    Chat(TurnRequest),
    /// Translate text on the speak screen.
    Translate { text: String, language: String },
    /// Synthesize speech for the translated text.
    Synthesize { text: String, language: String },
    /// Upload a PDF for summarization.
    Summarize {
        path: PathBuf,
        prompt: String,
        conversation_id: String,
        user_id: String,
    },
}

/// Errors that can occur constructing the app.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Current screen.
    pub screen: Screen,
    /// Color theme.
    pub theme: Theme,
    /// Client configuration.
    pub config: Config,

    /// Chat session (conversation state synchronizer).
    pub session: ChatSession,
    /// Speak screen state.
    pub speech: SpeechPad,
    /// Summarize screen state.
    pub summary: SummaryPad,
    /// Audio playback resource.
    pub player: AudioPlayer,
    /// Logged-in user, if any.
    pub user: Option<UserSession>,

    // === Chat screen ===
    /// Chat input line.
    pub chat_input: TextInputState,
    /// Transcript scroll state.
    pub transcript: TranscriptState,
    /// Transient feedback line (command results, rejections).
    pub chat_notice: Option<String>,

    // === Speak screen ===
    /// Source text input.
    pub speak_input: TextInputState,
    /// Which speak field has focus.
    pub speak_focus: SpeakFocus,
    /// Selected index into [`LANGUAGES`].
    pub language_index: usize,
    /// Inline error on the speak screen.
    pub speak_error: Option<String>,
    /// Whether a translate/synthesize request is in flight.
    pub speak_loading: bool,

    // === Summarize screen ===
    /// PDF path input.
    pub file_input: TextInputState,
    /// Prompt input.
    pub prompt_input: TextInputState,
    /// Which summarize field has focus.
    pub summarize_focus: SummarizeFocus,
    /// Inline error on the summarize screen.
    pub summary_error: Option<String>,
    /// Whether an upload is in flight.
    pub summary_loading: bool,

    // === Login screen ===
    /// Email input.
    pub email_input: TextInputState,
    /// Password input.
    pub password_input: TextInputState,
    /// Which login field has focus.
    pub login_focus: LoginFocus,
    /// Inline error on the login screen.
    pub login_error: Option<String>,
}

impl App {
    /// Create the app with a file-backed store at the configured data dir.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir())?);
        Self::with_store(config, store)
    }

    /// Create the app over an injected store.
    pub fn with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let client = ApiClient::with_timeout(
            &config.base_url,
            Duration::from_secs(config.timeout_seconds),
        )?;
        let session = ChatSession::load(Arc::clone(&store), client, &config.user_id)?;
        let speech = SpeechPad::load(Arc::clone(&store), session.conversation().id.clone())?;
        let summary = SummaryPad::load(store)?;
        let player = AudioPlayer::new(config.player_argv.clone(), &config.base_url);

        let language_index = LANGUAGES
            .iter()
            .position(|option| option.code == speech.language)
            .unwrap_or(0);
        let prompt_input = TextInputState::with_content(summary.prompt.clone());

        Ok(Self {
            should_quit: false,
            show_help: false,
            screen: Screen::Login,
            theme: Theme::default(),
            config,
            session,
            speech,
            summary,
            player,
            user: None,
            chat_input: TextInputState::new(),
            transcript: TranscriptState::new(),
            chat_notice: None,
            speak_input: TextInputState::new(),
            speak_focus: SpeakFocus::default(),
            language_index,
            speak_error: None,
            speak_loading: false,
            file_input: TextInputState::new(),
            prompt_input,
            summarize_focus: SummarizeFocus::default(),
            summary_error: None,
            summary_loading: false,
            email_input: TextInputState::new(),
            password_input: TextInputState::new(),
            login_focus: LoginFocus::default(),
            login_error: None,
        })
    }

    /// Handle a key event, possibly producing background work.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Work> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        // Global bindings
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }
        if key.code == KeyCode::F(1) {
            self.show_help = !self.show_help;
            return None;
        }
        if self.show_help {
            // Any key closes the overlay
            self.show_help = false;
            return None;
        }
        if key.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(ch @ '1'..='4') = key.code {
                let index = (ch as usize) - ('1' as usize);
                self.switch_screen(Screen::from_index(index));
                return None;
            }
        }

        match self.screen {
            Screen::Login => {
                self.handle_login_key(key);
                None
            }
            Screen::Chat => self.handle_chat_key(key),
            Screen::Speak => self.handle_speak_key(key),
            Screen::Summarize => self.handle_summarize_key(key),
        }
    }

    /// Scroll the transcript (mouse wheel).
    pub fn scroll_transcript(&mut self, up: bool) {
        if up {
            self.transcript.scroll_up(3);
        } else {
            self.transcript.scroll_down(3);
        }
    }

    /// Status bar content for the current state.
    pub fn status_content(&self) -> StatusBarContent {
        let pending = if self.session.is_loading() {
            Some("waiting for reply".to_string())
        } else if self.speak_loading {
            Some("translating".to_string())
        } else if self.summary_loading {
            Some("summarizing".to_string())
        } else {
            None
        };

        let hint = match self.screen {
            Screen::Login => Some("Enter to log in".to_string()),
            Screen::Chat => Some("Enter to send, /help for commands".to_string()),
            Screen::Speak => Some("Enter translate, Ctrl+S speak, Ctrl+P play".to_string()),
            Screen::Summarize => Some("Enter to upload".to_string()),
        };

        StatusBarContent {
            screen: self.screen.title().to_string(),
            conversation: StatusBarContent::short_id(&self.session.conversation().id),
            backend: self.config.base_url.clone(),
            pending,
            hint,
        }
    }

    /// Apply a finished chat turn.
    pub fn finish_chat(
        &mut self,
        conversation_id: &str,
        outcome: Result<AssistantReply, ApiError>,
    ) {
        self.session.accept_reply(conversation_id, outcome);
        self.transcript.follow_latest();
    }

    /// Apply a finished translation.
    pub fn finish_translate(&mut self, text: &str, outcome: Result<String, ApiError>) {
        self.speak_loading = false;
        match outcome {
            Ok(translated) => {
                self.speak_error = None;
                if let Err(err) = self.speech.record_translation(text, &translated) {
                    warn!(error = %err, "Failed to persist translation");
                }
            }
            Err(err) => {
                self.speech.translated_text = None;
                self.speak_error = Some(format!("Error: {err}"));
            }
        }
    }

    /// Apply a finished speech synthesis.
    pub fn finish_synthesize(&mut self, outcome: Result<String, ApiError>) {
        self.speak_loading = false;
        match outcome {
            Ok(url) => {
                self.speak_error = None;
                if let Err(err) = self.speech.record_audio(&url) {
                    warn!(error = %err, "Failed to persist audio url");
                }
            }
            Err(err) => {
                self.speech.audio_url = None;
                self.speak_error = Some(format!("Error: {err}"));
            }
        }
    }

    /// Apply a finished PDF upload.
    pub fn finish_summarize(
        &mut self,
        path: &PathBuf,
        prompt: &str,
        outcome: Result<String, ApiError>,
    ) {
        self.summary_loading = false;
        match outcome {
            Ok(summary) => {
                self.summary_error = None;
                if let Err(err) = self.summary.record_summary(path, prompt, &summary) {
                    warn!(error = %err, "Failed to persist summary");
                }
            }
            Err(err) => {
                self.summary.summary_text = None;
                self.summary_error = Some(format!("Error: {err}"));
            }
        }
    }

    /// Clear the conversation: new id, empty transcript, rebound pads,
    /// stopped audio.
    pub fn clear_conversation(&mut self) {
        self.player.stop();
        if let Err(err) = self.session.clear() {
            self.chat_notice = Some(format!("Failed to clear: {err}"));
            return;
        }
        let new_id = self.session.conversation().id.clone();
        if let Err(err) = self.speech.clear(new_id) {
            warn!(error = %err, "Failed to clear speech state");
        }
        self.transcript = TranscriptState::new();
        self.chat_notice = Some("Started a new conversation".to_string());
    }

    fn switch_screen(&mut self, target: Screen) {
        if self.user.is_none() && target != Screen::Login {
            self.login_error = Some("Please log in first.".to_string());
            self.screen = Screen::Login;
            return;
        }
        self.screen = target;
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        let input = match self.login_focus {
            LoginFocus::Email => &mut self.email_input,
            LoginFocus::Password => &mut self.password_input,
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.login_focus = match self.login_focus {
                    LoginFocus::Email => LoginFocus::Password,
                    LoginFocus::Password => LoginFocus::Email,
                };
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.login_focus = match self.login_focus {
                    LoginFocus::Email => LoginFocus::Password,
                    LoginFocus::Password => LoginFocus::Email,
                };
            }
            KeyCode::Enter => {
                let credentials = Credentials {
                    email: self.email_input.content().to_string(),
                    password: self.password_input.content().to_string(),
                };
                match credentials.login() {
                    Ok(user) => {
                        self.login_error = None;
                        self.password_input.clear();
                        self.user = Some(user);
                        self.screen = Screen::Chat;
                    }
                    Err(err) => {
                        self.login_error = Some(err.to_string());
                    }
                }
            }
            KeyCode::Esc => {
                self.login_error = None;
            }
            _ => Self::edit_input(input, key),
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Option<Work> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('l') {
            self.clear_conversation();
            return None;
        }

        match key.code {
            KeyCode::Enter => self.submit_chat(),
            KeyCode::Up => {
                self.chat_input.history_prev();
                None
            }
            KeyCode::Down => {
                self.chat_input.history_next();
                None
            }
            KeyCode::PageUp => {
                self.transcript.scroll_up(5);
                None
            }
            KeyCode::PageDown => {
                self.transcript.scroll_down(5);
                None
            }
            KeyCode::End => {
                self.transcript.follow_latest();
                None
            }
            KeyCode::Esc => {
                self.chat_notice = None;
                None
            }
            _ => {
                Self::edit_input(&mut self.chat_input, key);
                None
            }
        }
    }

    fn submit_chat(&mut self) -> Option<Work> {
        let line = self.chat_input.content().to_string();

        if commands::is_command(&line) {
            let command = commands::parse(&line)?;
            self.chat_input.submit();
            return self.run_command(command);
        }

        match self.session.begin_user_turn(&line, None) {
            Ok(request) => {
                self.chat_input.submit();
                self.chat_notice = None;
                self.transcript.follow_latest();
                Some(Work::Chat(request))
            }
            // Empty input is a no-op: nothing appended, nothing sent
            Err(TurnError::EmptyInput) => None,
            Err(err) => {
                self.chat_notice = Some(err.to_string());
                None
            }
        }
    }

    fn run_command(&mut self, command: Command) -> Option<Work> {
        match command {
            Command::Help => {
                self.show_help = true;
                None
            }
            Command::Quit => {
                self.should_quit = true;
                None
            }
            Command::Clear => {
                self.clear_conversation();
                None
            }
            Command::Copy => {
                self.copy_last_reply();
                None
            }
            Command::Play => {
                self.play_latest_audio();
                None
            }
            Command::Stop => {
                self.player.stop();
                self.chat_notice = Some("Playback stopped".to_string());
                None
            }
            Command::Image { path, caption } => {
                let attachment = match Attachment::image(path) {
                    Ok(attachment) => attachment,
                    Err(err) => {
                        self.chat_notice = Some(err.to_string());
                        return None;
                    }
                };
                match self.session.begin_user_turn(&caption, Some(attachment)) {
                    Ok(request) => {
                        self.chat_notice = None;
                        self.transcript.follow_latest();
                        Some(Work::Chat(request))
                    }
                    Err(err) => {
                        self.chat_notice = Some(err.to_string());
                        None
                    }
                }
            }
            Command::Unknown(name) => {
                self.chat_notice = Some(format!("Unknown command: /{name}"));
                None
            }
        }
    }

    fn copy_last_reply(&mut self) {
        let Some(reply) = self
            .session
            .conversation()
            .messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
        else {
            self.chat_notice = Some("Nothing to copy yet".to_string());
            return;
        };

        match arboard::Clipboard::new().and_then(|mut clipboard| {
            clipboard.set_text(reply.content.clone())
        }) {
            Ok(()) => self.chat_notice = Some("Copied last reply".to_string()),
            Err(err) => self.chat_notice = Some(format!("Clipboard error: {err}")),
        }
    }

    fn play_latest_audio(&mut self) {
        let url = self
            .session
            .conversation()
            .messages
            .iter()
            .rev()
            .find_map(|message| match &message.media {
                Some(MediaRef::Audio { url }) => Some(url.clone()),
                _ => None,
            });

        match url {
            Some(url) => match self.player.play(&url) {
                Ok(()) => self.chat_notice = Some("Playing reply audio".to_string()),
                Err(err) => self.chat_notice = Some(format!("Error: {err}")),
            },
            None => self.chat_notice = Some("No audio in this conversation".to_string()),
        }
    }

    fn handle_speak_key(&mut self, key: KeyEvent) -> Option<Work> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => return self.submit_synthesize(),
                KeyCode::Char('p') => {
                    self.play_speech_audio();
                    return None;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.speak_focus = match self.speak_focus {
                    SpeakFocus::Text => SpeakFocus::Language,
                    SpeakFocus::Language => SpeakFocus::Text,
                };
                None
            }
            KeyCode::Enter => self.submit_translate(),
            KeyCode::Up if self.speak_focus == SpeakFocus::Language => {
                self.language_index = self.language_index.saturating_sub(1);
                self.speech.language = LANGUAGES[self.language_index].code.to_string();
                None
            }
            KeyCode::Down if self.speak_focus == SpeakFocus::Language => {
                self.language_index = (self.language_index + 1).min(LANGUAGES.len() - 1);
                self.speech.language = LANGUAGES[self.language_index].code.to_string();
                None
            }
            KeyCode::Esc => {
                self.player.stop();
                self.speak_error = None;
                None
            }
            _ if self.speak_focus == SpeakFocus::Text => {
                Self::edit_input(&mut self.speak_input, key);
                None
            }
            _ => None,
        }
    }

    fn submit_translate(&mut self) -> Option<Work> {
        if self.speak_loading {
            return None;
        }
        let text = self.speak_input.content().trim().to_string();
        if let Err(err) = validate_speech_text(&text) {
            self.speak_error = Some(err.to_string());
            self.speech.translated_text = None;
            return None;
        }
        self.speak_error = None;
        self.speak_loading = true;
        Some(Work::Translate {
            text,
            language: self.speech.language.clone(),
        })
    }

    fn submit_synthesize(&mut self) -> Option<Work> {
        if self.speak_loading {
            return None;
        }
        let Some(translated) = self.speech.translated_text.clone() else {
            self.speak_error = Some("Translate the text first.".to_string());
            return None;
        };
        if validate_speech_text(&translated).is_err() {
            self.speak_error =
                Some("Translated text must be at least 5 characters.".to_string());
            return None;
        }
        self.speak_error = None;
        self.speak_loading = true;
        Some(Work::Synthesize {
            text: translated,
            language: self.speech.language.clone(),
        })
    }

    fn play_speech_audio(&mut self) {
        let Some(url) = self.speech.audio_url.clone() else {
            self.speak_error = Some("No audio yet. Press Ctrl+S to synthesize.".to_string());
            return;
        };
        if let Err(err) = self.player.play(&url) {
            self.speak_error = Some(format!("Error: {err}"));
        }
    }

    fn handle_summarize_key(&mut self, key: KeyEvent) -> Option<Work> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('l') {
            if let Err(err) = self.summary.clear() {
                warn!(error = %err, "Failed to clear summary state");
            }
            self.prompt_input = TextInputState::with_content(self.summary.prompt.clone());
            self.summary_error = None;
            return None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.summarize_focus = match self.summarize_focus {
                    SummarizeFocus::File => SummarizeFocus::Prompt,
                    SummarizeFocus::Prompt => SummarizeFocus::File,
                };
                None
            }
            KeyCode::Enter => self.submit_summarize(),
            KeyCode::Esc => {
                self.summary_error = None;
                None
            }
            _ => {
                let input = match self.summarize_focus {
                    SummarizeFocus::File => &mut self.file_input,
                    SummarizeFocus::Prompt => &mut self.prompt_input,
                };
                Self::edit_input(input, key);
                None
            }
        }
    }

    fn submit_summarize(&mut self) -> Option<Work> {
        if self.summary_loading {
            return None;
        }

        let path = PathBuf::from(self.file_input.content().trim());
        let prompt = self.prompt_input.content().trim().to_string();

        if let Err(err) = validate_pdf_path(&path) {
            self.summary_error = Some(err.to_string());
            return None;
        }
        if let Err(err) = validate_prompt(&prompt) {
            self.summary_error = Some(err.to_string());
            return None;
        }

        self.summary_error = None;
        self.summary_loading = true;
        Some(Work::Summarize {
            path,
            prompt,
            conversation_id: self.session.conversation().id.clone(),
            user_id: self.config.user_id.clone(),
        })
    }

    /// Route an editing key into a text input.
    fn edit_input(input: &mut TextInputState, key: KeyEvent) {
        match key.code {
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                input.insert(ch);
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            KeyCode::Home => input.move_home(),
            KeyCode::End => input.move_end(),
            _ => {}
        }
    }
}
