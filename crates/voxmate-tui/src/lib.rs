//! voxmate-tui: Terminal UI for the VoxMate assistant client
//!
//! This crate provides the TUI layer for VoxMate, including:
//! - Chat screen with markdown transcript and slash commands
//! - Speak screen (translation + text-to-speech)
//! - Summarize screen (PDF upload)
//! - Login form gating the other screens
//!
//! Network requests run on background tokio tasks; completions are
//! applied through the engine's guarded accept methods so a cleared
//! conversation never receives a stale reply.

mod app;
mod commands;
mod event;
mod screens;
mod text;
mod theme;
mod widgets;

pub use app::{App, AppError, Screen, Work};
pub use event::{Event, EventHandler};
pub use theme::Theme;
pub use voxmate_engine;

use std::io::{self, stdout};
use std::path::PathBuf;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::JoinHandle;
use tracing::warn;

use voxmate_engine::{ApiClient, ApiError, AssistantReply, Config};

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Outcome of a background speak-screen task.
enum SpeakOutcome {
    Translated {
        text: String,
        outcome: Result<String, ApiError>,
    },
    Synthesized(Result<String, ApiError>),
}

/// In-flight background tasks, at most one per flow.
#[derive(Default)]
struct Tasks {
    chat: Option<(String, JoinHandle<Result<AssistantReply, ApiError>>)>,
    speak: Option<JoinHandle<SpeakOutcome>>,
    summary: Option<(PathBuf, String, JoinHandle<Result<String, ApiError>>)>,
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config)?;

    // Create event handler (4 Hz tick rate = 250ms)
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tasks = Tasks::default();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::render(app, area, frame.buffer_mut());
        })?;

        apply_finished_tasks(app, &mut tasks).await;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if let Some(work) = app.handle_key(key) {
                        spawn_work(app.session.client().clone(), work, &mut tasks);
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.scroll_transcript(true),
                    MouseEventKind::ScrollDown => app.scroll_transcript(false),
                    _ => {}
                },
                Event::Tick | Event::Resize(_, _) => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Spawn requested work on a background task.
fn spawn_work(client: ApiClient, work: Work, tasks: &mut Tasks) {
    match work {
        Work::Chat(request) => {
            let conversation_id = request.conversation_id().to_string();
            let handle = tokio::spawn(async move { client.send_turn(request).await });
            tasks.chat = Some((conversation_id, handle));
        }
        Work::Translate { text, language } => {
            let handle = tokio::spawn(async move {
                let outcome = client.translate(&text, &language).await;
                SpeakOutcome::Translated { text, outcome }
            });
            tasks.speak = Some(handle);
        }
        Work::Synthesize { text, language } => {
            let handle = tokio::spawn(async move {
                SpeakOutcome::Synthesized(client.synthesize(&text, &language).await)
            });
            tasks.speak = Some(handle);
        }
        Work::Summarize {
            path,
            prompt,
            conversation_id,
            user_id,
        } => {
            let task_path = path.clone();
            let task_prompt = prompt.clone();
            let handle = tokio::spawn(async move {
                client
                    .upload_pdf(&task_path, &task_prompt, &conversation_id, &user_id)
                    .await
            });
            tasks.summary = Some((path, prompt, handle));
        }
    }
}

/// Apply completions of finished background tasks to the app state.
async fn apply_finished_tasks(app: &mut App, tasks: &mut Tasks) {
    if tasks
        .chat
        .as_ref()
        .is_some_and(|(_, handle)| handle.is_finished())
    {
        if let Some((conversation_id, handle)) = tasks.chat.take() {
            let outcome = join_outcome(handle.await);
            app.finish_chat(&conversation_id, outcome);
        }
    }

    if tasks.speak.as_ref().is_some_and(JoinHandle::is_finished) {
        if let Some(handle) = tasks.speak.take() {
            match handle.await {
                Ok(SpeakOutcome::Translated { text, outcome }) => {
                    app.finish_translate(&text, outcome);
                }
                Ok(SpeakOutcome::Synthesized(outcome)) => app.finish_synthesize(outcome),
                Err(err) => {
                    warn!(error = %err, "Speak task failed");
                    app.finish_synthesize(Err(join_error(err)));
                }
            }
        }
    }

    if tasks
        .summary
        .as_ref()
        .is_some_and(|(_, _, handle)| handle.is_finished())
    {
        if let Some((path, prompt, handle)) = tasks.summary.take() {
            let outcome = join_outcome(handle.await);
            app.finish_summarize(&path, &prompt, outcome);
        }
    }
}

/// Flatten a join result, mapping panics/cancellation into an `ApiError`.
fn join_outcome<T>(
    joined: Result<Result<T, ApiError>, tokio::task::JoinError>,
) -> Result<T, ApiError> {
    match joined {
        Ok(outcome) => outcome,
        Err(err) => Err(join_error(err)),
    }
}

fn join_error(err: tokio::task::JoinError) -> ApiError {
    ApiError::Io(std::io::Error::other(err))
}
