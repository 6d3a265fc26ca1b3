//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! Keys become `Action`s, `update()` returns an `Effect`, and effects that
//! need the network are spawned as tokio tasks. Each task sends its result
//! back over a channel as another `Action`, tagged with the parameters it was
//! started for. The reducer drops results whose parameters are no longer
//! current.
//!
//! The loop redraws every ~80ms while a page is loading (spinner) and
//! otherwise only on input, results or resize.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::cache::KeyPrefix;
use crate::core::fetcher::ListDataFetcher;
use crate::core::query::{PageLimit, QueryParameters, SortField};
use crate::core::state::{App, ListStatus};
use crate::tui::component::EventHandler;
use crate::tui::components::{PostTableState, SearchBox, SearchEvent, TableEvent};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Single-key commands act on the list.
    Browse,
    /// Keystrokes edit the search box. Enter applies, Esc leaves.
    Search,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub search_box: SearchBox,
    pub post_table: PostTableState,
    pub input_mode: InputMode,
    /// Signed-in email shown in the status bar
    pub user: Option<String>,
}

impl TuiState {
    pub fn new(user: Option<String>) -> Self {
        Self {
            search_box: SearchBox::new(),
            post_table: PostTableState::new(),
            input_mode: InputMode::Browse,
            user,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Show
        );
    }
}

/// Maps a key in browse mode to an action. Keys the table or the loop
/// handle themselves return `None`.
fn browse_action(event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::CursorLeft | TuiEvent::InputChar('h') => Some(Action::PrevPage),
        TuiEvent::CursorRight | TuiEvent::InputChar('l') => Some(Action::NextPage),
        TuiEvent::InputChar('t') => Some(Action::SortBy(SortField::Title)),
        TuiEvent::InputChar('c') => Some(Action::SortBy(SortField::CreatedAt)),
        TuiEvent::InputChar('f') => Some(Action::CycleCategory),
        TuiEvent::InputChar('x') => Some(Action::ResetSearch),
        TuiEvent::InputChar('r') => Some(Action::Retry),
        TuiEvent::InputChar('q') => Some(Action::Quit),
        _ => None,
    }
}

pub fn run(
    fetcher: Arc<ListDataFetcher>,
    limit: PageLimit,
    user: Option<String>,
) -> std::io::Result<()> {
    let mut app = App::new(limit);
    let mut tui = TuiState::new(user);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    let effect = update(&mut app, Action::Load);
    let mut should_quit = apply_effect(effect, &fetcher, &tx);

    while !should_quit {
        let loading = app.is_loading();
        if loading {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if loading {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(250)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let action = match event {
                TuiEvent::Resize => None,
                TuiEvent::ForceQuit => Some(Action::Quit),
                _ => match tui.input_mode {
                    InputMode::Search => match tui.search_box.handle_event(&event) {
                        Some(SearchEvent::Changed(text)) => Some(Action::StageSearch(text)),
                        Some(SearchEvent::Commit) => {
                            tui.input_mode = InputMode::Browse;
                            Some(Action::CommitSearch)
                        }
                        Some(SearchEvent::Cancel) => {
                            tui.input_mode = InputMode::Browse;
                            None
                        }
                        None => None,
                    },
                    InputMode::Browse => {
                        if matches!(event, TuiEvent::InputChar('/')) {
                            tui.input_mode = InputMode::Search;
                            None
                        } else if let Some(TableEvent::Delete(id)) =
                            tui.post_table.handle_event(&event, app.posts())
                        {
                            Some(Action::DeletePost(id))
                        } else {
                            browse_action(&event)
                        }
                    }
                },
            };

            if let Some(action) = action {
                if matches!(action, Action::ResetSearch) {
                    tui.search_box.set_text("");
                }
                let effect = update(&mut app, action);
                if apply_effect(effect, &fetcher, &tx) {
                    should_quit = true;
                    break;
                }
            }
        }

        // Handle results from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let was_loading = app.is_loading();
            let effect = update(&mut app, action);
            if was_loading && matches!(app.list, ListStatus::Loaded(_)) {
                tui.post_table.reset();
            }
            if apply_effect(effect, &fetcher, &tx) {
                should_quit = true;
                break;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

/// Starts whatever I/O `effect` asks for. Returns true on quit.
fn apply_effect(effect: Effect, fetcher: &Arc<ListDataFetcher>, tx: &mpsc::Sender<Action>) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::FetchPage(params) => {
            spawn_fetch(fetcher.clone(), params, tx.clone());
            false
        }
        Effect::RefetchPage(params) => {
            fetcher.invalidate(&KeyPrefix::PostLists);
            spawn_fetch(fetcher.clone(), params, tx.clone());
            false
        }
        Effect::DeletePost(id) => {
            spawn_delete(fetcher.clone(), id, tx.clone());
            false
        }
    }
}

fn spawn_fetch(fetcher: Arc<ListDataFetcher>, params: QueryParameters, tx: mpsc::Sender<Action>) {
    info!("Fetching page: {}", params.describe());
    tokio::spawn(async move {
        let result = fetcher.fetch(params.clone()).await;
        if tx.send(Action::PageLoaded { key: params, result }).is_err() {
            warn!("Failed to send PageLoaded: receiver dropped");
        }
    });
}

fn spawn_delete(fetcher: Arc<ListDataFetcher>, id: String, tx: mpsc::Sender<Action>) {
    info!("Deleting post {}", id);
    tokio::spawn(async move {
        let result = fetcher.delete_post(&id).await;
        if tx.send(Action::PostDeleted { id, result }).is_err() {
            warn!("Failed to send PostDeleted: receiver dropped");
        }
    });
}
