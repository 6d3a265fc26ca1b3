//! # Actions
//!
//! Everything that can happen on the board becomes an `Action`.
//! User presses `t`? That's `Action::SortBy(SortField::Title)`.
//! A page arrives? That's `Action::PageLoaded { key, result }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state and returns an `Effect` describing the I/O the caller should start.
//! No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Responses carry the parameters they were requested with. Only the response
//! whose key equals the controller's current parameters is applied, so a slow
//! answer for a page the user already left can never overwrite the view.

use log::{debug, info, warn};

use crate::api::{Category, FetchError, ListPage};
use crate::core::query::{QueryParameters, SortField};
use crate::core::state::{App, ListStatus};

#[derive(Debug, Clone)]
pub enum Action {
    /// Fetch the page for the current parameters.
    Load,
    SortBy(SortField),
    FilterCategory(Option<Category>),
    /// All → Notice → Q&A → Free → All.
    CycleCategory,
    /// Replace the search text being typed. Does not fetch.
    StageSearch(String),
    CommitSearch,
    ResetSearch,
    NextPage,
    PrevPage,
    /// Refetch the current page, bypassing the cache.
    Retry,
    PageLoaded {
        key: QueryParameters,
        result: Result<ListPage, FetchError>,
    },
    DeletePost(String),
    PostDeleted {
        id: String,
        result: Result<(), FetchError>,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    FetchPage(QueryParameters),
    /// Drop cached list pages, then fetch.
    RefetchPage(QueryParameters),
    DeletePost(String),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Load => start_fetch(app),
        Action::SortBy(field) => {
            let changed = app.controller.set_sort(field);
            fetch_if(app, changed)
        }
        Action::FilterCategory(category) => {
            let changed = app.controller.set_category(category);
            fetch_if(app, changed)
        }
        Action::CycleCategory => {
            let next = Category::cycle(app.controller.current().category());
            let changed = app.controller.set_category(next);
            fetch_if(app, changed)
        }
        Action::StageSearch(text) => {
            app.controller.set_search_term(text);
            Effect::None
        }
        Action::CommitSearch => {
            let changed = app.controller.commit_search();
            fetch_if(app, changed)
        }
        Action::ResetSearch => {
            let changed = app.controller.reset_search();
            fetch_if(app, changed)
        }
        Action::NextPage => {
            let cursor = app.page().and_then(|p| p.next_cursor.clone());
            let changed = app.controller.go_to_next_page(cursor.as_deref());
            fetch_if(app, changed)
        }
        Action::PrevPage => {
            let cursor = app.page().and_then(|p| p.prev_cursor.clone());
            let changed = app.controller.go_to_prev_page(cursor.as_deref());
            fetch_if(app, changed)
        }
        Action::Retry => {
            app.list = ListStatus::Loading;
            app.status_message = String::from("Reloading...");
            Effect::RefetchPage(app.controller.params())
        }
        Action::PageLoaded { key, result } => {
            if &key != app.controller.current() {
                debug!("Dropping stale response for {}", key.describe());
                return Effect::None;
            }
            match result {
                Ok(page) => {
                    app.status_message =
                        format!("{} posts · {}", page.items.len(), key.describe());
                    app.list = ListStatus::Loaded(page);
                }
                Err(e) => {
                    warn!("Loading posts failed [{}]: {}", e.kind(), e);
                    note_failure(app, &e);
                    app.list = ListStatus::Failed(e);
                }
            }
            Effect::None
        }
        Action::DeletePost(id) => {
            if app.pending_delete.is_some() {
                return Effect::None;
            }
            app.status_message = format!("Deleting {}...", id);
            app.pending_delete = Some(id.clone());
            Effect::DeletePost(id)
        }
        Action::PostDeleted { id, result } => {
            app.pending_delete = None;
            match result {
                Ok(()) => {
                    info!("Post {} deleted", id);
                    let effect = start_fetch(app);
                    app.status_message = format!("Deleted {}", id);
                    effect
                }
                Err(e) => {
                    warn!("Deleting {} failed: {}", id, e);
                    note_failure(app, &e);
                    Effect::None
                }
            }
        }
        Action::Quit => Effect::Quit,
    }
}

fn start_fetch(app: &mut App) -> Effect {
    app.list = ListStatus::Loading;
    app.status_message = String::from("Loading posts...");
    Effect::FetchPage(app.controller.params())
}

fn fetch_if(app: &mut App, changed: bool) -> Effect {
    if changed {
        start_fetch(app)
    } else {
        Effect::None
    }
}

fn note_failure(app: &mut App, error: &FetchError) {
    if error.is_unauthorized() {
        app.session_expired = true;
        app.status_message = String::from("Session expired. Run `postboard login` to sign in again.");
    } else {
        app.status_message = format!("Error: {}", error);
    }
}
