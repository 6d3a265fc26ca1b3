//! # Application State
//!
//! Core business state for the post board. This module contains domain logic
//! only, no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── controller: QueryStateController  // filters, sort, search, cursor
//! ├── list: ListStatus                  // what the list view shows
//! ├── status_message: String            // status bar text
//! ├── session_expired: bool             // last request came back 401
//! └── pending_delete: Option<String>    // post id awaiting server delete
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::api::{FetchError, ListPage, Post};
use crate::core::controller::{PageControls, QueryStateController};
use crate::core::query::PageLimit;

/// What the list view renders for the current parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Loaded(ListPage),
    Failed(FetchError),
}

pub struct App {
    pub controller: QueryStateController,
    pub list: ListStatus,
    pub status_message: String,
    /// Set when the server rejected the stored token. The user must log in
    /// again from the CLI.
    pub session_expired: bool,
    pub pending_delete: Option<String>,
}

impl App {
    pub fn new(limit: PageLimit) -> Self {
        Self {
            controller: QueryStateController::with_limit(limit),
            list: ListStatus::Idle,
            status_message: String::from("Loading posts..."),
            session_expired: false,
            pending_delete: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.list, ListStatus::Loading)
    }

    pub fn page(&self) -> Option<&ListPage> {
        match &self.list {
            ListStatus::Loaded(page) => Some(page),
            _ => None,
        }
    }

    pub fn posts(&self) -> &[Post] {
        self.page().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    /// Prev/next availability. Both are disabled while nothing is loaded.
    pub fn page_controls(&self) -> PageControls {
        self.page()
            .map(PageControls::for_page)
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.list {
            ListStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}
