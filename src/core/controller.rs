//! # Query State Controller
//!
//! Single source of truth for which page, under which filter/sort/search, the
//! list view should request next.
//!
//! Two rules hold after every transition:
//!
//! - A forward and a backward cursor are never set together.
//! - Changing anything other than the page position drops the cursor, since
//!   a cursor is only meaningful inside the context that produced it.
//!
//! Every transition returns `true` when the parameters changed, so the caller
//! knows a new fetch key exists.

use log::debug;

use crate::api::{Category, ListPage};
use crate::core::query::{
    Cursor, PageLimit, QueryError, QueryParameters, SortField, SortState, validate_date_range,
};

/// Availability of the previous/next page controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PageControls {
    pub fn for_page(page: &ListPage) -> Self {
        Self {
            prev_enabled: page.has_prev(),
            next_enabled: page.has_next(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryStateController {
    params: QueryParameters,
    /// Search text being typed; not part of the query until committed.
    search_input: String,
}

impl QueryStateController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the defaults with a configured page size.
    pub fn with_limit(limit: PageLimit) -> Self {
        Self {
            params: QueryParameters::with_limit(limit),
            search_input: String::new(),
        }
    }

    /// Immutable snapshot for the fetcher.
    pub fn params(&self) -> QueryParameters {
        self.params.clone()
    }

    /// Borrowed view for rendering and key comparison.
    pub fn current(&self) -> &QueryParameters {
        &self.params
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Clicking the same column while ascending flips to descending; any other
    /// click sorts ascending by `field`.
    pub fn set_sort(&mut self, field: SortField) -> bool {
        let next = SortState::toggle(self.params.sort, field);
        debug!("sort: {:?} -> {:?}", self.params.sort, next);
        self.update_context(|p| p.sort = Some(next))
    }

    pub fn set_category(&mut self, category: Option<Category>) -> bool {
        self.update_context(|p| p.category = category)
    }

    /// Stages search text without touching the query.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_input = term.into();
    }

    /// Commits the staged text, trimmed; blank text clears the search.
    pub fn commit_search(&mut self) -> bool {
        let trimmed = self.search_input.trim();
        let search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.update_context(|p| p.search = search)
    }

    /// Clears the staged text and the committed search together.
    pub fn reset_search(&mut self) -> bool {
        self.search_input.clear();
        self.update_context(|p| p.search = None)
    }

    /// Rejects out-of-range sizes and leaves the state untouched.
    pub fn set_limit(&mut self, limit: i64) -> Result<bool, QueryError> {
        let limit = PageLimit::new(limit)?;
        Ok(self.update_context(|p| p.limit = limit))
    }

    /// Replaces both date bounds. Invalid or reversed bounds leave the state
    /// untouched.
    pub fn set_date_range(
        &mut self,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<bool, QueryError> {
        let from = from.filter(|s| !s.trim().is_empty());
        let to = to.filter(|s| !s.trim().is_empty());
        validate_date_range(from.as_deref(), to.as_deref())?;
        Ok(self.update_context(|p| {
            p.from = from;
            p.to = to;
        }))
    }

    /// No-op without a cursor: an absent cursor means there is no next page.
    pub fn go_to_next_page(&mut self, cursor: Option<&str>) -> bool {
        match cursor.filter(|c| !c.is_empty()) {
            Some(token) => self.move_to(Cursor::Next(token.to_string())),
            None => false,
        }
    }

    /// Mirror of `go_to_next_page` for the backward direction.
    pub fn go_to_prev_page(&mut self, cursor: Option<&str>) -> bool {
        match cursor.filter(|c| !c.is_empty()) {
            Some(token) => self.move_to(Cursor::Prev(token.to_string())),
            None => false,
        }
    }

    /// Changes the filter/sort context and drops any cursor.
    fn update_context(&mut self, apply: impl FnOnce(&mut QueryParameters)) -> bool {
        let before = self.params.clone();
        apply(&mut self.params);
        self.params.cursor = None;
        before != self.params
    }

    /// Changes only the page position.
    fn move_to(&mut self, cursor: Cursor) -> bool {
        let changed = self.params.cursor.as_ref() != Some(&cursor);
        debug!("page position: {:?}", cursor);
        self.params.cursor = Some(cursor);
        changed
    }
}
