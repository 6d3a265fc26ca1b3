//! # Query Parameters
//!
//! The full set of filter/sort/pagination fields that identify one requestable
//! page of the post listing. A `QueryParameters` value is both the request
//! sent to `GET /posts` and the cache key for its result.
//!
//! ```text
//! QueryParameters
//! ├── limit: PageLimit            // 1..=100, default 10
//! ├── sort: Option<SortState>     // {field, order}, None = server default
//! ├── category: Option<Category>  // exact match
//! ├── search: Option<String>      // title/body free text, already trimmed
//! ├── from / to: Option<String>   // ISO-8601, inclusive
//! └── cursor: Option<Cursor>      // Next(token) | Prev(token), never both
//! ```
//!
//! Fields are crate-private: only `QueryStateController` mutates them.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use crate::api::Category;

pub const MIN_PAGE_LIMIT: u8 = 1;
pub const MAX_PAGE_LIMIT: u8 = 100;
pub const DEFAULT_PAGE_LIMIT: u8 = 10;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Page size outside `[1, 100]`.
    LimitOutOfRange(i64),
    /// A date bound is not ISO-8601.
    InvalidDate(String),
    /// `from` is after `to`.
    InvalidDateRange { from: String, to: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::LimitOutOfRange(n) => write!(
                f,
                "page limit {n} is outside {MIN_PAGE_LIMIT}..={MAX_PAGE_LIMIT}"
            ),
            QueryError::InvalidDate(s) => write!(f, "'{s}' is not an ISO-8601 date"),
            QueryError::InvalidDateRange { from, to } => {
                write!(f, "date range start {from} is after end {to}")
            }
        }
    }
}

impl std::error::Error for QueryError {}

// ============================================================================
// Field Types
// ============================================================================

/// Page size, guaranteed to be in `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageLimit(u8);

impl PageLimit {
    pub fn new(value: i64) -> Result<Self, QueryError> {
        if (i64::from(MIN_PAGE_LIMIT)..=i64::from(MAX_PAGE_LIMIT)).contains(&value) {
            Ok(PageLimit(value as u8))
        } else {
            Err(QueryError::LimitOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        PageLimit(DEFAULT_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Title,
    CreatedAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "createdAt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Arrow glyph for column headers
    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

/// Sort column and direction as one value, so an order never exists without
/// the field it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortState {
    /// Next state when the user picks `field`: the same field sorted
    /// ascending flips to descending, anything else starts ascending.
    pub fn toggle(current: Option<SortState>, field: SortField) -> SortState {
        match current {
            Some(SortState {
                field: current_field,
                order: SortOrder::Asc,
            }) if current_field == field => SortState {
                field,
                order: SortOrder::Desc,
            },
            _ => SortState {
                field,
                order: SortOrder::Asc,
            },
        }
    }
}

/// Pagination position. Holding it as one enum makes a forward and a backward
/// cursor impossible to set together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cursor {
    Next(String),
    Prev(String),
}

// ============================================================================
// QueryParameters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParameters {
    pub(crate) limit: PageLimit,
    pub(crate) sort: Option<SortState>,
    pub(crate) category: Option<Category>,
    pub(crate) search: Option<String>,
    pub(crate) from: Option<String>,
    pub(crate) to: Option<String>,
    pub(crate) cursor: Option<Cursor>,
}

impl Default for QueryParameters {
    /// First page, newest posts first, no filters.
    fn default() -> Self {
        Self {
            limit: PageLimit::default(),
            sort: Some(SortState {
                field: SortField::CreatedAt,
                order: SortOrder::Desc,
            }),
            category: None,
            search: None,
            from: None,
            to: None,
            cursor: None,
        }
    }
}

impl QueryParameters {
    /// Default parameters with a custom page size.
    pub fn with_limit(limit: PageLimit) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn limit(&self) -> PageLimit {
        self.limit
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn date_range(&self) -> (Option<&str>, Option<&str>) {
        (self.from.as_deref(), self.to.as_deref())
    }

    pub fn next_cursor(&self) -> Option<&str> {
        match &self.cursor {
            Some(Cursor::Next(token)) => Some(token),
            _ => None,
        }
    }

    pub fn prev_cursor(&self) -> Option<&str> {
        match &self.cursor {
            Some(Cursor::Prev(token)) => Some(token),
            _ => None,
        }
    }

    /// True when no cursor is set, i.e. this requests the first page of its
    /// filter/sort context.
    pub fn is_first_page(&self) -> bool {
        self.cursor.is_none()
    }

    /// Re-checks the constraints a request must satisfy before it is sent.
    pub fn validate(&self) -> Result<(), QueryError> {
        let limit = i64::from(self.limit.get());
        PageLimit::new(limit)?;
        validate_date_range(self.from.as_deref(), self.to.as_deref())
    }

    /// Serializes to `GET /posts` query pairs. `limit` is always present,
    /// everything else only when set.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.get().to_string())];
        if let Some(token) = self.prev_cursor() {
            pairs.push(("prevCursor", token.to_string()));
        }
        if let Some(token) = self.next_cursor() {
            pairs.push(("nextCursor", token.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.field.as_str().to_string()));
            pairs.push(("order", sort.order.as_str().to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(from) = &self.from {
            pairs.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            pairs.push(("to", to.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }

    /// One-line summary of the filter/sort context for status displays.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(sort) = self.sort {
            parts.push(format!("sort {} {}", sort.field.as_str(), sort.order.as_str()));
        }
        parts.push(format!(
            "category {}",
            self.category.map(|c| c.as_str()).unwrap_or("all")
        ));
        if let Some(search) = &self.search {
            parts.push(format!("search \"{search}\""));
        }
        match (&self.from, &self.to) {
            (None, None) => {}
            (from, to) => parts.push(format!(
                "{}..{}",
                from.as_deref().unwrap_or(""),
                to.as_deref().unwrap_or("")
            )),
        }
        parts.push(format!("limit {}", self.limit.get()));
        parts.join(" · ")
    }
}

// ============================================================================
// Date Bounds
// ============================================================================

/// Parses `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_iso_date(value: &str) -> Result<DateTime<Utc>, QueryError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| QueryError::InvalidDate(value.to_string()))
}

pub(crate) fn validate_date_range(from: Option<&str>, to: Option<&str>) -> Result<(), QueryError> {
    let parsed_from = from.map(parse_iso_date).transpose()?;
    let parsed_to = to.map(parse_iso_date).transpose()?;
    if let (Some(start), Some(end)) = (parsed_from, parsed_to)
        && start > end
    {
        return Err(QueryError::InvalidDateRange {
            from: from.unwrap_or_default().to_string(),
            to: to.unwrap_or_default().to_string(),
        });
    }
    Ok(())
}
