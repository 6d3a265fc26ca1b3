//! # Post Table Component
//!
//! The list of posts on the current page, with row selection and a
//! two-step delete (press `d` twice).
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `PostTableState` lives in `TuiState`
//! - `PostTable` is created each frame with borrowed state and posts

use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Row, Table, TableState};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::{Category, Post};
use crate::core::query::{SortField, SortState};
use crate::tui::event::TuiEvent;

/// Persistent state for the post table.
#[derive(Default)]
pub struct PostTableState {
    pub selected: usize,
    pub confirm_delete: bool,
    pub table_state: TableState,
}

/// Events emitted by the post table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Delete(String),
}

impl PostTableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the first row, e.g. after a new page arrived.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.confirm_delete = false;
    }

    /// Handle a key event against the rows currently shown.
    pub fn handle_event(&mut self, event: &TuiEvent, posts: &[Post]) -> Option<TableEvent> {
        // Any other key cancels a pending delete confirmation
        let is_delete_key = matches!(event, TuiEvent::InputChar('d'));
        if !is_delete_key {
            self.confirm_delete = false;
        }

        match event {
            TuiEvent::CursorUp | TuiEvent::InputChar('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown | TuiEvent::InputChar('j') => {
                if !posts.is_empty() {
                    self.selected = (self.selected + 1).min(posts.len() - 1);
                }
                None
            }
            TuiEvent::InputChar('d') => {
                let post = posts.get(self.selected)?;
                if self.confirm_delete {
                    self.confirm_delete = false;
                    Some(TableEvent::Delete(post.id.clone()))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the post table.
pub struct PostTable<'a> {
    state: &'a mut PostTableState,
    posts: &'a [Post],
    sort: Option<SortState>,
}

impl<'a> PostTable<'a> {
    pub fn new(state: &'a mut PostTableState, posts: &'a [Post], sort: Option<SortState>) -> Self {
        Self { state, posts, sort }
    }

    fn header_label(&self, label: &str, field: SortField) -> String {
        match self.sort {
            Some(sort) if sort.field == field => format!("{} {}", label, sort.order.arrow()),
            _ => label.to_string(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let help_text = if self.state.confirm_delete {
            " Press d again to delete | any other key cancels "
        } else {
            " ↑↓ select  ←→ page  t/c sort  f category  / search  x clear  d delete  r reload  q quit "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Posts ")
            .title_bottom(Line::from(help_text).centered());

        // Fixed columns: date(10) + category(6) + tags(20) + spacing
        let title_width = area.width.saturating_sub(2 + 10 + 6 + 20 + 3) as usize;

        if !self.posts.is_empty() {
            self.state.selected = self.state.selected.min(self.posts.len() - 1);
            self.state.table_state.select(Some(self.state.selected));
        } else {
            self.state.table_state.select(None);
        }

        let rows: Vec<Row> = self
            .posts
            .iter()
            .map(|post| {
                Row::new(vec![
                    format_date(post.created_at),
                    category_badge(post.category).to_string(),
                    truncate_str(&post.title, title_width),
                    truncate_str(&post.tags.join(", "), 20),
                ])
            })
            .collect();

        let selected_style = if self.state.confirm_delete {
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        };

        let header = Row::new(vec![
            self.header_label("Date", SortField::CreatedAt),
            "Cat".to_string(),
            self.header_label("Title", SortField::Title),
            "Tags".to_string(),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Min(10),
                Constraint::Length(20),
            ],
        )
        .header(header)
        .block(block)
        .style(Style::default().fg(Color::Gray))
        .row_highlight_style(selected_style);

        frame.render_stateful_widget(table, area, &mut self.state.table_state);
    }
}

fn category_badge(category: Category) -> &'static str {
    match category {
        Category::Notice => "공지",
        Category::Qna => "Q&A",
        Category::Free => "자유",
    }
}

/// Format a timestamp as a local "2025-01-15" date.
fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Truncate to `max_width` terminal cells, adding "..." if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 3 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}
