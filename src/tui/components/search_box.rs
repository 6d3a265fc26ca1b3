//! # SearchBox Component
//!
//! Single-line search field. Typing stages the text; Enter commits it as the
//! search term, Esc stops editing without committing.
//!
//! The buffer is internal state. `editing` and `committed` are props set by
//! the parent each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the SearchBox
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Buffer changed; carries the full text
    Changed(String),
    Commit,
    Cancel,
}

pub struct SearchBox {
    pub buffer: String,
    /// Byte offset of the cursor in `buffer`
    cursor: usize,
    /// Whether keystrokes go to this box (Prop)
    pub editing: bool,
    /// Search currently applied to the list (Prop)
    pub committed: Option<String>,
}

impl SearchBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            editing: false,
            committed: None,
        }
    }

    /// Replaces the buffer, moving the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.len();
    }

    fn changed(&self) -> Option<SearchEvent> {
        Some(SearchEvent::Changed(self.buffer.clone()))
    }

    /// True when the typed text differs from what is applied.
    fn is_pending(&self) -> bool {
        let typed = self.buffer.trim();
        match &self.committed {
            Some(applied) => typed != applied,
            None => !typed.is_empty(),
        }
    }
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map(|(i, _)| i).unwrap_or(0)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(pos)
}

impl Component for SearchBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.is_pending() {
            " Search (Enter to apply) "
        } else {
            " Search "
        };
        let border_style = if self.editing {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title);

        let (text, style) = if self.buffer.is_empty() && !self.editing {
            (
                "press / to search".to_string(),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )
        } else {
            (self.buffer.clone(), Style::default())
        };
        frame.render_widget(Paragraph::new(text).style(style).block(block), area);

        if self.editing {
            // Wide characters (Hangul, CJK) take two cells
            let offset = self.buffer[..self.cursor].width() as u16;
            let max_x = area.x + area.width.saturating_sub(2);
            let x = (area.x + 1 + offset).min(max_x);
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}

impl EventHandler for SearchBox {
    type Event = SearchEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                self.changed()
            }
            TuiEvent::Paste(text) => {
                // Single line only
                let text = text.replace(['\n', '\r'], " ");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                self.changed()
            }
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                self.changed()
            }
            TuiEvent::Delete => {
                if self.cursor >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                self.changed()
            }
            TuiEvent::CursorLeft => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer.len();
                None
            }
            TuiEvent::Submit => Some(SearchEvent::Commit),
            TuiEvent::Escape => Some(SearchEvent::Cancel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(search: &mut SearchBox, s: &str) {
        for c in s.chars() {
            search.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_typing_emits_changed() {
        let mut search = SearchBox::new();
        let res = search.handle_event(&TuiEvent::InputChar('r'));
        assert_eq!(res, Some(SearchEvent::Changed("r".to_string())));
        type_str(&mut search, "ust");
        assert_eq!(search.buffer, "rust");
    }

    #[test]
    fn test_backspace_handles_multibyte() {
        let mut search = SearchBox::new();
        type_str(&mut search, "공지");
        let res = search.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(SearchEvent::Changed("공".to_string())));
    }

    #[test]
    fn test_edit_in_middle() {
        let mut search = SearchBox::new();
        type_str(&mut search, "ac");
        search.handle_event(&TuiEvent::CursorLeft);
        type_str(&mut search, "b");
        assert_eq!(search.buffer, "abc");
        search.handle_event(&TuiEvent::CursorHome);
        search.handle_event(&TuiEvent::Delete);
        assert_eq!(search.buffer, "bc");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut search = SearchBox::new();
        assert_eq!(search.handle_event(&TuiEvent::Backspace), None);
    }

    #[test]
    fn test_enter_and_escape() {
        let mut search = SearchBox::new();
        assert_eq!(search.handle_event(&TuiEvent::Submit), Some(SearchEvent::Commit));
        assert_eq!(search.handle_event(&TuiEvent::Escape), Some(SearchEvent::Cancel));
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut search = SearchBox::new();
        search.handle_event(&TuiEvent::Paste("a\nb".to_string()));
        assert_eq!(search.buffer, "a b");
    }

    #[test]
    fn test_pending_marker() {
        let backend = TestBackend::new(40, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut search = SearchBox::new();
        search.set_text("rust");

        terminal.draw(|f| search.render(f, f.area())).unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.contains("Enter to apply"));

        search.committed = Some("rust".to_string());
        assert!(!search.is_pending());
    }
}
