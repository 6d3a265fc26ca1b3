//! # StatusBar Component
//!
//! Top line of the screen: who is signed in, the active query context, and
//! the latest status message.
//!
//! Purely presentational. All fields are props copied from `App` each frame:
//!
//! ```rust,ignore
//! let mut bar = StatusBar::new(user, app.controller.current().describe(), app.status_message.clone());
//! bar.session_expired = app.session_expired;
//! bar.render(frame, area);
//! ```

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct StatusBar {
    /// Signed-in email, if known
    pub user: Option<String>,
    /// Filter/sort summary for the current query
    pub context: String,
    pub status_message: String,
    pub session_expired: bool,
}

impl StatusBar {
    pub fn new(user: Option<String>, context: String, status_message: String) -> Self {
        Self {
            user,
            context,
            status_message,
            session_expired: false,
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let who = match (&self.user, self.session_expired) {
            (_, true) => Span::styled(
                "session expired",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            (Some(email), false) => Span::styled(email.clone(), Style::default().fg(Color::Cyan)),
            (None, false) => Span::styled("guest", Style::default().fg(Color::DarkGray)),
        };

        let mut spans = vec![
            Span::styled("Postboard", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" ("),
            who,
            Span::raw(") | "),
            Span::raw(self.context.clone()),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.status_message.clone(),
                Style::default().fg(Color::Yellow),
            ));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
