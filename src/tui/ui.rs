use crate::core::controller::PageControls;
use crate::core::state::{App, ListStatus};
use crate::tui::component::Component;
use crate::tui::components::{PostTable, StatusBar};
use crate::tui::{InputMode, TuiState};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Length(3), Min(0), Length(1)]);
    let [status_area, search_area, main_area, footer_area] = layout.areas(frame.area());

    let mut status_bar = StatusBar::new(
        tui.user.clone(),
        app.controller.current().describe(),
        app.status_message.clone(),
    );
    status_bar.session_expired = app.session_expired;
    status_bar.render(frame, status_area);

    tui.search_box.editing = matches!(tui.input_mode, InputMode::Search);
    tui.search_box.committed = app.controller.current().search().map(str::to_string);
    tui.search_box.render(frame, search_area);

    match &app.list {
        ListStatus::Idle => {}
        ListStatus::Loading => draw_loading(frame, main_area, spinner_frame),
        ListStatus::Failed(error) => {
            draw_error_view(frame, main_area, &error.to_string(), app.session_expired)
        }
        ListStatus::Loaded(page) if page.items.is_empty() => draw_empty(frame, main_area),
        ListStatus::Loaded(page) => {
            PostTable::new(&mut tui.post_table, &page.items, app.controller.current().sort())
                .render(frame, main_area);
        }
    }

    draw_footer(frame, footer_area, app.page_controls(), app.controller.current().is_first_page());
}

fn draw_loading(frame: &mut Frame, area: Rect, spinner_frame: usize) {
    let spinner = SPINNER[spinner_frame % SPINNER.len()];
    let paragraph = Paragraph::new(format!("{} Loading posts...", spinner))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::bordered().border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

fn draw_empty(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("No posts match the current filters. Press x to clear search.")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::bordered().border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

fn draw_error_view(frame: &mut Frame, area: Rect, error_msg: &str, session_expired: bool) {
    let hint = if session_expired {
        "Run `postboard login` and restart to sign in again."
    } else {
        "Press r to retry."
    };
    let text = vec![
        Line::from(error_msg.to_string()),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().add_modifier(Modifier::BOLD))),
    ];
    let error_paragraph = Paragraph::new(text)
        .block(
            Block::bordered()
                .title("ERROR")
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(error_paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, controls: PageControls, first_page: bool) {
    let enabled = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);

    let line = Line::from(vec![
        Span::styled(
            "◀ prev",
            if controls.prev_enabled { enabled } else { disabled },
        ),
        Span::raw(if first_page { "   first page   " } else { "   " }),
        Span::styled(
            "next ▶",
            if controls.next_enabled { enabled } else { disabled },
        ),
    ]);
    frame.render_widget(line.centered(), area);
}
