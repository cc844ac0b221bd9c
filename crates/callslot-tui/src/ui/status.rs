//! Status bar
//!
//! Displays permission status and the latest status message.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{App, PermissionView};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let permissions = match app.permissions() {
        PermissionView::Unknown => Span::styled("Not set up", Style::default().fg(Color::Yellow)),
        PermissionView::Requesting => {
            Span::styled("Requesting...", Style::default().fg(Color::Yellow))
        },
        PermissionView::Granted => Span::styled(
            "Ready",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        PermissionView::Denied => {
            Span::styled("Permissions denied", Style::default().fg(Color::Red))
        },
    };

    let message = app.status_message().map_or_else(String::new, |m| format!(" | {m}"));

    let status_line = Line::from(vec![
        Span::raw(" "),
        permissions,
        Span::styled(format!(" | {}", app.screen().name()), Style::default().fg(Color::Gray)),
        Span::raw(message),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
