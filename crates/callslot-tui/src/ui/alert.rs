//! Alert overlay
//!
//! Blocking notice drawn over the current screen until acknowledged.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered;
use crate::Alert;

const ALERT_WIDTH: u16 = 50;
const ALERT_HEIGHT: u16 = 7;

/// Render the alert centered in `area`.
pub fn render(frame: &mut Frame, alert: &Alert, area: Rect) {
    let popup = centered(area, ALERT_WIDTH, ALERT_HEIGHT);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", alert.title),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(Color::Yellow));

    let lines = vec![
        Line::from(alert.message.as_str()),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().add_modifier(Modifier::BOLD))),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}
