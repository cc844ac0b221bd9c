//! Call screens
//!
//! Home screen, the incoming-call modal, the banner for a call ringing on
//! the OS UI and the ongoing-call screen.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::centered;
use crate::{App, PermissionView};

const MODAL_WIDTH: u16 = 40;
const MODAL_HEIGHT: u16 = 7;

/// Render the idle screen.
pub fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Call Slot ");

    let button_style = if app.permissions() == PermissionView::Granted {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("Caller: "),
            Span::styled(app.caller(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" ({})", app.phone_number()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("[i] Simulate incoming call", button_style)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(block);
    frame.render_widget(paragraph, area);
}

/// Render the incoming-call modal over `area`.
pub fn render_incoming(frame: &mut Frame, caller: &str, number: &str, area: Rect) {
    let modal = centered(area, MODAL_WIDTH, MODAL_HEIGHT);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Incoming call ")
        .border_style(Style::default().fg(Color::Yellow));

    let lines = vec![
        Line::from(Span::styled(caller, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(number, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[a] Accept", Style::default().fg(Color::Green)),
            Span::raw("    "),
            Span::styled("[r] Reject", Style::default().fg(Color::Red)),
        ]),
    ];

    frame.render_widget(Clear, modal);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center).block(block), modal);
}

/// Render the system-UI ringing banner at the bottom of `area`.
pub fn render_ringing(frame: &mut Frame, caller: &str, area: Rect) {
    const BANNER_HEIGHT: u16 = 3;

    let height = BANNER_HEIGHT.min(area.height);
    let banner = Rect { y: area.bottom() - height, height, ..area };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" System call UI ")
        .border_style(Style::default().fg(Color::Yellow));
    let line = Line::from(vec![
        Span::styled(caller, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" ringing  "),
        Span::styled("[a] Answer", Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled("[r] Decline", Style::default().fg(Color::Red)),
    ]);

    frame.render_widget(Clear, banner);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center).block(block), banner);
}

/// Render the ongoing-call screen.
pub fn render_ongoing(frame: &mut Frame, caller: &str, elapsed: Duration, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Ongoing call ")
        .border_style(Style::default().fg(Color::Green));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(caller, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            format_elapsed(elapsed),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("[h] Hang up", Style::default().fg(Color::Red))),
    ];

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center).block(block), area);
}

/// `mm:ss`; minutes keep counting past the hour.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
