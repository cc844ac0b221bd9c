//! Key help line

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::{App, Screen};

/// Render the keys valid on the current screen.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let keys = if app.alert().is_some() {
        " Enter dismiss | q quit"
    } else {
        match app.screen() {
            Screen::Home => " i incoming | p permissions | q quit",
            Screen::Incoming { .. } => " a accept | r reject | x remote hang-up | q quit",
            Screen::Ringing { .. } => {
                " a answer (system UI) | r decline (system UI) | x remote hang-up | q quit"
            },
            Screen::Ongoing { .. } => " h hang up | x remote hang-up | q quit",
        }
    };

    frame.render_widget(Paragraph::new(keys).style(Style::default().fg(Color::DarkGray)), area);
}
