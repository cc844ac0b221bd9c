//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing into the frame.

mod alert;
mod call;
mod help;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
};

use crate::{App, Screen};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 5;
    const HELP_HEIGHT: u16 = 1;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(HELP_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, help_area, status_area] = chunks.as_ref() else {
        return;
    };

    match app.screen() {
        Screen::Home => call::render_home(frame, app, *main_area),
        Screen::Incoming { caller, .. } => {
            call::render_home(frame, app, *main_area);
            call::render_incoming(frame, caller, app.phone_number(), *main_area);
        },
        Screen::Ringing { caller, .. } => {
            call::render_home(frame, app, *main_area);
            call::render_ringing(frame, caller, *main_area);
        },
        Screen::Ongoing { caller, elapsed, .. } => {
            call::render_ongoing(frame, caller, *elapsed, *main_area);
        },
    }

    if let Some(alert) = app.alert() {
        alert::render(frame, alert, *main_area);
    }

    help::render(frame, app, *help_area);
    status::render(frame, app, *status_area);
}

/// Area of `width` x `height` centered in `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use callslot_app::AppEvent;
    use callslot_core::CallId;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).expect("terminal");
        terminal.draw(|frame| render(frame, app)).expect("draw");
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    fn ready_app() -> App {
        let mut app = App::new("John Doe", "123456789");
        let _ = app.handle(AppEvent::PermissionsGranted);
        app
    }

    #[test]
    fn home_offers_incoming_call() {
        let screen = rendered(&ready_app());

        assert!(screen.contains("Simulate incoming call"));
        assert!(screen.contains("Call integration ready"));
    }

    #[test]
    fn incoming_modal_shows_caller() {
        let mut app = ready_app();
        let _ = app.handle(AppEvent::IncomingShown {
            id: CallId::new("c1"),
            caller: "John Doe".into(),
        });

        let screen = rendered(&app);

        assert!(screen.contains("Incoming call"));
        assert!(screen.contains("John Doe"));
        assert!(screen.contains("[a] Accept"));
    }

    #[test]
    fn system_ui_ringing_shows_banner_not_modal() {
        let mut app = ready_app();
        let _ = app.handle(AppEvent::Ringing { id: CallId::new("n1"), caller: "John Doe".into() });

        let screen = rendered(&app);

        assert!(screen.contains("System call UI"));
        assert!(screen.contains("[a] Answer"));
        assert!(!screen.contains("Incoming call"));
    }

    #[test]
    fn ongoing_shows_elapsed_as_minutes_and_seconds() {
        let mut app = ready_app();
        let _ = app.handle(AppEvent::OngoingShown {
            id: CallId::new("c1"),
            caller: "John Doe".into(),
        });
        let _ = app.handle(AppEvent::ElapsedChanged { elapsed: Duration::from_secs(75) });

        let screen = rendered(&app);

        assert!(screen.contains("01:15"));
        assert!(screen.contains("[h] Hang up"));
    }

    #[test]
    fn alert_overlays_screen() {
        let mut app = ready_app();
        let _ = app.handle(AppEvent::Notice {
            title: "Call ended!".into(),
            message: "UUID: c1".into(),
        });

        let screen = rendered(&app);

        assert!(screen.contains("Call ended!"));
        assert!(screen.contains("UUID: c1"));
        assert!(screen.contains("[Enter] OK"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = ready_app();
        let _ = app.handle(AppEvent::PermissionsDenied {
            title: "Permissions Required".into(),
            message: "You must grant all permissions to use call functionality.".into(),
        });

        let mut terminal = Terminal::new(TestBackend::new(8, 4)).expect("terminal");
        terminal.draw(|frame| render(frame, &app)).expect("draw");
    }
}
