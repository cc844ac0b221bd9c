//! Property-based tests for App state machine.
//!
//! Tests verify that view-model properties hold under arbitrary event
//! sequences.

use std::time::Duration;

use callslot_app::{App, AppAction, AppEvent, KeyInput, PermissionView, Screen};
use callslot_core::{CallId, EndReason};
use proptest::prelude::*;

/// Generate random key inputs.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        4 => prop::sample::select(vec!['i', 'a', 'r', 'h', 'p', 'x', 'z']).prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
    ]
}

fn id_strategy() -> impl Strategy<Value = CallId> {
    (0u8..3).prop_map(|n| CallId::new(format!("call-{n}")))
}

/// Generate random app events, excluding quit keys.
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        6 => key_strategy().prop_map(AppEvent::Key),
        1 => Just(AppEvent::Tick),
        1 => Just(AppEvent::PermissionsGranted),
        1 => Just(AppEvent::PermissionsDenied {
            title: "Permissions Required".into(),
            message: "denied".into()
        }),
        2 => id_strategy().prop_map(|id| AppEvent::IncomingShown { id, caller: "John Doe".into() }),
        1 => Just(AppEvent::IncomingHidden),
        1 => id_strategy().prop_map(|id| AppEvent::Ringing { id, caller: "John Doe".into() }),
        2 => id_strategy().prop_map(|id| AppEvent::OngoingShown { id, caller: "John Doe".into() }),
        1 => Just(AppEvent::OngoingHidden),
        2 => (0u64..600).prop_map(|s| AppEvent::ElapsedChanged { elapsed: Duration::from_secs(s) }),
        1 => id_strategy().prop_map(|id| AppEvent::CallEnded { id, reason: EndReason::Remote }),
        1 => Just(AppEvent::Notice { title: "Call ended!".into(), message: "UUID: x".into() }),
    ]
}

proptest! {
    /// Call intents are never produced while an alert is up.
    #[test]
    fn prop_alert_blocks_call_intents(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut app = App::new("John Doe", "123456789");

        for event in events {
            let blocked = app.alert().is_some() && matches!(event, AppEvent::Key(_));
            let actions = app.handle(event);
            if blocked {
                prop_assert!(
                    actions.iter().all(|a| matches!(a, AppAction::Render | AppAction::Quit))
                );
            }
        }
    }

    /// Incoming calls are only simulated once permissions are granted.
    #[test]
    fn prop_incoming_requires_permissions(
        events in prop::collection::vec(event_strategy(), 0..60),
    ) {
        let mut app = App::new("John Doe", "123456789");

        for event in events {
            let granted = app.permissions() == PermissionView::Granted;
            let actions = app.handle(event);
            if !granted {
                let simulated =
                    actions.iter().any(|a| matches!(a, AppAction::SimulateIncoming { .. }));
                prop_assert!(!simulated);
            }
        }
    }

    /// Hiding a screen never hides a different one.
    #[test]
    fn prop_hide_is_scoped(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut app = App::new("John Doe", "123456789");

        for event in events {
            let before = app.screen().clone();
            let hides_incoming = matches!(event, AppEvent::IncomingHidden);
            let hides_ongoing = matches!(event, AppEvent::OngoingHidden);
            let _ = app.handle(event);

            if hides_incoming && matches!(before, Screen::Ongoing { .. }) {
                prop_assert_eq!(app.screen(), &before);
            }
            if hides_ongoing && matches!(before, Screen::Incoming { .. }) {
                prop_assert_eq!(app.screen(), &before);
            }
        }
    }

    /// Generated events never make the App quit; only q and Esc do.
    #[test]
    fn prop_no_spurious_quit(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut app = App::new("John Doe", "123456789");

        for event in events {
            let actions = app.handle(event);
            prop_assert!(!actions.contains(&AppAction::Quit));
        }
    }
}
