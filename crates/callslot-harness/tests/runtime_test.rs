//! End-to-end tests for the runtime loop.
//!
//! # Test Strategy
//!
//! Each test scripts what a user does in the TUI, runs the real
//! [`Runtime`] against a [`SimDriver`] on virtual time, then checks what the
//! simulated platform observed:
//! - Native commands dispatched, in order
//! - Listener registration and release
//! - Screens and alerts rendered

use std::time::Duration;

use callslot_app::{App, Bridge, KeyInput, Runtime};
use callslot_core::{
    CoordinatorConfig, NativeCommand, NativeEventKind, Permission, PermissionGate, Presentation,
    SetupOptions,
};
use callslot_harness::{SimDriver, SimDriverError, SimEnv, SimProbe, SimStep};

fn key(c: char) -> SimStep {
    SimStep::Key(KeyInput::Char(c))
}

fn wait(millis: u64) -> SimStep {
    SimStep::Wait(Duration::from_millis(millis))
}

async fn run_with(
    driver: SimDriver,
    env: SimEnv,
    config: CoordinatorConfig,
) -> (Result<(), SimDriverError>, SimProbe) {
    let probe = driver.probe();
    let bridge = Bridge::new(env, config, PermissionGate::new(SetupOptions::self_managed()));
    let runtime = Runtime::new(driver, App::new("John Doe", "123456789"), bridge);
    (runtime.run().await, probe)
}

/// Method names of dispatched commands.
fn command_names(probe: &SimProbe) -> Vec<&'static str> {
    probe.commands().iter().map(NativeCommand::name).collect()
}

/// Accept, talk, hang up.
///
/// TUI behavior:
/// - Permissions are granted at startup and setup runs once
/// - Incoming modal, then the ongoing screen with a ticking duration
/// - Hang up returns to home; the echoed endCall changes nothing
#[tokio::test]
async fn accept_talk_hang_up() {
    let env = SimEnv::with_seed(1);
    let driver = SimDriver::new(env.clone()).with_script([
        key('i'),
        key('a'),
        wait(3_000),
        key('h'),
        wait(300),
    ]);

    let (result, probe) = run_with(driver, env, CoordinatorConfig::default()).await;
    assert_eq!(result, Ok(()));

    assert_eq!(command_names(&probe), vec![
        "setup",
        "startCall",
        "setCurrentCallActive",
        "endCall"
    ]);
    assert_eq!(probe.permission_requests(), vec![Permission::ALL.to_vec()]);

    let renders = probe.renders();
    assert!(renders.iter().any(|r| r.screen == "incoming"));
    let longest = renders.iter().filter_map(|r| r.elapsed).max();
    assert!(longest >= Some(Duration::from_secs(2)), "duration should tick, got {longest:?}");
    assert_eq!(probe.last_render().map(|r| r.screen), Some("home"));
}

/// Listeners are registered once and all released on exit.
#[tokio::test]
async fn subscriptions_released_on_exit() {
    let env = SimEnv::with_seed(2);
    let driver = SimDriver::new(env.clone());

    let (result, probe) = run_with(driver, env, CoordinatorConfig::default()).await;
    assert_eq!(result, Ok(()));

    assert!(probe.subscribed().is_empty());
    let mut released = probe.released();
    released.sort();
    assert_eq!(released, NativeEventKind::ALL.to_vec());
    assert!(probe.is_stopped());
}

/// Remote party hangs up an active call.
#[tokio::test]
async fn remote_hang_up_shows_notice() {
    let env = SimEnv::with_seed(3);
    let driver = SimDriver::new(env.clone()).with_script([
        key('i'),
        key('a'),
        wait(1_500),
        SimStep::RemoteHangUp,
        wait(200),
    ]);

    let (result, probe) = run_with(driver, env, CoordinatorConfig::default()).await;
    assert_eq!(result, Ok(()));

    assert_eq!(command_names(&probe), vec!["setup", "startCall", "setCurrentCallActive"]);
    let last = probe.last_render().expect("rendered");
    assert_eq!(last.screen, "home");
    assert_eq!(last.alert.as_deref(), Some("Call ended!"));
}

/// One denied capability blocks setup and the call UI.
#[tokio::test]
async fn denied_permission_blocks_setup() {
    let env = SimEnv::with_seed(4);
    let driver = SimDriver::new(env.clone()).deny(Permission::RecordAudio).with_script([
        key('i'),
        SimStep::Key(KeyInput::Enter),
        key('p'),
        SimStep::Key(KeyInput::Enter),
        key('i'),
    ]);

    let (result, probe) = run_with(driver, env, CoordinatorConfig::default()).await;
    assert_eq!(result, Ok(()));

    assert!(probe.commands().is_empty(), "setup must never run");
    assert_eq!(probe.permission_requests().len(), 2);
    assert!(probe.renders().iter().all(|r| r.screen == "home"));
    assert!(
        probe.renders().iter().any(|r| r.alert.as_deref() == Some("Permissions Required"))
    );
}

/// Permission request failure is absorbed like a denial.
#[tokio::test]
async fn permission_request_failure_is_recoverable() {
    let env = SimEnv::with_seed(5);
    let driver = SimDriver::new(env.clone()).fail_permission_requests();

    let (result, probe) = run_with(driver, env, CoordinatorConfig::default()).await;
    assert_eq!(result, Ok(()));
    assert!(probe.commands().is_empty());
    assert!(
        probe.renders().iter().any(|r| r.alert.as_deref() == Some("Permissions Required"))
    );
}

/// Accepted call never confirmed by the native layer.
#[tokio::test]
async fn unconfirmed_accept_times_out() {
    let env = SimEnv::with_seed(6);
    let driver = SimDriver::new(env.clone())
        .without_confirmation()
        .with_script([key('i'), key('a'), wait(2_500)]);
    let config = CoordinatorConfig::default().with_answer_timeout(Some(Duration::from_secs(2)));

    let (result, probe) = run_with(driver, env, config).await;
    assert_eq!(result, Ok(()));

    assert_eq!(command_names(&probe), vec!["setup", "startCall", "endCall"]);
    assert_eq!(probe.last_render().and_then(|r| r.alert).as_deref(), Some("Call failed"));
}

/// Native presentation: the call rings on the OS UI and is answered there.
///
/// TUI behavior:
/// - The app shows a ringing banner, never the in-app modal
/// - answerCall from the OS UI activates the call without startCall
/// - Hang up ends it like any other call
#[tokio::test]
async fn native_presentation_answered_on_os_ui() {
    let env = SimEnv::with_seed(7);
    let driver = SimDriver::new(env.clone()).with_script([
        key('i'),
        SimStep::AnswerNatively,
        wait(1_200),
        key('h'),
    ]);
    let config = CoordinatorConfig::default().with_presentation(Presentation::NativeUi);

    let (result, probe) = run_with(driver, env, config).await;
    assert_eq!(result, Ok(()));

    assert_eq!(command_names(&probe), vec![
        "setup",
        "displayIncomingCall",
        "setCurrentCallActive",
        "endCall"
    ]);
    let renders = probe.renders();
    assert!(renders.iter().any(|r| r.screen == "ringing"));
    assert!(renders.iter().all(|r| r.screen != "incoming"));
    assert!(renders.iter().any(|r| r.elapsed >= Some(Duration::from_secs(1))));
    assert_eq!(probe.last_render().map(|r| r.screen), Some("home"));
}

/// Declining on the OS UI ends the ringing call and clears the banner.
#[tokio::test]
async fn native_presentation_declined_on_os_ui() {
    let env = SimEnv::with_seed(10);
    let driver = SimDriver::new(env.clone()).with_script([
        key('i'),
        SimStep::DeclineNatively,
        wait(200),
    ]);
    let config = CoordinatorConfig::default().with_presentation(Presentation::NativeUi);

    let (result, probe) = run_with(driver, env, config).await;
    assert_eq!(result, Ok(()));

    assert_eq!(command_names(&probe), vec!["setup", "displayIncomingCall"]);
    let last = probe.last_render().expect("rendered");
    assert_eq!(last.screen, "home");
    assert_eq!(last.alert.as_deref(), Some("Call ended!"));
}

/// Native presentation still honors the in-app accept key.
#[tokio::test]
async fn native_presentation_accepts_in_app() {
    let env = SimEnv::with_seed(11);
    let driver =
        SimDriver::new(env.clone()).with_script([key('i'), key('a'), wait(1_200), key('h')]);
    let config = CoordinatorConfig::default().with_presentation(Presentation::NativeUi);

    let (result, probe) = run_with(driver, env, config).await;
    assert_eq!(result, Ok(()));

    assert_eq!(command_names(&probe), vec![
        "setup",
        "displayIncomingCall",
        "startCall",
        "setCurrentCallActive",
        "endCall"
    ]);
    assert!(probe.renders().iter().all(|r| r.screen != "incoming"));
}

/// A refused listener aborts startup and releases what was registered.
#[tokio::test]
async fn refused_subscription_propagates() {
    let env = SimEnv::with_seed(8);
    let driver = SimDriver::new(env.clone()).refuse_subscription(NativeEventKind::EndCall);

    let (result, probe) = run_with(driver, env, CoordinatorConfig::default()).await;
    assert_eq!(result, Err(SimDriverError::Subscribe("endCall")));

    assert_eq!(probe.released(), vec![NativeEventKind::AnswerCall]);
    assert!(probe.subscribed().is_empty());
    assert!(probe.is_stopped());
}

/// Native layer faults are not absorbed.
#[tokio::test]
async fn native_fault_propagates() {
    let env = SimEnv::with_seed(9);
    let driver = SimDriver::new(env.clone()).fail_commands().with_script([key('i'), key('a')]);

    let (result, probe) = run_with(driver, env, CoordinatorConfig::default()).await;
    assert!(matches!(result, Err(SimDriverError::Native(_))));
    assert!(probe.is_stopped());
}
