//! Call slot TUI entry point.

use std::{collections::BTreeSet, fs::File, path::PathBuf, sync::Mutex, time::Duration};

use callslot_app::{App, Bridge, Runtime};
use callslot_core::{CoordinatorConfig, Permission, PermissionGate, Presentation, SetupOptions};
use callslot_tui::{LoopbackNative, SystemEnv, TerminalDriver};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Call slot terminal UI
#[derive(Parser, Debug)]
#[command(name = "callslot-tui")]
#[command(about = "Simulate incoming calls against a loopback native call layer")]
#[command(version)]
struct Args {
    /// Display name of the simulated caller
    #[arg(long, default_value = "John Doe")]
    caller: String,

    /// Number of the simulated caller
    #[arg(long, default_value = "123456789")]
    number: String,

    /// Who presents the incoming call
    #[arg(long, value_enum, default_value_t = PresentationArg::InApp)]
    presentation: PresentationArg,

    /// Seconds an accepted call may wait for native confirmation (0 disables)
    #[arg(long, default_value_t = 30)]
    answer_timeout: u64,

    /// Permission the simulated OS refuses (e.g. RECORD_AUDIO); repeatable
    #[arg(long, value_parser = parse_permission)]
    deny: Vec<Permission>,

    /// Delay before the loopback native layer answers a command
    #[arg(long, default_value_t = 300)]
    native_delay_ms: u64,

    /// JSON file with the native setup options
    ///
    /// If not provided, self-managed defaults are used.
    #[arg(long)]
    options: Option<PathBuf>,

    /// File receiving the logs
    #[arg(long, default_value = "callslot.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Incoming call presentation.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresentationArg {
    /// Modal drawn by the application
    InApp,
    /// OS incoming-call UI via `displayIncomingCall`, simulated in a banner
    /// answered with `a` and declined with `r`
    Native,
}

impl From<PresentationArg> for Presentation {
    fn from(arg: PresentationArg) -> Self {
        match arg {
            PresentationArg::InApp => Self::InAppModal,
            PresentationArg::Native => Self::NativeUi,
        }
    }
}

fn parse_permission(name: &str) -> Result<Permission, String> {
    Permission::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Permission::ALL.iter().map(|p| p.name()).collect();
        format!("unknown permission '{name}' (expected one of {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The terminal belongs to the UI, so logs go to a file
    let log_file = File::create(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    let options = match &args.options {
        Some(path) => SetupOptions::from_json(&std::fs::read_to_string(path)?)?,
        None => SetupOptions::self_managed(),
    };

    let answer_timeout =
        (args.answer_timeout > 0).then_some(Duration::from_secs(args.answer_timeout));
    let config = CoordinatorConfig::default()
        .with_presentation(args.presentation.into())
        .with_answer_timeout(answer_timeout);
    let denied: BTreeSet<Permission> = args.deny.into_iter().collect();

    tracing::info!(
        caller = %args.caller,
        presentation = ?args.presentation,
        ?answer_timeout,
        ?denied,
        "starting"
    );

    let native = LoopbackNative::spawn(Duration::from_millis(args.native_delay_ms));
    let driver = TerminalDriver::new(native, denied)?;
    let bridge = Bridge::new(SystemEnv::new(), config, PermissionGate::new(options));
    let runtime = Runtime::new(driver, App::new(args.caller, args.number), bridge);

    Ok(runtime.run().await?)
}
