//! # Drive Teleop
//!
//! Drive a differential-drive robot from a gamepad.
//!
//! Reads the gamepad through evdev on a dedicated thread and runs the
//! operator-control loop on a fixed tick. Actuator and rumble commands go to
//! the log until real hardware sinks are attached.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drive_teleop::config::{Config, LoggingConfig};
use drive_teleop::control::ControlLoop;
use drive_teleop::controller::gamepad::Gamepad;
use drive_teleop::controller::mapper::{EventMapper, GamepadState};
use drive_teleop::hal::console::{ConsoleActuators, ConsoleHaptics, NoHeadingSensor, WatchInput};

/// Config file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of ticks between status log messages
const STATUS_INTERVAL_TICKS: u64 = 500;

/// Delay between attempts to reopen a lost gamepad
const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Prefix for daily log files
const LOG_FILE_PREFIX: &str = "drive-teleop.log";

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (argument, then `config/default.toml`, then built-in defaults)
///    - Set up logging
///    - Open the gamepad and start the event reader thread
///    - Build the control loop and run mode entry
///
/// 2. **Main Loop**
///    - Take the latest gamepad snapshot and run one control tick
///    - Log status every 500 ticks
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Run mode exit: stop all outputs, silence rumble
///
/// # Errors
///
/// Returns error if the configuration is invalid, no gamepad is found, or
/// the gamepad lacks a bound channel.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(std::env::args().nth(1).map(PathBuf::from))?;
    let _log_guard = init_logging(&config.logging)?;

    info!("Drive Teleop v{} starting...", env!("CARGO_PKG_VERSION"));

    let device_path = (!config.controller.device_path.is_empty())
        .then(|| PathBuf::from(&config.controller.device_path));
    let gamepad = Gamepad::open(device_path.as_deref())?;
    info!(
        "Gamepad: {} ({})",
        gamepad.name().unwrap_or("unnamed"),
        gamepad.device_path()
    );

    let (tx, rx) = watch::channel(GamepadState::default());
    // Plain thread: evdev reads block and must not hold up runtime shutdown
    std::thread::Builder::new()
        .name("gamepad-reader".to_string())
        .spawn(move || read_gamepad(gamepad, device_path.as_deref(), &tx))
        .context("Failed to start gamepad reader")?;

    let mut teleop = ControlLoop::new(
        &config,
        WatchInput::new(rx),
        ConsoleActuators::default(),
        ConsoleHaptics,
        NoHeadingSensor,
    )?;
    teleop.init();

    let mut ticker = interval(config.timing.period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Starting control loop at {}Hz", config.timing.tick_rate_hz);
    info!("Press Ctrl+C to exit");

    let mut tick_count: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let was_connected = teleop.input_mut().is_connected();
                if !teleop.input_mut().refresh() && was_connected {
                    warn!("Gamepad lost; driving with released inputs");
                }

                let speeds = teleop.periodic(Instant::now());
                tick_count += 1;

                if tick_count % STATUS_INTERVAL_TICKS == 0 {
                    info!(
                        "Tick {}: wheels=({:+.2}, {:+.2}){}",
                        tick_count,
                        speeds.left,
                        speeds.right,
                        if teleop.is_stopped() { " [STOPPED]" } else { "" }
                    );
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    teleop.disable();
    info!("Total ticks: {}", tick_count);

    Ok(())
}

/// Loads the config at `path`, falling back to the default file and then to
/// built-in defaults.
fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => PathBuf::from(DEFAULT_CONFIG_PATH),
        None => return Ok(Config::default()),
    };
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Installs the tracing subscriber: stdout always, plus a daily file when a
/// log directory is configured.
///
/// The returned guard must be kept alive to flush the file writer.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: Level = logging
        .level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let (file_layer, guard) = if logging.dir.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&logging.dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Folds gamepad events into snapshots and publishes each change.
///
/// When the gamepad fails, inputs are released at once and the device is
/// reopened. Returns once the control loop drops its receiver.
fn read_gamepad(
    mut gamepad: Gamepad,
    device_path: Option<&Path>,
    tx: &watch::Sender<GamepadState>,
) {
    let mut mapper = EventMapper::with_ranges(gamepad.axis_ranges());

    loop {
        match pump_events(&mut gamepad, &mut mapper, tx) {
            Ok(()) => return,
            Err(e) => warn!("{}; waiting for gamepad", e),
        }

        mapper.reset();
        if tx.send(mapper.state_snapshot()).is_err() {
            return;
        }

        gamepad = match reopen(device_path, tx) {
            Some(gamepad) => gamepad,
            None => return,
        };
        mapper = EventMapper::with_ranges(gamepad.axis_ranges());
        info!("Gamepad reconnected at {}", gamepad.device_path());
    }
}

/// Publishes snapshots until the receiver goes away (`Ok`) or a read fails.
fn pump_events(
    gamepad: &mut Gamepad,
    mapper: &mut EventMapper,
    tx: &watch::Sender<GamepadState>,
) -> drive_teleop::error::Result<()> {
    loop {
        let mut changed = false;
        for event in gamepad.fetch_events()? {
            changed |= mapper.process_event(&event);
        }

        if changed && tx.send(mapper.state_snapshot()).is_err() {
            return Ok(());
        }
    }
}

/// Retries opening the gamepad until it succeeds or the receiver goes away.
fn reopen(device_path: Option<&Path>, tx: &watch::Sender<GamepadState>) -> Option<Gamepad> {
    while !tx.is_closed() {
        match Gamepad::open(device_path) {
            Ok(gamepad) => return Some(gamepad),
            Err(e) => debug!("Reconnect failed: {}", e),
        }
        std::thread::sleep(RECONNECT_INTERVAL);
    }
    None
}
