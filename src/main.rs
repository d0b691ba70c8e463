use std::convert::Infallible;

use clap::Command;

use rotwatch::backends::{DisplayConfig, HyprctlDispatcher};
use rotwatch::control::Controller;
use rotwatch::daemon::{self, ToggleWatch};
use rotwatch::error::Result;
use rotwatch::query::SensorProxyQuery;
use rotwatch::sensors::{monitor_sensor, MonitorSensor};
use rotwatch::toggle::ToggleStore;

fn cli() -> Command<'static> {
    Command::new("rotwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rotates the display, touchscreen and tablet to follow the accelerometer")
        .after_help("Rotation is paused while ~/.config/hypr/rotation-toggle holds 0.")
}

fn start() -> Result<Infallible> {
    let toggle = ToggleStore::new(ToggleStore::default_path()?);
    toggle.ensure_exists()?;

    let watch = ToggleWatch::new(toggle.path())?;
    let sensor = MonitorSensor::start(monitor_sensor::DEFAULT_COMMAND)?;

    let config = DisplayConfig::default();
    tracing::info!(
        monitor = %config.monitor,
        resolution = %config.resolution,
        position = %config.position,
        scale = %config.scale,
        "display configuration"
    );

    let controller = Controller::new(
        toggle,
        sensor,
        SensorProxyQuery::default(),
        HyprctlDispatcher::new(config),
    );
    daemon::run(controller, watch)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn main() {
    init_tracing();
    let _ = cli().get_matches();

    if let Err(err) = start() {
        tracing::error!(error = %err, "rotwatch cannot start");
        std::process::exit(1);
    }
}
