//! Pi-sensor-control binary: probe the bus, program a mode, stream, stop.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};

use pi_sensor_control::{
    configure_mode, probe_device, start_streaming, stop_streaming, CaptureParams, LinuxI2cBus,
    Registry,
};

const DEFAULT_DEVICE: &str = "/dev/i2c-0";
const DEFAULT_TIMEOUT_MS: u64 = 5000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid {name}: {value}")),
        Err(_) => Ok(default),
    }
}

fn run() -> Result<()> {
    let device = std::env::var("PI_SENSOR_I2C_DEVICE").unwrap_or_else(|_| DEFAULT_DEVICE.to_owned());
    let mode_index: usize = env_or("PI_SENSOR_MODE", 0)?;
    let timeout_ms: u64 = env_or("PI_SENSOR_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;

    let registry = Registry::builtin();
    let sensor = probe_device(&device, registry.sensors())?;

    let mut mode = sensor.working_mode(mode_index)?;
    for issue in configure_mode(sensor, &mut mode, &CaptureParams::default()) {
        warn!("{issue}");
    }

    info!(
        "Mode {mode_index}: {}x{} {}",
        mode.width,
        mode.height,
        mode.fourcc(None)?
    );

    {
        let mut bus = LinuxI2cBus::open(&device)?;
        let report = start_streaming(&mut bus, sensor, &mode)?;
        if !report.is_clean() {
            warn!("{} register writes failed", report.failures.len());
        }
    }

    std::thread::sleep(Duration::from_millis(timeout_ms));

    let mut bus = LinuxI2cBus::open(&device)?;
    stop_streaming(&mut bus, sensor)?;
    Ok(())
}
