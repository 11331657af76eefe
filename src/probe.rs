//! Sensor identification on the control bus.

use log::{debug, error, info, warn};

use crate::device::LinuxI2cBus;
use crate::registry::{SensorDescriptor, Width};
use crate::traits::{ControlError, RegisterBus, Result};

/// Read the identification register of `sensor`, most significant byte first.
fn read_ident<B: RegisterBus>(bus: &mut B, sensor: &SensorDescriptor) -> Result<u16> {
    let ident = sensor.ident;
    let [high, low] = ident.register.to_be_bytes();
    let register = match sensor.addressing {
        Width::One => vec![low],
        Width::Two => vec![high, low],
    };

    let mut buf = [0u8; 2];
    let read = buf
        .get_mut(..usize::from(ident.length))
        .ok_or_else(|| ControlError::Bus(format!("ident length {} too long", ident.length)))?;
    bus.write_read(sensor.address, &register, read)?;

    Ok(read
        .iter()
        .fold(0u16, |value, byte| (value << 8) | u16::from(*byte)))
}

/// Find the first candidate whose identification register matches.
///
/// Candidates are tried in order. Failed transactions count as a mismatch;
/// candidates with an identification length outside `1..=2` are skipped.
pub fn probe<'a, B: RegisterBus>(
    bus: &mut B,
    candidates: &'a [SensorDescriptor],
) -> Result<&'a SensorDescriptor> {
    for sensor in candidates {
        if !(1..=2).contains(&sensor.ident.length) {
            warn!(
                "Skipping {}: unsupported ident length {}",
                sensor.name, sensor.ident.length
            );
            continue;
        }

        match read_ident(bus, sensor) {
            Ok(value) if value == sensor.ident.value => {
                info!("Found sensor {} at address {:02X}", sensor.name, sensor.address);
                return Ok(sensor);
            }
            Ok(value) => debug!(
                "{}: ident {:04X} read {value:04X}, expected {:04X}",
                sensor.name, sensor.ident.register, sensor.ident.value
            ),
            Err(err) => debug!("{}: no answer at {:02X}: {err}", sensor.name, sensor.address),
        }
    }
    Err(ControlError::DeviceNotFound)
}

/// Open the bus at `path` and probe it.
///
/// A bus that cannot be opened finds no sensor.
pub fn probe_device<'a>(
    path: &str,
    candidates: &'a [SensorDescriptor],
) -> Result<&'a SensorDescriptor> {
    let mut bus = LinuxI2cBus::open(path).map_err(|err| {
        error!("{err}");
        ControlError::DeviceNotFound
    })?;
    probe(&mut bus, candidates)
}
