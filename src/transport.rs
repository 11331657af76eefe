//! Serialization of register sequences onto the control bus.

use log::{debug, error, info, warn};

use crate::registry::{RegisterEntry, SensorDescriptor, Width, WorkingMode};
use crate::traits::{ControlError, RegisterBus, Result};
use crate::validation::validate_sequence;

/// Outcome of sending one register sequence.
#[derive(Debug, Default)]
pub struct SendReport {
    /// Register writes fully accepted by the bus.
    pub writes: usize,
    /// Failures, in sequence order. None of them stopped the sequence.
    pub failures: Vec<ControlError>,
}

impl SendReport {
    /// `true` when every entry went through.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Wire bytes for one register write: address then data, each big-endian in
/// the sensor's width.
#[must_use]
pub fn encode_write(sensor: &SensorDescriptor, address: u16, data: u16) -> Vec<u8> {
    let mut message = Vec::with_capacity(4);
    let [address_high, address_low] = address.to_be_bytes();
    if sensor.addressing == Width::Two {
        message.push(address_high);
    }
    message.push(address_low);

    let [data_high, data_low] = data.to_be_bytes();
    if sensor.data_size == Width::Two {
        message.push(data_high);
    }
    message.push(data_low);
    message
}

/// Send `entries` in order. Every failure is logged and collected; the
/// sequence always runs to the end.
pub fn send<B: RegisterBus>(
    bus: &mut B,
    sensor: &SensorDescriptor,
    entries: &[RegisterEntry],
) -> SendReport {
    let mut report = SendReport::default();

    for (index, entry) in entries.iter().enumerate() {
        match *entry {
            RegisterEntry::SelectAddress { address } => {
                debug!("Select address {address:02X}");
                if let Err(err) = bus.set_address(address) {
                    error!("Failed to set I2C address to {address:02X}: {err}");
                    report.failures.push(err);
                }
            }
            RegisterEntry::Delay { ms } => {
                debug!("Delay {ms} ms");
                if let Err(err) = bus.delay_ms(ms) {
                    error!("{err}");
                    report.failures.push(err);
                }
            }
            RegisterEntry::Write { address, data } => {
                let message = encode_write(sensor, address, data);
                match bus.write(&message) {
                    Ok(accepted) if accepted == message.len() => report.writes += 1,
                    Ok(accepted) => {
                        error!(
                            "Failed to write register index {index} ({address:04X} val {data:02X})"
                        );
                        report.failures.push(ControlError::ShortWrite {
                            index,
                            address,
                            accepted,
                            expected: message.len(),
                        });
                    }
                    Err(err) => {
                        error!("Failed to write register index {index} ({address:04X}): {err}");
                        report.failures.push(err);
                    }
                }
            }
        }
    }
    report
}

/// Program `mode` into the sensor, starting the stream.
///
/// Fails only when the sensor's own bus address cannot be selected; the
/// sequence itself is best effort.
pub fn start_streaming<B: RegisterBus>(
    bus: &mut B,
    sensor: &SensorDescriptor,
    mode: &WorkingMode,
) -> Result<SendReport> {
    for issue in validate_sequence(sensor, &mode.registers) {
        warn!("{issue}");
    }
    bus.set_address(u16::from(sensor.address))?;
    let report = send(bus, sensor, &mode.registers);
    info!(
        "Now streaming {} ({} writes, {} failures)",
        sensor.name,
        report.writes,
        report.failures.len()
    );
    Ok(report)
}

/// Send the sensor's fixed stop sequence.
pub fn stop_streaming<B: RegisterBus>(
    bus: &mut B,
    sensor: &SensorDescriptor,
) -> Result<SendReport> {
    bus.set_address(u16::from(sensor.address))?;
    let report = send(bus, sensor, &sensor.stop_sequence());
    info!("Stopped {}", sensor.name);
    Ok(report)
}
