//! Static checks of register sequences.
//!
//! Tables are compiled in, so a malformed entry is a table bug rather than a
//! runtime condition. These checks let tests and the start path catch entries
//! that would be silently truncated on the wire.

use crate::registry::{RegisterEntry, SensorDescriptor};
use crate::traits::ControlError;

/// Highest 7-bit bus address.
const MAX_BUS_ADDRESS: u16 = 0x7F;

/// Checks a register sequence against the wire widths of a sensor.
///
/// # Arguments
///
/// * `sensor` - The sensor the sequence will be sent to
/// * `entries` - The decoded register sequence
///
/// # Returns
///
/// One [`ControlError::SequenceCheck`] per offending entry, in sequence
/// order. An empty vector means every entry encodes losslessly.
///
/// Reported problems:
/// - A register address wider than the sensor's address width
/// - A data value wider than the sensor's data width
/// - A select directive targeting an address outside the 7-bit range
pub fn validate_sequence(sensor: &SensorDescriptor, entries: &[RegisterEntry]) -> Vec<ControlError> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            check_entry(sensor, *entry).map(|reason| ControlError::SequenceCheck { index, reason })
        })
        .collect()
}

fn check_entry(sensor: &SensorDescriptor, entry: RegisterEntry) -> Option<String> {
    match entry {
        RegisterEntry::Write { address, .. } if address > sensor.addressing.max_value() => Some(
            format!(
                "register {address:#06x} wider than {} address byte(s)",
                sensor.addressing.bytes()
            ),
        ),
        RegisterEntry::Write { address, data } if data > sensor.data_size.max_value() => Some(
            format!(
                "value {data:#06x} for register {address:#06x} wider than {} data byte(s)",
                sensor.data_size.bytes()
            ),
        ),
        RegisterEntry::SelectAddress { address } if address > MAX_BUS_ADDRESS => {
            Some(format!("select target {address:#06x} is not a 7-bit address"))
        }
        _ => None,
    }
}
