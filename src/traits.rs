//! Core traits and error types for the sensor control bus.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Numeric sensor fields that are range checked before being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Integration time in lines.
    Exposure,
    /// Total lines per frame (VTS).
    FrameLength,
    /// Analog gain code.
    Gain,
    /// Output window width or height.
    OutputSize,
    /// Crop window origin.
    CropOrigin,
    /// Odd/even skip increment.
    Increment,
    /// Readout window start or end for binning.
    Binning,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exposure => "exposure",
            Self::FrameLength => "frame length",
            Self::Gain => "gain",
            Self::OutputSize => "output size",
            Self::CropOrigin => "crop origin",
            Self::Increment => "skip increment",
            Self::Binning => "binning window",
        };
        f.write_str(name)
    }
}

/// Error type for register control operations.
///
/// Everything except [`ControlError::DeviceNotFound`] is recoverable: the
/// failing step is logged and skipped, and the remaining work carries on.
#[derive(Debug, Error)]
pub enum ControlError {
    /// An edit targeted a register absent from the mode's sequence.
    #[error("register {address:#06x} not found in mode sequence")]
    LookupMiss {
        /// Register address that was looked up.
        address: u16,
    },
    /// A bit range outside `0..=15` or with `start > end`.
    #[error("invalid bit range {start}..={end}")]
    InvalidBitRange {
        /// First bit.
        start: u8,
        /// Last bit (inclusive).
        end: u8,
    },
    /// A numeric field does not fit its register width.
    #[error("invalid {field}: {value}, range is 0 to {max}")]
    Range {
        /// Field being written.
        field: Field,
        /// Rejected value.
        value: i64,
        /// Largest accepted value.
        max: u64,
    },
    /// The bus accepted fewer bytes than a register write required.
    #[error("short write at entry {index} (reg {address:#06x}): {accepted} of {expected} bytes")]
    ShortWrite {
        /// Position in the register sequence.
        index: usize,
        /// Register address being written.
        address: u16,
        /// Bytes accepted by the bus.
        accepted: usize,
        /// Bytes in the message.
        expected: usize,
    },
    /// A bus transaction failed.
    #[error("bus error: {0}")]
    Bus(String),
    /// The bus target address could not be changed.
    #[error("failed to set bus address to {address:#04x}: {reason}")]
    AddressSelect {
        /// Requested target address.
        address: u16,
        /// Underlying failure.
        reason: String,
    },
    /// The bus device could not be opened.
    #[error("failed to open bus {path}: {reason}")]
    BusOpen {
        /// Device path.
        path: String,
        /// Underlying failure.
        reason: String,
    },
    /// No candidate sensor answered with its identification value.
    #[error("no supported sensor found")]
    DeviceNotFound,
    /// The requested mode index does not exist for the sensor.
    #[error("mode {index} not available for sensor {sensor}")]
    ModeNotFound {
        /// Sensor name.
        sensor: &'static str,
        /// Requested mode index.
        index: usize,
    },
    /// A register override group could not be parsed.
    #[error("invalid register override: {0}")]
    InvalidOverride(String),
    /// The Bayer order and bit depth do not map onto a known encoding.
    #[error("no encoding for bayer order {order:?} at {bit_depth} bits")]
    UnsupportedEncoding {
        /// Bayer order of the mode.
        order: crate::registry::BayerOrder,
        /// Requested bit depth.
        bit_depth: u8,
    },
    /// The sensor has no registers for the requested adjustment.
    #[error("{sensor} does not support {feature}")]
    Unsupported {
        /// Sensor name.
        sensor: &'static str,
        /// Adjustment that was requested.
        feature: &'static str,
    },
    /// A register sequence entry cannot be encoded for the sensor.
    #[error("sequence entry {index}: {reason}")]
    SequenceCheck {
        /// Position in the register sequence.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for register control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Abstraction over the sensor control bus.
///
/// A bus handle is owned by the caller for the span of one logical operation
/// (probe, start sequence or stop sequence). Every call blocks.
pub trait RegisterBus {
    /// Change the target address used by subsequent [`RegisterBus::write`] calls.
    fn set_address(&mut self, address: u16) -> Result<()>;

    /// Write raw bytes to the current target. Returns the number of bytes accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Combined write-then-read transaction against `address`.
    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<()>;

    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u16) -> Result<()> {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
        Ok(())
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn set_address(&mut self, address: u16) -> Result<()> {
        (**self).set_address(address)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        (**self).write_read(address, write, read)
    }

    fn delay_ms(&mut self, ms: u16) -> Result<()> {
        (**self).delay_ms(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_message() {
        let err = ControlError::Range {
            field: Field::Exposure,
            value: 70_000,
            max: 65_535,
        };
        assert_eq!(
            err.to_string(),
            "invalid exposure: 70000, range is 0 to 65535"
        );
    }

    #[test]
    fn test_lookup_miss_message() {
        let err = ControlError::LookupMiss { address: 0x3500 };
        assert_eq!(err.to_string(), "register 0x3500 not found in mode sequence");
    }
}
