//! Mock bus implementation for testing without hardware.

use std::collections::HashMap;

use crate::registry::{
    decode_sequence, BayerOrder, CsiTiming, Identification, ModeDescriptor, PixelEncoding, RegisterEntry,
    SensorDescriptor, Width, WorkingMode,
};
use crate::traits::{ControlError, RegisterBus, Result};

/// One observed bus operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Target address change.
    Select(u16),
    /// Raw write to the current target.
    Write {
        /// Target address at the time of the write.
        address: u16,
        /// Bytes written.
        bytes: Vec<u8>,
    },
    /// Combined write-then-read.
    WriteRead {
        /// Device address.
        address: u8,
        /// Bytes written before the read.
        bytes: Vec<u8>,
    },
    /// Delay directive.
    Delay(u16),
}

/// Mock bus recording every operation.
pub struct MockBus {
    address: u16,
    events: Vec<BusEvent>,
    responses: HashMap<(u8, Vec<u8>), Vec<u8>>,
    short_writes: bool,
    failing_select: bool,
    sleep: bool,
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBus {
    /// Create a new mock bus with no devices attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            address: 0,
            events: Vec::new(),
            responses: HashMap::new(),
            short_writes: false,
            failing_select: false,
            sleep: true,
        }
    }

    /// Answer reads of `register` (wire bytes) on `address` with `value`.
    #[must_use]
    pub fn with_response(mut self, address: u8, register: &[u8], value: &[u8]) -> Self {
        self.responses
            .insert((address, register.to_vec()), value.to_vec());
        self
    }

    /// Accept one byte less than requested on every write.
    #[must_use]
    pub const fn with_short_writes(mut self) -> Self {
        self.short_writes = true;
        self
    }

    /// Reject every target address change.
    #[must_use]
    pub const fn with_failing_select(mut self) -> Self {
        self.failing_select = true;
        self
    }

    /// Record delays without sleeping.
    #[must_use]
    pub const fn without_sleep(mut self) -> Self {
        self.sleep = false;
        self
    }

    /// Operations observed so far.
    #[must_use]
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Raw writes observed so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BusEvent::Write { bytes, .. } => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RegisterBus for MockBus {
    fn set_address(&mut self, address: u16) -> Result<()> {
        self.events.push(BusEvent::Select(address));
        if self.failing_select {
            return Err(ControlError::AddressSelect {
                address,
                reason: "mock rejects address changes".to_owned(),
            });
        }
        self.address = address;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.events.push(BusEvent::Write {
            address: self.address,
            bytes: bytes.to_vec(),
        });
        if self.short_writes {
            Ok(bytes.len().saturating_sub(1))
        } else {
            Ok(bytes.len())
        }
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        self.events.push(BusEvent::WriteRead {
            address,
            bytes: write.to_vec(),
        });
        let value = self
            .responses
            .get(&(address, write.to_vec()))
            .ok_or_else(|| ControlError::Bus(format!("no ack from {address:#04x}")))?;
        if value.len() != read.len() {
            return Err(ControlError::Bus(format!(
                "expected {} bytes, device has {}",
                read.len(),
                value.len()
            )));
        }
        read.copy_from_slice(value);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u16) -> Result<()> {
        self.events.push(BusEvent::Delay(ms));
        if self.sleep {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
        }
        Ok(())
    }
}

/// Working mode over a raw register table, Bayer BGGR 10 bit.
#[must_use]
pub fn test_mode(registers: &[(u16, u16)]) -> WorkingMode {
    let mut mode = TEST_MODE.working_copy();
    mode.registers = decode_sequence(registers);
    mode
}

/// Mode template used by [`test_mode`].
pub const TEST_MODE: ModeDescriptor = ModeDescriptor {
    width: 640,
    height: 480,
    encoding: PixelEncoding::Bayer {
        order: BayerOrder::Bggr,
        native_bit_depth: 10,
    },
    image_id: 0x2B,
    data_lanes: 2,
    min_vts: 1000,
    line_time_ns: 20_000,
    timing: CsiTiming {
        timing: [0; 5],
        term: [0; 2],
    },
    black_level: 16,
    crop_scale: 1,
    registers: &[],
};

/// Sensor with no flip, exposure or gain registers, 16-bit addresses and 8-bit data.
pub const TEST_SENSOR: SensorDescriptor = SensorDescriptor {
    name: "test",
    address: 0x36,
    addressing: Width::Two,
    data_size: Width::One,
    ident: Identification {
        register: 0x300A,
        length: 2,
        value: 0x5647,
    },
    vflip: None,
    hflip: None,
    flips_keep_bayer_order: false,
    exposure: None,
    frame_length: None,
    gain: None,
    output_size: None,
    crop_origin: None,
    increments: None,
    binning: None,
    modes: &[],
    stop: &[(0x0100, 0x00)],
};

/// Shorthand for a register write entry.
#[must_use]
pub const fn write(address: u16, data: u16) -> RegisterEntry {
    RegisterEntry::Write { address, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_events() {
        let mut bus = MockBus::new().without_sleep();
        bus.set_address(0x36).expect("select");
        let accepted = bus.write(&[0x01, 0x00, 0x01]).expect("write");
        bus.delay_ms(3).expect("delay");

        assert_eq!(accepted, 3);
        assert_eq!(
            bus.events(),
            &[
                BusEvent::Select(0x36),
                BusEvent::Write {
                    address: 0x36,
                    bytes: vec![0x01, 0x00, 0x01]
                },
                BusEvent::Delay(3),
            ]
        );
    }

    #[test]
    fn test_mock_short_writes() {
        let mut bus = MockBus::new().with_short_writes();
        assert_eq!(bus.write(&[0x01, 0x02]).expect("write"), 1);
    }

    #[test]
    fn test_mock_responses() {
        let mut bus = MockBus::new().with_response(0x10, &[0x00, 0x00], &[0x02, 0x19]);
        let mut buf = [0u8; 2];
        bus.write_read(0x10, &[0x00, 0x00], &mut buf).expect("present");
        assert_eq!(buf, [0x02, 0x19]);

        assert!(bus.write_read(0x11, &[0x00, 0x00], &mut buf).is_err());
        let mut short = [0u8; 1];
        assert!(bus.write_read(0x10, &[0x00, 0x00], &mut short).is_err());
    }
}
