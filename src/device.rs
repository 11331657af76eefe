//! I2C bus implementation over embedded-hal.

use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;

use crate::traits::{ControlError, RegisterBus, Result};

/// Highest 7-bit I2C address.
const MAX_ADDRESS: u16 = 0x7F;

/// [`RegisterBus`] over any embedded-hal I2C controller.
///
/// Plain writes go to the currently selected target address; combined
/// write-read transactions carry their own address.
pub struct I2cBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cBus<I2C> {
    /// Wrap an I2C controller. The target address starts at `0`.
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c, address: 0 }
    }

    /// Currently selected target address.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying controller.
    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

/// I2C bus on a Linux `/dev/i2c-N` character device.
pub type LinuxI2cBus = I2cBus<I2cdev>;

impl LinuxI2cBus {
    /// Open a Linux I2C device node (e.g., `/dev/i2c-0`).
    pub fn open(path: &str) -> Result<Self> {
        let i2c = I2cdev::new(path).map_err(|err| ControlError::BusOpen {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        Ok(Self::new(i2c))
    }
}

impl<I2C: I2c> RegisterBus for I2cBus<I2C> {
    fn set_address(&mut self, address: u16) -> Result<()> {
        self.address = u8::try_from(address)
            .ok()
            .filter(|_| address <= MAX_ADDRESS)
            .ok_or_else(|| ControlError::AddressSelect {
                address,
                reason: "not a 7-bit address".to_owned(),
            })?;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|err| ControlError::Bus(format!("write to {:#04x}: {err:?}", self.address)))?;
        Ok(bytes.len())
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        self.i2c
            .write_read(address, write, read)
            .map_err(|err| ControlError::Bus(format!("write-read on {address:#04x}: {err:?}")))
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    use super::*;

    /// Records transactions; NACKs everything at `0x50`.
    #[derive(Default)]
    struct FakeI2c {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> std::result::Result<(), ErrorKind> {
            if address == 0x50 {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.fill(0xA5),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_writes_go_to_selected_address() {
        let mut bus = I2cBus::new(FakeI2c::default());
        bus.set_address(0x36).expect("valid address");
        let accepted = bus.write(&[0x01, 0x00, 0x01]).expect("write succeeds");

        assert_eq!(accepted, 3);
        assert_eq!(bus.address(), 0x36);
        assert_eq!(bus.into_inner().writes, vec![(0x36, vec![0x01, 0x00, 0x01])]);
    }

    #[test]
    fn test_select_rejects_wide_addresses() {
        let mut bus = I2cBus::new(FakeI2c::default());
        bus.set_address(0x21).expect("valid address");

        for address in [0x80, 0x88, 0xFFFF] {
            assert!(matches!(
                bus.set_address(address),
                Err(ControlError::AddressSelect { .. })
            ));
        }
        assert_eq!(bus.address(), 0x21);
    }

    #[test]
    fn test_write_read() {
        let mut bus = I2cBus::new(FakeI2c::default());
        let mut buf = [0u8; 2];
        bus.write_read(0x10, &[0x00, 0x00], &mut buf).expect("device answers");
        assert_eq!(buf, [0xA5, 0xA5]);
    }

    #[test]
    fn test_nack_is_bus_error() {
        let mut bus = I2cBus::new(FakeI2c::default());
        bus.set_address(0x50).expect("valid address");

        assert!(matches!(bus.write(&[0x00]), Err(ControlError::Bus(_))));
        let mut buf = [0u8; 1];
        assert!(matches!(
            bus.write_read(0x50, &[0x00], &mut buf),
            Err(ControlError::Bus(_))
        ));
    }

    #[test]
    fn test_open_missing_device() {
        assert!(matches!(
            LinuxI2cBus::open("/dev/i2c-does-not-exist"),
            Err(ControlError::BusOpen { .. })
        ));
    }
}
