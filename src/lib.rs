//! Pi-Sensor-Control: register control plane for Raspberry Pi camera sensors
//!
//! This library describes supported sensors and their capture modes as
//! register tables, translates capture parameters (flips, exposure, gain,
//! windowing) into edits of a working copy of a mode, and sends the result
//! to the sensor over an abstract control bus. The bus is a trait, so the
//! same code drives real hardware through embedded-hal and mock buses in tests.

pub mod device;
pub mod edit;
pub mod overrides;
pub mod probe;
pub mod registry;
pub mod sensors;
pub mod traits;
pub mod translate;
pub mod transport;
pub mod validation;

#[cfg(test)]
pub mod mock;

pub use device::{I2cBus, LinuxI2cBus};
pub use edit::{edit_bit, edit_field, BitOp, RegisterEdit};
pub use probe::{probe, probe_device};
pub use registry::{
    BayerOrder, FourCC, ModeDescriptor, PixelEncoding, RegisterEntry, Registry, SensorDescriptor,
    WorkingMode,
};
pub use traits::{ControlError, Field, RegisterBus};
pub use translate::{apply_parameters, configure_mode, CaptureParams};
pub use transport::{send, start_streaming, stop_streaming, SendReport};
