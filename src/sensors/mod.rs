//! Compiled-in sensor tables.

pub mod adv7282m;
pub mod imx219;
pub mod ov5647;

use crate::registry::{CsiTiming, SensorDescriptor};

/// All receiver timing left to the receiver's defaults.
pub const AUTO_TIMING: CsiTiming = CsiTiming {
    timing: [0; 5],
    term: [0; 2],
};

/// Built-in sensors, in probe order.
pub static BUILTIN: [SensorDescriptor; 3] = [ov5647::OV5647, imx219::IMX219, adv7282m::ADV7282M];
