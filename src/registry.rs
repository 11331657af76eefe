//! Sensor and mode descriptions.
//!
//! Descriptors are compiled-in, read-only data. A session never edits a
//! [`ModeDescriptor`] directly: it takes a [`WorkingMode`] copy, edits that,
//! and transmits it.

use std::fmt;

use crate::sensors;
use crate::traits::{ControlError, Result};

/// Reserved register address: switch the bus target address to `data`.
pub const SELECT_ADDRESS: u16 = 0xFFFF;
/// Reserved register address: wait `data` milliseconds.
pub const DELAY: u16 = 0xFFFE;

/// One step of a register sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterEntry {
    /// Write `data` to register `address`.
    Write {
        /// Register address.
        address: u16,
        /// Register value.
        data: u16,
    },
    /// Retarget the bus to another device address.
    SelectAddress {
        /// New bus target address.
        address: u16,
    },
    /// Wait before processing the next entry.
    Delay {
        /// Milliseconds to wait.
        ms: u16,
    },
}

impl RegisterEntry {
    /// Decode a raw `(address, data)` table pair, recognising the sentinel addresses.
    #[must_use]
    pub const fn from_raw(address: u16, data: u16) -> Self {
        match address {
            SELECT_ADDRESS => Self::SelectAddress { address: data },
            DELAY => Self::Delay { ms: data },
            _ => Self::Write { address, data },
        }
    }

    /// Encode back to the raw `(address, data)` form.
    #[must_use]
    pub const fn to_raw(self) -> (u16, u16) {
        match self {
            Self::Write { address, data } => (address, data),
            Self::SelectAddress { address } => (SELECT_ADDRESS, address),
            Self::Delay { ms } => (DELAY, ms),
        }
    }
}

/// Decode a raw register table.
#[must_use]
pub fn decode_sequence(raw: &[(u16, u16)]) -> Vec<RegisterEntry> {
    raw.iter()
        .map(|&(address, data)| RegisterEntry::from_raw(address, data))
        .collect()
}

/// Width of an address or data field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// One byte.
    One,
    /// Two bytes, big-endian.
    Two,
}

impl Width {
    /// Number of bytes on the wire.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Largest value representable in this width.
    #[must_use]
    pub const fn max_value(self) -> u16 {
        match self {
            Self::One => 0xFF,
            Self::Two => 0xFFFF,
        }
    }
}

/// Pixel format code (e.g., `pBAA`, `UYVY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create a new `FourCC` from a 4-byte array.
    #[must_use]
    pub const fn new(code: &[u8; 4]) -> Self {
        Self(*code)
    }

    /// UYVY pixel format (4:2:2 packed).
    pub const UYVY: Self = Self::new(b"UYVY");
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Rotation of the colour filter tile.
///
/// Ordered so that a horizontal flip is `^ 1` and a vertical flip is `^ 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayerOrder {
    /// Blue, green / green, red.
    Bggr = 0,
    /// Green, blue / red, green.
    Gbrg = 1,
    /// Green, red / blue, green.
    Grbg = 2,
    /// Red, green / green, blue.
    Rggb = 3,
}

impl BayerOrder {
    /// Index in `0..4`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Order from the low two bits of `index`.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index & 0b11 {
            0 => Self::Bggr,
            1 => Self::Gbrg,
            2 => Self::Grbg,
            _ => Self::Rggb,
        }
    }

    /// Order after XOR-ing the index with `mask`.
    #[must_use]
    pub const fn toggled(self, mask: u8) -> Self {
        Self::from_index(self.index() ^ mask)
    }

    /// Format code for this order at `bit_depth` bits per sample.
    #[must_use]
    pub const fn fourcc(self, bit_depth: u8) -> Option<FourCC> {
        let codes: &[&[u8; 4]; 4] = match bit_depth {
            8 => &[b"BA81", b"GBRG", b"GRBG", b"RGGB"],
            10 => &[b"pBAA", b"pGAA", b"pgAA", b"pRAA"],
            12 => &[b"pBCC", b"pGCC", b"pgCC", b"pRCC"],
            16 => &[b"BYR2", b"GB16", b"GR16", b"RG16"],
            _ => return None,
        };
        Some(FourCC::new(codes[self.index() as usize]))
    }
}

/// How a mode's pixels are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    /// A fixed format that does not depend on flips or bit depth.
    Fixed(FourCC),
    /// Raw Bayer data, resolved to a format once flips and bit depth are known.
    Bayer {
        /// Colour filter order before any flips.
        order: BayerOrder,
        /// Bits per sample as produced by the sensor.
        native_bit_depth: u8,
    },
}

/// A numeric field spread over consecutive 8-bit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRegister {
    /// First (most significant) register.
    pub address: u16,
    /// Width of the field in bits.
    pub bits: u8,
}

/// A single-bit flip control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipRegister {
    /// Register holding the flip bit.
    pub address: u16,
    /// Bit position within the register.
    pub bit: u8,
}

/// A pair of horizontal/vertical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRegisters {
    /// Horizontal field.
    pub x: FieldRegister,
    /// Vertical field.
    pub y: FieldRegister,
}

/// Sensor readout window recentred for 4x4 binned output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinningWindow {
    /// Full array width in pixels.
    pub native_width: u32,
    /// Full array height in lines.
    pub native_height: u32,
    /// First column and row read out.
    pub start: AxisRegisters,
    /// Last column and row read out.
    pub end: AxisRegisters,
}

/// Identification register used when probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identification {
    /// Register address.
    pub register: u16,
    /// Bytes to read (at most 2).
    pub length: u8,
    /// Expected value, first byte read most significant.
    pub value: u16,
}

/// CSI-2 receiver timing values for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsiTiming {
    /// Receiver timing registers 1 to 5.
    pub timing: [u32; 5],
    /// Termination timing registers 1 and 2.
    pub term: [u32; 2],
}

/// Immutable capture mode template.
#[derive(Debug, Clone, Copy)]
pub struct ModeDescriptor {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in lines.
    pub height: u32,
    /// Pixel encoding.
    pub encoding: PixelEncoding,
    /// CSI-2 data type identifier.
    pub image_id: u8,
    /// Number of CSI-2 data lanes.
    pub data_lanes: u8,
    /// Minimum frame length in lines.
    pub min_vts: u32,
    /// Time per line in nanoseconds.
    pub line_time_ns: u32,
    /// Receiver timing.
    pub timing: CsiTiming,
    /// Black level of the raw data.
    pub black_level: u16,
    /// Binning factor applied to crop origin coordinates.
    pub crop_scale: u16,
    /// Complete power-on register image, raw form.
    pub registers: &'static [(u16, u16)],
}

impl ModeDescriptor {
    /// Produce an owned, editable copy of this mode.
    #[must_use]
    pub fn working_copy(&self) -> WorkingMode {
        WorkingMode {
            width: self.width,
            height: self.height,
            encoding: self.encoding,
            image_id: self.image_id,
            data_lanes: self.data_lanes,
            min_vts: self.min_vts,
            line_time_ns: self.line_time_ns,
            timing: self.timing,
            black_level: self.black_level,
            crop_scale: self.crop_scale,
            registers: decode_sequence(self.registers),
        }
    }
}

/// Immutable description of one supported sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorDescriptor {
    /// Display name.
    pub name: &'static str,
    /// 7-bit bus address.
    pub address: u8,
    /// Register address width on the wire.
    pub addressing: Width,
    /// Register data width on the wire.
    pub data_size: Width,
    /// Identification register.
    pub ident: Identification,
    /// Vertical flip control.
    pub vflip: Option<FlipRegister>,
    /// Horizontal flip control.
    pub hflip: Option<FlipRegister>,
    /// The sensor shifts its window on flip so the Bayer order stays put.
    pub flips_keep_bayer_order: bool,
    /// Exposure (integration lines).
    pub exposure: Option<FieldRegister>,
    /// Frame length (VTS).
    pub frame_length: Option<FieldRegister>,
    /// Analog gain.
    pub gain: Option<FieldRegister>,
    /// Output window size.
    pub output_size: Option<AxisRegisters>,
    /// Crop window origin.
    pub crop_origin: Option<AxisRegisters>,
    /// Odd/even skip increments.
    pub increments: Option<AxisRegisters>,
    /// Readout window used for 4x4 binning.
    pub binning: Option<BinningWindow>,
    /// Capture modes.
    pub modes: &'static [ModeDescriptor],
    /// Sequence that halts streaming, raw form.
    pub stop: &'static [(u16, u16)],
}

impl SensorDescriptor {
    /// Look up a mode template by index.
    pub fn mode(&self, index: usize) -> Result<&ModeDescriptor> {
        self.modes.get(index).ok_or(ControlError::ModeNotFound {
            sensor: self.name,
            index,
        })
    }

    /// Working copy of the mode at `index`.
    pub fn working_mode(&self, index: usize) -> Result<WorkingMode> {
        self.mode(index).map(ModeDescriptor::working_copy)
    }

    /// The fixed stop sequence, decoded.
    #[must_use]
    pub fn stop_sequence(&self) -> Vec<RegisterEntry> {
        decode_sequence(self.stop)
    }
}

/// Session-owned, editable copy of a [`ModeDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingMode {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in lines.
    pub height: u32,
    /// Pixel encoding; the Bayer order follows applied flips.
    pub encoding: PixelEncoding,
    /// CSI-2 data type identifier.
    pub image_id: u8,
    /// Number of CSI-2 data lanes.
    pub data_lanes: u8,
    /// Minimum frame length in lines.
    pub min_vts: u32,
    /// Time per line in nanoseconds.
    pub line_time_ns: u32,
    /// Receiver timing.
    pub timing: CsiTiming,
    /// Black level of the raw data.
    pub black_level: u16,
    /// Binning factor applied to crop origin coordinates.
    pub crop_scale: u16,
    /// Register sequence, in transmission order.
    pub registers: Vec<RegisterEntry>,
}

impl WorkingMode {
    /// Current value of the first write to `address`, if any.
    #[must_use]
    pub fn register(&self, address: u16) -> Option<u16> {
        self.registers.iter().find_map(|entry| match *entry {
            RegisterEntry::Write { address: a, data } if a == address => Some(data),
            _ => None,
        })
    }

    /// Current Bayer order, if the mode produces Bayer data.
    #[must_use]
    pub const fn bayer_order(&self) -> Option<BayerOrder> {
        match self.encoding {
            PixelEncoding::Bayer { order, .. } => Some(order),
            PixelEncoding::Fixed(_) => None,
        }
    }

    /// XOR the Bayer order index with `mask`. No effect on fixed encodings.
    pub fn toggle_bayer_order(&mut self, mask: u8) {
        if let PixelEncoding::Bayer { order, .. } = &mut self.encoding {
            *order = order.toggled(mask);
        }
    }

    /// Resolve the output format, using `bit_depth` or the sensor's native depth.
    pub fn fourcc(&self, bit_depth: Option<u8>) -> Result<FourCC> {
        match self.encoding {
            PixelEncoding::Fixed(code) => Ok(code),
            PixelEncoding::Bayer {
                order,
                native_bit_depth,
            } => {
                let bit_depth = bit_depth.unwrap_or(native_bit_depth);
                order
                    .fourcc(bit_depth)
                    .ok_or(ControlError::UnsupportedEncoding { order, bit_depth })
            }
        }
    }
}

/// Process-wide, read-only set of supported sensors.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    sensors: &'static [SensorDescriptor],
}

impl Registry {
    /// Registry over an arbitrary sensor table.
    #[must_use]
    pub const fn new(sensors: &'static [SensorDescriptor]) -> Self {
        Self { sensors }
    }

    /// Registry over the compiled-in sensors, in probe order.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(&sensors::BUILTIN)
    }

    /// All sensors, in probe order.
    #[must_use]
    pub const fn sensors(&self) -> &'static [SensorDescriptor] {
        self.sensors
    }

    /// Find a sensor by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&'static SensorDescriptor> {
        self.sensors.iter().find(|sensor| sensor.name == name)
    }
}
