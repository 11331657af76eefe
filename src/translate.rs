//! Translation of capture parameters into register edits.
//!
//! Every step here is best effort: a failing edit is logged, collected and
//! skipped, and the remaining steps still run. Nothing touches the bus.

use log::{info, warn};

use crate::edit::{edit_bit, edit_field, BitOp};
use crate::overrides::apply_overrides;
use crate::registry::{FieldRegister, SensorDescriptor, WorkingMode};
use crate::traits::{ControlError, Field, Result};

/// Bayer order mask for a horizontal flip.
const HFLIP_ORDER_MASK: u8 = 1;
/// Bayer order mask for a vertical flip.
const VFLIP_ORDER_MASK: u8 = 2;

/// User-requested capture parameters. Unset options leave the mode alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureParams {
    /// Mirror horizontally.
    pub hflip: bool,
    /// Mirror vertically.
    pub vflip: bool,
    /// Exposure in lines.
    pub exposure: Option<i64>,
    /// Exposure in microseconds; takes precedence over `exposure`.
    pub exposure_us: Option<i64>,
    /// Analog gain code.
    pub gain: Option<i64>,
    /// Target frame rate.
    pub fps: Option<f64>,
    /// Output width.
    pub width: Option<u32>,
    /// Output height.
    pub height: Option<u32>,
    /// Crop origin, horizontal.
    pub left: Option<u32>,
    /// Crop origin, vertical.
    pub top: Option<u32>,
    /// Horizontal odd/even skip increment.
    pub hinc: Option<u32>,
    /// Vertical odd/even skip increment.
    pub vinc: Option<u32>,
    /// Raw register overrides, `"RRRR,VV..;RRRR,VV.."`.
    pub registers: Option<String>,
    /// Output bit depth; native depth when unset.
    pub bit_depth: Option<u8>,
    /// Recentre the readout window for 4x4 binning.
    pub binning: bool,
}

impl CaptureParams {
    /// Request horizontal and vertical flips.
    #[must_use]
    pub const fn with_flips(mut self, hflip: bool, vflip: bool) -> Self {
        self.hflip = hflip;
        self.vflip = vflip;
        self
    }

    /// Request an exposure in lines.
    #[must_use]
    pub const fn with_exposure(mut self, lines: i64) -> Self {
        self.exposure = Some(lines);
        self
    }

    /// Request an exposure in microseconds.
    #[must_use]
    pub const fn with_exposure_us(mut self, us: i64) -> Self {
        self.exposure_us = Some(us);
        self
    }

    /// Request an analog gain code.
    #[must_use]
    pub const fn with_gain(mut self, gain: i64) -> Self {
        self.gain = Some(gain);
        self
    }

    /// Request a frame rate.
    #[must_use]
    pub const fn with_frame_rate(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Request an output window size.
    #[must_use]
    pub const fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Request a crop window origin.
    #[must_use]
    pub const fn with_crop_origin(mut self, left: u32, top: u32) -> Self {
        self.left = Some(left);
        self.top = Some(top);
        self
    }

    /// Request odd/even skip increments.
    #[must_use]
    pub const fn with_increments(mut self, hinc: u32, vinc: u32) -> Self {
        self.hinc = Some(hinc);
        self.vinc = Some(vinc);
        self
    }

    /// Request raw register overrides.
    #[must_use]
    pub fn with_registers(mut self, overrides: impl Into<String>) -> Self {
        self.registers = Some(overrides.into());
        self
    }

    /// Request 4x4 binning of the output window.
    #[must_use]
    pub const fn with_binning(mut self) -> Self {
        self.binning = true;
        self
    }

    /// Request an output bit depth.
    #[must_use]
    pub const fn with_bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = Some(bit_depth);
        self
    }
}

fn record(issues: &mut Vec<ControlError>, result: Result<()>) {
    if let Err(err) = result {
        warn!("{err}");
        issues.push(err);
    }
}

/// Write `value` big-endian across the registers of `register`.
///
/// The first register takes the most significant, possibly partial, byte;
/// the rest take full bytes. Out-of-range values leave every register
/// untouched. A missing register is skipped and the remaining bytes are
/// still written; the first miss is returned.
pub fn split_write(
    mode: &mut WorkingMode,
    field: Field,
    register: FieldRegister,
    value: i64,
) -> Result<()> {
    let bits = register.bits;
    let max = if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    };
    let value = u64::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or(ControlError::Range { field, value, max })?;

    let mut first_miss = None;
    for i in 0..bits.div_ceil(8) {
        let top = bits - 1 - 8 * i;
        // Bytes above bit 63 are zero.
        #[allow(clippy::cast_possible_truncation)]
        let byte = (value.checked_shr(u32::from(top & !7)).unwrap_or(0) & 0xFF) as u32;
        let end = if i == 0 { top & 7 } else { 7 };
        let address = register.address.wrapping_add(u16::from(i));

        match edit_field(mode, address, 0, end, byte, BitOp::Assign) {
            Ok(()) => info!("Set {field} {address:04X} to {byte:02X}"),
            Err(err) => {
                first_miss.get_or_insert(err);
            }
        }
    }
    first_miss.map_or(Ok(()), Err)
}

/// Apply flips, exposure, frame length and gain to `mode`.
///
/// The four edits are independent: each one runs whatever happened to the
/// others. Frame length is only written when the exposure reaches the mode's
/// minimum frame length, so it grows with long exposures and is never shortened.
pub fn apply_parameters(
    sensor: &SensorDescriptor,
    mode: &mut WorkingMode,
    hflip: bool,
    vflip: bool,
    exposure: Option<i64>,
    gain: Option<i64>,
) -> Vec<ControlError> {
    let mut issues = Vec::new();

    if let Some(flip) = sensor.vflip {
        record(
            &mut issues,
            edit_bit(mode, flip.address, flip.bit, vflip, BitOp::Xor),
        );
        if vflip && !sensor.flips_keep_bayer_order {
            mode.toggle_bayer_order(VFLIP_ORDER_MASK);
        }
    }

    if let Some(flip) = sensor.hflip {
        record(
            &mut issues,
            edit_bit(mode, flip.address, flip.bit, hflip, BitOp::Xor),
        );
        if hflip && !sensor.flips_keep_bayer_order {
            mode.toggle_bayer_order(HFLIP_ORDER_MASK);
        }
    }

    if let (Some(register), Some(lines)) = (sensor.exposure, exposure) {
        record(
            &mut issues,
            split_write(mode, Field::Exposure, register, lines),
        );
    }

    if let (Some(register), Some(lines)) = (sensor.frame_length, exposure) {
        if lines >= i64::from(mode.min_vts) {
            record(
                &mut issues,
                split_write(mode, Field::FrameLength, register, lines),
            );
        }
    }

    if let (Some(register), Some(gain)) = (sensor.gain, gain) {
        record(&mut issues, split_write(mode, Field::Gain, register, gain));
    }

    issues
}

/// Convert an exposure time into lines of the mode.
#[must_use]
pub fn exposure_from_micros(mode: &WorkingMode, us: i64) -> Option<i64> {
    (mode.line_time_ns > 0).then(|| us.saturating_mul(1000) / i64::from(mode.line_time_ns))
}

/// Set the frame length for a target frame rate.
pub fn apply_frame_rate(
    sensor: &SensorDescriptor,
    mode: &mut WorkingMode,
    fps: f64,
) -> Result<()> {
    let register = sensor.frame_length.ok_or(ControlError::Unsupported {
        sensor: sensor.name,
        feature: "frame rate",
    })?;
    let lines = 1e9 / (f64::from(mode.line_time_ns) * fps);
    if !lines.is_finite() {
        return Err(ControlError::Unsupported {
            sensor: sensor.name,
            feature: "frame rate without line time",
        });
    }
    #[allow(clippy::cast_possible_truncation)]
    let lines = lines as i64;
    info!("Frame rate {fps} -> {lines} lines");
    split_write(mode, Field::FrameLength, register, lines)
}

/// Set the output window width and/or height.
pub fn apply_output_size(
    sensor: &SensorDescriptor,
    mode: &mut WorkingMode,
    width: Option<u32>,
    height: Option<u32>,
) -> Vec<ControlError> {
    let mut issues = Vec::new();
    let Some(registers) = sensor.output_size else {
        if width.is_some() || height.is_some() {
            record(
                &mut issues,
                Err(ControlError::Unsupported {
                    sensor: sensor.name,
                    feature: "output size",
                }),
            );
        }
        return issues;
    };

    if let Some(width) = width {
        let result = split_write(mode, Field::OutputSize, registers.x, i64::from(width));
        if result.is_ok() {
            mode.width = width;
        }
        record(&mut issues, result);
    }
    if let Some(height) = height {
        let result = split_write(mode, Field::OutputSize, registers.y, i64::from(height));
        if result.is_ok() {
            mode.height = height;
        }
        record(&mut issues, result);
    }
    issues
}

/// Move the crop window origin. Coordinates are scaled by the mode's binning factor.
pub fn apply_crop_origin(
    sensor: &SensorDescriptor,
    mode: &mut WorkingMode,
    left: Option<u32>,
    top: Option<u32>,
) -> Vec<ControlError> {
    let mut issues = Vec::new();
    let Some(registers) = sensor.crop_origin else {
        if left.is_some() || top.is_some() {
            record(
                &mut issues,
                Err(ControlError::Unsupported {
                    sensor: sensor.name,
                    feature: "crop origin",
                }),
            );
        }
        return issues;
    };

    let scale = i64::from(mode.crop_scale);
    for (register, value) in [(registers.x, left), (registers.y, top)] {
        if let Some(value) = value {
            let scaled = i64::from(value) * scale;
            record(
                &mut issues,
                split_write(mode, Field::CropOrigin, register, scaled),
            );
        }
    }
    issues
}

/// Set the odd/even skip increments.
pub fn apply_increments(
    sensor: &SensorDescriptor,
    mode: &mut WorkingMode,
    hinc: Option<u32>,
    vinc: Option<u32>,
) -> Vec<ControlError> {
    let mut issues = Vec::new();
    let Some(registers) = sensor.increments else {
        if hinc.is_some() || vinc.is_some() {
            record(
                &mut issues,
                Err(ControlError::Unsupported {
                    sensor: sensor.name,
                    feature: "skip increments",
                }),
            );
        }
        return issues;
    };

    for (register, value) in [(registers.x, hinc), (registers.y, vinc)] {
        if let Some(value) = value {
            record(
                &mut issues,
                split_write(mode, Field::Increment, register, i64::from(value)),
            );
        }
    }
    issues
}

/// Recentre the readout window for 4x4 binning of the mode's output size.
///
/// The read-out span on each axis is twice the output size, doubled again
/// when that axis skips with an increment of 3. A span wider than the array
/// is rejected and that axis left alone.
pub fn apply_binning(
    sensor: &SensorDescriptor,
    mode: &mut WorkingMode,
    hinc: Option<u32>,
    vinc: Option<u32>,
) -> Vec<ControlError> {
    let mut issues = Vec::new();
    let Some(window) = sensor.binning else {
        record(
            &mut issues,
            Err(ControlError::Unsupported {
                sensor: sensor.name,
                feature: "4x4 binning",
            }),
        );
        return issues;
    };

    let axes = [
        (mode.width, hinc, window.native_width, window.start.x, window.end.x),
        (mode.height, vinc, window.native_height, window.start.y, window.end.y),
    ];
    for (size, increment, native, start, end) in axes {
        let factor = if increment == Some(3) { 4 } else { 2 };
        let span = i64::from(size) * factor;
        let array = i64::from(native);
        if span > array {
            record(
                &mut issues,
                Err(ControlError::Range {
                    field: Field::Binning,
                    value: span,
                    max: u64::from(native),
                }),
            );
            continue;
        }

        let border = (array - span) / 2;
        let last = array - border - 1;
        info!("Binning window {border}..={last} of {native}");
        record(&mut issues, split_write(mode, Field::Binning, start, border));
        record(&mut issues, split_write(mode, Field::Binning, end, last));
    }
    issues
}

/// Run every requested adjustment on `mode`, then the core parameter translation.
///
/// Order: register overrides, skip increments, frame rate, output size,
/// crop origin, binning window, exposure conversion, flips/exposure/gain.
pub fn configure_mode(
    sensor: &SensorDescriptor,
    mode: &mut WorkingMode,
    params: &CaptureParams,
) -> Vec<ControlError> {
    let mut issues = Vec::new();

    if let Some(overrides) = &params.registers {
        issues.extend(apply_overrides(mode, overrides));
    }
    issues.extend(apply_increments(sensor, mode, params.hinc, params.vinc));
    if let Some(fps) = params.fps.filter(|fps| *fps > 0.0) {
        record(&mut issues, apply_frame_rate(sensor, mode, fps));
    }
    issues.extend(apply_output_size(sensor, mode, params.width, params.height));
    issues.extend(apply_crop_origin(sensor, mode, params.left, params.top));
    if params.binning {
        issues.extend(apply_binning(sensor, mode, params.hinc, params.vinc));
    }

    let mut exposure = params.exposure;
    if let Some(us) = params.exposure_us {
        exposure = exposure_from_micros(mode, us);
        info!("Setting exposure to {exposure:?} from time {us}us");
    }

    issues.extend(apply_parameters(
        sensor,
        mode,
        params.hflip,
        params.vflip,
        exposure,
        params.gain,
    ));
    issues
}
