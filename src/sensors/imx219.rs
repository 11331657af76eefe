//! Sony IMX219, 8 MP Bayer sensor.

use super::AUTO_TIMING;
use crate::registry::{
    AxisRegisters, BayerOrder, BinningWindow, FieldRegister, FlipRegister, Identification, ModeDescriptor,
    PixelEncoding, SensorDescriptor, Width,
};

const RAW10: PixelEncoding = PixelEncoding::Bayer {
    order: BayerOrder::Bggr,
    native_bit_depth: 10,
};

/// 3280x2464, full sensor, 15 fps.
const FULL_RESOLUTION: &[(u16, u16)] = &[
    (0x0100, 0x00),
    (0x30EB, 0x05),
    (0x30EB, 0x0C),
    (0x300A, 0xFF),
    (0x300B, 0xFF),
    (0x30EB, 0x05),
    (0x30EB, 0x09),
    (0x0114, 0x01),
    (0x0128, 0x00),
    (0x012A, 0x18),
    (0x012B, 0x00),
    (0x0160, 0x09),
    (0x0161, 0xC8),
    (0x0162, 0x0D),
    (0x0163, 0x78),
    (0x0164, 0x00),
    (0x0165, 0x00),
    (0x0166, 0x0C),
    (0x0167, 0xCF),
    (0x0168, 0x00),
    (0x0169, 0x00),
    (0x016A, 0x09),
    (0x016B, 0x9F),
    (0x016C, 0x0C),
    (0x016D, 0xD0),
    (0x016E, 0x09),
    (0x016F, 0xA0),
    (0x0170, 0x01),
    (0x0171, 0x01),
    (0x0172, 0x03),
    (0x0174, 0x00),
    (0x0175, 0x00),
    (0x018C, 0x0A),
    (0x018D, 0x0A),
    (0x0301, 0x05),
    (0x0303, 0x01),
    (0x0304, 0x03),
    (0x0305, 0x03),
    (0x0306, 0x00),
    (0x0307, 0x2B),
    (0x0309, 0x0A),
    (0x030B, 0x01),
    (0x030C, 0x00),
    (0x030D, 0x55),
    (0x455E, 0x00),
    (0x471E, 0x4B),
    (0x4767, 0x0F),
    (0x4750, 0x14),
    (0x4540, 0x00),
    (0x47B4, 0x14),
    (0x4713, 0x30),
    (0x478B, 0x10),
    (0x478F, 0x10),
    (0x4793, 0x10),
    (0x4797, 0x0E),
    (0x479B, 0x0E),
    (0x0157, 0x00),
    (0x015A, 0x09),
    (0x015B, 0xBD),
    (0x0100, 0x01),
];

/// 1920x1080 centre crop, 30 fps.
const FULL_HD: &[(u16, u16)] = &[
    (0x0100, 0x00),
    (0x30EB, 0x05),
    (0x30EB, 0x0C),
    (0x300A, 0xFF),
    (0x300B, 0xFF),
    (0x30EB, 0x05),
    (0x30EB, 0x09),
    (0x0114, 0x01),
    (0x0128, 0x00),
    (0x012A, 0x18),
    (0x012B, 0x00),
    (0x0160, 0x06),
    (0x0161, 0xE3),
    (0x0162, 0x0D),
    (0x0163, 0x78),
    (0x0164, 0x02),
    (0x0165, 0xA8),
    (0x0166, 0x0A),
    (0x0167, 0x27),
    (0x0168, 0x02),
    (0x0169, 0xB4),
    (0x016A, 0x06),
    (0x016B, 0xEB),
    (0x016C, 0x07),
    (0x016D, 0x80),
    (0x016E, 0x04),
    (0x016F, 0x38),
    (0x0170, 0x01),
    (0x0171, 0x01),
    (0x0172, 0x03),
    (0x0174, 0x00),
    (0x0175, 0x00),
    (0x018C, 0x0A),
    (0x018D, 0x0A),
    (0x0301, 0x05),
    (0x0303, 0x01),
    (0x0304, 0x03),
    (0x0305, 0x03),
    (0x0306, 0x00),
    (0x0307, 0x39),
    (0x0309, 0x0A),
    (0x030B, 0x01),
    (0x030C, 0x00),
    (0x030D, 0x72),
    (0x455E, 0x00),
    (0x471E, 0x4B),
    (0x4767, 0x0F),
    (0x4750, 0x14),
    (0x4540, 0x00),
    (0x47B4, 0x14),
    (0x4713, 0x30),
    (0x478B, 0x10),
    (0x478F, 0x10),
    (0x4793, 0x10),
    (0x4797, 0x0E),
    (0x479B, 0x0E),
    (0x0157, 0x00),
    (0x015A, 0x06),
    (0x015B, 0xDF),
    (0x0100, 0x01),
];

const MODES: [ModeDescriptor; 2] = [
    ModeDescriptor {
        width: 3280,
        height: 2464,
        encoding: RAW10,
        image_id: 0x2B,
        data_lanes: 2,
        min_vts: 2504,
        line_time_ns: 18_904,
        timing: AUTO_TIMING,
        black_level: 64,
        crop_scale: 1,
        registers: FULL_RESOLUTION,
    },
    ModeDescriptor {
        width: 1920,
        height: 1080,
        encoding: RAW10,
        image_id: 0x2B,
        data_lanes: 2,
        min_vts: 1763,
        line_time_ns: 18_904,
        timing: AUTO_TIMING,
        black_level: 64,
        crop_scale: 1,
        registers: FULL_HD,
    },
];

/// IMX219 descriptor.
pub const IMX219: SensorDescriptor = SensorDescriptor {
    name: "imx219",
    address: 0x10,
    addressing: Width::Two,
    data_size: Width::One,
    ident: Identification {
        register: 0x0000,
        length: 2,
        value: 0x0219,
    },
    vflip: Some(FlipRegister {
        address: 0x0172,
        bit: 1,
    }),
    hflip: Some(FlipRegister {
        address: 0x0172,
        bit: 0,
    }),
    flips_keep_bayer_order: false,
    exposure: Some(FieldRegister {
        address: 0x015A,
        bits: 16,
    }),
    frame_length: Some(FieldRegister {
        address: 0x0160,
        bits: 16,
    }),
    gain: Some(FieldRegister {
        address: 0x0157,
        bits: 8,
    }),
    output_size: Some(AxisRegisters {
        x: FieldRegister {
            address: 0x016C,
            bits: 12,
        },
        y: FieldRegister {
            address: 0x016E,
            bits: 12,
        },
    }),
    crop_origin: None,
    increments: Some(AxisRegisters {
        x: FieldRegister {
            address: 0x0170,
            bits: 3,
        },
        y: FieldRegister {
            address: 0x0171,
            bits: 3,
        },
    }),
    binning: Some(BinningWindow {
        native_width: 3280,
        native_height: 2464,
        start: AxisRegisters {
            x: FieldRegister {
                address: 0x0164,
                bits: 16,
            },
            y: FieldRegister {
                address: 0x0168,
                bits: 16,
            },
        },
        end: AxisRegisters {
            x: FieldRegister {
                address: 0x0166,
                bits: 16,
            },
            y: FieldRegister {
                address: 0x016A,
                bits: 16,
            },
        },
    }),
    modes: &MODES,
    stop: &[(0x0100, 0x00)],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{configure_mode, CaptureParams};

    #[test]
    fn test_long_exposure_extends_frame() {
        let mut mode = IMX219.working_mode(1).expect("mode 1");
        let issues = configure_mode(&IMX219, &mut mode, &CaptureParams::default().with_exposure(3000));

        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(mode.register(0x015A), Some(0x0B));
        assert_eq!(mode.register(0x015B), Some(0xB8));
        assert_eq!(mode.register(0x0160), Some(0x0B));
        assert_eq!(mode.register(0x0161), Some(0xB8));
    }

    #[test]
    fn test_binning_recentres_window() {
        let mut mode = IMX219.working_mode(0).expect("mode 0");
        let params = CaptureParams::default()
            .with_output_size(640, 480)
            .with_increments(3, 3)
            .with_binning();

        let issues = configure_mode(&IMX219, &mut mode, &params);

        assert!(issues.is_empty(), "{issues:?}");
        // 640 * 4 = 2560 columns: border 360, end 2919.
        assert_eq!(mode.register(0x0164), Some(0x01));
        assert_eq!(mode.register(0x0165), Some(0x68));
        assert_eq!(mode.register(0x0166), Some(0x0B));
        assert_eq!(mode.register(0x0167), Some(0x67));
        // 480 * 4 = 1920 rows: border 272, end 2191.
        assert_eq!(mode.register(0x0168), Some(0x01));
        assert_eq!(mode.register(0x0169), Some(0x10));
        assert_eq!(mode.register(0x016A), Some(0x08));
        assert_eq!(mode.register(0x016B), Some(0x8F));
    }

    #[test]
    fn test_binning_without_skip_uses_double_size() {
        let mut mode = IMX219.working_mode(0).expect("mode 0");
        let params = CaptureParams::default()
            .with_output_size(1640, 1232)
            .with_binning();

        let issues = configure_mode(&IMX219, &mut mode, &params);

        assert!(issues.is_empty(), "{issues:?}");
        // Full array: border 0, end 3279 / 2463.
        assert_eq!(mode.register(0x0164), Some(0x00));
        assert_eq!(mode.register(0x0165), Some(0x00));
        assert_eq!(mode.register(0x0166), Some(0x0C));
        assert_eq!(mode.register(0x0167), Some(0xCF));
        assert_eq!(mode.register(0x016A), Some(0x09));
        assert_eq!(mode.register(0x016B), Some(0x9F));
    }

    #[test]
    fn test_binning_window_larger_than_array() {
        let mut mode = IMX219.working_mode(0).expect("mode 0");
        let before = mode.register(0x0165);
        let params = CaptureParams::default()
            .with_output_size(1000, 480)
            .with_increments(3, 1)
            .with_binning();

        let issues = configure_mode(&IMX219, &mut mode, &params);

        assert!(matches!(
            issues.as_slice(),
            [crate::traits::ControlError::Range {
                value: 4000,
                max: 3280,
                ..
            }]
        ));
        assert_eq!(mode.register(0x0165), before);
        // Rows: 480 * 2 = 960, border 752, end 1711.
        assert_eq!(mode.register(0x0168), Some(0x02));
        assert_eq!(mode.register(0x0169), Some(0xF0));
    }

    #[test]
    fn test_increments_are_three_bits() {
        let mut mode = IMX219.working_mode(0).expect("mode 0");
        let issues = configure_mode(&IMX219, &mut mode, &CaptureParams::default().with_increments(3, 8));

        assert_eq!(mode.register(0x0170), Some(0x03));
        assert_eq!(mode.register(0x0171), Some(0x01));
        assert!(matches!(
            issues.as_slice(),
            [crate::traits::ControlError::Range { value: 8, max: 7, .. }]
        ));
    }
}
