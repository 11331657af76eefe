//! OmniVision OV5647, 5 MP Bayer sensor.

use super::AUTO_TIMING;
use crate::registry::{
    AxisRegisters, BayerOrder, FieldRegister, FlipRegister, Identification, ModeDescriptor,
    PixelEncoding, SensorDescriptor, Width, DELAY,
};

const RAW10: PixelEncoding = PixelEncoding::Bayer {
    order: BayerOrder::Bggr,
    native_bit_depth: 10,
};

/// 2592x1944, full sensor, 15 fps.
const FULL_RESOLUTION: &[(u16, u16)] = &[
    (0x0100, 0x00),
    (0x0103, 0x01),
    (DELAY, 5),
    (0x3034, 0x1A),
    (0x3035, 0x21),
    (0x3036, 0x69),
    (0x303C, 0x11),
    (0x3106, 0xF5),
    (0x3821, 0x06),
    (0x3820, 0x00),
    (0x3827, 0xEC),
    (0x370C, 0x03),
    (0x3612, 0x5B),
    (0x3618, 0x04),
    (0x5000, 0x06),
    (0x5002, 0x40),
    (0x5003, 0x08),
    (0x5A00, 0x08),
    (0x3000, 0x00),
    (0x3001, 0x00),
    (0x3002, 0x00),
    (0x3016, 0x08),
    (0x3017, 0xE0),
    (0x3018, 0x44),
    (0x301C, 0xF8),
    (0x301D, 0xF0),
    (0x3A18, 0x00),
    (0x3A19, 0xF8),
    (0x3C01, 0x80),
    (0x3B07, 0x0C),
    (0x380C, 0x0B),
    (0x380D, 0x1C),
    (0x380E, 0x07),
    (0x380F, 0xB0),
    (0x3814, 0x11),
    (0x3815, 0x11),
    (0x3708, 0x64),
    (0x3709, 0x12),
    (0x3808, 0x0A),
    (0x3809, 0x20),
    (0x380A, 0x07),
    (0x380B, 0x98),
    (0x3800, 0x00),
    (0x3801, 0x00),
    (0x3802, 0x00),
    (0x3803, 0x00),
    (0x3804, 0x0A),
    (0x3805, 0x3F),
    (0x3806, 0x07),
    (0x3807, 0xA3),
    (0x3811, 0x10),
    (0x3813, 0x06),
    (0x3630, 0x2E),
    (0x3632, 0xE2),
    (0x3633, 0x23),
    (0x3634, 0x44),
    (0x3636, 0x06),
    (0x3620, 0x64),
    (0x3621, 0xE0),
    (0x3600, 0x37),
    (0x3704, 0xA0),
    (0x3703, 0x5A),
    (0x3715, 0x78),
    (0x3717, 0x01),
    (0x3731, 0x02),
    (0x370B, 0x60),
    (0x3705, 0x1A),
    (0x3F05, 0x02),
    (0x3F06, 0x10),
    (0x3F01, 0x0A),
    (0x3A08, 0x01),
    (0x3A09, 0x28),
    (0x3A0A, 0x00),
    (0x3A0B, 0xF6),
    (0x3A0D, 0x08),
    (0x3A0E, 0x06),
    (0x3A0F, 0x58),
    (0x3A10, 0x50),
    (0x3A1B, 0x58),
    (0x3A1E, 0x50),
    (0x3A11, 0x60),
    (0x3A1F, 0x28),
    (0x4001, 0x02),
    (0x4004, 0x04),
    (0x4000, 0x09),
    (0x4837, 0x19),
    (0x4800, 0x34),
    (0x3500, 0x00),
    (0x3501, 0x04),
    (0x3502, 0x60),
    (0x350A, 0x00),
    (0x350B, 0x10),
    (0x3503, 0x03),
    (0x0100, 0x01),
];

/// 640x480, 4x4 skipped from the full array, 60 fps.
const VGA: &[(u16, u16)] = &[
    (0x0100, 0x00),
    (0x0103, 0x01),
    (DELAY, 5),
    (0x3034, 0x1A),
    (0x3035, 0x21),
    (0x3036, 0x46),
    (0x303C, 0x11),
    (0x3106, 0xF5),
    (0x3821, 0x07),
    (0x3820, 0x41),
    (0x3827, 0xEC),
    (0x370C, 0x0F),
    (0x3612, 0x59),
    (0x3618, 0x00),
    (0x5000, 0x06),
    (0x5002, 0x40),
    (0x5003, 0x08),
    (0x5A00, 0x08),
    (0x3000, 0x00),
    (0x3001, 0x00),
    (0x3002, 0x00),
    (0x3016, 0x08),
    (0x3017, 0xE0),
    (0x3018, 0x44),
    (0x301C, 0xF8),
    (0x301D, 0xF0),
    (0x3A18, 0x00),
    (0x3A19, 0xF8),
    (0x3C01, 0x80),
    (0x3B07, 0x0C),
    (0x380C, 0x07),
    (0x380D, 0x3C),
    (0x380E, 0x01),
    (0x380F, 0xF8),
    (0x3814, 0x71),
    (0x3815, 0x71),
    (0x3708, 0x64),
    (0x3709, 0x52),
    (0x3808, 0x02),
    (0x3809, 0x80),
    (0x380A, 0x01),
    (0x380B, 0xE0),
    (0x3800, 0x00),
    (0x3801, 0x10),
    (0x3802, 0x00),
    (0x3803, 0x00),
    (0x3804, 0x0A),
    (0x3805, 0x2F),
    (0x3806, 0x07),
    (0x3807, 0x9F),
    (0x3811, 0x04),
    (0x3813, 0x02),
    (0x3630, 0x2E),
    (0x3632, 0xE2),
    (0x3633, 0x23),
    (0x3634, 0x44),
    (0x3636, 0x06),
    (0x3620, 0x64),
    (0x3621, 0xE0),
    (0x3600, 0x37),
    (0x3704, 0xA0),
    (0x3703, 0x5A),
    (0x3715, 0x78),
    (0x3717, 0x01),
    (0x3731, 0x02),
    (0x370B, 0x60),
    (0x3705, 0x1A),
    (0x3F05, 0x02),
    (0x3F06, 0x10),
    (0x3F01, 0x0A),
    (0x3A08, 0x01),
    (0x3A09, 0x2E),
    (0x3A0A, 0x00),
    (0x3A0B, 0xFB),
    (0x3A0D, 0x02),
    (0x3A0E, 0x01),
    (0x3A0F, 0x58),
    (0x3A10, 0x50),
    (0x3A1B, 0x58),
    (0x3A1E, 0x50),
    (0x3A11, 0x60),
    (0x3A1F, 0x28),
    (0x4001, 0x02),
    (0x4004, 0x02),
    (0x4000, 0x09),
    (0x4837, 0x16),
    (0x4800, 0x34),
    (0x3500, 0x00),
    (0x3501, 0x01),
    (0x3502, 0xF0),
    (0x350A, 0x00),
    (0x350B, 0x10),
    (0x3503, 0x03),
    (0x0100, 0x01),
];

const MODES: [ModeDescriptor; 2] = [
    ModeDescriptor {
        width: 2592,
        height: 1944,
        encoding: RAW10,
        image_id: 0x2B,
        data_lanes: 2,
        min_vts: 1968,
        line_time_ns: 32_503,
        timing: AUTO_TIMING,
        black_level: 16,
        crop_scale: 1,
        registers: FULL_RESOLUTION,
    },
    ModeDescriptor {
        width: 640,
        height: 480,
        encoding: RAW10,
        image_id: 0x2B,
        data_lanes: 2,
        min_vts: 504,
        line_time_ns: 31_749,
        timing: AUTO_TIMING,
        black_level: 16,
        crop_scale: 4,
        registers: VGA,
    },
];

/// OV5647 descriptor.
pub const OV5647: SensorDescriptor = SensorDescriptor {
    name: "ov5647",
    address: 0x36,
    addressing: Width::Two,
    data_size: Width::One,
    ident: Identification {
        register: 0x300A,
        length: 2,
        value: 0x5647,
    },
    vflip: Some(FlipRegister {
        address: 0x3820,
        bit: 1,
    }),
    hflip: Some(FlipRegister {
        address: 0x3821,
        bit: 1,
    }),
    flips_keep_bayer_order: true,
    exposure: Some(FieldRegister {
        address: 0x3500,
        bits: 20,
    }),
    frame_length: Some(FieldRegister {
        address: 0x380E,
        bits: 16,
    }),
    gain: Some(FieldRegister {
        address: 0x350A,
        bits: 10,
    }),
    output_size: Some(AxisRegisters {
        x: FieldRegister {
            address: 0x3808,
            bits: 12,
        },
        y: FieldRegister {
            address: 0x380A,
            bits: 12,
        },
    }),
    crop_origin: Some(AxisRegisters {
        x: FieldRegister {
            address: 0x3800,
            bits: 12,
        },
        y: FieldRegister {
            address: 0x3802,
            bits: 12,
        },
    }),
    increments: Some(AxisRegisters {
        x: FieldRegister {
            address: 0x3814,
            bits: 8,
        },
        y: FieldRegister {
            address: 0x3815,
            bits: 8,
        },
    }),
    binning: None,
    modes: &MODES,
    stop: &[(0x0100, 0x00), (0x4800, 0x25)],
};
