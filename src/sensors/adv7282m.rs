//! Analog Devices ADV7282-M, analog video decoder with CSI-2 output.
//!
//! The CSI transmitter lives behind a second bus address mapped through
//! register `0xFE` of the decoder, so its tables retarget the bus mid-sequence.

use super::AUTO_TIMING;
use crate::registry::{
    FourCC, Identification, ModeDescriptor, PixelEncoding, SensorDescriptor, Width, DELAY,
    SELECT_ADDRESS,
};

const DECODER: u16 = 0x21;
const CSI_MAP: u16 = 0x44;

/// 720x480 interlaced NTSC, UYVY.
const NTSC: &[(u16, u16)] = &[
    (0x0F, 0x80),
    (DELAY, 10),
    (0x0F, 0x00),
    (0x00, 0x00),
    (0x0E, 0x80),
    (0x9C, 0x00),
    (0x9C, 0xFF),
    (0x0E, 0x00),
    (0x03, 0x4C),
    (0x04, 0x37),
    (0x13, 0x00),
    (0x17, 0x41),
    (0x1D, 0xC0),
    (0x52, 0xCD),
    (0x80, 0x51),
    (0x81, 0x51),
    (0x82, 0x68),
    (0xFD, 0x84),
    (0xFE, 0x88),
    (SELECT_ADDRESS, CSI_MAP),
    (0x01, 0x20),
    (0x02, 0x28),
    (0x03, 0x38),
    (0x04, 0x30),
    (0x05, 0x30),
    (0x06, 0x80),
    (0x07, 0x70),
    (0x08, 0x50),
    (0xDE, 0x02),
    (0xD2, 0xF7),
    (0xD8, 0x65),
    (0xE0, 0x09),
    (0x2C, 0x00),
    (0x1D, 0x80),
    (0x00, 0x00),
    (SELECT_ADDRESS, DECODER),
];

const MODES: [ModeDescriptor; 1] = [ModeDescriptor {
    width: 720,
    height: 480,
    encoding: PixelEncoding::Fixed(FourCC::UYVY),
    image_id: 0x1E,
    data_lanes: 1,
    min_vts: 0,
    line_time_ns: 0,
    timing: AUTO_TIMING,
    black_level: 0,
    crop_scale: 1,
    registers: NTSC,
}];

/// ADV7282-M descriptor. No flip, exposure or gain controls.
pub const ADV7282M: SensorDescriptor = SensorDescriptor {
    name: "adv7282m",
    address: 0x21,
    addressing: Width::One,
    data_size: Width::One,
    ident: Identification {
        register: 0x11,
        length: 1,
        value: 0x42,
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
    modes: &MODES,
    stop: &[
        (SELECT_ADDRESS, CSI_MAP),
        (0x00, 0x80),
        (SELECT_ADDRESS, DECODER),
    ],
};
