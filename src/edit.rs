//! Bit-level edits over a working register sequence.

use log::debug;

use crate::registry::{RegisterEntry, WorkingMode};
use crate::traits::{ControlError, Result};

/// Highest bit index in a register value.
pub const MAX_BIT: u8 = 15;

/// How a bit edit combines with the current register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    /// Force the bit to the requested value.
    Assign,
    /// Force the bit to 1.
    Set,
    /// Force the bit to 0.
    Clear,
    /// Toggle the bit when the requested value is 1.
    Xor,
}

/// A request to edit a bit range of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEdit {
    /// Register address.
    pub address: u16,
    /// First bit (inclusive).
    pub start: u8,
    /// Last bit (inclusive).
    pub end: u8,
    /// Source value; bit `i` of it lands in bit `i` of the register.
    pub value: u32,
    /// Combination rule.
    pub op: BitOp,
}

impl RegisterEdit {
    /// Apply this edit to `mode`.
    pub fn apply(&self, mode: &mut WorkingMode) -> Result<()> {
        edit_field(mode, self.address, self.start, self.end, self.value, self.op)
    }
}

/// Edit one bit of the first write to `address` in `mode`.
///
/// A missing register leaves the mode untouched and returns
/// [`ControlError::LookupMiss`].
pub fn edit_bit(
    mode: &mut WorkingMode,
    address: u16,
    bit: u8,
    value: bool,
    op: BitOp,
) -> Result<()> {
    if bit > MAX_BIT {
        return Err(ControlError::InvalidBitRange {
            start: bit,
            end: bit,
        });
    }

    let Some(data) = mode.registers.iter_mut().find_map(|entry| match entry {
        RegisterEntry::Write { address: a, data } if *a == address => Some(data),
        _ => None,
    }) else {
        return Err(ControlError::LookupMiss { address });
    };

    let mask = 1u16 << bit;
    *data = match op {
        BitOp::Assign if value => *data | mask,
        BitOp::Assign | BitOp::Clear => *data & !mask,
        BitOp::Set => *data | mask,
        BitOp::Xor if value => *data ^ mask,
        BitOp::Xor => *data,
    };
    Ok(())
}

/// Edit bits `start..=end` of the first write to `address`, taking each bit
/// from the same position of `value`.
pub fn edit_field(
    mode: &mut WorkingMode,
    address: u16,
    start: u8,
    end: u8,
    value: u32,
    op: BitOp,
) -> Result<()> {
    if start > end || end > MAX_BIT {
        return Err(ControlError::InvalidBitRange { start, end });
    }

    for bit in start..=end {
        edit_bit(mode, address, bit, (value >> bit) & 1 == 1, op)?;
    }
    debug!("{op:?} {address:04X}[{end}:{start}] <- {value:#x}");
    Ok(())
}
