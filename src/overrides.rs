//! Raw register overrides supplied by the user.
//!
//! Format: groups separated by `;`. Each group is a four hex digit start
//! register, a comma, then one or more two hex digit bytes written to
//! consecutive registers, e.g. `"3500,000f00;350b,40"`.

use log::{info, warn};

use crate::edit::{BitOp, RegisterEdit};
use crate::registry::WorkingMode;
use crate::traits::{ControlError, Result};

/// Parse one override group into byte edits.
pub fn parse_group(group: &str) -> Result<Vec<RegisterEdit>> {
    let invalid = || ControlError::InvalidOverride(group.to_owned());

    let (register, bytes) = group.split_once(',').ok_or_else(invalid)?;
    let is_hex = |text: &str| text.bytes().all(|b| b.is_ascii_hexdigit());
    if register.len() != 4
        || bytes.is_empty()
        || bytes.len() % 2 != 0
        || !is_hex(register)
        || !is_hex(bytes)
    {
        return Err(invalid());
    }
    let register = u16::from_str_radix(register, 16).map_err(|_| invalid())?;

    bytes
        .as_bytes()
        .chunks(2)
        .zip(0u16..)
        .map(|(pair, offset)| {
            let text = std::str::from_utf8(pair).map_err(|_| invalid())?;
            let value = u8::from_str_radix(text, 16).map_err(|_| invalid())?;
            Ok(RegisterEdit {
                address: register.wrapping_add(offset),
                start: 0,
                end: 7,
                value: u32::from(value),
                op: BitOp::Assign,
            })
        })
        .collect()
}

/// Apply an override string to `mode`.
///
/// Empty groups are ignored. Malformed groups and missing registers are
/// collected and skipped; the remaining groups still apply.
pub fn apply_overrides(mode: &mut WorkingMode, overrides: &str) -> Vec<ControlError> {
    let mut issues = Vec::new();
    for group in overrides.split(';').map(str::trim).filter(|g| !g.is_empty()) {
        let edits = match parse_group(group) {
            Ok(edits) => edits,
            Err(err) => {
                warn!("{err}");
                issues.push(err);
                continue;
            }
        };
        for edit in edits {
            match edit.apply(mode) {
                Ok(()) => info!("{:04x}: {:02x}", edit.address, edit.value),
                Err(err) => {
                    warn!("{err}");
                    issues.push(err);
                }
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::test_mode;

    #[test]
    fn test_parse_consecutive_bytes() {
        let edits = parse_group("3500,000f00").expect("valid group");
        let targets: Vec<(u16, u32)> = edits.iter().map(|e| (e.address, e.value)).collect();
        assert_eq!(targets, vec![(0x3500, 0x00), (0x3501, 0x0F), (0x3502, 0x00)]);
        assert!(edits.iter().all(|e| e.start == 0 && e.end == 7));
    }

    #[test]
    fn test_parse_rejects_malformed_groups() {
        for group in [
            "3500", "350,00", "3500,0", "3500,", "35x0,00", "3500,zz", "+123,01", "0123,+1",
            "+123,+1",
        ] {
            assert!(
                matches!(parse_group(group), Err(ControlError::InvalidOverride(_))),
                "{group} should be rejected"
            );
        }
    }

    #[test]
    fn test_apply_overrides_skips_empty_groups() {
        let mut mode = test_mode(&[(0x0100, 0x00), (0x0101, 0x00)]);

        let issues = apply_overrides(&mut mode, "0100,01;; ;0101,02;");

        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(mode.register(0x0100), Some(0x01));
        assert_eq!(mode.register(0x0101), Some(0x02));
    }

    #[test]
    fn test_signed_group_is_not_applied() {
        let mut mode = test_mode(&[(0x0123, 0x00)]);

        let issues = apply_overrides(&mut mode, "+123,+1");

        assert!(matches!(issues.as_slice(), [ControlError::InvalidOverride(_)]));
        assert_eq!(mode.register(0x0123), Some(0x00));
    }

    #[test]
    fn test_apply_overrides_keeps_going() {
        let mut mode = test_mode(&[(0x0100, 0xFF00), (0x0101, 0x00), (0x0200, 0x00)]);

        let issues = apply_overrides(&mut mode, "0100,12bogus;0200,7;0100,3456;0300,01");

        // Bad group, short group, missing register.
        assert_eq!(issues.len(), 3, "{issues:?}");
        assert_eq!(mode.register(0x0100), Some(0xFF34));
        assert_eq!(mode.register(0x0101), Some(0x56));
        assert_eq!(mode.register(0x0200), Some(0x00));
    }
}
