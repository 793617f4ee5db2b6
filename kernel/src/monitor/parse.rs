/// Argument parsers: hexadecimal addresses and permission changes.
use super::error::ParseError;
use crate::mem::{Pte, PteFlags};

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Hex digits that fit in a 32-bit address.
const MAX_DIGITS: usize = 8;

/// Parse a `0x`-prefixed hexadecimal literal of 1 to 8 digits.
///
/// Digits are case-insensitive; the prefix is not (`0X1000` is rejected).
pub fn parse_addr(arg: &str) -> Result<u32, ParseError<'_>> {
    let bad = || ParseError::BadAddress(arg);

    let digits = arg.strip_prefix("0x").ok_or_else(bad)?;
    if digits.is_empty() || digits.len() > MAX_DIGITS {
        return Err(bad());
    }

    let mut res = 0u32;
    for (pos, c) in digits.bytes().rev().enumerate() {
        let c = c.to_ascii_lowercase();
        let value = DIGITS.iter().position(|&d| d == c).ok_or_else(bad)?;
        res += (value as u32) << (4 * pos);
    }
    Ok(res)
}

/// How a permission change combines with an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermOp {
    /// Grant: `entry | mask`.
    Or,
    /// Revoke: `entry & mask`, the mask being the complement of the bit.
    And,
}

/// A parsed `[+-][WU]` directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermDelta {
    pub op: PermOp,
    pub mask: u32,
}

impl PermDelta {
    /// Apply to an entry in place.
    ///
    /// The mask only ever covers `W` or `U`, so the frame address and the
    /// present bit come through unchanged.
    pub fn apply(&self, pte: &mut Pte) {
        match self.op {
            PermOp::Or => pte.0 |= self.mask,
            PermOp::And => pte.0 &= self.mask,
        }
    }
}

/// Parse a two-character permission change: `+W`, `-W`, `+U` or `-U`.
pub fn parse_perm(arg: &str) -> Result<PermDelta, ParseError<'_>> {
    let bad = || ParseError::BadPermission(arg);

    let &[sign, flag] = arg.as_bytes() else {
        return Err(bad());
    };
    let bit = match flag {
        b'W' => PteFlags::W,
        b'U' => PteFlags::U,
        _ => return Err(bad()),
    };
    match sign {
        b'+' => Ok(PermDelta {
            op: PermOp::Or,
            mask: bit.bits(),
        }),
        b'-' => Ok(PermDelta {
            op: PermOp::And,
            mask: !bit.bits(),
        }),
        _ => Err(bad()),
    }
}
