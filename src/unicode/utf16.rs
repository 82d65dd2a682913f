//! Conversion between UTF-16 code units and Unicode scalar values.

use crate::error::{DecodeError, EncodeError};

const HIGH_SURROGATE_START: u32 = 0xD800;
const LOW_SURROGATE_START: u32 = 0xDC00;
const SURROGATE_END: u32 = 0xE000;
const MAX_SCALAR: u32 = 0x10FFFF;

/// Decode UTF-16 code units into scalar values.
///
/// An isolated surrogate is replaced with `substitution`, unless `error_on_substitution` is set,
/// in which case a `DecodeError` carrying the offset of the offending unit is returned.
pub fn to_scalar_array(
    units: &[u16],
    substitution: u32,
    error_on_substitution: bool,
) -> Result<Vec<u32>, DecodeError> {
    let mut scalars = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let c = u32::from(units[i]);
        if !(HIGH_SURROGATE_START..SURROGATE_END).contains(&c) {
            scalars.push(c);
        } else if c < LOW_SURROGATE_START {
            match units.get(i + 1).map(|&unit| u32::from(unit)) {
                Some(c2) if (LOW_SURROGATE_START..SURROGATE_END).contains(&c2) => {
                    scalars.push(
                        ((c - HIGH_SURROGATE_START) << 10) + (c2 - LOW_SURROGATE_START) + 0x10000,
                    );
                    i += 1;
                }
                _ if error_on_substitution => return Err(DecodeError::IsolatedHighSurrogate(i)),
                _ => scalars.push(substitution),
            }
        } else if error_on_substitution {
            return Err(DecodeError::IsolatedLowSurrogate(i));
        } else {
            scalars.push(substitution);
        }
        i += 1;
    }
    Ok(scalars)
}

/// Encode scalar values as UTF-16 code units.
pub fn from_scalar_array(scalars: &[u32]) -> Result<Vec<u16>, EncodeError> {
    let mut units = Vec::with_capacity(scalars.len());
    for &s in scalars {
        if s < 0x10000 {
            if (HIGH_SURROGATE_START..SURROGATE_END).contains(&s) {
                return Err(EncodeError::SurrogateScalar(s));
            }
            units.push(s as u16);
        } else if s <= MAX_SCALAR {
            let offset = s - 0x10000;
            units.push((HIGH_SURROGATE_START + ((offset >> 10) & 0x3FF)) as u16);
            units.push((LOW_SURROGATE_START + (offset & 0x3FF)) as u16);
        } else {
            return Err(EncodeError::OutOfRange(s));
        }
    }
    Ok(units)
}
