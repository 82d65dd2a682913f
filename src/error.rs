//! Error types

use crate::tag::DisplayTag;
use crate::unicode::format_codepoint;
use std::fmt;

/// Error returned from the shaping entry points
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ShapingError {
    Capability(CapabilityError),
    Decode(DecodeError),
    Encode(EncodeError),
}

impl From<CapabilityError> for ShapingError {
    fn from(error: CapabilityError) -> Self {
        ShapingError::Capability(error)
    }
}

impl From<DecodeError> for ShapingError {
    fn from(error: DecodeError) -> Self {
        ShapingError::Decode(error)
    }
}

impl From<EncodeError> for ShapingError {
    fn from(error: EncodeError) -> Self {
        ShapingError::Encode(error)
    }
}

impl fmt::Display for ShapingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapingError::Capability(err) => write!(f, "shaping capability: {}", err),
            ShapingError::Decode(err) => write!(f, "utf-16 decode: {}", err),
            ShapingError::Encode(err) => write!(f, "utf-16 encode: {}", err),
        }
    }
}

impl std::error::Error for ShapingError {}

/// A font was asked to perform an operation it does not declare support for
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CapabilityError {
    /// Substitution was requested from a font without substitution tables
    NotSubstitutable { script: u32 },
    /// Positioning was requested from a font without positioning tables
    NotPositionable { script: u32 },
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::NotSubstitutable { script } => write!(
                f,
                "font does not perform substitution (script '{}')",
                DisplayTag(*script)
            ),
            CapabilityError::NotPositionable { script } => write!(
                f,
                "font does not perform positioning (script '{}')",
                DisplayTag(*script)
            ),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Errors that originate when decoding UTF-16 into scalar values
///
/// The `usize` field is the offset of the offending code unit.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DecodeError {
    IsolatedHighSurrogate(usize),
    IsolatedLowSurrogate(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::IsolatedHighSurrogate(offset) => {
                write!(f, "isolated high (leading) surrogate at offset {}", offset)
            }
            DecodeError::IsolatedLowSurrogate(offset) => {
                write!(f, "isolated low (trailing) surrogate at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Errors that originate when encoding scalar values as UTF-16
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum EncodeError {
    /// The scalar value lies in the surrogate range U+D800..=U+DFFF
    SurrogateScalar(u32),
    /// The scalar value is greater than U+10FFFF
    OutOfRange(u32),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::SurrogateScalar(c) => write!(
                f,
                "illegal scalar value {}; cannot be UTF-16 surrogate",
                format_codepoint(*c)
            ),
            EncodeError::OutOfRange(c) => write!(
                f,
                "illegal scalar value 0x{:X}; out of range for UTF-16",
                c
            ),
        }
    }
}

impl std::error::Error for EncodeError {}
