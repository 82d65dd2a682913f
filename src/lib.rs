#![warn(rust_2018_idioms)]

//! Complex-script shaping: script classification, glyph sequences with character
//! associations, and feature driven substitution and positioning for Arabic and the Indic
//! scripts.

pub mod context;
pub mod error;
pub mod gdef;
pub mod glyph_sequence;
pub mod gpos;
pub mod gsub;
pub mod layout;
/// Script specific shaping.
pub mod scripts;
pub mod shaper;
pub mod tag;
/// Character classification.
pub mod unicode;

pub use crate::glyph_sequence::{CharAssociation, GlyphSequence};
pub use crate::shaper::{ShapedText, Shaper, ShaperConfig, ShapingFont};
