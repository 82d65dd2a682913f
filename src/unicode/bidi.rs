//! Bidirectional category lookup.
//!
//! The category table itself is generated data supplied by the `unicode-bidi` crate; shaping
//! only ever asks whether a character is an Arabic letter or a non-spacing mark.

use unicode_bidi::BidiClass;

/// The Unicode bidirectional category of a codepoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BidiCategory(BidiClass);

impl BidiCategory {
    pub const ARABIC_LETTER: BidiCategory = BidiCategory(BidiClass::AL);
    pub const NON_SPACING_MARK: BidiCategory = BidiCategory(BidiClass::NSM);

    pub fn class(self) -> BidiClass {
        self.0
    }

    pub fn is_arabic_letter(self) -> bool {
        self.0 == BidiClass::AL
    }

    pub fn is_non_spacing_mark(self) -> bool {
        self.0 == BidiClass::NSM
    }
}

/// Look up the bidi category of `c`.
///
/// Values that are not Unicode scalar values (surrogates, out of range) are reported as
/// left-to-right, which is neither of the categories shaping distinguishes.
pub fn bidi_class(c: u32) -> BidiCategory {
    match char::from_u32(c) {
        Some(ch) => BidiCategory(unicode_bidi::bidi_class(ch)),
        None => BidiCategory(BidiClass::L),
    }
}
