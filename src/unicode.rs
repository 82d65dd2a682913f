//! Character classification utilities.
//!
//! Whitespace and punctuation classes used by line-breaking interop, together with the script
//! classifier, bracket mirroring, bidi categories and UTF-16 conversion in the submodules.

pub mod bidi;
pub mod mirror;
pub mod script;
pub mod utf16;

pub use bidi::{bidi_class, BidiCategory};
pub use mirror::{mirror, mirror_str};
pub use script::{CharClassifier, IndicVariant, ScriptCode};
pub use utf16::{from_scalar_array, to_scalar_array};

use unicode_general_category::{get_general_category, GeneralCategory};

/// Character code used to signal a character boundary in inline content, such as an inline
/// with borders and padding or a nested block object.
pub const CODE_EOT: u32 = 0x0000;
pub const LINEFEED_CHAR: u32 = 0x000A;
pub const CARRIAGE_RETURN: u32 = 0x000D;
pub const TAB: u32 = 0x0009;
pub const SPACE: u32 = 0x0020;
pub const NBSPACE: u32 = 0x00A0;
pub const NEXT_LINE: u32 = 0x0085;
pub const ZERO_WIDTH_SPACE: u32 = 0x200B;
pub const ZERO_WIDTH_JOINER: u32 = 0x200D;
pub const NARROW_NBSPACE: u32 = 0x202F;
pub const WORD_JOINER: u32 = 0x2060;
pub const LINE_SEPARATOR: u32 = 0x2028;
pub const PARAGRAPH_SEPARATOR: u32 = 0x2029;
pub const IDEOGRAPHIC_SPACE: u32 = 0x3000;
/// Zero-width no-break space, also used as the byte order mark.
pub const ZERO_WIDTH_NOBREAK_SPACE: u32 = 0xFEFF;
pub const NOT_A_CHARACTER: u32 = 0xFFFF;

/// Whitespace class of a character, as seen by line breaking.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CharClass {
    /// Unicode white space other than the XML white space characters
    UnicodeWhitespace,
    LineFeed,
    /// Boundary between text runs
    Boundary,
    /// Space, carriage return or tab
    XmlWhitespace,
    NonWhitespace,
}

pub fn classify(c: u32) -> CharClass {
    match c {
        CODE_EOT => CharClass::Boundary,
        LINEFEED_CHAR => CharClass::LineFeed,
        SPACE | CARRIAGE_RETURN | TAB => CharClass::XmlWhitespace,
        _ if is_any_space(c) => CharClass::UnicodeWhitespace,
        _ => CharClass::NonWhitespace,
    }
}

/// A space with normal behaviour, i.e. one that allows a break.
pub fn is_breakable_space(c: u32) -> bool {
    c == SPACE || is_fixed_width_space(c)
}

pub fn is_zero_width_space(c: u32) -> bool {
    c == ZERO_WIDTH_SPACE || c == WORD_JOINER || c == ZERO_WIDTH_NOBREAK_SPACE
}

/// En quad through zero width space, plus the ideographic space.
pub fn is_fixed_width_space(c: u32) -> bool {
    (0x2000..=0x200B).contains(&c) || c == IDEOGRAPHIC_SPACE
}

pub fn is_non_breakable_space(c: u32) -> bool {
    matches!(
        c,
        NBSPACE | NARROW_NBSPACE | IDEOGRAPHIC_SPACE | WORD_JOINER | ZERO_WIDTH_NOBREAK_SPACE
    )
}

/// A space whose width may be stretched or shrunk during justification.
pub fn is_adjustable_space(c: u32) -> bool {
    c == SPACE || c == NBSPACE
}

pub fn is_any_space(c: u32) -> bool {
    is_breakable_space(c) || is_non_breakable_space(c)
}

pub fn is_explicit_break(c: u32) -> bool {
    matches!(
        c,
        LINEFEED_CHAR | CARRIAGE_RETURN | NEXT_LINE | LINE_SEPARATOR | PARAGRAPH_SEPARATOR
    )
}

// Only the Latin-1 and general punctuation blocks are covered.
pub fn is_punctuation(c: u32) -> bool {
    matches!(
        c,
        0x0021..=0x002F
            | 0x003A..=0x0040
            | 0x005F..=0x0060
            | 0x007E
            | 0x00A1..=0x00BF
            | 0x00D7
            | 0x00F7
            | 0x2000..=0x206F
    )
}

pub fn is_digit(c: u32) -> bool {
    (0x0030..=0x0039).contains(&c)
}

/// Letters of any case and letter numbers (`Lu`, `Ll`, `Lt`, `Lm`, `Lo`, `Nl`).
///
/// The `Other_Alphabetic` property is not consulted.
pub fn is_alphabetic(c: u32) -> bool {
    char::from_u32(c).map_or(false, |ch| {
        matches!(
            get_general_category(ch),
            GeneralCategory::UppercaseLetter
                | GeneralCategory::LowercaseLetter
                | GeneralCategory::TitlecaseLetter
                | GeneralCategory::ModifierLetter
                | GeneralCategory::OtherLetter
                | GeneralCategory::LetterNumber
        )
    })
}

/// Format a codepoint for diagnostics: `0x` followed by 4 (BMP) or 6 lowercase hex digits.
pub fn format_codepoint(c: u32) -> String {
    if c < 0x110000 {
        let width = if c < 0x10000 { 4 } else { 6 };
        format!("0x{:0width$x}", c, width = width)
    } else {
        String::from("!NOT A CHARACTER!")
    }
}

/// Convert a codepoint to an XML numeric character reference, e.g. `&#x0041;`.
pub fn char_to_ncref(c: u32) -> String {
    let width = if c > 0xFFFF { 6 } else { 4 };
    format!("&#x{:0width$X};", c, width = width)
}

/// Convert a string to ASCII, replacing everything outside printable ASCII with numeric
/// character references and escaping the XML specials.
pub fn to_ncrefs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            ' '..='~' => out.push(ch),
            _ => out.push_str(&char_to_ncref(ch as u32)),
        }
    }
    out
}
