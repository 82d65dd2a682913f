//! Script classification of codepoints.
//!
//! Script codes are ISO 15924 numeric codes. Codes of 1000 and above are private values for
//! the "v2" shaping variants of the Indic scripts (e.g. `dev2` for Devanagari).

use std::cmp::Reverse;
use std::fmt;

use itertools::Itertools;
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::tag;
use crate::unicode::{is_any_space, is_digit, is_punctuation};

/// Offset between a v1 Indic script code and its v2 variant.
const V2_OFFSET: u16 = 1000;

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ScriptCode(pub u16);

impl ScriptCode {
    pub const HEBREW: ScriptCode = ScriptCode(125);
    pub const MONGOLIAN: ScriptCode = ScriptCode(145);
    pub const ARABIC: ScriptCode = ScriptCode(160);
    pub const GREEK: ScriptCode = ScriptCode(200);
    pub const LATIN: ScriptCode = ScriptCode(215);
    pub const CYRILLIC: ScriptCode = ScriptCode(220);
    pub const GEORGIAN: ScriptCode = ScriptCode(240);
    pub const BOPOMOFO: ScriptCode = ScriptCode(285);
    pub const HANGUL: ScriptCode = ScriptCode(286);
    pub const GURMUKHI: ScriptCode = ScriptCode(310);
    pub const GURMUKHI_2: ScriptCode = ScriptCode(1310);
    pub const DEVANAGARI: ScriptCode = ScriptCode(315);
    pub const DEVANAGARI_2: ScriptCode = ScriptCode(1315);
    pub const GUJARATI: ScriptCode = ScriptCode(320);
    pub const GUJARATI_2: ScriptCode = ScriptCode(1320);
    pub const BENGALI: ScriptCode = ScriptCode(326);
    pub const BENGALI_2: ScriptCode = ScriptCode(1326);
    pub const ORIYA: ScriptCode = ScriptCode(327);
    pub const ORIYA_2: ScriptCode = ScriptCode(1327);
    pub const TIBETAN: ScriptCode = ScriptCode(330);
    pub const TELUGU: ScriptCode = ScriptCode(340);
    pub const TELUGU_2: ScriptCode = ScriptCode(1340);
    pub const KANNADA: ScriptCode = ScriptCode(345);
    pub const KANNADA_2: ScriptCode = ScriptCode(1345);
    pub const TAMIL: ScriptCode = ScriptCode(346);
    pub const TAMIL_2: ScriptCode = ScriptCode(1346);
    pub const MALAYALAM: ScriptCode = ScriptCode(347);
    pub const MALAYALAM_2: ScriptCode = ScriptCode(1347);
    pub const SINHALA: ScriptCode = ScriptCode(348);
    pub const MYANMAR: ScriptCode = ScriptCode(350);
    pub const THAI: ScriptCode = ScriptCode(352);
    pub const KHMER: ScriptCode = ScriptCode(355);
    pub const LAO: ScriptCode = ScriptCode(356);
    pub const HIRAGANA: ScriptCode = ScriptCode(410);
    pub const KATAKANA: ScriptCode = ScriptCode(411);
    pub const ETHIOPIC: ScriptCode = ScriptCode(430);
    pub const HAN: ScriptCode = ScriptCode(500);
    pub const MATH: ScriptCode = ScriptCode(995);
    pub const SYMBOL: ScriptCode = ScriptCode(996);
    pub const UNDETERMINED: ScriptCode = ScriptCode(998);
    pub const UNCODED: ScriptCode = ScriptCode(999);

    /// The v2 variant of a v1 Indic code. Codes that are already v2 are returned unchanged.
    pub fn v2(self) -> ScriptCode {
        if self.0 < V2_OFFSET {
            ScriptCode(self.0 + V2_OFFSET)
        } else {
            self
        }
    }

    pub fn is_indic(self) -> bool {
        matches!(
            self,
            ScriptCode::BENGALI
                | ScriptCode::BENGALI_2
                | ScriptCode::MYANMAR
                | ScriptCode::DEVANAGARI
                | ScriptCode::DEVANAGARI_2
                | ScriptCode::GUJARATI
                | ScriptCode::GUJARATI_2
                | ScriptCode::GURMUKHI
                | ScriptCode::GURMUKHI_2
                | ScriptCode::KANNADA
                | ScriptCode::KANNADA_2
                | ScriptCode::MALAYALAM
                | ScriptCode::MALAYALAM_2
                | ScriptCode::ORIYA
                | ScriptCode::ORIYA_2
                | ScriptCode::TAMIL
                | ScriptCode::TAMIL_2
                | ScriptCode::TELUGU
                | ScriptCode::TELUGU_2
        )
    }

    /// The canonical 4-letter tag of this code, or `""` if the code is not registered.
    pub fn tag(self) -> &'static str {
        script_tag_from_code(self)
    }
}

impl fmt::Debug for ScriptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptCode({} '{}')", self.0, self.tag())
    }
}

const SCRIPT_TAGS: &[(ScriptCode, &str)] = &[
    (ScriptCode::HEBREW, "hebr"),
    (ScriptCode::MONGOLIAN, "mong"),
    (ScriptCode::ARABIC, "arab"),
    (ScriptCode::GREEK, "grek"),
    (ScriptCode::LATIN, "latn"),
    (ScriptCode::CYRILLIC, "cyrl"),
    (ScriptCode::GEORGIAN, "geor"),
    (ScriptCode::BOPOMOFO, "bopo"),
    (ScriptCode::HANGUL, "hang"),
    (ScriptCode::GURMUKHI, "guru"),
    (ScriptCode::GURMUKHI_2, "gur2"),
    (ScriptCode::DEVANAGARI, "deva"),
    (ScriptCode::DEVANAGARI_2, "dev2"),
    (ScriptCode::GUJARATI, "gujr"),
    (ScriptCode::GUJARATI_2, "gjr2"),
    (ScriptCode::BENGALI, "beng"),
    (ScriptCode::BENGALI_2, "bng2"),
    (ScriptCode::ORIYA, "orya"),
    (ScriptCode::ORIYA_2, "ory2"),
    (ScriptCode::TIBETAN, "tibt"),
    (ScriptCode::TELUGU, "telu"),
    (ScriptCode::TELUGU_2, "tel2"),
    (ScriptCode::KANNADA, "knda"),
    (ScriptCode::KANNADA_2, "knd2"),
    (ScriptCode::TAMIL, "taml"),
    (ScriptCode::TAMIL_2, "tml2"),
    (ScriptCode::MALAYALAM, "mlym"),
    (ScriptCode::MALAYALAM_2, "mlm2"),
    (ScriptCode::SINHALA, "sinh"),
    (ScriptCode::MYANMAR, "mymr"),
    (ScriptCode::THAI, "thai"),
    (ScriptCode::KHMER, "khmr"),
    (ScriptCode::LAO, "laoo"),
    (ScriptCode::HIRAGANA, "hira"),
    (ScriptCode::ETHIOPIC, "ethi"),
    (ScriptCode::HAN, "hani"),
    (ScriptCode::KATAKANA, "kana"),
    (ScriptCode::MATH, "zmth"),
    (ScriptCode::SYMBOL, "zsym"),
    (ScriptCode::UNDETERMINED, "zyyy"),
    (ScriptCode::UNCODED, "zzzz"),
];

lazy_static! {
    static ref TAGS_BY_CODE: FxHashMap<ScriptCode, &'static str> =
        SCRIPT_TAGS.iter().copied().collect();
    static ref CODES_BY_TAG: FxHashMap<&'static str, ScriptCode> = SCRIPT_TAGS
        .iter()
        .map(|&(code, tag)| (tag, code))
        .collect();
}

pub fn script_tag_from_code(code: ScriptCode) -> &'static str {
    TAGS_BY_CODE.get(&code).copied().unwrap_or("")
}

pub fn script_code_from_tag(tag: &str) -> ScriptCode {
    CODES_BY_TAG
        .get(tag)
        .copied()
        .unwrap_or(ScriptCode::UNDETERMINED)
}

/// Whether the OpenType script tag designates a script handled by the Indic processor.
pub fn is_indic_script(script_tag: u32) -> bool {
    matches!(
        script_tag,
        tag::BENG
            | tag::BNG2
            | tag::MYMR
            | tag::DEVA
            | tag::DEV2
            | tag::GUJR
            | tag::GJR2
            | tag::GURU
            | tag::GUR2
            | tag::KNDA
            | tag::KND2
            | tag::MLYM
            | tag::MLM2
            | tag::ORYA
            | tag::ORY2
            | tag::TAML
            | tag::TML2
            | tag::TELU
            | tag::TEL2
    )
}

/// Which flavour of Indic shaping the script classifier reports.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IndicVariant {
    /// Report the ISO 15924 code, e.g. `deva`.
    V1,
    /// Report the private v2 code, e.g. `dev2`.
    #[default]
    V2,
}

/// Classifies codepoints by script.
///
/// The Indic variant is fixed at construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharClassifier {
    indic_variant: IndicVariant,
}

impl CharClassifier {
    pub fn new(indic_variant: IndicVariant) -> Self {
        CharClassifier { indic_variant }
    }

    pub fn indic_variant(&self) -> IndicVariant {
        self.indic_variant
    }

    /// Obtain the script code of `c`, or `UNDETERMINED` if it cannot be determined.
    ///
    /// Spaces, punctuation and digits are always `UNDETERMINED`.
    pub fn script_of(&self, c: u32) -> ScriptCode {
        if is_any_space(c) || is_punctuation(c) || is_digit(c) {
            ScriptCode::UNDETERMINED
        } else if is_latin(c) {
            ScriptCode::LATIN
        } else if is_cyrillic(c) {
            ScriptCode::CYRILLIC
        } else if is_greek(c) {
            ScriptCode::GREEK
        } else if is_han(c) {
            ScriptCode::HAN
        } else if is_bopomofo(c) {
            ScriptCode::BOPOMOFO
        } else if is_katakana(c) {
            ScriptCode::KATAKANA
        } else if is_hiragana(c) {
            ScriptCode::HIRAGANA
        } else if is_hangul(c) {
            ScriptCode::HANGUL
        } else if is_arabic(c) {
            ScriptCode::ARABIC
        } else if is_hebrew(c) {
            ScriptCode::HEBREW
        } else if is_mongolian(c) {
            ScriptCode::MONGOLIAN
        } else if is_georgian(c) {
            ScriptCode::GEORGIAN
        } else if is_gurmukhi(c) {
            self.indic(ScriptCode::GURMUKHI)
        } else if is_devanagari(c) {
            self.indic(ScriptCode::DEVANAGARI)
        } else if is_gujarati(c) {
            self.indic(ScriptCode::GUJARATI)
        } else if is_bengali(c) {
            self.indic(ScriptCode::BENGALI)
        } else if is_oriya(c) {
            self.indic(ScriptCode::ORIYA)
        } else if is_tibetan(c) {
            ScriptCode::TIBETAN
        } else if is_telugu(c) {
            self.indic(ScriptCode::TELUGU)
        } else if is_kannada(c) {
            self.indic(ScriptCode::KANNADA)
        } else if is_tamil(c) {
            self.indic(ScriptCode::TAMIL)
        } else if is_malayalam(c) {
            self.indic(ScriptCode::MALAYALAM)
        } else if is_sinhala(c) {
            ScriptCode::SINHALA
        } else if is_myanmar(c) {
            ScriptCode::MYANMAR
        } else if is_thai(c) {
            ScriptCode::THAI
        } else if is_khmer(c) {
            ScriptCode::KHMER
        } else if is_lao(c) {
            ScriptCode::LAO
        } else if is_ethiopic(c) {
            ScriptCode::ETHIOPIC
        } else {
            ScriptCode::UNDETERMINED
        }
    }

    /// The sorted set of distinct scripts in `cs`.
    pub fn scripts_of(&self, cs: impl IntoIterator<Item = u32>) -> Vec<ScriptCode> {
        cs.into_iter()
            .map(|c| self.script_of(c))
            .sorted()
            .dedup()
            .collect()
    }

    /// The most frequent script in `cs`, ignoring `UNDETERMINED` and `UNCODED`.
    ///
    /// Ties go to the lowest script code. Returns `UNDETERMINED` if no script was found.
    pub fn dominant_script(&self, cs: impl IntoIterator<Item = u32>) -> ScriptCode {
        cs.into_iter()
            .map(|c| self.script_of(c))
            .filter(|&code| code != ScriptCode::UNDETERMINED && code != ScriptCode::UNCODED)
            .counts()
            .into_iter()
            .max_by_key(|&(code, count)| (count, Reverse(code)))
            .map(|(code, _count)| code)
            .unwrap_or(ScriptCode::UNDETERMINED)
    }

    fn indic(&self, code: ScriptCode) -> ScriptCode {
        match self.indic_variant {
            IndicVariant::V1 => code,
            IndicVariant::V2 => code.v2(),
        }
    }
}

pub fn is_hebrew(c: u32) -> bool {
    matches!(c, 0x0590..=0x05FF | 0xFB00..=0xFB4F)
}

pub fn is_mongolian(c: u32) -> bool {
    matches!(c, 0x1800..=0x18AF)
}

pub fn is_arabic(c: u32) -> bool {
    matches!(
        c,
        0x0600..=0x06FF // arabic
        | 0x0750..=0x077F // arabic supplement
        | 0xFB50..=0xFDFF // presentation forms a
        | 0xFE70..=0xFEFF // presentation forms b
    )
}

pub fn is_greek(c: u32) -> bool {
    matches!(c, 0x0370..=0x03FF | 0x1F00..=0x1FFF)
}

pub fn is_latin(c: u32) -> bool {
    matches!(
        c,
        0x0041..=0x005A
        | 0x0061..=0x007A
        | 0x00C0..=0x00D6
        | 0x00D8..=0x00F6
        | 0x00F8..=0x024F // latin-1 letters, extended a and b
        | 0x1E00..=0x1EFF // extended additional
        | 0x2C60..=0x2C7F // extended c
        | 0xA720..=0xA7FF // extended d
        | 0xFB00..=0xFB0F // ligatures
    )
}

pub fn is_cyrillic(c: u32) -> bool {
    matches!(c, 0x0400..=0x052F | 0x2DE0..=0x2DFF | 0xA640..=0xA69F)
}

pub fn is_georgian(c: u32) -> bool {
    matches!(c, 0x10A0..=0x10FF | 0x2D00..=0x2D2F)
}

pub fn is_hangul(c: u32) -> bool {
    matches!(
        c,
        0x1100..=0x11FF // jamo
        | 0x3130..=0x318F // compatibility jamo
        | 0xA960..=0xA97F // jamo extended a
        | 0xAC00..=0xD7A3 // syllables
        | 0xD7B0..=0xD7FF // jamo extended b
    )
}

pub fn is_gurmukhi(c: u32) -> bool {
    matches!(c, 0x0A00..=0x0A7F)
}

pub fn is_devanagari(c: u32) -> bool {
    matches!(c, 0x0900..=0x097F | 0xA8E0..=0xA8FF)
}

pub fn is_gujarati(c: u32) -> bool {
    matches!(c, 0x0A80..=0x0AFF)
}

pub fn is_bengali(c: u32) -> bool {
    matches!(c, 0x0980..=0x09FF)
}

pub fn is_oriya(c: u32) -> bool {
    matches!(c, 0x0B00..=0x0B7F)
}

pub fn is_tibetan(c: u32) -> bool {
    matches!(c, 0x0F00..=0x0FFF)
}

pub fn is_telugu(c: u32) -> bool {
    matches!(c, 0x0C00..=0x0C7F)
}

pub fn is_kannada(c: u32) -> bool {
    matches!(c, 0x0C80..=0x0CFF)
}

pub fn is_tamil(c: u32) -> bool {
    matches!(c, 0x0B80..=0x0BFF)
}

pub fn is_malayalam(c: u32) -> bool {
    matches!(c, 0x0D00..=0x0D7F)
}

pub fn is_sinhala(c: u32) -> bool {
    matches!(c, 0x0D80..=0x0DFF)
}

pub fn is_myanmar(c: u32) -> bool {
    matches!(c, 0x1000..=0x109F | 0xAA60..=0xAA7F)
}

pub fn is_thai(c: u32) -> bool {
    matches!(c, 0x0E00..=0x0E7F)
}

pub fn is_khmer(c: u32) -> bool {
    matches!(c, 0x1780..=0x17FF | 0x19E0..=0x19FF)
}

pub fn is_lao(c: u32) -> bool {
    matches!(c, 0x0E80..=0x0EFF)
}

pub fn is_ethiopic(c: u32) -> bool {
    matches!(
        c,
        0x1200..=0x137F | 0x1380..=0x139F | 0x2D80..=0x2DDF | 0xAB00..=0xAB2F
    )
}

pub fn is_han(c: u32) -> bool {
    matches!(
        c,
        0x3400..=0x4DBF // extension a
        | 0x4E00..=0x9FFF // unified ideographs
        | 0xF900..=0xFAFF // compatibility ideographs
        | 0x20000..=0x2A6DF // extension b
        | 0x2A700..=0x2B73F // extension c
        | 0x2F800..=0x2FA1F // compatibility ideographs supplement
    )
}

pub fn is_bopomofo(c: u32) -> bool {
    matches!(c, 0x3100..=0x312F)
}

pub fn is_hiragana(c: u32) -> bool {
    matches!(c, 0x3040..=0x309F)
}

pub fn is_katakana(c: u32) -> bool {
    matches!(c, 0x30A0..=0x30FF | 0x31F0..=0x31FF)
}
