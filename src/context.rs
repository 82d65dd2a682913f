//! Utilities for deciding whether a lookup may apply at a position in a glyph sequence.
//!
//! Two mechanisms are combined here: lookup flags, which say which glyph classes a lookup
//! skips over, and script context testers, which are per-feature predicates supplied by a
//! script processor (e.g. "is this Arabic letter in initial position").

use std::fmt;

use rustc_hash::FxHashMap;

use crate::gdef::{self, GlyphDefinitionTable};
use crate::glyph_sequence::GlyphSequence;
use crate::tag::DisplayTag;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LookupFlag(pub u16);

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IgnoreMarks {
    NoIgnoreMarks,
    IgnoreAllMarks,
    IgnoreMarksExcept(u8),
}

#[derive(Copy, Clone, Debug)]
pub struct MatchType {
    ignore_bases: bool,
    ignore_ligatures: bool,
    ignore_marks: IgnoreMarks,
}

impl LookupFlag {
    pub const RIGHT_TO_LEFT: u16 = 0x0001;
    pub const IGNORE_BASE_GLYPHS: u16 = 0x0002;
    pub const IGNORE_LIGATURES: u16 = 0x0004;
    pub const IGNORE_MARKS: u16 = 0x0008;

    pub fn get_rtl(self) -> bool {
        (self.0 & Self::RIGHT_TO_LEFT) != 0
    }

    pub fn get_ignore_bases(self) -> bool {
        (self.0 & Self::IGNORE_BASE_GLYPHS) != 0
    }

    pub fn get_ignore_ligatures(self) -> bool {
        (self.0 & Self::IGNORE_LIGATURES) != 0
    }

    pub fn get_ignore_marks(self) -> IgnoreMarks {
        if (self.0 & Self::IGNORE_MARKS) != 0 {
            IgnoreMarks::IgnoreAllMarks
        } else if self.0 & 0xFF00 != 0 {
            IgnoreMarks::IgnoreMarksExcept((self.0 >> 8) as u8)
        } else {
            IgnoreMarks::NoIgnoreMarks
        }
    }
}

impl MatchType {
    pub fn ignore_marks() -> MatchType {
        MatchType {
            ignore_bases: false,
            ignore_ligatures: false,
            ignore_marks: IgnoreMarks::IgnoreAllMarks,
        }
    }

    pub fn marks_only() -> MatchType {
        MatchType {
            ignore_bases: true,
            ignore_ligatures: true,
            ignore_marks: IgnoreMarks::NoIgnoreMarks,
        }
    }

    pub fn from_lookup_flag(lookup_flag: LookupFlag) -> MatchType {
        MatchType {
            ignore_bases: lookup_flag.get_ignore_bases(),
            ignore_ligatures: lookup_flag.get_ignore_ligatures(),
            ignore_marks: lookup_flag.get_ignore_marks(),
        }
    }

    pub fn match_glyph(self, opt_gdef_table: Option<&GlyphDefinitionTable>, glyph: u16) -> bool {
        if !self.ignore_bases
            && !self.ignore_ligatures
            && self.ignore_marks == IgnoreMarks::NoIgnoreMarks
        {
            // fast path that doesn't require checking glyph_class
            return true;
        }
        let glyph_class = gdef::glyph_class(opt_gdef_table, glyph);
        if self.ignore_bases && glyph_class == gdef::GLYPH_CLASS_BASE {
            return false;
        }
        if self.ignore_ligatures && glyph_class == gdef::GLYPH_CLASS_LIGATURE {
            return false;
        }
        match self.ignore_marks {
            IgnoreMarks::NoIgnoreMarks => true,
            IgnoreMarks::IgnoreAllMarks => glyph_class != gdef::GLYPH_CLASS_MARK,
            IgnoreMarks::IgnoreMarksExcept(keep_class) => {
                let mark_attach_class = gdef::mark_attach_class(opt_gdef_table, glyph);
                (glyph_class != gdef::GLYPH_CLASS_MARK)
                    || (mark_attach_class == u16::from(keep_class))
            }
        }
    }

    // searches backwards from glyphs[index-1]
    pub fn find_prev(
        self,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        glyphs: &[u16],
        mut index: usize,
    ) -> Option<usize> {
        while index > 0 {
            index -= 1;
            if self.match_glyph(opt_gdef_table, glyphs[index]) {
                return Some(index);
            }
        }
        None
    }

    // searches forwards from glyphs[index+1]
    pub fn find_next(
        self,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        glyphs: &[u16],
        mut index: usize,
    ) -> Option<usize> {
        while index + 1 < glyphs.len() {
            index += 1;
            if self.match_glyph(opt_gdef_table, glyphs[index]) {
                return Some(index);
            }
        }
        None
    }
}

/// A predicate deciding whether `feature` is eligible at glyph `index` of a sequence.
///
/// Arguments are the script, language and feature tags, the sequence, the glyph index and the
/// flags of the lookup being applied.
pub type GlyphContextTester =
    fn(u32, u32, u32, &GlyphSequence, usize, LookupFlag) -> bool;

/// Context testers of a script processor, keyed by feature tag.
///
/// A feature without a tester is always eligible.
#[derive(Clone, Default)]
pub struct ScriptContextTester {
    testers: FxHashMap<u32, GlyphContextTester>,
}

impl ScriptContextTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tester(mut self, feature_tag: u32, tester: GlyphContextTester) -> Self {
        self.testers.insert(feature_tag, tester);
        self
    }

    pub fn get_tester(&self, feature_tag: u32) -> Option<GlyphContextTester> {
        self.testers.get(&feature_tag).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.testers.is_empty()
    }

    /// Run the tester for `feature_tag`, if any.
    pub fn test(
        &self,
        script_tag: u32,
        lang_tag: u32,
        feature_tag: u32,
        gs: &GlyphSequence,
        index: usize,
        flags: LookupFlag,
    ) -> bool {
        match self.get_tester(feature_tag) {
            Some(tester) => tester(script_tag, lang_tag, feature_tag, gs, index, flags),
            None => true,
        }
    }
}

impl fmt::Debug for ScriptContextTester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut features: Vec<_> = self.testers.keys().copied().collect();
        features.sort_unstable();
        f.debug_set()
            .entries(features.into_iter().map(DisplayTag))
            .finish()
    }
}
