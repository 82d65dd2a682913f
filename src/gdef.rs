//! Glyph definitions: which glyphs are bases, ligatures, marks or components.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/gdef>

use unicode_general_category::{get_general_category, GeneralCategory};

use crate::glyph_sequence::GlyphSequence;
use crate::layout::ClassDef;

pub const GLYPH_CLASS_NONE: u16 = 0;
pub const GLYPH_CLASS_BASE: u16 = 1;
pub const GLYPH_CLASS_LIGATURE: u16 = 2;
pub const GLYPH_CLASS_MARK: u16 = 3;
pub const GLYPH_CLASS_COMPONENT: u16 = 4;

#[derive(Debug)]
pub struct GlyphDefinitionTable {
    pub opt_glyph_classdef: Option<ClassDef>,
    pub opt_mark_attach_classdef: Option<ClassDef>,
}

impl GlyphDefinitionTable {
    pub fn new(glyph_classdef: ClassDef) -> Self {
        GlyphDefinitionTable {
            opt_glyph_classdef: Some(glyph_classdef),
            opt_mark_attach_classdef: None,
        }
    }

    pub fn with_mark_attach_classdef(mut self, mark_attach_classdef: ClassDef) -> Self {
        self.opt_mark_attach_classdef = Some(mark_attach_classdef);
        self
    }

    /// Derive glyph classes from the characters each glyph of `gs` was mapped from.
    ///
    /// Used when a font carries no glyph definitions: a glyph whose characters are all
    /// non-spacing marks is classed as a mark, every other glyph as a base.
    pub fn infer_from_sequence(gs: &GlyphSequence) -> Self {
        let classes = gs.glyphs().iter().enumerate().map(|(i, &glyph)| {
            let chars = gs.associated_characters(i);
            if !chars.is_empty() && unicodes_are_marks(chars) {
                (glyph, GLYPH_CLASS_MARK)
            } else {
                (glyph, GLYPH_CLASS_BASE)
            }
        });
        GlyphDefinitionTable::new(ClassDef::from_glyph_classes(classes))
    }
}

pub fn gdef_is_mark(opt_gdef_table: Option<&GlyphDefinitionTable>, glyph_index: u16) -> bool {
    glyph_class(opt_gdef_table, glyph_index) == GLYPH_CLASS_MARK
}

pub fn glyph_class(opt_gdef_table: Option<&GlyphDefinitionTable>, glyph: u16) -> u16 {
    opt_gdef_table
        .and_then(|gdef| gdef.opt_glyph_classdef.as_ref())
        .map(|glyph_classdef| glyph_classdef.glyph_class_value(glyph))
        .unwrap_or(GLYPH_CLASS_NONE)
}

pub fn mark_attach_class(opt_gdef_table: Option<&GlyphDefinitionTable>, glyph: u16) -> u16 {
    opt_gdef_table
        .and_then(|gdef| gdef.opt_mark_attach_classdef.as_ref())
        .map(|mark_attach_classdef| mark_attach_classdef.glyph_class_value(glyph))
        .unwrap_or(GLYPH_CLASS_NONE)
}

fn unicodes_are_marks(unicodes: &[u32]) -> bool {
    unicodes
        .iter()
        .map(|&c| char::from_u32(c).map(get_general_category))
        .all(|cat| cat == Some(GeneralCategory::NonspacingMark))
}
