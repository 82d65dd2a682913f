//! The shaping entry point: map characters to glyphs, then substitute, position and reorder
//! them with the processor for the script.

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{CapabilityError, ShapingError};
use crate::gdef::GlyphDefinitionTable;
use crate::glyph_sequence::GlyphSequence;
use crate::gpos::{self, GlyphPositioningTable};
use crate::gsub::{self, FeatureMask, GlyphSubstitutionTable};
use crate::layout::Adjust;
use crate::scripts::{processor_for, ScriptProcessor};
use crate::tag;
use crate::tag::DisplayTag;
use crate::unicode::script::{script_tag_from_code, ScriptCode};
use crate::unicode::{to_scalar_array, CharClassifier, IndicVariant};

/// Code point used in place of unpaired surrogates when decoding UTF-16.
pub const REPLACEMENT_CHARACTER: u32 = 0xFFFD;

/// Maps characters to glyph indices. Unmapped characters map to glyph 0.
pub trait GlyphMap {
    fn glyph_index(&self, c: u32) -> u16;
}

impl GlyphMap for FxHashMap<u32, u16> {
    fn glyph_index(&self, c: u32) -> u16 {
        self.get(&c).copied().unwrap_or(0)
    }
}

/// A font that can rewrite glyph sequences.
pub trait Substitutable {
    fn substitute(
        &self,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        processor: &dyn ScriptProcessor,
        script_tag: u32,
        lang_tag: u32,
        feature_mask: FeatureMask,
        gs: &mut GlyphSequence,
    );
}

/// A font that can position glyph sequences.
pub trait Positionable {
    fn position(
        &self,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        processor: &dyn ScriptProcessor,
        script_tag: u32,
        lang_tag: u32,
        feature_mask: FeatureMask,
        gs: &GlyphSequence,
    ) -> Vec<Adjust>;
}

impl Substitutable for GlyphSubstitutionTable {
    fn substitute(
        &self,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        processor: &dyn ScriptProcessor,
        script_tag: u32,
        lang_tag: u32,
        feature_mask: FeatureMask,
        gs: &mut GlyphSequence,
    ) {
        gsub::apply_substitution(
            self,
            opt_gdef_table,
            processor,
            script_tag,
            lang_tag,
            feature_mask,
            gs,
        )
    }
}

impl Positionable for GlyphPositioningTable {
    fn position(
        &self,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        processor: &dyn ScriptProcessor,
        script_tag: u32,
        lang_tag: u32,
        feature_mask: FeatureMask,
        gs: &GlyphSequence,
    ) -> Vec<Adjust> {
        gpos::apply_positioning(
            self,
            opt_gdef_table,
            processor,
            script_tag,
            lang_tag,
            feature_mask,
            gs,
        )
    }
}

/// The parts of a font shaping needs.
pub struct ShapingFont {
    glyph_map: Box<dyn GlyphMap>,
    opt_gsub_table: Option<GlyphSubstitutionTable>,
    opt_gpos_table: Option<GlyphPositioningTable>,
    opt_gdef_table: Option<GlyphDefinitionTable>,
}

impl ShapingFont {
    pub fn new(glyph_map: impl GlyphMap + 'static) -> Self {
        ShapingFont {
            glyph_map: Box::new(glyph_map),
            opt_gsub_table: None,
            opt_gpos_table: None,
            opt_gdef_table: None,
        }
    }

    pub fn with_substitution(mut self, gsub_table: GlyphSubstitutionTable) -> Self {
        self.opt_gsub_table = Some(gsub_table);
        self
    }

    pub fn with_positioning(mut self, gpos_table: GlyphPositioningTable) -> Self {
        self.opt_gpos_table = Some(gpos_table);
        self
    }

    pub fn with_glyph_definitions(mut self, gdef_table: GlyphDefinitionTable) -> Self {
        self.opt_gdef_table = Some(gdef_table);
        self
    }

    pub fn glyph_index(&self, c: u32) -> u16 {
        self.glyph_map.glyph_index(c)
    }

    pub fn gdef_table(&self) -> Option<&GlyphDefinitionTable> {
        self.opt_gdef_table.as_ref()
    }

    pub fn as_substitutable(&self) -> Option<&dyn Substitutable> {
        self.opt_gsub_table
            .as_ref()
            .map(|gsub_table| gsub_table as &dyn Substitutable)
    }

    pub fn as_positionable(&self) -> Option<&dyn Positionable> {
        self.opt_gpos_table
            .as_ref()
            .map(|gpos_table| gpos_table as &dyn Positionable)
    }

    /// Apply the substitution features of `processor` to `gs`.
    pub fn substitute(
        &self,
        processor: &dyn ScriptProcessor,
        script_tag: u32,
        lang_tag: u32,
        feature_mask: FeatureMask,
        gs: &mut GlyphSequence,
    ) -> Result<(), CapabilityError> {
        let substitutable = self
            .as_substitutable()
            .ok_or(CapabilityError::NotSubstitutable { script: script_tag })?;
        let inferred;
        let gdef_table = match self.gdef_table() {
            Some(gdef_table) => gdef_table,
            None => {
                inferred = GlyphDefinitionTable::infer_from_sequence(gs);
                &inferred
            }
        };
        substitutable.substitute(
            Some(gdef_table),
            processor,
            script_tag,
            lang_tag,
            feature_mask,
            gs,
        );
        Ok(())
    }

    /// Apply the positioning features of `processor` to `gs`.
    pub fn position(
        &self,
        processor: &dyn ScriptProcessor,
        script_tag: u32,
        lang_tag: u32,
        feature_mask: FeatureMask,
        gs: &GlyphSequence,
    ) -> Result<Vec<Adjust>, CapabilityError> {
        let positionable = self
            .as_positionable()
            .ok_or(CapabilityError::NotPositionable { script: script_tag })?;
        let inferred;
        let gdef_table = match self.gdef_table() {
            Some(gdef_table) => gdef_table,
            None => {
                inferred = GlyphDefinitionTable::infer_from_sequence(gs);
                &inferred
            }
        };
        Ok(positionable.position(
            Some(gdef_table),
            processor,
            script_tag,
            lang_tag,
            feature_mask,
            gs,
        ))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ShaperConfig {
    pub indic_variant: IndicVariant,
    /// Apply the `kern` feature.
    pub kerning: bool,
    /// Move spacing marks in front of their bases after positioning.
    pub reorder_marks: bool,
    pub features: FeatureMask,
}

impl Default for ShaperConfig {
    fn default() -> Self {
        ShaperConfig {
            indic_variant: IndicVariant::default(),
            kerning: true,
            reorder_marks: true,
            features: FeatureMask::default(),
        }
    }
}

impl ShaperConfig {
    fn feature_mask(&self) -> FeatureMask {
        if self.kerning {
            self.features
        } else {
            self.features - FeatureMask::KERN
        }
    }
}

/// The shaped glyphs and one positioning adjustment per glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedText {
    pub glyphs: GlyphSequence,
    pub positions: Vec<Adjust>,
}

pub struct Shaper<'a> {
    font: &'a ShapingFont,
    config: ShaperConfig,
    classifier: CharClassifier,
}

impl<'a> Shaper<'a> {
    pub fn new(font: &'a ShapingFont, config: ShaperConfig) -> Self {
        Shaper {
            font,
            config,
            classifier: CharClassifier::new(config.indic_variant),
        }
    }

    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    pub fn classifier(&self) -> &CharClassifier {
        &self.classifier
    }

    /// The script tag of the dominant script of `chars`, or `DFLT` if there is none.
    pub fn detect_script(&self, chars: &[u32]) -> u32 {
        let script_code = self.classifier.dominant_script(chars.iter().copied());
        if script_code == ScriptCode::UNDETERMINED {
            return tag::DFLT;
        }
        tag::from_string(script_tag_from_code(script_code)).unwrap_or(tag::DFLT)
    }

    pub fn shape(
        &self,
        chars: &[u32],
        script_tag: u32,
        lang_tag: u32,
    ) -> Result<ShapedText, ShapingError> {
        let font = self.font;
        let processor = processor_for(script_tag);
        let feature_mask = self.config.feature_mask();
        let mut gs = GlyphSequence::from_chars(chars.to_vec(), |c| font.glyph_index(c));

        if font.as_substitutable().is_some() {
            font.substitute(processor, script_tag, lang_tag, feature_mask, &mut gs)?;
        }

        let mut positions = if font.as_positionable().is_some() {
            font.position(processor, script_tag, lang_tag, feature_mask, &gs)?
        } else {
            vec![Adjust::default(); gs.len()]
        };

        if self.config.reorder_marks {
            let inferred;
            let gdef_table = match font.gdef_table() {
                Some(gdef_table) => gdef_table,
                None => {
                    inferred = GlyphDefinitionTable::infer_from_sequence(&gs);
                    &inferred
                }
            };
            gs = processor.reorder_combining_marks(
                Some(gdef_table),
                &gs,
                &mut positions,
                script_tag,
                lang_tag,
            );
        }

        debug!(
            "shaped {} chars into {} glyphs ('{}')",
            chars.len(),
            gs.len(),
            DisplayTag(script_tag)
        );
        Ok(ShapedText {
            glyphs: gs,
            positions,
        })
    }

    pub fn shape_str(
        &self,
        text: &str,
        script_tag: u32,
        lang_tag: u32,
    ) -> Result<ShapedText, ShapingError> {
        let chars: Vec<u32> = text.chars().map(u32::from).collect();
        self.shape(&chars, script_tag, lang_tag)
    }

    /// Shape UTF-16 text. Unpaired surrogates are an error.
    pub fn shape_utf16(
        &self,
        text: &[u16],
        script_tag: u32,
        lang_tag: u32,
    ) -> Result<ShapedText, ShapingError> {
        let chars = to_scalar_array(text, REPLACEMENT_CHARACTER, true)?;
        self.shape(&chars, script_tag, lang_tag)
    }
}
