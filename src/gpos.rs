//! Glyph positioning (`gpos`) implementation.
//!
//! > The Glyph Positioning table (GPOS) provides precise control over glyph placement for
//! > sophisticated text layout and rendering in each script and language system that a font
//! > supports.
//!
//! — <https://docs.microsoft.com/en-us/typography/opentype/spec/gpos>

use log::{debug, warn};

use crate::context::{LookupFlag, MatchType, ScriptContextTester};
use crate::gdef::{gdef_is_mark, GlyphDefinitionTable};
use crate::glyph_sequence::GlyphSequence;
use crate::gsub::FeatureMask;
use crate::layout::{Adjust, Anchor, ClassDef, Coverage, LayoutTable, Lookup};
use crate::scripts::ScriptProcessor;
use crate::tag::DisplayTag;

/// Positioning lookups keyed by script, language and feature.
pub type GlyphPositioningTable = LayoutTable<dyn PositioningSubtable>;

pub type ValueRecord = Adjust;

/// The state handed to a positioning subtable.
///
/// `positions` holds one adjustment per glyph of `sequence`.
pub struct PositioningState<'a> {
    pub sequence: &'a GlyphSequence,
    pub positions: &'a mut [Adjust],
    pub index: usize,
    pub script_tag: u32,
    pub lang_tag: u32,
    pub feature_tag: u32,
    pub lookup_flag: LookupFlag,
    pub opt_gdef_table: Option<&'a GlyphDefinitionTable>,
    step: usize,
}

impl<'a> PositioningState<'a> {
    pub fn new(
        sequence: &'a GlyphSequence,
        positions: &'a mut [Adjust],
        opt_gdef_table: Option<&'a GlyphDefinitionTable>,
        script_tag: u32,
        lang_tag: u32,
        feature_tag: u32,
    ) -> Self {
        PositioningState {
            sequence,
            positions,
            index: 0,
            script_tag,
            lang_tag,
            feature_tag,
            lookup_flag: LookupFlag::default(),
            opt_gdef_table,
            step: 1,
        }
    }

    pub fn glyph(&self) -> Option<u16> {
        self.sequence.glyph(self.index)
    }

    pub fn match_type(&self) -> MatchType {
        MatchType::from_lookup_flag(self.lookup_flag)
    }

    /// Add `adjust` to the glyph at `index`.
    pub fn adjust(&mut self, index: usize, adjust: Adjust) -> bool {
        match self.positions.get_mut(index) {
            Some(position) => {
                *position += adjust;
                true
            }
            None => {
                warn!("position array shorter than glyph sequence");
                false
            }
        }
    }

    pub fn set_step(&mut self, step: usize) {
        self.step = step.max(1);
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

/// A positioning subtable.
///
/// `position` accumulates adjustments for the glyphs around `state.index`. It returns `false`
/// when the subtable does not cover the glyph there.
pub trait PositioningSubtable {
    fn position(&self, state: &mut PositioningState<'_>) -> bool;
}

pub enum SinglePos {
    Format1 {
        coverage: Coverage,
        value_record: ValueRecord,
    },
    Format2 {
        coverage: Coverage,
        value_records: Vec<ValueRecord>,
    },
}

impl SinglePos {
    pub fn apply(&self, glyph: u16) -> Option<ValueRecord> {
        match *self {
            SinglePos::Format1 {
                ref coverage,
                value_record,
            } => coverage.glyph_coverage_value(glyph).map(|_| value_record),
            SinglePos::Format2 {
                ref coverage,
                ref value_records,
            } => {
                let coverage_index = usize::from(coverage.glyph_coverage_value(glyph)?);
                let value_record = value_records.get(coverage_index).copied();
                if value_record.is_none() {
                    warn!("single positioning: coverage index {} out of range", coverage_index);
                }
                value_record
            }
        }
    }
}

impl PositioningSubtable for SinglePos {
    fn position(&self, state: &mut PositioningState<'_>) -> bool {
        match state.glyph().and_then(|glyph| self.apply(glyph)) {
            Some(value_record) => state.adjust(state.index, value_record),
            None => false,
        }
    }
}

pub enum PairPos {
    Format1 {
        coverage: Coverage,
        pairsets: Vec<PairSet>,
    },
    Format2 {
        coverage: Coverage,
        classdef1: ClassDef,
        classdef2: ClassDef,
        /// Indexed by first class then second class.
        class1_records: Vec<Vec<(ValueRecord, ValueRecord)>>,
    },
}

pub struct PairSet {
    pub pair_value_records: Vec<PairValueRecord>,
}

#[derive(Copy, Clone, Debug)]
pub struct PairValueRecord {
    pub second_glyph: u16,
    pub value_record1: ValueRecord,
    pub value_record2: ValueRecord,
}

impl PairPos {
    pub fn apply(&self, glyph1: u16, glyph2: u16) -> Option<(ValueRecord, ValueRecord)> {
        match *self {
            PairPos::Format1 {
                ref coverage,
                ref pairsets,
            } => {
                let coverage_index = usize::from(coverage.glyph_coverage_value(glyph1)?);
                let pairset = match pairsets.get(coverage_index) {
                    Some(pairset) => pairset,
                    None => {
                        warn!("pair positioning: coverage index {} out of range", coverage_index);
                        return None;
                    }
                };
                pairset
                    .pair_value_records
                    .iter()
                    .find(|record| record.second_glyph == glyph2)
                    .map(|record| (record.value_record1, record.value_record2))
            }
            PairPos::Format2 {
                ref coverage,
                ref classdef1,
                ref classdef2,
                ref class1_records,
            } => {
                coverage.glyph_coverage_value(glyph1)?;
                let class1 = usize::from(classdef1.glyph_class_value(glyph1));
                let class2 = usize::from(classdef2.glyph_class_value(glyph2));
                let record = class1_records
                    .get(class1)
                    .and_then(|class2_records| class2_records.get(class2))
                    .copied();
                if record.is_none() {
                    warn!("pair positioning: class ({}, {}) out of range", class1, class2);
                }
                record
            }
        }
    }
}

impl PositioningSubtable for PairPos {
    fn position(&self, state: &mut PositioningState<'_>) -> bool {
        let sequence = state.sequence;
        let glyphs = sequence.glyphs();
        let i = state.index;
        let first_glyph = match state.glyph() {
            Some(glyph) => glyph,
            None => return false,
        };
        let j = match state
            .match_type()
            .find_next(state.opt_gdef_table, glyphs, i)
        {
            Some(j) => j,
            None => return false,
        };
        match self.apply(first_glyph, glyphs[j]) {
            Some((value_record1, value_record2)) => {
                state.adjust(i, value_record1);
                if value_record2.is_zero() {
                    // the second glyph may start the next pair
                    state.set_step(j - i);
                } else {
                    state.adjust(j, value_record2);
                    state.set_step(j - i + 1);
                }
                true
            }
            None => false,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct MarkRecord {
    pub mark_class: u16,
    pub mark_anchor: Anchor,
}

/// Attaches a mark to a preceding glyph by aligning anchors.
///
/// Also used for mark-to-mark attachment, where the preceding glyph must itself be a mark.
/// The resulting placement is relative to the origin of the glyph attached to.
pub struct MarkBasePos {
    mark_coverage: Coverage,
    base_coverage: Coverage,
    mark_array: Vec<MarkRecord>,
    /// Indexed by base coverage index then mark class.
    base_array: Vec<Vec<Option<Anchor>>>,
    attach_to_marks: bool,
}

impl MarkBasePos {
    pub fn new(
        mark_coverage: Coverage,
        base_coverage: Coverage,
        mark_array: Vec<MarkRecord>,
        base_array: Vec<Vec<Option<Anchor>>>,
    ) -> Self {
        MarkBasePos {
            mark_coverage,
            base_coverage,
            mark_array,
            base_array,
            attach_to_marks: false,
        }
    }

    pub fn mark_to_mark(
        mark1_coverage: Coverage,
        mark2_coverage: Coverage,
        mark1_array: Vec<MarkRecord>,
        mark2_array: Vec<Vec<Option<Anchor>>>,
    ) -> Self {
        MarkBasePos {
            attach_to_marks: true,
            ..MarkBasePos::new(mark1_coverage, mark2_coverage, mark1_array, mark2_array)
        }
    }

    /// The anchors used to attach `mark_glyph` to `base_glyph`.
    pub fn apply(&self, base_glyph: u16, mark_glyph: u16) -> Option<(Anchor, Anchor)> {
        let mark_index = usize::from(self.mark_coverage.glyph_coverage_value(mark_glyph)?);
        let base_index = usize::from(self.base_coverage.glyph_coverage_value(base_glyph)?);
        let mark_record = match self.mark_array.get(mark_index) {
            Some(mark_record) => mark_record,
            None => {
                warn!("mark positioning: mark index {} out of range", mark_index);
                return None;
            }
        };
        let base_anchor = self
            .base_array
            .get(base_index)
            .and_then(|anchors| anchors.get(usize::from(mark_record.mark_class)))
            .copied()
            .flatten()?;
        Some((base_anchor, mark_record.mark_anchor))
    }
}

impl PositioningSubtable for MarkBasePos {
    fn position(&self, state: &mut PositioningState<'_>) -> bool {
        let sequence = state.sequence;
        let glyphs = sequence.glyphs();
        let i = state.index;
        let mark_glyph = match state.glyph() {
            Some(glyph) => glyph,
            None => return false,
        };
        if self.mark_coverage.glyph_coverage_value(mark_glyph).is_none() {
            return false;
        }
        let opt_base_index = if self.attach_to_marks {
            state
                .match_type()
                .find_prev(state.opt_gdef_table, glyphs, i)
                .filter(|&j| gdef_is_mark(state.opt_gdef_table, glyphs[j]))
        } else {
            MatchType::ignore_marks().find_prev(state.opt_gdef_table, glyphs, i)
        };
        let base_index = match opt_base_index {
            Some(base_index) => base_index,
            None => return false,
        };
        match self.apply(glyphs[base_index], mark_glyph) {
            Some((base_anchor, mark_anchor)) => {
                let placement = Adjust::placement(
                    i32::from(base_anchor.x) - i32::from(mark_anchor.x),
                    i32::from(base_anchor.y) - i32::from(mark_anchor.y),
                );
                state.adjust(i, placement)
            }
            None => false,
        }
    }
}

/// Apply the positioning features of `processor`, in the processor's order, to `gs`.
///
/// Returns one adjustment per glyph.
pub fn apply_positioning(
    gpos_table: &GlyphPositioningTable,
    opt_gdef_table: Option<&GlyphDefinitionTable>,
    processor: &dyn ScriptProcessor,
    script_tag: u32,
    lang_tag: u32,
    feature_mask: FeatureMask,
    gs: &GlyphSequence,
) -> Vec<Adjust> {
    let mut positions = vec![Adjust::default(); gs.len()];
    let tester = processor.positioning_context_tester();
    for &feature_tag in processor.positioning_features() {
        if !feature_mask.enables(feature_tag) {
            continue;
        }
        for (lookup_index, lookup) in gpos_table.feature_lookups(script_tag, lang_tag, feature_tag)
        {
            gpos_apply_lookup(
                opt_gdef_table,
                tester,
                lookup_index,
                lookup,
                script_tag,
                lang_tag,
                feature_tag,
                gs,
                &mut positions,
            );
        }
    }
    positions
}

fn gpos_apply_lookup(
    opt_gdef_table: Option<&GlyphDefinitionTable>,
    tester: &ScriptContextTester,
    lookup_index: usize,
    lookup: &Lookup<dyn PositioningSubtable>,
    script_tag: u32,
    lang_tag: u32,
    feature_tag: u32,
    gs: &GlyphSequence,
    positions: &mut [Adjust],
) {
    let match_type = MatchType::from_lookup_flag(lookup.lookup_flag);
    let mut i = 0;
    while i < gs.len() {
        let eligible = match_type.match_glyph(opt_gdef_table, gs.glyphs()[i])
            && tester.test(script_tag, lang_tag, feature_tag, gs, i, lookup.lookup_flag);
        if eligible {
            let mut state = PositioningState {
                sequence: gs,
                positions: &mut *positions,
                index: i,
                script_tag,
                lang_tag,
                feature_tag,
                lookup_flag: lookup.lookup_flag,
                opt_gdef_table,
                step: 1,
            };
            if lookup
                .subtables
                .iter()
                .any(|subtable| subtable.position(&mut state))
            {
                debug!(
                    "gpos: '{}' lookup {} applied at glyph {}",
                    DisplayTag(feature_tag),
                    lookup_index,
                    i
                );
                i += state.step();
                continue;
            }
        }
        i += 1;
    }
}
