#![allow(dead_code)]

use complex_scripts::context::LookupFlag;
use complex_scripts::gdef::GlyphDefinitionTable;
use complex_scripts::gpos::{MarkBasePos, MarkRecord, PairPos, PairSet, PairValueRecord};
use complex_scripts::gpos::{PositioningSubtable, SinglePos};
use complex_scripts::gsub::{Ligature, LigatureSet, LigatureSubst, SequenceTable};
use complex_scripts::gsub::{MultipleSubst, SingleSubst, SubstitutionSubtable};
use complex_scripts::layout::{Adjust, Anchor, ClassDef, Coverage, LayoutTable, Lookup};
use complex_scripts::tag;

use rustc_hash::FxHashMap;

pub fn chars(text: &str) -> Vec<u32> {
    text.chars().map(u32::from).collect()
}

pub fn glyph_map(pairs: &[(u32, u16)]) -> FxHashMap<u32, u16> {
    pairs.iter().copied().collect()
}

pub fn glyph_classes(pairs: &[(u16, u16)]) -> GlyphDefinitionTable {
    GlyphDefinitionTable::new(ClassDef::from_glyph_classes(pairs.iter().copied()))
}

/// Register one lookup under `feature_tag` for the default script and language.
pub fn add_lookup<S: ?Sized>(
    table: &mut LayoutTable<S>,
    feature_tag: u32,
    lookup_flag: u16,
    subtables: Vec<Box<S>>,
) {
    let index = table.push_lookup(Lookup::new(LookupFlag(lookup_flag), subtables));
    table.add_feature(tag::DFLT, tag::DFLT_LANG, feature_tag, &[index]);
}

pub fn single_subst(pairs: &[(u16, u16)]) -> Box<dyn SubstitutionSubtable> {
    let mut pairs = pairs.to_vec();
    pairs.sort_unstable();
    Box::new(SingleSubst::Format2 {
        coverage: Coverage::from_glyphs(pairs.iter().map(|&(input, _)| input)),
        substitute_glyph_array: pairs.iter().map(|&(_, output)| output).collect(),
    })
}

pub fn multiple_subst(input: u16, output: &[u16]) -> Box<dyn SubstitutionSubtable> {
    Box::new(MultipleSubst::new(
        Coverage::from_glyphs([input]),
        vec![SequenceTable {
            substitute_glyphs: output.to_vec(),
        }],
    ))
}

pub fn ligature_subst(components: &[u16], ligature_glyph: u16) -> Box<dyn SubstitutionSubtable> {
    Box::new(LigatureSubst::new(
        Coverage::from_glyphs([components[0]]),
        vec![LigatureSet {
            ligatures: vec![Ligature {
                ligature_glyph,
                component_glyphs: components[1..].to_vec(),
            }],
        }],
    ))
}

pub fn single_pos(glyph: u16, adjust: Adjust) -> Box<dyn PositioningSubtable> {
    Box::new(SinglePos::Format1 {
        coverage: Coverage::from_glyphs([glyph]),
        value_record: adjust,
    })
}

pub fn kern_pair(first: u16, second: u16, x_advance: i32) -> Box<dyn PositioningSubtable> {
    Box::new(PairPos::Format1 {
        coverage: Coverage::from_glyphs([first]),
        pairsets: vec![PairSet {
            pair_value_records: vec![PairValueRecord {
                second_glyph: second,
                value_record1: Adjust::advance(x_advance),
                value_record2: Adjust::default(),
            }],
        }],
    })
}

/// Attach `mark` to any of `bases`, all bases sharing one anchor.
pub fn mark_to_base(
    mark: u16,
    mark_anchor: Anchor,
    bases: &[u16],
    base_anchor: Anchor,
) -> Box<dyn PositioningSubtable> {
    let mut bases = bases.to_vec();
    bases.sort_unstable();
    bases.dedup();
    Box::new(MarkBasePos::new(
        Coverage::from_glyphs([mark]),
        Coverage::from_glyphs(bases.iter().copied()),
        vec![MarkRecord {
            mark_class: 0,
            mark_anchor,
        }],
        bases.iter().map(|_| vec![Some(base_anchor)]).collect(),
    ))
}
