//! Glyph substitution (`gsub`) implementation.
//!
//! > The Glyph Substitution (GSUB) table provides data for substition of glyphs for appropriate
//! > rendering of scripts, such as cursively-connecting forms in Arabic script, or for advanced
//! > typographic effects, such as ligatures.
//!
//! — <https://docs.microsoft.com/en-us/typography/opentype/spec/gsub>

use bitflags::bitflags;
use log::{debug, warn};
use tinyvec::{tiny_vec, TinyVec};

use crate::context::{LookupFlag, MatchType, ScriptContextTester};
use crate::gdef::GlyphDefinitionTable;
use crate::glyph_sequence::GlyphSequence;
use crate::layout::{Coverage, LayoutTable, Lookup};
use crate::scripts::ScriptProcessor;
use crate::tag;
use crate::tag::DisplayTag;

/// Substitution lookups keyed by script, language and feature.
pub type GlyphSubstitutionTable = LayoutTable<dyn SubstitutionSubtable>;

bitflags! {
    /// Features the caller allows to be applied.
    ///
    /// Processors still decide the order features are applied in; the mask only switches
    /// features off. Features not listed here cannot be disabled.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct FeatureMask: u64 {
        const ABVF = 1 << 0;
        const ABVM = 1 << 1;
        const ABVS = 1 << 2;
        const AKHN = 1 << 3;
        const BLWF = 1 << 4;
        const BLWM = 1 << 5;
        const BLWS = 1 << 6;
        const CALT = 1 << 7;
        const CCMP = 1 << 8;
        const CJCT = 1 << 9;
        const CURS = 1 << 10;
        const DIST = 1 << 11;
        const FINA = 1 << 12;
        const HALF = 1 << 13;
        const HALN = 1 << 14;
        const INIT = 1 << 15;
        const ISOL = 1 << 16;
        const KERN = 1 << 17;
        const LIGA = 1 << 18;
        const LOCL = 1 << 19;
        const MARK = 1 << 20;
        const MEDI = 1 << 21;
        const MKMK = 1 << 22;
        const NUKT = 1 << 23;
        const PREF = 1 << 24;
        const PRES = 1 << 25;
        const PSTF = 1 << 26;
        const PSTS = 1 << 27;
        const RKRF = 1 << 28;
        const RLIG = 1 << 29;
        const RPHF = 1 << 30;
        const VATU = 1 << 31;
    }
}

impl Default for FeatureMask {
    fn default() -> Self {
        FeatureMask::all()
    }
}

impl FeatureMask {
    pub fn from_tag(feature_tag: u32) -> FeatureMask {
        match feature_tag {
            tag::ABVF => FeatureMask::ABVF,
            tag::ABVM => FeatureMask::ABVM,
            tag::ABVS => FeatureMask::ABVS,
            tag::AKHN => FeatureMask::AKHN,
            tag::BLWF => FeatureMask::BLWF,
            tag::BLWM => FeatureMask::BLWM,
            tag::BLWS => FeatureMask::BLWS,
            tag::CALT => FeatureMask::CALT,
            tag::CCMP => FeatureMask::CCMP,
            tag::CJCT => FeatureMask::CJCT,
            tag::CURS => FeatureMask::CURS,
            tag::DIST => FeatureMask::DIST,
            tag::FINA => FeatureMask::FINA,
            tag::HALF => FeatureMask::HALF,
            tag::HALN => FeatureMask::HALN,
            tag::INIT => FeatureMask::INIT,
            tag::ISOL => FeatureMask::ISOL,
            tag::KERN => FeatureMask::KERN,
            tag::LIGA => FeatureMask::LIGA,
            tag::LOCL => FeatureMask::LOCL,
            tag::MARK => FeatureMask::MARK,
            tag::MEDI => FeatureMask::MEDI,
            tag::MKMK => FeatureMask::MKMK,
            tag::NUKT => FeatureMask::NUKT,
            tag::PREF => FeatureMask::PREF,
            tag::PRES => FeatureMask::PRES,
            tag::PSTF => FeatureMask::PSTF,
            tag::PSTS => FeatureMask::PSTS,
            tag::RKRF => FeatureMask::RKRF,
            tag::RLIG => FeatureMask::RLIG,
            tag::RPHF => FeatureMask::RPHF,
            tag::VATU => FeatureMask::VATU,
            _ => FeatureMask::empty(),
        }
    }

    /// Whether `feature_tag` may be applied under this mask.
    pub fn enables(self, feature_tag: u32) -> bool {
        self.contains(FeatureMask::from_tag(feature_tag))
    }
}

/// The state handed to a substitution subtable: the sequence being rewritten and the position
/// the driver is at.
pub struct SubstitutionState<'a> {
    pub sequence: &'a mut GlyphSequence,
    pub index: usize,
    pub script_tag: u32,
    pub lang_tag: u32,
    pub feature_tag: u32,
    pub lookup_flag: LookupFlag,
    pub opt_gdef_table: Option<&'a GlyphDefinitionTable>,
    step: usize,
}

impl<'a> SubstitutionState<'a> {
    pub fn new(
        sequence: &'a mut GlyphSequence,
        opt_gdef_table: Option<&'a GlyphDefinitionTable>,
        script_tag: u32,
        lang_tag: u32,
        feature_tag: u32,
    ) -> Self {
        SubstitutionState {
            sequence,
            index: 0,
            script_tag,
            lang_tag,
            feature_tag,
            lookup_flag: LookupFlag::default(),
            opt_gdef_table,
            step: 1,
        }
    }

    /// The glyph at the current index.
    pub fn glyph(&self) -> Option<u16> {
        self.sequence.glyph(self.index)
    }

    pub fn match_type(&self) -> MatchType {
        MatchType::from_lookup_flag(self.lookup_flag)
    }

    /// Record the number of glyphs the driver steps over after a successful substitution.
    ///
    /// Zero is valid when the current glyph was deleted.
    pub fn set_step(&mut self, step: usize) {
        self.step = step;
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

/// A substitution subtable.
///
/// `substitute` only looks at and rewrites the sequence around `state.index`. It returns `false`
/// when the subtable does not cover the glyph there, leaving the sequence untouched.
pub trait SubstitutionSubtable {
    fn substitute(&self, state: &mut SubstitutionState<'_>) -> bool;
}

pub enum SingleSubst {
    Format1 {
        coverage: Coverage,
        delta_glyph_index: i16,
    },
    Format2 {
        coverage: Coverage,
        substitute_glyph_array: Vec<u16>,
    },
}

impl SingleSubst {
    pub fn apply_glyph(&self, glyph: u16) -> Option<u16> {
        match *self {
            SingleSubst::Format1 {
                ref coverage,
                delta_glyph_index,
            } => {
                if coverage.glyph_coverage_value(glyph).is_some() {
                    let new_glyph_index = glyph as isize + delta_glyph_index as isize;
                    // Addition of deltaGlyphID is modulo 65536, which is why the mask is used.
                    Some((new_glyph_index & 0xffff) as u16)
                } else {
                    None
                }
            }
            SingleSubst::Format2 {
                ref coverage,
                ref substitute_glyph_array,
            } => {
                let coverage_index = usize::from(coverage.glyph_coverage_value(glyph)?);
                let new_glyph_index = substitute_glyph_array.get(coverage_index).copied();
                if new_glyph_index.is_none() {
                    warn!("single substitution: coverage index {} out of range", coverage_index);
                }
                new_glyph_index
            }
        }
    }
}

impl SubstitutionSubtable for SingleSubst {
    fn substitute(&self, state: &mut SubstitutionState<'_>) -> bool {
        match state.glyph().and_then(|glyph| self.apply_glyph(glyph)) {
            Some(output_glyph) => {
                state.sequence.set_glyph(state.index, output_glyph);
                state.set_step(1);
                true
            }
            None => false,
        }
    }
}

pub struct MultipleSubst {
    coverage: Coverage,
    sequences: Vec<SequenceTable>,
}

pub struct SequenceTable {
    pub substitute_glyphs: Vec<u16>,
}

impl MultipleSubst {
    pub fn new(coverage: Coverage, sequences: Vec<SequenceTable>) -> Self {
        MultipleSubst {
            coverage,
            sequences,
        }
    }

    pub fn apply_glyph(&self, glyph: u16) -> Option<&SequenceTable> {
        let coverage_index = usize::from(self.coverage.glyph_coverage_value(glyph)?);
        let sequence = self.sequences.get(coverage_index);
        if sequence.is_none() {
            warn!("multiple substitution: coverage index {} out of range", coverage_index);
        }
        sequence
    }
}

impl SubstitutionSubtable for MultipleSubst {
    fn substitute(&self, state: &mut SubstitutionState<'_>) -> bool {
        match state.glyph().and_then(|glyph| self.apply_glyph(glyph)) {
            // an empty sequence deletes the glyph; the format forbids this, but implementations
            // all allow it
            Some(sequence_table) => {
                let applied = state
                    .sequence
                    .replace(state.index, &sequence_table.substitute_glyphs);
                state.set_step(sequence_table.substitute_glyphs.len());
                applied
            }
            None => false,
        }
    }
}

pub struct LigatureSubst {
    coverage: Coverage,
    ligaturesets: Vec<LigatureSet>,
}

pub struct LigatureSet {
    pub ligatures: Vec<Ligature>,
}

pub struct Ligature {
    pub ligature_glyph: u16,
    /// Components following the first, which is given by the coverage.
    pub component_glyphs: Vec<u16>,
}

impl LigatureSubst {
    pub fn new(coverage: Coverage, ligaturesets: Vec<LigatureSet>) -> Self {
        LigatureSubst {
            coverage,
            ligaturesets,
        }
    }

    pub fn apply_glyph(&self, glyph: u16) -> Option<&LigatureSet> {
        let coverage_index = usize::from(self.coverage.glyph_coverage_value(glyph)?);
        let ligatureset = self.ligaturesets.get(coverage_index);
        if ligatureset.is_none() {
            warn!("ligature substitution: coverage index {} out of range", coverage_index);
        }
        ligatureset
    }
}

impl Ligature {
    /// Indices of the glyphs forming this ligature when it starts at `i`, skipping glyphs the
    /// match type ignores.
    pub fn matches(
        &self,
        match_type: MatchType,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        i: usize,
        glyphs: &[u16],
    ) -> Option<TinyVec<[usize; 8]>> {
        let mut indices = tiny_vec!([usize; 8] => i);
        let mut index = i;
        for &component in &self.component_glyphs {
            index = match_type.find_next(opt_gdef_table, glyphs, index)?;
            if glyphs[index] != component {
                return None;
            }
            indices.push(index);
        }
        Some(indices)
    }
}

impl SubstitutionSubtable for LigatureSubst {
    fn substitute(&self, state: &mut SubstitutionState<'_>) -> bool {
        let ligatureset = match state.glyph().and_then(|glyph| self.apply_glyph(glyph)) {
            Some(ligatureset) => ligatureset,
            None => return false,
        };
        let match_type = state.match_type();
        for ligature in &ligatureset.ligatures {
            if let Some(indices) = ligature.matches(
                match_type,
                state.opt_gdef_table,
                state.index,
                state.sequence.glyphs(),
            ) {
                let span = indices.last().map_or(1, |last| last - state.index + 1);
                let skipped = span - indices.len();
                if state.sequence.ligate(&indices, ligature.ligature_glyph) {
                    // glyphs skipped over inside the ligature now follow it
                    state.set_step(skipped + 1);
                    return true;
                }
            }
        }
        false
    }
}

/// Apply the substitution features of `processor`, in the processor's order, to `gs`.
pub fn apply_substitution(
    gsub_table: &GlyphSubstitutionTable,
    opt_gdef_table: Option<&GlyphDefinitionTable>,
    processor: &dyn ScriptProcessor,
    script_tag: u32,
    lang_tag: u32,
    feature_mask: FeatureMask,
    gs: &mut GlyphSequence,
) {
    let tester = processor.substitution_context_tester();
    for &feature_tag in processor.substitution_features() {
        if !feature_mask.enables(feature_tag) {
            continue;
        }
        for (lookup_index, lookup) in gsub_table.feature_lookups(script_tag, lang_tag, feature_tag)
        {
            gsub_apply_lookup(
                opt_gdef_table,
                tester,
                lookup_index,
                lookup,
                script_tag,
                lang_tag,
                feature_tag,
                gs,
            );
        }
    }
}

fn gsub_apply_lookup(
    opt_gdef_table: Option<&GlyphDefinitionTable>,
    tester: &ScriptContextTester,
    lookup_index: usize,
    lookup: &Lookup<dyn SubstitutionSubtable>,
    script_tag: u32,
    lang_tag: u32,
    feature_tag: u32,
    gs: &mut GlyphSequence,
) {
    let match_type = MatchType::from_lookup_flag(lookup.lookup_flag);
    let mut i = 0;
    while i < gs.len() {
        let eligible = match_type.match_glyph(opt_gdef_table, gs.glyphs()[i])
            && tester.test(script_tag, lang_tag, feature_tag, gs, i, lookup.lookup_flag);
        if eligible {
            let mut state = SubstitutionState {
                sequence: &mut *gs,
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
                .any(|subtable| subtable.substitute(&mut state))
            {
                debug!(
                    "gsub: '{}' lookup {} applied at glyph {}",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdef::{self, GlyphDefinitionTable};
    use crate::layout::ClassDef;
    use crate::scripts::processor_for;

    fn sequence(glyphs: &[u16]) -> GlyphSequence {
        let chars: Vec<u32> = glyphs.iter().map(|&g| u32::from(g)).collect();
        GlyphSequence::from_chars(chars, |c| c as u16)
    }

    fn spans(gs: &GlyphSequence) -> Vec<(usize, usize)> {
        gs.associations()
            .iter()
            .map(|assoc| (assoc.start(), assoc.end()))
            .collect()
    }

    fn substitute(
        subtable: &dyn SubstitutionSubtable,
        gs: &mut GlyphSequence,
        index: usize,
    ) -> (bool, usize) {
        let mut state = SubstitutionState::new(gs, None, tag::LATN, tag::DFLT_LANG, tag::LIGA);
        state.index = index;
        let applied = subtable.substitute(&mut state);
        (applied, state.step())
    }

    mod single_subst {
        use super::*;

        #[test]
        fn test_delta() {
            let subst = SingleSubst::Format1 {
                coverage: Coverage::from_glyphs([5]),
                delta_glyph_index: -3,
            };
            assert_eq!(subst.apply_glyph(5), Some(2));
            assert_eq!(subst.apply_glyph(6), None);
        }

        #[test]
        fn test_delta_wraps() {
            let subst = SingleSubst::Format1 {
                coverage: Coverage::from_glyphs([1]),
                delta_glyph_index: -2,
            };
            assert_eq!(subst.apply_glyph(1), Some(0xFFFF));
        }

        #[test]
        fn test_mapped() {
            let subst = SingleSubst::Format2 {
                coverage: Coverage::from_glyphs([4, 8]),
                substitute_glyph_array: vec![40],
            };
            assert_eq!(subst.apply_glyph(4), Some(40));
            // malformed: coverage index past the substitute array
            assert_eq!(subst.apply_glyph(8), None);
        }

        #[test]
        fn test_substitute() {
            let subst = SingleSubst::Format2 {
                coverage: Coverage::from_glyphs([2]),
                substitute_glyph_array: vec![20],
            };
            let mut gs = sequence(&[1, 2, 3]);
            assert_eq!(substitute(&subst, &mut gs, 0), (false, 1));
            assert_eq!(substitute(&subst, &mut gs, 1), (true, 1));
            assert_eq!(gs.glyphs(), &[1, 20, 3]);
            assert_eq!(spans(&gs), vec![(0, 1), (1, 2), (2, 3)]);
        }
    }

    mod multiple_subst {
        use super::*;

        fn subst() -> MultipleSubst {
            MultipleSubst::new(
                Coverage::from_glyphs([2, 3]),
                vec![
                    SequenceTable {
                        substitute_glyphs: vec![21, 22],
                    },
                    SequenceTable {
                        substitute_glyphs: vec![],
                    },
                ],
            )
        }

        #[test]
        fn test_expand() {
            let mut gs = sequence(&[1, 2, 3]);
            assert_eq!(substitute(&subst(), &mut gs, 1), (true, 2));
            assert_eq!(gs.glyphs(), &[1, 21, 22, 3]);
            assert_eq!(spans(&gs), vec![(0, 1), (1, 2), (1, 2), (2, 3)]);
        }

        #[test]
        fn test_delete() {
            let mut gs = sequence(&[1, 3, 4]);
            assert_eq!(substitute(&subst(), &mut gs, 1), (true, 0));
            assert_eq!(gs.glyphs(), &[1, 4]);
        }
    }

    mod ligature_subst {
        use super::*;

        // f + f + i => 100, f + i => 101
        fn subst() -> LigatureSubst {
            LigatureSubst::new(
                Coverage::from_glyphs([1]),
                vec![LigatureSet {
                    ligatures: vec![
                        Ligature {
                            ligature_glyph: 100,
                            component_glyphs: vec![1, 2],
                        },
                        Ligature {
                            ligature_glyph: 101,
                            component_glyphs: vec![2],
                        },
                    ],
                }],
            )
        }

        #[test]
        fn test_first_match_wins() {
            let mut gs = sequence(&[1, 1, 2, 9]);
            assert_eq!(substitute(&subst(), &mut gs, 0), (true, 1));
            assert_eq!(gs.glyphs(), &[100, 9]);
            assert_eq!(spans(&gs), vec![(0, 3), (3, 4)]);
        }

        #[test]
        fn test_shorter_ligature() {
            let mut gs = sequence(&[9, 1, 2]);
            assert_eq!(substitute(&subst(), &mut gs, 1), (true, 1));
            assert_eq!(gs.glyphs(), &[9, 101]);
        }

        #[test]
        fn test_no_match_at_end() {
            let mut gs = sequence(&[9, 1]);
            assert_eq!(substitute(&subst(), &mut gs, 1).0, false);
            assert_eq!(gs.glyphs(), &[9, 1]);
        }

        #[test]
        fn test_skips_marks() {
            let gdef = GlyphDefinitionTable::new(ClassDef::from_glyph_classes([(
                7,
                gdef::GLYPH_CLASS_MARK,
            )]));
            let mut gs = sequence(&[1, 7, 2]);
            let mut state =
                SubstitutionState::new(&mut gs, Some(&gdef), tag::LATN, tag::DFLT_LANG, tag::LIGA);
            state.lookup_flag = LookupFlag(LookupFlag::IGNORE_MARKS);
            assert!(subst().substitute(&mut state));
            assert_eq!(state.step(), 2);
            assert_eq!(gs.glyphs(), &[101, 7]);
            assert_eq!(spans(&gs), vec![(0, 3), (1, 2)]);
        }

        #[test]
        fn test_mark_blocks_without_flag() {
            let mut gs = sequence(&[1, 7, 2]);
            assert_eq!(substitute(&subst(), &mut gs, 0).0, false);
        }
    }

    mod feature_mask {
        use super::*;

        #[test]
        fn test_enables() {
            let mask = FeatureMask::default() - FeatureMask::LIGA;
            assert!(!mask.enables(tag::LIGA));
            assert!(mask.enables(tag::INIT));
            // features outside the mask can't be switched off
            assert!(FeatureMask::empty().enables(tag!(b"zzzz")));
        }
    }

    mod apply_substitution {
        use super::*;

        fn table() -> GlyphSubstitutionTable {
            let mut table = GlyphSubstitutionTable::new();
            let single: Box<dyn SubstitutionSubtable> = Box::new(SingleSubst::Format1 {
                coverage: Coverage::from_glyphs([1, 2]),
                delta_glyph_index: 10,
            });
            let liga: Box<dyn SubstitutionSubtable> = Box::new(LigatureSubst::new(
                Coverage::from_glyphs([11]),
                vec![LigatureSet {
                    ligatures: vec![Ligature {
                        ligature_glyph: 50,
                        component_glyphs: vec![12],
                    }],
                }],
            ));
            let ccmp = table.push_lookup(Lookup::new(LookupFlag(0), vec![single]));
            let liga = table.push_lookup(Lookup::new(LookupFlag(0), vec![liga]));
            table.add_feature(tag::DFLT, tag::DFLT_LANG, tag::CCMP, &[ccmp]);
            table.add_feature(tag::DFLT, tag::DFLT_LANG, tag::LIGA, &[liga]);
            table
        }

        #[test]
        fn test_feature_order() {
            // ccmp maps 1 => 11 and 2 => 12 before liga forms 11 + 12 => 50
            let mut gs = sequence(&[1, 2, 3]);
            let processor = processor_for(tag::LATN);
            apply_substitution(
                &table(),
                None,
                processor,
                tag::LATN,
                tag::DFLT_LANG,
                FeatureMask::default(),
                &mut gs,
            );
            assert_eq!(gs.glyphs(), &[50, 3]);
            assert_eq!(spans(&gs), vec![(0, 2), (2, 3)]);
        }

        #[test]
        fn test_masked_feature() {
            let mut gs = sequence(&[1, 2, 3]);
            apply_substitution(
                &table(),
                None,
                processor_for(tag::LATN),
                tag::LATN,
                tag::DFLT_LANG,
                FeatureMask::default() - FeatureMask::LIGA,
                &mut gs,
            );
            assert_eq!(gs.glyphs(), &[11, 12, 3]);
        }

        #[test]
        fn test_empty_sequence() {
            let mut gs = sequence(&[]);
            apply_substitution(
                &table(),
                None,
                processor_for(tag::LATN),
                tag::LATN,
                tag::DFLT_LANG,
                FeatureMask::default(),
                &mut gs,
            );
            assert!(gs.is_empty());
        }
    }
}
