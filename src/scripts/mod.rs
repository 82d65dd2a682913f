//! Script processors: the per-script knowledge of which features to apply, in which order,
//! and where.

pub mod arabic;
pub mod indic;

use lazy_static::lazy_static;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::context::ScriptContextTester;
use crate::gdef::{gdef_is_mark, GlyphDefinitionTable};
use crate::glyph_sequence::GlyphSequence;
use crate::layout::Adjust;
use crate::tag;
use crate::tag::DisplayTag;
use crate::unicode::script::is_indic_script;

use self::arabic::ArabicProcessor;
use self::indic::IndicProcessor;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptType {
    Arabic,
    Default,
    Indic,
}

impl From<u32> for ScriptType {
    fn from(script_tag: u32) -> Self {
        match script_tag {
            tag::ARAB => ScriptType::Arabic,
            _ if is_indic_script(script_tag) => ScriptType::Indic,
            _ => ScriptType::Default,
        }
    }
}

/// Script specific shaping behaviour.
///
/// Feature lists are ordered: substitution and positioning apply features in exactly the
/// order returned here.
pub trait ScriptProcessor: Send + Sync {
    /// The script tag this processor was built for.
    fn script(&self) -> u32;

    fn substitution_features(&self) -> &[u32];

    fn substitution_context_tester(&self) -> &ScriptContextTester;

    fn positioning_features(&self) -> &[u32];

    fn positioning_context_tester(&self) -> &ScriptContextTester;

    /// Reorder combining marks of a positioned sequence.
    ///
    /// `positions` holds one adjustment per glyph of `gs` and is permuted along with the
    /// glyphs. The returned sequence may be in visual rather than logical order.
    fn reorder_combining_marks(
        &self,
        opt_gdef_table: Option<&GlyphDefinitionTable>,
        gs: &GlyphSequence,
        positions: &mut [Adjust],
        _script_tag: u32,
        _lang_tag: u32,
    ) -> GlyphSequence {
        reorder_marks_before_bases(opt_gdef_table, gs, positions)
    }
}

const DEFAULT_SUBSTITUTION_FEATURES: &[u32] = &[tag::CCMP, tag::LIGA, tag::LOCL];
const DEFAULT_POSITIONING_FEATURES: &[u32] = &[tag::KERN, tag::MARK, tag::MKMK];

/// Processor for scripts without script specific shaping.
///
/// Every feature is eligible everywhere.
pub struct DefaultProcessor {
    script_tag: u32,
    testers: ScriptContextTester,
}

impl DefaultProcessor {
    pub fn new(script_tag: u32) -> Self {
        DefaultProcessor {
            script_tag,
            testers: ScriptContextTester::new(),
        }
    }
}

impl ScriptProcessor for DefaultProcessor {
    fn script(&self) -> u32 {
        self.script_tag
    }

    fn substitution_features(&self) -> &[u32] {
        DEFAULT_SUBSTITUTION_FEATURES
    }

    fn substitution_context_tester(&self) -> &ScriptContextTester {
        &self.testers
    }

    fn positioning_features(&self) -> &[u32] {
        DEFAULT_POSITIONING_FEATURES
    }

    fn positioning_context_tester(&self) -> &ScriptContextTester {
        &self.testers
    }
}

fn is_reordered_mark(
    opt_gdef_table: Option<&GlyphDefinitionTable>,
    glyph: u16,
    position: &Adjust,
) -> bool {
    gdef_is_mark(opt_gdef_table, glyph) && position.x_advance != 0
}

/// Move each spacing mark in front of the base glyph preceding it.
///
/// Marks that follow the same base keep their relative order. Sequences with no spacing
/// marks, or with nothing but spacing marks, are returned unchanged.
pub fn reorder_marks_before_bases(
    opt_gdef_table: Option<&GlyphDefinitionTable>,
    gs: &GlyphSequence,
    positions: &mut [Adjust],
) -> GlyphSequence {
    if positions.len() != gs.len() {
        warn!(
            "mark reordering: {} positions for {} glyphs",
            positions.len(),
            gs.len()
        );
        return gs.clone();
    }
    let marks: Vec<bool> = gs
        .glyphs()
        .iter()
        .zip(positions.iter())
        .map(|(&glyph, position)| is_reordered_mark(opt_gdef_table, glyph, position))
        .collect();
    let mark_count = marks.iter().filter(|&&is_mark| is_mark).count();
    if mark_count == 0 || mark_count == gs.len() {
        return gs.clone();
    }

    let mut order = Vec::with_capacity(gs.len());
    let mut held_base = None;
    for (i, &is_mark) in marks.iter().enumerate() {
        if is_mark {
            order.push(i);
        } else if let Some(base) = held_base.replace(i) {
            order.push(base);
        }
    }
    order.extend(held_base);

    match gs.permuted(&order) {
        Some(reordered) => {
            let reordered_positions: Vec<Adjust> = order.iter().map(|&i| positions[i]).collect();
            positions.copy_from_slice(&reordered_positions);
            reordered
        }
        None => {
            warn!("mark reordering produced an invalid permutation");
            gs.clone()
        }
    }
}

lazy_static! {
    static ref PROCESSORS: FxHashMap<u32, Box<dyn ScriptProcessor>> = build_processors();
    static ref FALLBACK_PROCESSOR: DefaultProcessor = DefaultProcessor::new(tag::DFLT);
}

const DEFAULT_SCRIPTS: &[u32] = &[tag::LATN, tag::CYRL, tag::GREK, tag::HEBR];

const INDIC_SCRIPTS: &[u32] = &[
    tag::BENG,
    tag::BNG2,
    tag::DEVA,
    tag::DEV2,
    tag::GUJR,
    tag::GJR2,
    tag::GURU,
    tag::GUR2,
    tag::KNDA,
    tag::KND2,
    tag::MLYM,
    tag::MLM2,
    tag::MYMR,
    tag::ORYA,
    tag::ORY2,
    tag::TAML,
    tag::TML2,
    tag::TELU,
    tag::TEL2,
];

fn build_processors() -> FxHashMap<u32, Box<dyn ScriptProcessor>> {
    let mut processors: FxHashMap<u32, Box<dyn ScriptProcessor>> = FxHashMap::default();
    for &script_tag in DEFAULT_SCRIPTS {
        processors.insert(script_tag, Box::new(DefaultProcessor::new(script_tag)));
    }
    for &script_tag in INDIC_SCRIPTS {
        processors.insert(script_tag, Box::new(IndicProcessor::new(script_tag)));
    }
    processors.insert(tag::ARAB, Box::new(ArabicProcessor::new()));
    processors
}

/// The shared processor for `script_tag`.
///
/// Scripts without a dedicated processor get a default one.
pub fn processor_for(script_tag: u32) -> &'static dyn ScriptProcessor {
    match PROCESSORS.get(&script_tag) {
        Some(processor) => {
            debug!(
                "selected {:?} processor for '{}'",
                ScriptType::from(script_tag),
                DisplayTag(script_tag)
            );
            processor.as_ref()
        }
        None => {
            debug!("no processor for '{}', using default", DisplayTag(script_tag));
            &*FALLBACK_PROCESSOR
        }
    }
}
