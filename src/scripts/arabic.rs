//! Shaping for the Arabic script.
//!
//! Joining forms are chosen by context testers attached to the `fina`, `init`, `isol`, `liga`
//! and `medi` features. Joining behaviour is approximated from bidi categories: Arabic letters
//! join, non-spacing marks are transparent, everything else breaks a run. Letters that only
//! join to the right (ALEF, DAL, REH, WAW and friends) and HAMZA are listed in two exception
//! tables.

use crate::context::{LookupFlag, ScriptContextTester};
use crate::gdef::GlyphDefinitionTable;
use crate::glyph_sequence::GlyphSequence;
use crate::layout::Adjust;
use crate::scripts::ScriptProcessor;
use crate::tag;
use crate::unicode::bidi_class;

const SUBSTITUTION_FEATURES: &[u32] = &[
    tag::CALT,
    tag::CCMP,
    tag::FINA,
    tag::INIT,
    tag::ISOL,
    tag::LIGA,
    tag::MEDI,
    tag::RLIG,
];

const POSITIONING_FEATURES: &[u32] = &[tag::CURS, tag::KERN, tag::MARK, tag::MKMK];

/// Letters that never join to the following letter, so the letter after them starts a new
/// run. Sorted.
const ISOLATED_INITIALS: &[u32] = &[
    0x0621, // HAMZA
    0x0622, // ALEF WITH MADDA ABOVE
    0x0623, // ALEF WITH HAMZA ABOVE
    0x0624, // WAW WITH HAMZA ABOVE
    0x0625, // ALEF WITH HAMZA BELOW
    0x0627, // ALEF
    0x062F, // DAL
    0x0630, // THAL
    0x0631, // REH
    0x0632, // ZAIN
    0x0648, // WAW
    0x0671, // ALEF WASLA
    0x0672, // ALEF WITH WAVY HAMZA ABOVE
    0x0673, // ALEF WITH WAVY HAMZA BELOW
    0x0675, // HIGH HAMZA ALEF
    0x0676, // HIGH HAMZA WAW
    0x0677, // U WITH HAMZA ABOVE
    0x0688, 0x0689, 0x068A, 0x068B, 0x068C, 0x068D, 0x068E, 0x068F, // DAL variants
    0x0690, 0x0691, 0x0692, 0x0693, 0x0694, 0x0695, 0x0696, 0x0697, 0x0698, 0x0699, // REH variants
    0x06C4, 0x06C5, 0x06C6, 0x06C7, 0x06C8, 0x06C9, 0x06CA, 0x06CB, // WAW variants
    0x06CF, // WAW WITH DOT ABOVE
    0x06EE, // DAL WITH INVERTED V
    0x06EF, // REH WITH INVERTED V
];

/// Letters that never join to the preceding letter. Sorted.
const ISOLATED_FINALS: &[u32] = &[
    0x0621, // HAMZA
];

pub struct ArabicProcessor {
    substitution_testers: ScriptContextTester,
    positioning_testers: ScriptContextTester,
}

impl ArabicProcessor {
    pub fn new() -> Self {
        ArabicProcessor {
            substitution_testers: ScriptContextTester::new()
                .with_tester(tag::FINA, in_final_context)
                .with_tester(tag::INIT, in_initial_context)
                .with_tester(tag::ISOL, in_isolated_context)
                .with_tester(tag::LIGA, in_ligature_context)
                .with_tester(tag::MEDI, in_medial_context),
            positioning_testers: ScriptContextTester::new(),
        }
    }
}

impl Default for ArabicProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptProcessor for ArabicProcessor {
    fn script(&self) -> u32 {
        tag::ARAB
    }

    fn substitution_features(&self) -> &[u32] {
        SUBSTITUTION_FEATURES
    }

    fn substitution_context_tester(&self) -> &ScriptContextTester {
        &self.substitution_testers
    }

    fn positioning_features(&self) -> &[u32] {
        POSITIONING_FEATURES
    }

    fn positioning_context_tester(&self) -> &ScriptContextTester {
        &self.positioning_testers
    }

    // Marks are already placed by bidi reordering.
    fn reorder_combining_marks(
        &self,
        _opt_gdef_table: Option<&GlyphDefinitionTable>,
        gs: &GlyphSequence,
        _positions: &mut [Adjust],
        _script_tag: u32,
        _lang_tag: u32,
    ) -> GlyphSequence {
        gs.clone()
    }
}

fn is_arabic_letter(c: u32) -> bool {
    bidi_class(c).is_arabic_letter()
}

fn is_transparent(c: u32) -> bool {
    bidi_class(c).is_non_spacing_mark()
}

fn is_isolated_initial(c: u32) -> bool {
    ISOLATED_INITIALS.binary_search(&c).is_ok()
}

fn is_isolated_final(c: u32) -> bool {
    ISOLATED_FINALS.binary_search(&c).is_ok()
}

/// The characters around the glyph at `index`, with transparent characters skipped.
struct JoiningContext<'a> {
    span: &'a [u32],
    preceding: Option<u32>,
    following: Option<u32>,
}

impl<'a> JoiningContext<'a> {
    fn new(gs: &'a GlyphSequence, index: usize) -> Option<Self> {
        let chars = gs.characters();
        if chars.is_empty() {
            return None;
        }
        let assoc = gs.association(index)?;
        let before = chars.get(..assoc.start())?;
        let span = chars.get(assoc.start()..assoc.end())?;
        let after = chars.get(assoc.end()..)?;
        Some(JoiningContext {
            span,
            preceding: before.iter().rev().copied().find(|&c| !is_transparent(c)),
            following: after.iter().copied().find(|&c| !is_transparent(c)),
        })
    }

    fn first_in_span(&self) -> Option<u32> {
        self.span.iter().copied().find(|&c| !is_transparent(c))
    }

    fn last_in_span(&self) -> Option<u32> {
        self.span.iter().rev().copied().find(|&c| !is_transparent(c))
    }

    /// The preceding letter joins to this glyph.
    fn joined_from_preceding(&self) -> bool {
        matches!(self.preceding, Some(c) if is_arabic_letter(c) && !is_isolated_initial(c))
    }

    /// This glyph joins to the following letter.
    fn joins_following(&self) -> bool {
        matches!(self.following, Some(c) if is_arabic_letter(c) && !is_isolated_final(c))
    }
}

fn in_final_context(
    _script_tag: u32,
    _lang_tag: u32,
    _feature_tag: u32,
    gs: &GlyphSequence,
    index: usize,
    _flags: LookupFlag,
) -> bool {
    let context = match JoiningContext::new(gs, index) {
        Some(context) => context,
        None => return false,
    };
    if !context.joined_from_preceding() {
        return false;
    }
    // a glyph ending in a right-joining letter cannot join onwards
    if matches!(context.last_in_span(), Some(c) if is_arabic_letter(c) && is_isolated_initial(c)) {
        return true;
    }
    !context.joins_following()
}

fn in_initial_context(
    _script_tag: u32,
    _lang_tag: u32,
    _feature_tag: u32,
    gs: &GlyphSequence,
    index: usize,
    _flags: LookupFlag,
) -> bool {
    match JoiningContext::new(gs, index) {
        Some(context) => !context.joined_from_preceding() && context.joins_following(),
        None => false,
    }
}

fn in_isolated_context(
    _script_tag: u32,
    _lang_tag: u32,
    _feature_tag: u32,
    gs: &GlyphSequence,
    index: usize,
    _flags: LookupFlag,
) -> bool {
    let character_count = gs.character_count();
    match gs.association(index) {
        Some(assoc) => character_count > 0 && assoc.start() == 0 && assoc.end() == character_count,
        None => false,
    }
}

fn in_medial_context(
    _script_tag: u32,
    _lang_tag: u32,
    _feature_tag: u32,
    gs: &GlyphSequence,
    index: usize,
    _flags: LookupFlag,
) -> bool {
    let context = match JoiningContext::new(gs, index) {
        Some(context) => context,
        None => return false,
    };
    let joins_within = match (context.first_in_span(), context.last_in_span()) {
        (Some(first), Some(last)) => {
            is_arabic_letter(first)
                && is_arabic_letter(last)
                && !is_isolated_final(first)
                && !is_isolated_initial(last)
        }
        _ => false,
    };
    context.joined_from_preceding() && joins_within && context.joins_following()
}

fn in_ligature_context(
    _script_tag: u32,
    _lang_tag: u32,
    _feature_tag: u32,
    gs: &GlyphSequence,
    index: usize,
    _flags: LookupFlag,
) -> bool {
    match JoiningContext::new(gs, index) {
        Some(context) => matches!(context.following, Some(c) if is_arabic_letter(c)),
        None => false,
    }
}
