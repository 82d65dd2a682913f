//! Shaping for the Indic scripts.
//!
//! Syllable analysis is left to the font's lookups; this processor only fixes the order in
//! which the Indic features are applied.

use crate::context::ScriptContextTester;
use crate::scripts::ScriptProcessor;
use crate::tag;

const SUBSTITUTION_FEATURES: &[u32] = &[
    tag::LOCL,
    tag::NUKT,
    tag::AKHN,
    tag::RPHF,
    tag::RKRF,
    tag::PREF,
    tag::BLWF,
    tag::ABVF,
    tag::HALF,
    tag::PSTF,
    tag::VATU,
    tag::CJCT,
    tag::PRES,
    tag::ABVS,
    tag::BLWS,
    tag::PSTS,
    tag::HALN,
    tag::CALT,
];

const POSITIONING_FEATURES: &[u32] = &[
    tag::ABVM,
    tag::BLWM,
    tag::DIST,
    tag::KERN,
    tag::MARK,
    tag::MKMK,
];

/// Processor shared by the v1 and v2 Indic script tags.
pub struct IndicProcessor {
    script_tag: u32,
    testers: ScriptContextTester,
}

impl IndicProcessor {
    pub fn new(script_tag: u32) -> Self {
        IndicProcessor {
            script_tag,
            testers: ScriptContextTester::new(),
        }
    }

    /// Whether this processor serves a "v2" script tag such as `dev2`.
    pub fn is_v2(&self) -> bool {
        (self.script_tag & 0xFF) == u32::from(b'2')
    }
}

impl ScriptProcessor for IndicProcessor {
    fn script(&self) -> u32 {
        self.script_tag
    }

    fn substitution_features(&self) -> &[u32] {
        SUBSTITUTION_FEATURES
    }

    fn substitution_context_tester(&self) -> &ScriptContextTester {
        &self.testers
    }

    fn positioning_features(&self) -> &[u32] {
        POSITIONING_FEATURES
    }

    fn positioning_context_tester(&self) -> &ScriptContextTester {
        &self.testers
    }
}
