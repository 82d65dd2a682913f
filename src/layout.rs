//! Lookup table structures shared by glyph substitution and positioning.
//!
//! Tables are assembled in memory by the font provider: a script list mapping script and
//! language tags to features, each feature naming the lookups it applies, and the lookups
//! themselves holding their subtables.

use std::ops::AddAssign;

use itertools::Itertools;
use log::warn;
use rustc_hash::FxHashMap;

use crate::context::LookupFlag;
use crate::tag;

// GSUB and GPOS tables have the same top-level structure
pub struct LayoutTable<S: ?Sized> {
    scripts: FxHashMap<u32, ScriptTable>,
    lookups: Vec<Lookup<S>>,
}

#[derive(Default)]
pub struct ScriptTable {
    opt_default_langsys: Option<LangSys>,
    langsys_records: FxHashMap<u32, LangSys>,
}

#[derive(Default)]
pub struct LangSys {
    feature_records: Vec<FeatureRecord>,
}

pub struct FeatureRecord {
    pub feature_tag: u32,
    pub lookup_indices: Vec<u16>,
}

pub struct Lookup<S: ?Sized> {
    pub lookup_flag: LookupFlag,
    pub subtables: Vec<Box<S>>,
}

impl<S: ?Sized> Lookup<S> {
    pub fn new(lookup_flag: LookupFlag, subtables: Vec<Box<S>>) -> Self {
        Lookup {
            lookup_flag,
            subtables,
        }
    }
}

impl<S: ?Sized> Default for LayoutTable<S> {
    fn default() -> Self {
        LayoutTable {
            scripts: FxHashMap::default(),
            lookups: Vec::new(),
        }
    }
}

impl<S: ?Sized> LayoutTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lookup, returning its index.
    pub fn push_lookup(&mut self, lookup: Lookup<S>) -> u16 {
        self.lookups.push(lookup);
        (self.lookups.len() - 1) as u16
    }

    /// Register `feature_tag` for a script and language, applying the given lookups.
    ///
    /// `dflt` as the language registers the feature with the script's default language system.
    pub fn add_feature(
        &mut self,
        script_tag: u32,
        lang_tag: u32,
        feature_tag: u32,
        lookup_indices: &[u16],
    ) {
        let script = self.scripts.entry(script_tag).or_default();
        let langsys = if lang_tag == tag::DFLT_LANG {
            script.opt_default_langsys.get_or_insert_with(LangSys::default)
        } else {
            script.langsys_records.entry(lang_tag).or_default()
        };
        langsys.feature_records.push(FeatureRecord {
            feature_tag,
            lookup_indices: lookup_indices.to_vec(),
        });
    }

    pub fn find_script(&self, script_tag: u32) -> Option<&ScriptTable> {
        self.scripts.get(&script_tag)
    }

    pub fn find_script_or_default(&self, script_tag: u32) -> Option<&ScriptTable> {
        self.find_script(script_tag)
            .or_else(|| self.find_script(tag::DFLT))
    }

    pub fn lookup(&self, lookup_index: usize) -> Option<&Lookup<S>> {
        self.lookups.get(lookup_index)
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.len()
    }

    /// The lookups a feature applies for a script and language, in lookup list order.
    ///
    /// The script falls back to `DFLT` and the language to the script's default language
    /// system. Duplicate lookup indices are applied once.
    pub fn feature_lookups(
        &self,
        script_tag: u32,
        lang_tag: u32,
        feature_tag: u32,
    ) -> Vec<(usize, &Lookup<S>)> {
        let feature = self
            .find_script_or_default(script_tag)
            .and_then(|script| script.find_langsys_or_default(lang_tag))
            .and_then(|langsys| langsys.find_feature(feature_tag));
        match feature {
            Some(feature) => feature
                .lookup_indices
                .iter()
                .copied()
                .sorted()
                .dedup()
                .map(usize::from)
                .filter_map(|index| self.lookup(index).map(|lookup| (index, lookup)))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl ScriptTable {
    pub fn default_langsys_record(&self) -> Option<&LangSys> {
        self.opt_default_langsys.as_ref()
    }

    pub fn find_langsys(&self, lang_tag: u32) -> Option<&LangSys> {
        self.langsys_records.get(&lang_tag)
    }

    pub fn find_langsys_or_default(&self, lang_tag: u32) -> Option<&LangSys> {
        self.find_langsys(lang_tag)
            .or_else(|| self.default_langsys_record())
    }
}

impl LangSys {
    pub fn find_feature(&self, feature_tag: u32) -> Option<&FeatureRecord> {
        self.feature_records
            .iter()
            .find(|record| record.feature_tag == feature_tag)
    }
}

/// A positioning adjustment, in font design units.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Adjust {
    pub x_placement: i32,
    pub y_placement: i32,
    pub x_advance: i32,
    pub y_advance: i32,
}

impl Adjust {
    pub fn advance(x_advance: i32) -> Adjust {
        Adjust {
            x_advance,
            ..Adjust::default()
        }
    }

    pub fn placement(x_placement: i32, y_placement: i32) -> Adjust {
        Adjust {
            x_placement,
            y_placement,
            ..Adjust::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Adjust::default()
    }
}

impl AddAssign for Adjust {
    fn add_assign(&mut self, other: Adjust) {
        self.x_placement += other.x_placement;
        self.y_placement += other.y_placement;
        self.x_advance += other.x_advance;
        self.y_advance += other.y_advance;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Anchor {
    pub x: i16,
    pub y: i16,
}

#[derive(Debug)]
pub enum Coverage {
    Format1 {
        glyph_array: Vec<u16>,
    },
    Format2 {
        coverage_range_array: Vec<CoverageRangeRecord>,
    },
}

#[derive(Copy, Clone, Debug)]
pub struct CoverageRangeRecord {
    start_glyph: u16,
    end_glyph: u16,
    start_coverage_index: u16,
}

impl Coverage {
    /// A format 1 coverage of the given glyphs, sorted and de-duplicated.
    pub fn from_glyphs(glyphs: impl IntoIterator<Item = u16>) -> Coverage {
        Coverage::Format1 {
            glyph_array: glyphs.into_iter().sorted().dedup().collect(),
        }
    }

    /// A format 2 coverage of inclusive glyph ranges, numbered in the order given.
    ///
    /// Ranges with `start > end` are skipped, as are ranges whose coverage indices would not
    /// fit in a `u16`.
    pub fn from_ranges(ranges: &[(u16, u16)]) -> Coverage {
        let mut coverage_range_array = Vec::with_capacity(ranges.len());
        let mut next_coverage_index = 0u32;
        for &(start_glyph, end_glyph) in ranges.iter().filter(|(start, end)| start <= end) {
            let range_len = u32::from(end_glyph) - u32::from(start_glyph) + 1;
            let start_coverage_index = match u16::try_from(next_coverage_index) {
                Ok(index) if next_coverage_index + range_len <= 0x10000 => index,
                _ => {
                    warn!(
                        "coverage range {}..={} exceeds the coverage index space",
                        start_glyph, end_glyph
                    );
                    continue;
                }
            };
            coverage_range_array.push(CoverageRangeRecord {
                start_glyph,
                end_glyph,
                start_coverage_index,
            });
            next_coverage_index += range_len;
        }
        Coverage::Format2 {
            coverage_range_array,
        }
    }

    pub fn glyph_coverage_value(&self, glyph: u16) -> Option<u16> {
        match *self {
            Coverage::Format1 { ref glyph_array } => {
                // The glyph indices must be in numerical order for binary searching of the list.
                if let Ok(index) = glyph_array.binary_search(&glyph) {
                    Some(index as u16)
                } else {
                    None
                }
            }
            Coverage::Format2 {
                ref coverage_range_array,
            } => {
                for coverage_range in coverage_range_array {
                    if (glyph >= coverage_range.start_glyph) && (glyph <= coverage_range.end_glyph)
                    {
                        return coverage_range
                            .start_coverage_index
                            .checked_add(glyph - coverage_range.start_glyph);
                    }
                }
                None
            }
        }
    }

    /// Convenience method to count the total number of glyphs covered
    pub fn glyph_count(&self) -> usize {
        match self {
            Coverage::Format1 { glyph_array } => glyph_array.len(),
            Coverage::Format2 {
                coverage_range_array,
            } => coverage_range_array
                .iter()
                .fold(0, |acc, coverage_range_record| {
                    acc + (usize::from(coverage_range_record.end_glyph))
                        - (usize::from(coverage_range_record.start_glyph))
                        + 1
                }),
        }
    }
}

#[derive(Debug)]
pub enum ClassDef {
    Format1 {
        start_glyph: u16,
        class_value_array: Vec<u16>,
    },
    Format2 {
        class_range_array: Vec<ClassRangeRecord>,
    },
}

#[derive(Copy, Clone, Debug)]
pub struct ClassRangeRecord {
    start_glyph: u16,
    end_glyph: u16,
    class_value: u16,
}

impl ClassDef {
    /// A format 2 class definition from `(glyph, class)` pairs.
    ///
    /// Consecutive glyphs sharing a class are merged into one range. When a glyph is listed
    /// more than once the first class wins.
    pub fn from_glyph_classes(pairs: impl IntoIterator<Item = (u16, u16)>) -> ClassDef {
        let mut class_range_array: Vec<ClassRangeRecord> = Vec::new();
        let pairs = pairs
            .into_iter()
            .enumerate()
            .sorted_by_key(|&(order, (glyph, _))| (glyph, order))
            .map(|(_, pair)| pair)
            .dedup_by(|a, b| a.0 == b.0);
        for (glyph, class_value) in pairs {
            match class_range_array.last_mut() {
                Some(range)
                    if range.class_value == class_value
                        && u32::from(range.end_glyph) + 1 == u32::from(glyph) =>
                {
                    range.end_glyph = glyph
                }
                _ => class_range_array.push(ClassRangeRecord {
                    start_glyph: glyph,
                    end_glyph: glyph,
                    class_value,
                }),
            }
        }
        ClassDef::Format2 { class_range_array }
    }

    pub fn glyph_class_value(&self, glyph: u16) -> u16 {
        match *self {
            ClassDef::Format1 {
                start_glyph,
                ref class_value_array,
            } => {
                if (glyph >= start_glyph)
                    && (usize::from(glyph - start_glyph) < class_value_array.len())
                {
                    class_value_array[usize::from(glyph - start_glyph)]
                } else {
                    0
                }
            }
            ClassDef::Format2 {
                ref class_range_array,
            } => {
                for class_range in class_range_array {
                    if (glyph >= class_range.start_glyph) && (glyph <= class_range.end_glyph) {
                        return class_range.class_value;
                    }
                }
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod coverage {
        use super::*;

        #[test]
        fn test_format1() {
            let coverage = Coverage::from_glyphs([30, 10, 20, 10]);
            assert_eq!(coverage.glyph_coverage_value(10), Some(0));
            assert_eq!(coverage.glyph_coverage_value(20), Some(1));
            assert_eq!(coverage.glyph_coverage_value(30), Some(2));
            assert_eq!(coverage.glyph_coverage_value(15), None);
            assert_eq!(coverage.glyph_count(), 3);
        }

        #[test]
        fn test_format2() {
            let coverage = Coverage::from_ranges(&[(10, 12), (20, 20), (9, 1)]);
            assert_eq!(coverage.glyph_coverage_value(10), Some(0));
            assert_eq!(coverage.glyph_coverage_value(12), Some(2));
            assert_eq!(coverage.glyph_coverage_value(20), Some(3));
            assert_eq!(coverage.glyph_coverage_value(13), None);
            assert_eq!(coverage.glyph_coverage_value(5), None);
            assert_eq!(coverage.glyph_count(), 4);
        }

        #[test]
        fn test_format2_full_range() {
            let coverage = Coverage::from_ranges(&[(0, 0xFFFF), (5, 6)]);
            assert_eq!(coverage.glyph_coverage_value(0), Some(0));
            assert_eq!(coverage.glyph_coverage_value(0xFFFF), Some(0xFFFF));
            // no index space is left for the second range
            assert_eq!(coverage.glyph_count(), 0x10000);

            let coverage = Coverage::from_ranges(&[(1, 0xFFFF), (0, 0), (0, 1)]);
            assert_eq!(coverage.glyph_coverage_value(0), Some(0xFFFF));
            assert_eq!(coverage.glyph_coverage_value(0xFFFF), Some(0xFFFE));
            assert_eq!(coverage.glyph_count(), 0x10000);
        }
    }

    mod class_def {
        use super::*;

        #[test]
        fn test_from_glyph_classes() {
            let classdef = ClassDef::from_glyph_classes([(5, 3), (3, 1), (4, 1), (7, 3), (5, 2)]);
            assert_eq!(classdef.glyph_class_value(3), 1);
            assert_eq!(classdef.glyph_class_value(4), 1);
            assert_eq!(classdef.glyph_class_value(5), 3);
            assert_eq!(classdef.glyph_class_value(6), 0);
            assert_eq!(classdef.glyph_class_value(7), 3);
            match classdef {
                ClassDef::Format2 { class_range_array } => assert_eq!(class_range_array.len(), 3),
                ClassDef::Format1 { .. } => panic!("expected format 2"),
            }
        }

        #[test]
        fn test_format1() {
            let classdef = ClassDef::Format1 {
                start_glyph: 10,
                class_value_array: vec![1, 2, 3],
            };
            assert_eq!(classdef.glyph_class_value(9), 0);
            assert_eq!(classdef.glyph_class_value(11), 2);
            assert_eq!(classdef.glyph_class_value(13), 0);
        }
    }

    mod layout_table {
        use super::*;

        struct Dummy;

        fn table() -> LayoutTable<Dummy> {
            let mut table = LayoutTable::new();
            let first = table.push_lookup(Lookup::new(LookupFlag(0), vec![Box::new(Dummy)]));
            let second = table.push_lookup(Lookup::new(LookupFlag(8), vec![]));
            table.add_feature(tag::ARAB, tag::DFLT_LANG, tag::INIT, &[second, first, second]);
            table.add_feature(tag::ARAB, tag!(b"URD "), tag::INIT, &[second]);
            table.add_feature(tag::DFLT, tag::DFLT_LANG, tag::LIGA, &[first, 7]);
            table
        }

        #[test]
        fn test_sorted_dedup() {
            let table = table();
            let lookups = table.feature_lookups(tag::ARAB, tag::DFLT_LANG, tag::INIT);
            let indices: Vec<usize> = lookups.iter().map(|(index, _)| *index).collect();
            assert_eq!(indices, vec![0, 1]);
        }

        #[test]
        fn test_language() {
            let table = table();
            let lookups = table.feature_lookups(tag::ARAB, tag!(b"URD "), tag::INIT);
            assert_eq!(lookups.len(), 1);
            assert_eq!(lookups[0].1.lookup_flag.0, 8);
            // unknown language falls back to the default language system
            let lookups = table.feature_lookups(tag::ARAB, tag!(b"FAR "), tag::INIT);
            assert_eq!(lookups.len(), 2);
        }

        #[test]
        fn test_script_fallback() {
            let table = table();
            // missing lookup 7 is skipped
            let lookups = table.feature_lookups(tag::LATN, tag::DFLT_LANG, tag::LIGA);
            assert_eq!(lookups.len(), 1);
            assert!(table
                .feature_lookups(tag::ARAB, tag::DFLT_LANG, tag::LIGA)
                .is_empty());
            assert_eq!(table.lookup_count(), 2);
        }
    }

    #[test]
    fn test_adjust() {
        let mut adjust = Adjust::advance(-20);
        adjust += Adjust::placement(5, 10);
        assert_eq!(
            adjust,
            Adjust {
                x_placement: 5,
                y_placement: 10,
                x_advance: -20,
                y_advance: 0
            }
        );
        assert!(!adjust.is_zero());
        assert!(Adjust::default().is_zero());
    }
}
