//! Glyph sequences that remember which characters produced each glyph.

use std::rc::Rc;

use tinyvec::TinyVec;

use crate::error::EncodeError;
use crate::unicode::from_scalar_array;

/// The half-open span `[start, end)` of characters a glyph was produced from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub struct CharAssociation {
    start: usize,
    end: usize,
}

impl CharAssociation {
    /// # Panics
    ///
    /// Panics if `start > end`. [`CharAssociation::try_new`] is the non-panicking form.
    pub fn new(start: usize, end: usize) -> CharAssociation {
        assert!(start <= end, "association start after end");
        CharAssociation { start, end }
    }

    /// The span `[start, end)`, or `None` if `start > end`.
    pub fn try_new(start: usize, end: usize) -> Option<CharAssociation> {
        (start <= end).then_some(CharAssociation { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(self, other: CharAssociation) -> CharAssociation {
        CharAssociation {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// An ordered sequence of glyph ids, each tagged with the span of characters that produced it.
///
/// The character array is shared and never modified. Glyphs and associations are always the
/// same length.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphSequence {
    chars: Rc<[u32]>,
    glyphs: Vec<u16>,
    associations: Vec<CharAssociation>,
}

impl GlyphSequence {
    /// Map each character to a glyph, associating every glyph with its own character.
    pub fn from_chars(chars: impl Into<Rc<[u32]>>, mut map: impl FnMut(u32) -> u16) -> Self {
        let chars = chars.into();
        let glyphs = chars.iter().map(|&c| map(c)).collect();
        let associations = (0..chars.len())
            .map(|i| CharAssociation::new(i, i + 1))
            .collect();
        GlyphSequence {
            chars,
            glyphs,
            associations,
        }
    }

    /// Assemble a sequence from its parts.
    ///
    /// Returns `None` if the glyph and association counts differ, an association lies
    /// outside the character array, or association starts decrease along the sequence.
    /// Visually ordered sequences come from [`GlyphSequence::permuted`] instead.
    pub fn from_parts(
        chars: Rc<[u32]>,
        glyphs: Vec<u16>,
        associations: Vec<CharAssociation>,
    ) -> Option<Self> {
        if glyphs.len() != associations.len()
            || associations.iter().any(|assoc| assoc.end > chars.len())
            || associations.windows(2).any(|w| w[1].start < w[0].start)
        {
            return None;
        }
        Some(GlyphSequence {
            chars,
            glyphs,
            associations,
        })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph(&self, index: usize) -> Option<u16> {
        self.glyphs.get(index).copied()
    }

    pub fn glyphs(&self) -> &[u16] {
        &self.glyphs
    }

    pub fn association(&self, index: usize) -> Option<CharAssociation> {
        self.associations.get(index).copied()
    }

    pub fn associations(&self) -> &[CharAssociation] {
        &self.associations
    }

    pub fn characters(&self) -> &[u32] {
        &self.chars
    }

    pub fn shared_characters(&self) -> Rc<[u32]> {
        Rc::clone(&self.chars)
    }

    pub fn character_count(&self) -> usize {
        self.chars.len()
    }

    /// The characters the glyph at `index` was produced from.
    pub fn associated_characters(&self, index: usize) -> &[u32] {
        match self.associations.get(index) {
            Some(assoc) => &self.chars[assoc.start..assoc.end],
            None => &[],
        }
    }

    /// The character array encoded as UTF-16.
    pub fn characters_utf16(&self) -> Result<Vec<u16>, EncodeError> {
        from_scalar_array(&self.chars)
    }

    /// Replace the glyph at `index`, keeping its association.
    pub fn set_glyph(&mut self, index: usize, glyph: u16) -> bool {
        match self.glyphs.get_mut(index) {
            Some(slot) => {
                *slot = glyph;
                true
            }
            None => false,
        }
    }

    /// Replace the glyph at `index` with `replacement`, which may be empty.
    ///
    /// Every inserted glyph inherits the association of the glyph it replaces.
    pub fn replace(&mut self, index: usize, replacement: &[u16]) -> bool {
        let assoc = match self.associations.get(index) {
            Some(&assoc) => assoc,
            None => return false,
        };
        self.glyphs
            .splice(index..=index, replacement.iter().copied());
        self.associations.splice(
            index..=index,
            std::iter::repeat(assoc).take(replacement.len()),
        );
        true
    }

    /// Merge the glyphs at `components` into a single `glyph` placed at the first component.
    ///
    /// `components` must be strictly ascending. Glyphs lying between components (e.g. skipped
    /// marks) stay in place after the merged glyph. The merged glyph is associated with the
    /// union of the component spans.
    pub fn ligate(&mut self, components: &[usize], glyph: u16) -> bool {
        let first = match components.first() {
            Some(&first) => first,
            None => return false,
        };
        let ascending = components.windows(2).all(|pair| pair[0] < pair[1]);
        let in_bounds = components
            .last()
            .map_or(false, |&last| last < self.glyphs.len());
        if !ascending || !in_bounds {
            return false;
        }

        let assoc = components
            .iter()
            .map(|&i| self.associations[i])
            .fold(self.associations[first], CharAssociation::union);
        self.glyphs[first] = glyph;
        self.associations[first] = assoc;
        for &i in components[1..].iter().rev() {
            self.glyphs.remove(i);
            self.associations.remove(i);
        }
        true
    }

    /// A new sequence holding this sequence's glyphs in the order given by `order`.
    ///
    /// Returns `None` unless `order` is a permutation of the glyph indices.
    pub fn permuted(&self, order: &[usize]) -> Option<GlyphSequence> {
        if order.len() != self.glyphs.len() {
            return None;
        }
        let mut seen: TinyVec<[bool; 64]> = TinyVec::new();
        seen.resize(order.len(), false);
        for &i in order {
            match seen.get_mut(i) {
                Some(flag) if !*flag => *flag = true,
                _ => return None,
            }
        }
        Some(GlyphSequence {
            chars: Rc::clone(&self.chars),
            glyphs: order.iter().map(|&i| self.glyphs[i]).collect(),
            associations: order.iter().map(|&i| self.associations[i]).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(chars: &[u32]) -> GlyphSequence {
        GlyphSequence::from_chars(chars.to_vec(), |c| (c & 0xFF) as u16)
    }

    fn spans(gs: &GlyphSequence) -> Vec<(usize, usize)> {
        gs.associations()
            .iter()
            .map(|assoc| (assoc.start(), assoc.end()))
            .collect()
    }

    #[test]
    fn test_from_chars() {
        let gs = sequence(&[0x0627, 0x0644, 0x0645]);
        assert_eq!(gs.len(), 3);
        assert_eq!(gs.glyphs(), &[0x27, 0x44, 0x45]);
        assert_eq!(spans(&gs), vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(gs.character_count(), 3);
        assert_eq!(gs.associated_characters(1), &[0x0644]);
        assert_eq!(gs.associated_characters(5), &[] as &[u32]);
    }

    #[test]
    fn test_from_parts() {
        let chars: Rc<[u32]> = Rc::from(vec![0x61, 0x62]);
        assert!(GlyphSequence::from_parts(
            Rc::clone(&chars),
            vec![1],
            vec![CharAssociation::new(0, 2)]
        )
        .is_some());
        assert!(GlyphSequence::from_parts(Rc::clone(&chars), vec![1, 2], vec![]).is_none());
        assert!(GlyphSequence::from_parts(
            Rc::clone(&chars),
            vec![1],
            vec![CharAssociation::new(1, 3)]
        )
        .is_none());
        // starts must not decrease
        let chars: Rc<[u32]> = Rc::from(vec![0x61, 0x62, 0x63]);
        assert!(GlyphSequence::from_parts(
            Rc::clone(&chars),
            vec![1, 2],
            vec![CharAssociation::new(2, 3), CharAssociation::new(0, 1)]
        )
        .is_none());
        assert!(GlyphSequence::from_parts(
            chars,
            vec![1, 2, 3],
            vec![
                CharAssociation::new(0, 2),
                CharAssociation::new(0, 1),
                CharAssociation::new(2, 3)
            ]
        )
        .is_some());
    }

    #[test]
    fn test_set_glyph() {
        let mut gs = sequence(&[0x61, 0x62]);
        assert!(gs.set_glyph(1, 99));
        assert!(!gs.set_glyph(2, 99));
        assert_eq!(gs.glyphs(), &[0x61, 99]);
    }

    mod replace {
        use super::*;

        #[test]
        fn test_one_to_many() {
            let mut gs = sequence(&[0x61, 0x62, 0x63]);
            assert!(gs.replace(1, &[7, 8, 9]));
            assert_eq!(gs.glyphs(), &[0x61, 7, 8, 9, 0x63]);
            assert_eq!(spans(&gs), vec![(0, 1), (1, 2), (1, 2), (1, 2), (2, 3)]);
        }

        #[test]
        fn test_delete() {
            let mut gs = sequence(&[0x61, 0x62]);
            assert!(gs.replace(0, &[]));
            assert_eq!(gs.glyphs(), &[0x62]);
            assert_eq!(spans(&gs), vec![(1, 2)]);
            assert_eq!(gs.character_count(), 2);
        }

        #[test]
        fn test_out_of_range() {
            let mut gs = sequence(&[0x61]);
            assert!(!gs.replace(1, &[1]));
            assert_eq!(gs.len(), 1);
        }
    }

    mod ligate {
        use super::*;

        #[test]
        fn test_contiguous() {
            let mut gs = sequence(&[0x61, 0x66, 0x69, 0x62]);
            assert!(gs.ligate(&[1, 2], 200));
            assert_eq!(gs.glyphs(), &[0x61, 200, 0x62]);
            assert_eq!(spans(&gs), vec![(0, 1), (1, 3), (3, 4)]);
        }

        #[test]
        fn test_skipped_mark_stays_after() {
            let mut gs = sequence(&[0x0644, 0x064E, 0x0627]);
            assert!(gs.ligate(&[0, 2], 200));
            assert_eq!(gs.glyphs(), &[200, 0x4E]);
            assert_eq!(spans(&gs), vec![(0, 3), (1, 2)]);
        }

        #[test]
        fn test_invalid_components() {
            let mut gs = sequence(&[0x61, 0x62]);
            assert!(!gs.ligate(&[], 1));
            assert!(!gs.ligate(&[1, 0], 1));
            assert!(!gs.ligate(&[0, 2], 1));
            assert_eq!(gs.glyphs(), &[0x61, 0x62]);
        }
    }

    #[test]
    fn test_permuted() {
        let gs = sequence(&[0x61, 0x62, 0x63]);
        let permuted = gs.permuted(&[1, 0, 2]).unwrap();
        assert_eq!(permuted.glyphs(), &[0x62, 0x61, 0x63]);
        assert_eq!(spans(&permuted), vec![(1, 2), (0, 1), (2, 3)]);
        assert!(gs.permuted(&[0, 0, 1]).is_none());
        assert!(gs.permuted(&[0, 1]).is_none());
        assert!(gs.permuted(&[0, 1, 3]).is_none());
    }

    #[test]
    fn test_characters_utf16() {
        let gs = sequence(&[0x61, 0x1F600]);
        assert_eq!(gs.characters_utf16(), Ok(vec![0x61, 0xD83D, 0xDE00]));
        let bad = sequence(&[0xD800]);
        assert_eq!(
            bad.characters_utf16(),
            Err(EncodeError::SurrogateScalar(0xD800))
        );
    }

    #[test]
    fn test_union() {
        let a = CharAssociation::new(2, 4);
        let b = CharAssociation::new(0, 3);
        assert_eq!(a.union(b), CharAssociation::new(0, 4));
        assert_eq!(a.len(), 2);
        assert!(CharAssociation::new(1, 1).is_empty());
    }

    #[test]
    fn test_try_new() {
        assert_eq!(
            CharAssociation::try_new(1, 3),
            Some(CharAssociation::new(1, 3))
        );
        assert_eq!(CharAssociation::try_new(3, 1), None);
    }

    #[test]
    #[should_panic]
    fn test_new_reversed() {
        CharAssociation::new(3, 1);
    }
}
