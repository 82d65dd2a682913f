mod common;

#[cfg(test)]
mod shape_tests {
    use crate::common;

    use complex_scripts::error::{CapabilityError, DecodeError, ShapingError};
    use complex_scripts::gpos::GlyphPositioningTable;
    use complex_scripts::gsub::{FeatureMask, GlyphSubstitutionTable};
    use complex_scripts::layout::{Adjust, Anchor};
    use complex_scripts::scripts::processor_for;
    use complex_scripts::tag;
    use complex_scripts::unicode::IndicVariant;
    use complex_scripts::{CharAssociation, GlyphSequence, Shaper, ShaperConfig, ShapingFont};

    const E: u16 = 5;
    const F: u16 = 6;
    const I: u16 = 9;
    const CAP_A: u16 = 27;
    const CAP_V: u16 = 28;
    const E_ACUTE: u16 = 50;
    const ACUTE: u16 = 60;
    const F_I: u16 = 100;
    const KA: u16 = 200;
    const VOWEL_SIGN_I: u16 = 201;

    fn glyph_map() -> Vec<(u32, u16)> {
        let mut pairs: Vec<(u32, u16)> = ('a'..='z')
            .zip(1..)
            .map(|(ch, glyph)| (u32::from(ch), glyph))
            .collect();
        pairs.extend([
            (u32::from('A'), CAP_A),
            (u32::from('V'), CAP_V),
            (0x00E9, E_ACUTE),
            (0x0915, KA),
            (0x093F, VOWEL_SIGN_I),
        ]);
        pairs
    }

    fn font() -> ShapingFont {
        let mut gsub = GlyphSubstitutionTable::new();
        common::add_lookup(
            &mut gsub,
            tag::CCMP,
            0,
            vec![common::multiple_subst(E_ACUTE, &[E, ACUTE])],
        );
        common::add_lookup(
            &mut gsub,
            tag::LIGA,
            0,
            vec![common::ligature_subst(&[F, I], F_I)],
        );

        let mut gpos = GlyphPositioningTable::new();
        common::add_lookup(
            &mut gpos,
            tag::KERN,
            0,
            vec![common::kern_pair(CAP_A, CAP_V, -80)],
        );
        common::add_lookup(
            &mut gpos,
            tag::MARK,
            0,
            vec![common::mark_to_base(
                ACUTE,
                Anchor { x: 0, y: 0 },
                &[E],
                Anchor { x: 250, y: 500 },
            )],
        );
        common::add_lookup(
            &mut gpos,
            tag::DIST,
            0,
            vec![common::single_pos(VOWEL_SIGN_I, Adjust::advance(250))],
        );

        let gdef = common::glyph_classes(&[(E, 1), (KA, 1), (ACUTE, 3), (VOWEL_SIGN_I, 3)]);

        ShapingFont::new(common::glyph_map(&glyph_map()))
            .with_substitution(gsub)
            .with_positioning(gpos)
            .with_glyph_definitions(gdef)
    }

    fn shape(config: ShaperConfig, text: &str, script_tag: u32) -> (Vec<u16>, Vec<Adjust>) {
        let font = font();
        let shaper = Shaper::new(&font, config);
        let shaped = shaper
            .shape_str(text, script_tag, tag::DFLT_LANG)
            .expect("shaping failed");
        (shaped.glyphs.glyphs().to_vec(), shaped.positions)
    }

    #[test]
    fn ligature() {
        let font = font();
        let shaper = Shaper::new(&font, ShaperConfig::default());
        let shaped = shaper.shape_str("fix", tag::LATN, tag::DFLT_LANG).unwrap();
        assert_eq!(shaped.glyphs.glyphs(), &[F_I, 24]);
        assert_eq!(
            shaped.glyphs.associations(),
            &[CharAssociation::new(0, 2), CharAssociation::new(2, 3)]
        );
        assert_eq!(shaped.glyphs.characters(), common::chars("fix").as_slice());
    }

    #[test]
    fn disabled_ligature() {
        let config = ShaperConfig {
            features: FeatureMask::default() - FeatureMask::LIGA,
            ..ShaperConfig::default()
        };
        let (glyphs, _) = shape(config, "fi", tag::LATN);
        assert_eq!(glyphs, vec![F, I]);
    }

    #[test]
    fn kerning() {
        let (glyphs, positions) = shape(ShaperConfig::default(), "AVA", tag::LATN);
        assert_eq!(glyphs, vec![CAP_A, CAP_V, CAP_A]);
        assert_eq!(
            positions,
            vec![Adjust::advance(-80), Adjust::default(), Adjust::default()]
        );

        let config = ShaperConfig {
            kerning: false,
            ..ShaperConfig::default()
        };
        let (_, positions) = shape(config, "AV", tag::LATN);
        assert!(positions.iter().all(Adjust::is_zero));
    }

    #[test]
    fn decomposition_and_mark_attachment() {
        let font = font();
        let shaper = Shaper::new(&font, ShaperConfig::default());
        let shaped = shaper
            .shape_str("\u{e9}t", tag::LATN, tag::DFLT_LANG)
            .unwrap();
        assert_eq!(shaped.glyphs.glyphs(), &[E, ACUTE, 20]);
        assert_eq!(
            shaped.glyphs.associations(),
            &[
                CharAssociation::new(0, 1),
                CharAssociation::new(0, 1),
                CharAssociation::new(1, 2)
            ]
        );
        // zero width marks are not reordered
        assert_eq!(
            shaped.positions,
            vec![
                Adjust::default(),
                Adjust::placement(250, 500),
                Adjust::default()
            ]
        );
    }

    #[test]
    fn spacing_mark_reordering() {
        let font = font();
        let shaper = Shaper::new(&font, ShaperConfig::default());
        let shaped = shaper
            .shape(&[0x0915, 0x093F], tag::DEV2, tag::DFLT_LANG)
            .unwrap();
        assert_eq!(shaped.glyphs.glyphs(), &[VOWEL_SIGN_I, KA]);
        assert_eq!(
            shaped.glyphs.associations(),
            &[CharAssociation::new(1, 2), CharAssociation::new(0, 1)]
        );
        assert_eq!(shaped.positions, vec![Adjust::advance(250), Adjust::default()]);

        let config = ShaperConfig {
            reorder_marks: false,
            ..ShaperConfig::default()
        };
        let (glyphs, positions) = shape(config, "\u{915}\u{93f}", tag::DEV2);
        assert_eq!(glyphs, vec![KA, VOWEL_SIGN_I]);
        assert_eq!(positions, vec![Adjust::default(), Adjust::advance(250)]);
    }

    #[test]
    fn unknown_script_uses_default_features() {
        let (glyphs, _) = shape(ShaperConfig::default(), "fi", tag!(b"zzzz"));
        assert_eq!(glyphs, vec![F_I]);
    }

    #[test]
    fn utf16() {
        let font = font();
        let shaper = Shaper::new(&font, ShaperConfig::default());
        let text: Vec<u16> = "fi".encode_utf16().collect();
        let shaped = shaper
            .shape_utf16(&text, tag::LATN, tag::DFLT_LANG)
            .unwrap();
        assert_eq!(shaped.glyphs.glyphs(), &[F_I]);
        assert_eq!(shaped.glyphs.characters_utf16(), Ok(text));

        // unmapped characters from the supplementary planes get glyph 0
        let text: Vec<u16> = "\u{1D400}".encode_utf16().collect();
        let shaped = shaper
            .shape_utf16(&text, tag::LATN, tag::DFLT_LANG)
            .unwrap();
        assert_eq!(shaped.glyphs.glyphs(), &[0]);
        assert_eq!(shaped.glyphs.characters(), &[0x1D400]);

        assert_eq!(
            shaper.shape_utf16(&[0xD835], tag::LATN, tag::DFLT_LANG),
            Err(ShapingError::Decode(DecodeError::IsolatedHighSurrogate(0)))
        );
    }

    #[test]
    fn detect_script() {
        let font = font();
        let shaper = Shaper::new(&font, ShaperConfig::default());
        assert_eq!(shaper.detect_script(&common::chars("fix 42")), tag::LATN);
        assert_eq!(shaper.detect_script(&common::chars("\u{915}\u{93f}")), tag::DEV2);

        let config = ShaperConfig {
            indic_variant: IndicVariant::V1,
            ..ShaperConfig::default()
        };
        let shaper = Shaper::new(&font, config);
        assert_eq!(shaper.detect_script(&common::chars("\u{915}\u{93f}")), tag::DEVA);
    }

    #[test]
    fn missing_capabilities() {
        let font = ShapingFont::new(common::glyph_map(&glyph_map()));
        assert!(font.as_substitutable().is_none());
        assert!(font.as_positionable().is_none());

        let gs = GlyphSequence::from_chars(common::chars("AV"), |c| font.glyph_index(c));
        assert_eq!(
            font.position(
                processor_for(tag::LATN),
                tag::LATN,
                tag::DFLT_LANG,
                FeatureMask::default(),
                &gs
            ),
            Err(CapabilityError::NotPositionable { script: tag::LATN })
        );

        // shaping without tables maps glyphs and nothing else
        let shaper = Shaper::new(&font, ShaperConfig::default());
        let shaped = shaper.shape_str("fi", tag::LATN, tag::DFLT_LANG).unwrap();
        assert_eq!(shaped.glyphs.glyphs(), &[F, I]);
        assert_eq!(shaped.positions, vec![Adjust::default(); 2]);
    }
}
