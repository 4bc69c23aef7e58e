//! Run fragmentation does not change what normalization produces.

use super::common::{body, fragmented, flat_text};
use docxfix::{normalize_part, TextIndex};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z_][A-Za-z0-9_]{0,10}").unwrap()
}

/// Plain prose with no braces. Includes characters that need escaping and
/// multi-byte characters.
fn prose_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ,.:;&<>'\"éàüç€-]{0,12}").unwrap()
}

#[derive(Debug, Clone)]
enum Segment {
    Prose(String),
    Legacy(String),
    Canonical(String),
}

fn segment_strategy() -> impl Strategy<Value = Segment> {
    prop_oneof![
        3 => prose_strategy().prop_map(Segment::Prose),
        2 => identifier_strategy().prop_map(Segment::Legacy),
        1 => identifier_strategy().prop_map(Segment::Canonical),
    ]
}

/// (source text, expected text after normalization)
fn template_strategy() -> impl Strategy<Value = (String, String)> {
    prop::collection::vec(segment_strategy(), 1..8).prop_map(|segments| {
        let mut source = String::new();
        let mut expected = String::new();
        for segment in segments {
            match segment {
                Segment::Prose(text) => {
                    source.push_str(&text);
                    expected.push_str(&text);
                }
                Segment::Legacy(name) => {
                    source.push_str(&format!("{{-w:p {0}}}{{{0}}}{{/{0}}}", name));
                    expected.push_str(&format!("{{{}}}", name));
                }
                Segment::Canonical(name) => {
                    source.push_str(&format!("{{{}}}", name));
                    expected.push_str(&format!("{{{}}}", name));
                }
            }
        }
        (source, expected)
    })
}

/// Template plus cut points that fall on character boundaries.
fn fragmented_template_strategy() -> impl Strategy<Value = (String, String, Vec<usize>)> {
    template_strategy().prop_flat_map(|(source, expected)| {
        let boundaries: Vec<usize> = source
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(source.len()))
            .collect();
        let cuts = prop::collection::vec(prop::sample::select(boundaries), 0..10);
        (Just(source), Just(expected), cuts)
    })
}

fn normalized(xml: &str) -> String {
    match normalize_part("word/document.xml", xml.as_bytes())
        .expect("generated markup is well-formed")
        .markup
    {
        Some(bytes) => String::from_utf8(bytes).expect("UTF-8 output"),
        None => xml.to_string(),
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    /// Property: the flat text after normalization does not depend on how the
    /// template was split into runs.
    #[test]
    fn prop_fragmentation_does_not_change_result(
        (source, expected, cuts) in fragmented_template_strategy()
    ) {
        let xml = body(&fragmented(&source, &cuts));
        prop_assert_eq!(flat_text(&xml), source);
        prop_assert_eq!(flat_text(&normalized(&xml)), expected);
    }

    /// Property: normalizing twice is the same as normalizing once.
    #[test]
    fn prop_idempotent((source, _expected, cuts) in fragmented_template_strategy()) {
        let once = normalized(&body(&fragmented(&source, &cuts)));
        let outcome = normalize_part("word/document.xml", once.as_bytes()).unwrap();
        prop_assert!(outcome.markup.is_none());
        prop_assert_eq!(outcome.report.rewritten, 0);
    }

    /// Property: a template without legacy placeholders is returned unchanged,
    /// byte for byte.
    #[test]
    fn prop_no_legacy_no_change(
        prose in prose_strategy(),
        name in identifier_strategy(),
        cut in 0usize..20,
    ) {
        let source = format!("{}{{{}}}{}", prose, name, prose);
        let cut = source
            .char_indices()
            .map(|(i, _)| i)
            .find(|&i| i >= cut)
            .unwrap_or(0);
        let xml = body(&fragmented(&source, &[cut]));
        let outcome = normalize_part("word/document.xml", xml.as_bytes()).unwrap();
        prop_assert!(outcome.markup.is_none());
        prop_assert_eq!(outcome.report.crc32_before, outcome.report.crc32_after);
    }

    /// Property: every run in the output still maps to a contiguous slice of
    /// the flat text, and the output stays well-formed.
    #[test]
    fn prop_output_reindexes((source, _expected, cuts) in fragmented_template_strategy()) {
        let out = normalized(&body(&fragmented(&source, &cuts)));
        let index = TextIndex::build(out.as_bytes());
        prop_assert!(index.is_ok());
        let index = index.unwrap();
        let joined: String = (0..index.runs().len()).map(|i| index.run_text(i)).collect();
        prop_assert_eq!(joined, index.flat_text());
    }
}
