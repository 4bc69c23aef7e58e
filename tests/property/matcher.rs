//! Matcher properties over arbitrary flat text.

use docxfix::{find_matches, is_identifier, scan, SourceForm};
use proptest::prelude::*;

proptest! {
    /// Property: matches are sorted, disjoint, in bounds and name identifiers,
    /// and malformed spans never overlap a match.
    #[test]
    fn prop_scan_is_well_formed(flat in "[a-z{}/ :w\\-p]{0,60}") {
        let report = scan(&flat);
        let mut last_end = 0;
        for m in &report.matches {
            prop_assert!(m.flat_start >= last_end);
            prop_assert!(m.flat_end <= flat.len());
            prop_assert!(is_identifier(&m.name));
            last_end = m.flat_end;
        }
        for bad in &report.malformed {
            prop_assert!(report
                .matches
                .iter()
                .all(|m| m.flat_end <= bad.flat_start || bad.flat_end <= m.flat_start));
            prop_assert_eq!(&flat[bad.flat_start..bad.flat_end], bad.text.as_str());
        }
    }

    /// Property: each legacy match covers exactly the three-token form of its
    /// own name.
    #[test]
    fn prop_legacy_text_matches_name(
        prefix in "[a-z ]{0,5}",
        name in "[a-z_][a-z0-9_]{0,6}",
        suffix in "[a-z ]{0,5}",
    ) {
        let flat = format!("{}{{-w:p {1}}}{{{1}}}{{/{1}}}{2}", prefix, name, suffix);
        let matches = find_matches(&flat);
        prop_assert_eq!(matches.len(), 1);
        prop_assert_eq!(matches[0].form, SourceForm::ThreeToken);
        prop_assert_eq!(&matches[0].name, &name);
        let expected = format!("{{-w:p {0}}}{{{0}}}{{/{0}}}", name);
        prop_assert_eq!(
            &flat[matches[0].range()],
            expected.as_str()
        );
    }
}
