//! Property-based tests for comment normalization and fragment matching.
//!
//! These tests use proptest to generate configuration-like text and verify
//! that the invariants of the normalizer and the merge engine hold for all of
//! it.

#[cfg(test)]
mod proptest_tests {
    use crate::document::Document;
    use crate::merge::{merge, ADDITION_SEPARATOR};
    use crate::normalize::{normalize, normalize_line};
    use crate::patches::{extract_entities, Fragment};
    use proptest::prelude::*;

    /// Lines built from the characters that matter to the normalizer.
    fn config_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z_]{1,12} = [a-zA-Z0-9 .#\\\\]{0,20}",
            "[ \t]{0,3}#[a-zA-Z ]{0,20}",
            "filament_colour = #[0-9A-F]{6}[ \t]{0,2}",
            "\\[filament:[A-Za-z0-9 @()+.*]{0,16}\\]",
            "[ \t]{0,4}",
        ]
    }

    fn config_text() -> impl Strategy<Value = String> {
        (prop::collection::vec(config_line(), 0..20), any::<bool>()).prop_map(|(lines, crlf)| {
            lines.join(if crlf { "\r\n" } else { "\n" })
        })
    }

    // ============================================================================
    // normalize property tests
    // ============================================================================

    proptest! {
        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(text in config_text()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: normalize is idempotent on arbitrary input
        #[test]
        fn normalize_is_idempotent_on_any_text(text in ".*") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: the number of lines never changes
        #[test]
        fn normalize_preserves_line_count(text in config_text()) {
            prop_assert_eq!(
                normalize(&text).split('\n').count(),
                text.split('\n').count()
            );
        }

        /// Property: no normalized line ends in whitespace
        #[test]
        fn normalize_trims_trailing_whitespace(text in config_text()) {
            for line in normalize(&text).split('\n') {
                prop_assert_eq!(line, line.trim_end());
            }
        }

        /// Property: colour lines keep their value
        #[test]
        fn colour_lines_are_never_truncated(value in "#[0-9A-F]{6}", key in "(filament|extrusion)_(colour|COLOUR)") {
            let line = format!("{} = {}", key, value);
            prop_assert_eq!(normalize_line(&line), line.as_str());
        }

        /// Property: a normalized line is a prefix of the original line
        #[test]
        fn normalized_line_is_prefix(line in "[^\n]*") {
            prop_assert!(line.starts_with(normalize_line(&line)));
        }
    }

    // ============================================================================
    // merge property tests
    // ============================================================================

    proptest! {
        /// Property: removing a fragment taken from the document always succeeds
        /// and removes exactly that many bytes
        #[test]
        fn removal_of_own_section_succeeds(
            head in "[a-z = 0-9\n]{0,40}",
            section in "\\[filament:[A-Za-z]{1,8}\\]\n[a-z]{1,8} = [0-9]{1,3}",
            tail in "[a-z = 0-9\n]{0,40}",
        ) {
            let text = format!("{}\n{}\n{}", head, section, tail);
            let base = Document::raw(text.as_str());
            let removals = vec![Fragment::removal("x.rm.ini", &section)];
            let outcome = merge(&base, &removals, &[], "2.0.0").unwrap();
            prop_assert_eq!(
                outcome.document().len(),
                normalize(&text).len() - section.len()
            );
        }

        /// Property: each addition appears exactly once and ahead of the anchor
        #[test]
        fn additions_land_before_anchor(
            head in "[a-z = 0-9\n]{0,40}",
            names in prop::collection::btree_set("[A-Z][a-z]{2,8}", 1..5),
        ) {
            let base = Document::raw(format!("{}\n[printer:*common*]\nend", head));
            let additions: Vec<Fragment> = names
                .iter()
                .map(|name| Fragment::addition(format!("{}.add.ini", name), &format!("[filament:{}]\n", name)))
                .collect();
            let doc = merge(&base, &[], &additions, "2.0.0").unwrap().into_document();
            let text = doc.as_str();
            let anchor = text.find("[printer:*common*]").unwrap();
            let expected_block = format!("{}[printer:*common*]", ADDITION_SEPARATOR);
            prop_assert!(text.contains(&expected_block));
            for name in &names {
                let header = format!("[filament:{}]", name);
                prop_assert_eq!(text.matches(&header).count(), 1);
                prop_assert!(text.find(&header).unwrap() < anchor);
            }
            let entities = extract_entities(text);
            prop_assert_eq!(entities.len(), names.len());
        }
    }
}
