//! Recognition of bare `namespace/image` references.

/// Returns `true` if `reference` is exactly two non-empty segments separated
/// by a single `/`, neither containing whitespace.
///
/// Such a reference is used as-is instead of being looked up by name.
#[must_use]
pub fn is_bare_reference(reference: &str) -> bool {
    let Some((namespace, image)) = reference.split_once('/') else {
        return false;
    };
    is_segment(namespace) && is_segment(image)
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.chars().any(|c| c == '/' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn namespaced_image_is_bare() {
        assert!(is_bare_reference("shaddock/nova"));
        assert!(is_bare_reference("shaddock/nova:v1"));
    }

    #[test]
    fn plain_name_is_not_bare() {
        assert!(!is_bare_reference("nova"));
        assert!(!is_bare_reference(""));
    }

    #[test]
    fn empty_segment_is_not_bare() {
        assert!(!is_bare_reference("/nova"));
        assert!(!is_bare_reference("shaddock/"));
        assert!(!is_bare_reference("/"));
    }

    #[test]
    fn extra_slash_is_not_bare() {
        assert!(!is_bare_reference("registry/shaddock/nova"));
        assert!(!is_bare_reference("unix://var/run/docker.sock"));
    }

    #[test]
    fn whitespace_is_not_bare() {
        assert!(!is_bare_reference("shaddock/no va"));
        assert!(!is_bare_reference(" shaddock/nova"));
        assert!(!is_bare_reference("shaddock/nova\n"));
    }

    proptest! {
        #[test]
        fn two_clean_segments_are_bare(ns in "[a-z0-9._:-]{1,16}", img in "[a-z0-9._:-]{1,16}") {
            let reference = format!("{ns}/{img}");
            prop_assert!(is_bare_reference(&reference));
        }

        #[test]
        fn strings_without_slash_are_never_bare(s in "[^/]*") {
            prop_assert!(!is_bare_reference(&s));
        }
    }
}
