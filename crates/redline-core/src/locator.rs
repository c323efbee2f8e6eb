/// Relocation of a text span inside content that may have changed since the
/// span was captured.
///
/// Offsets are never trusted as the primary key. All occurrences of the
/// text are considered and the one whose surroundings best match the
/// captured context wins.
use std::cmp::Reverse;

use crate::surface::TextRange;

/// A candidate occurrence and how well its surroundings match.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    range: TextRange,
    score: usize,
}

/// Finds the live range of `text` in `content`.
///
/// Returns `None` if `text` is empty or does not occur.
pub fn locate(
    content: &str,
    text: &str,
    context_before: &str,
    context_after: &str,
) -> Option<TextRange> {
    locate_with_hint(content, text, context_before, context_after, None)
}

/// Like [`locate`], breaking score ties by distance to `hint`, a char
/// offset where the span used to start.
pub fn locate_with_hint(
    content: &str,
    text: &str,
    context_before: &str,
    context_after: &str,
    hint: Option<usize>,
) -> Option<TextRange> {
    if text.is_empty() {
        return None;
    }

    let text_chars = text.chars().count();
    let mut candidates = Vec::new();
    let (mut last_byte, mut last_char) = (0, 0);

    for (byte_start, _) in content.match_indices(text) {
        let char_start = last_char + content[last_byte..byte_start].chars().count();
        last_byte = byte_start;
        last_char = char_start;

        let byte_end = byte_start + text.len();
        let score = common_suffix_len(&content[..byte_start], context_before)
            + common_prefix_len(&content[byte_end..], context_after);
        candidates.push(Candidate {
            range: TextRange::new(char_start, char_start + text_chars),
            score,
        });
    }

    if candidates.len() <= 1 {
        return candidates.first().map(|c| c.range);
    }

    candidates
        .into_iter()
        .min_by_key(|c| {
            let distance = hint.map_or(0, |h| h.abs_diff(c.range.start));
            (Reverse(c.score), distance, c.range.start)
        })
        .map(|c| c.range)
}

/// Number of trailing chars `a` and `b` share.
fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Number of leading chars `a` and `b` share.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_occurrence() {
        let content = "Intro. The cat sat. Outro.";
        assert_eq!(
            locate(content, "The cat sat.", "", ""),
            Some(TextRange::new(7, 19))
        );
    }

    #[test]
    fn test_unique_occurrence_ignores_context_mismatch() {
        let content = "Intro. The cat sat. Outro.";
        assert_eq!(
            locate(content, "cat", "nothing alike", "at all"),
            Some(TextRange::new(11, 14))
        );
    }

    #[test]
    fn test_missing_and_empty() {
        assert_eq!(locate("abc", "xyz", "", ""), None);
        assert_eq!(locate("abc", "", "", ""), None);
        assert_eq!(locate("", "a", "", ""), None);
    }

    #[test]
    fn test_context_disambiguates() {
        let content = "Red: the end. Blue: the end. Green: the end.";
        let found = locate(content, "the end.", "Blue: ", " Green").unwrap();
        assert_eq!(found, TextRange::new(20, 28));
    }

    #[test]
    fn test_context_survives_unrelated_edit() {
        let before = "Alpha. The cat sat. Beta. The cat sat. Gamma.";
        let ctx_before = "Beta. ";
        let ctx_after = " Gamma.";
        let first = locate(before, "The cat sat.", ctx_before, ctx_after).unwrap();
        assert_eq!(first, TextRange::new(26, 38));

        // Unrelated edit ahead of both occurrences shifts everything.
        let after = "Alpha, expanded at length. The cat sat. Beta. The cat sat. Gamma.";
        let second = locate(after, "The cat sat.", ctx_before, ctx_after).unwrap();
        assert_eq!(second, TextRange::new(46, 58));
    }

    #[test]
    fn test_partial_context_still_scores() {
        let content = "one: x here; two: x there";
        // Context windows routinely start and end mid-word.
        let found = locate(content, "x", "wo: ", " ther").unwrap();
        assert_eq!(found, TextRange::new(18, 19));
    }

    #[test]
    fn test_tie_broken_by_hint_then_earliest() {
        let content = "ab ab ab";
        assert_eq!(locate(content, "ab", "", ""), Some(TextRange::new(0, 2)));
        assert_eq!(
            locate_with_hint(content, "ab", "", "", Some(5)),
            Some(TextRange::new(6, 8))
        );
    }

    #[test]
    fn test_unicode_offsets() {
        let content = "日本語 café. Next café.";
        let found = locate(content, "café", "Next ", "").unwrap();
        assert_eq!(found, TextRange::new(15, 19));
    }

    #[test]
    fn test_deterministic_on_unchanged_content() {
        let content = "the quick brown fox";
        let a = locate(content, "brown", "quick ", " fox");
        let b = locate(content, "brown", "quick ", " fox");
        assert_eq!(a, b);
        assert_eq!(a, Some(TextRange::new(10, 15)));
    }
}
