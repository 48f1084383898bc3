//! Splitting display text into highlighted and plain runs.

use super::index::MatchRange;

/// A run of display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Split `text` at the char-offset `ranges`.
///
/// Ranges may be unsorted or overlap; parts past the end of `text` are
/// ignored.
pub fn highlight_segments(text: &str, ranges: &[MatchRange]) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let mut marked = vec![false; chars.len()];
    for range in ranges {
        let end = range.end.min(chars.len());
        for flag in marked.iter_mut().take(end).skip(range.start) {
            *flag = true;
        }
    }

    let mut segments: Vec<Segment> = Vec::new();
    for (c, highlighted) in chars.into_iter().zip(marked) {
        match segments.last_mut() {
            Some(last) if last.highlighted == highlighted => last.text.push(c),
            _ => segments.push(Segment {
                text: c.to_string(),
                highlighted,
            }),
        }
    }
    segments
}

/// Case-insensitive occurrences of `term` in `text`, for fields the index
/// does not cover.
pub fn substring_ranges(text: &str, term: &str) -> Vec<MatchRange> {
    let fold = |s: &str| -> Vec<char> {
        s.chars()
            .map(|c| c.to_lowercase().next().unwrap_or(c))
            .collect()
    };
    let haystack = fold(text);
    let needle = fold(term.trim());
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()] == needle[..] {
            ranges.push(MatchRange {
                start: i,
                end: i + needle.len(),
            });
            i += needle.len();
        } else {
            i += 1;
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|s| {
                if s.highlighted {
                    format!("[{}]", s.text)
                } else {
                    s.text.clone()
                }
            })
            .collect()
    }

    #[test]
    fn test_highlight_segments() {
        let segments = highlight_segments(
            "The Rank Foundation",
            &[MatchRange { start: 4, end: 8 }, MatchRange { start: 9, end: 14 }],
        );
        assert_eq!(render(&segments), "The [Rank] [Found]ation");
    }

    #[test]
    fn test_out_of_bounds_range_is_clamped() {
        let segments = highlight_segments("Arts", &[MatchRange { start: 2, end: 40 }]);
        assert_eq!(render(&segments), "Ar[ts]");
    }

    #[test]
    fn test_no_ranges_is_single_plain_segment() {
        let segments = highlight_segments("Youth", &[]);
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].highlighted);
        assert!(highlight_segments("", &[]).is_empty());
    }

    #[test]
    fn test_substring_ranges_case_insensitive() {
        let ranges = substring_ranges("Trustees: Anna Trust, TRUST", "trust");
        assert_eq!(
            ranges.iter().map(|r| r.start).collect::<Vec<_>>(),
            vec![0, 15, 22]
        );
        assert!(substring_ranges("abc", " ").is_empty());
    }
}
