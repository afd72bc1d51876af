//! Near-duplicate title detection
//!
//! Flags a candidate title as a duplicate of an existing song when the two
//! normalized titles match exactly, or when their Levenshtein edit distance
//! is strictly below [`DUPLICATE_DISTANCE_THRESHOLD`]. Pure functions, no
//! I/O; the create handler consults this before inserting and the caller
//! decides whether to override.

use songbook_common::db::Song;

/// Distance at or above this value is NOT considered a duplicate.
/// Tuning constant; exact-match short-circuit applies regardless.
pub const DUPLICATE_DISTANCE_THRESHOLD: usize = 3;

/// Normalize a title for comparison: trim surrounding whitespace, lowercase
pub fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Classic dynamic-programming Levenshtein edit distance over chars.
/// Insertions, deletions, and substitutions each cost 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row DP: prev holds the previous row of the full matrix
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution_cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + substitution_cost)
                .min(prev[j + 1] + 1)
                .min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Return the subset of `songs` whose titles are near-duplicates of
/// `candidate`, preserving the input order.
pub fn find_duplicates<'a>(
    candidate: &str,
    songs: &'a [Song],
    threshold: usize,
) -> Vec<&'a Song> {
    let normalized = normalize(candidate);

    songs
        .iter()
        .filter(|song| {
            let existing = normalize(&song.title);
            existing == normalized || levenshtein(&existing, &normalized) < threshold
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use songbook_common::db::SongLanguage;

    fn song(title: &str) -> Song {
        Song::new(title.to_string(), None, "la la la".to_string(), SongLanguage::English)
    }

    #[test]
    fn test_levenshtein_empty_strings() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_levenshtein_known_distances() {
        assert_eq!(levenshtein("silent night", "silent night"), 0);
        assert_eq!(levenshtein("silent night", "silent nite"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_levenshtein_is_symmetric() {
        let pairs = [
            ("amazing grace", "silent night"),
            ("abide with me", "abide"),
            ("", "joy to the world"),
            ("o holy night", "o holy nite"),
        ];
        for (a, b) in pairs {
            assert_eq!(levenshtein(a, b), levenshtein(b, a), "d({a:?},{b:?})");
        }
    }

    #[test]
    fn test_levenshtein_multibyte_chars() {
        // Counts chars, not bytes
        assert_eq!(levenshtein("héllo", "hello"), 1);
        assert_eq!(levenshtein("", "నా"), 2);
    }

    #[test]
    fn test_exact_match_ignores_case_and_whitespace() {
        let songs = vec![song("  Silent Night  ")];
        let dups = find_duplicates("silent night", &songs, DUPLICATE_DISTANCE_THRESHOLD);
        assert_eq!(dups.len(), 1);
    }

    #[test]
    fn test_near_match_below_threshold_is_flagged() {
        let songs = vec![song("Silent Night")];
        // distance 1
        let dups = find_duplicates("Silent Nigh", &songs, DUPLICATE_DISTANCE_THRESHOLD);
        assert_eq!(dups.len(), 1);
    }

    #[test]
    fn test_distance_at_threshold_is_not_flagged() {
        let songs = vec![song("abcdef")];
        // distance exactly 3; strict less-than applies
        assert_eq!(levenshtein("abcdef", "abc"), 3);
        let dups = find_duplicates("abc", &songs, 3);
        assert!(dups.is_empty());
    }

    #[test]
    fn test_distant_titles_are_not_flagged() {
        let songs = vec![song("Amazing Grace")];
        let dups = find_duplicates("Silent Night", &songs, DUPLICATE_DISTANCE_THRESHOLD);
        assert!(dups.is_empty());
    }

    #[test]
    fn test_result_preserves_input_order() {
        let songs = vec![song("How Great"), song("Silent Night"), song("How Grate")];
        let dups = find_duplicates("How Great", &songs, DUPLICATE_DISTANCE_THRESHOLD);
        let titles: Vec<&str> = dups.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["How Great", "How Grate"]);
    }

    #[test]
    fn test_empty_candidate_matches_only_near_empty_titles() {
        let songs = vec![song("ab"), song("Amazing Grace")];
        let dups = find_duplicates("", &songs, DUPLICATE_DISTANCE_THRESHOLD);
        let titles: Vec<&str> = dups.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["ab"]);
    }
}
