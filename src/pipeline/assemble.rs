//! Per-chunk transcript assembly.

/// Join chunk transcripts in chunk order with a single space, then trim.
///
/// Silent chunks come back as empty strings and are joined as-is; no
/// deduplication or cross-chunk sentence repair happens here, so a word split
/// by a chunk boundary stays split.
pub fn assemble_transcript(segments: &[String]) -> String {
    segments.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn segments_join_in_order_with_single_spaces() {
        assert_eq!(
            assemble_transcript(&seg(&["first part", "second part", "third"])),
            "first part second part third"
        );
    }

    #[test]
    fn no_segments_yield_an_empty_transcript() {
        assert_eq!(assemble_transcript(&[]), "");
    }

    #[test]
    fn edge_empties_are_trimmed_away() {
        assert_eq!(assemble_transcript(&seg(&["", "middle", ""])), "middle");
    }

    #[test]
    fn single_segment_passes_through_trimmed() {
        assert_eq!(assemble_transcript(&seg(&["  hello  "])), "hello");
    }
}
