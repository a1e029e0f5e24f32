use crate::models::FeatureSet;

const MAX_KEYWORDS: usize = 30;
const MIN_KEYWORD_CHARS: usize = 4;

/// Derive the keyword-side features of a chunk: a case-folded word set for
/// overlap scoring, the text length, and up to 30 keywords longer than four
/// characters, kept in document order.
///
/// The embedding is attached separately because it comes from a remote,
/// best-effort call; feature extraction itself never fails.
pub fn build_features(text: &str, embedding: Option<Vec<f32>>) -> FeatureSet {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let keywords = words
        .iter()
        .filter(|word| word.chars().count() > MIN_KEYWORD_CHARS)
        .take(MAX_KEYWORDS)
        .map(|word| (*word).to_string())
        .collect();

    FeatureSet {
        words: words.iter().map(|word| (*word).to_string()).collect(),
        length: text.chars().count(),
        keywords,
        embedding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_case_folded() {
        let features = build_features("Suku Bunga suku", None);
        assert_eq!(features.words.len(), 2);
        assert!(features.words.contains("suku"));
        assert!(features.words.contains("bunga"));
    }

    #[test]
    fn keywords_require_more_than_four_chars() {
        let features = build_features("rate rates inflation BI", None);
        assert_eq!(features.keywords, vec!["rates", "inflation"]);
    }

    #[test]
    fn keywords_are_capped_at_thirty() {
        let text = (0..50)
            .map(|index| format!("keyword{index}"))
            .collect::<Vec<_>>()
            .join(" ");
        let features = build_features(&text, None);
        assert_eq!(features.keywords.len(), 30);
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let features = build_features("héllo", None);
        assert_eq!(features.length, 5);
    }

    #[test]
    fn embedding_is_attached_when_supplied() {
        let features = build_features("text", Some(vec![0.5, 0.5]));
        assert_eq!(features.embedding.as_deref(), Some(&[0.5, 0.5][..]));
    }
}
