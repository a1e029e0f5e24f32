use crate::models::{DocumentChunk, ScoredChunk};
use std::collections::HashSet;

const EMBEDDING_WEIGHT: f32 = 100.0;
const WORD_OVERLAP_WEIGHT: f32 = 2.0;
const PHRASE_MATCH_BONUS: f32 = 10.0;
const MIN_PHRASE_CHARS: usize = 3;

/// Cosine similarity of two vectors; 0.0 when either operand is absent in
/// spirit (zero norm) or the dimensions disagree.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    if left.len() != right.len() {
        return 0.0;
    }

    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let norm_left: f32 = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let norm_right: f32 = right.iter().map(|value| value * value).sum::<f32>().sqrt();

    if norm_left == 0.0 || norm_right == 0.0 {
        return 0.0;
    }

    dot / (norm_left * norm_right)
}

/// Composite relevance of one chunk for one query: embedding similarity
/// scaled to 0-100 when both vectors exist, plus 2 per shared case-folded
/// word, plus 10 when the whole lowercased query appears verbatim in the
/// chunk.
pub fn score_chunk(
    query_lower: &str,
    query_words: &HashSet<String>,
    query_embedding: Option<&[f32]>,
    chunk: &DocumentChunk,
) -> f32 {
    let mut score = 0.0;

    if let (Some(query_vector), Some(chunk_vector)) =
        (query_embedding, chunk.features.embedding.as_deref())
    {
        score += cosine_similarity(query_vector, chunk_vector) * EMBEDDING_WEIGHT;
    }

    let overlap = query_words
        .iter()
        .filter(|word| chunk.features.words.contains(*word))
        .count();
    score += overlap as f32 * WORD_OVERLAP_WEIGHT;

    if query_lower.chars().count() > MIN_PHRASE_CHARS
        && chunk.text.to_lowercase().contains(query_lower)
    {
        score += PHRASE_MATCH_BONUS;
    }

    score
}

/// Rank `chunks` against `query` and keep the `top_k` best. Scores of zero
/// or below are dropped; ties keep insertion order (stable sort). No chunks
/// means an empty result, not an error.
pub fn rank_chunks(
    query: &str,
    chunks: &[DocumentChunk],
    query_embedding: Option<&[f32]>,
    top_k: usize,
) -> Vec<ScoredChunk> {
    let query_lower = query.to_lowercase();
    let query_words: HashSet<String> = query_lower
        .split_whitespace()
        .map(|word| word.to_string())
        .collect();

    let mut scored: Vec<ScoredChunk> = chunks
        .iter()
        .filter_map(|chunk| {
            let score = score_chunk(&query_lower, &query_words, query_embedding, chunk);
            (score > 0.0).then(|| ScoredChunk {
                chunk: chunk.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|left, right| right.score.total_cmp(&left.score));
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::build_features;
    use crate::models::{DocumentChunk, FeatureSet};

    fn chunk_with(text: &str, embedding: Option<Vec<f32>>, index: usize) -> DocumentChunk {
        let features: FeatureSet = build_features(text, embedding);
        DocumentChunk {
            id: DocumentChunk::chunk_id("doc.txt", index),
            filename: "doc.txt".to_string(),
            text: text.to_string(),
            features,
            chunk_index: index,
            total_chunks: 1,
        }
    }

    #[test]
    fn identical_vectors_have_unit_similarity() {
        let vector = vec![0.3, 0.4, 0.5];
        let similarity = cosine_similarity(&vector, &vector);
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_zero_similarity() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(similarity.abs() < 1e-6);
    }

    #[test]
    fn zero_vector_has_zero_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn mismatched_dimensions_have_zero_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn phrase_match_scores_without_embeddings() {
        let chunk = chunk_with("kebijakan suku bunga acuan bank sentral", None, 0);
        let hits = rank_chunks("suku bunga", &[chunk], None, 5);

        assert_eq!(hits.len(), 1);
        // 10 for the verbatim phrase plus 2 per overlapping word.
        assert!(hits[0].score >= 14.0);
    }

    #[test]
    fn adding_a_shared_keyword_never_decreases_the_score() {
        let base = chunk_with("inflasi tahunan menurun", None, 0);
        let richer = chunk_with("inflasi tahunan menurun bunga", None, 1);

        let query_lower = "suku bunga".to_string();
        let query_words: HashSet<String> =
            query_lower.split_whitespace().map(String::from).collect();

        let low = score_chunk(&query_lower, &query_words, None, &base);
        let high = score_chunk(&query_lower, &query_words, None, &richer);
        assert!(high >= low);
    }

    #[test]
    fn zero_scoring_chunks_are_excluded() {
        let unrelated = chunk_with("completely different topic", None, 0);
        let hits = rank_chunks("suku bunga", &[unrelated], None, 5);
        assert!(hits.is_empty());
    }

    #[test]
    fn top_k_bounds_the_result() {
        let chunks: Vec<DocumentChunk> = (0..10)
            .map(|index| chunk_with("suku bunga acuan", None, index))
            .collect();
        let hits = rank_chunks("suku bunga", &chunks, None, 3);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let chunks: Vec<DocumentChunk> = (0..4)
            .map(|index| chunk_with("suku bunga acuan", None, index))
            .collect();
        let hits = rank_chunks("suku bunga", &chunks, None, 4);

        let order: Vec<usize> = hits.iter().map(|hit| hit.chunk.chunk_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn embedding_similarity_dominates_the_composite() {
        let aligned = chunk_with("unrelated words here okay", Some(vec![1.0, 0.0]), 0);
        let keyword_only = chunk_with("suku bunga acuan", None, 1);

        let hits = rank_chunks(
            "suku bunga",
            &[keyword_only, aligned],
            Some(&[1.0, 0.0]),
            5,
        );

        assert_eq!(hits.len(), 2);
        // cosine 1.0 scaled to 100 beats 10 + word overlap.
        assert_eq!(hits[0].chunk.chunk_index, 0);
    }

    #[test]
    fn empty_collection_yields_empty_result() {
        assert!(rank_chunks("anything", &[], None, 5).is_empty());
    }
}
