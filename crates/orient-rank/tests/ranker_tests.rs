use proptest::prelude::*;

use orient_core::traits::Ranker;
use orient_core::types::{Chunk, ContextBundle};
use orient_rank::TfIdfRanker;

fn chunks(texts: &[&str]) -> Vec<Chunk> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Chunk { corpus_id: "test".to_string(), sequence_index: i, text: (*t).to_string() })
        .collect()
}

#[test]
fn nursing_chunk_ranks_first_in_both_corpora() {
    let ranker = TfIdfRanker::default();
    let metiers = chunks(&["Chunk about software engineering.", "Chunk about nursing and care."]);
    let jobs = chunks(&["Software developer listing.", "Nurse job listing."]);

    let a = ranker.rank("aime soigner les gens nursing care", &metiers, 15);
    assert_eq!(a.len(), 2);
    assert_eq!(a[0].index, 1);
    assert!(a[0].similarity > 0.0);
    assert_eq!(a[1].similarity, 0.0);

    let b = ranker.rank("I like caring for people: nurse", &jobs, 15);
    assert_eq!(b[0].index, 1);
    assert!(b[0].similarity > b[1].similarity);
}

#[test]
fn empty_chunk_set_gives_empty_result() {
    assert!(TfIdfRanker::default().rank("anything", &[], 15).is_empty());
}

#[test]
fn no_shared_vocabulary_returns_top_n_zero_scores_in_index_order() {
    let set = chunks(&["alpha", "bravo", "charlie", "delta"]);
    let ranked = TfIdfRanker::default().rank("zulu", &set, 3);
    let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![0, 1, 2]);
    assert!(ranked.iter().all(|r| r.similarity == 0.0));
}

#[test]
fn preview_is_truncated_to_configured_length() {
    let long = "x".repeat(250);
    let ranked = TfIdfRanker::default().rank("x", &chunks(&[long.as_str()]), 1);
    assert_eq!(ranked[0].preview.chars().count(), 100);
}

#[test]
fn bundle_concatenates_ranked_texts() {
    let set = chunks(&["Chunk about software engineering.", "Chunk about nursing and care."]);
    let ranked = TfIdfRanker::default().rank("nursing", &set, 15);
    let bundle = ContextBundle::from_ranked(ranked, &set);
    assert_eq!(bundle.text, "Chunk about nursing and care. Chunk about software engineering.");
}

fn corpus() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e]{1,3}( [a-e]{1,3}){0,6}", 0..25)
}

proptest! {
    #[test]
    fn ranking_is_deterministic(texts in corpus(), query in "[a-e]{1,3}( [a-e]{1,3}){0,4}", top_n in 0usize..30) {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let set = chunks(&refs);
        let ranker = TfIdfRanker::default();
        prop_assert_eq!(ranker.rank(&query, &set, top_n), ranker.rank(&query, &set, top_n));
    }

    #[test]
    fn ranking_is_ordered_and_sized(texts in corpus(), query in "[a-e]{1,3}( [a-e]{1,3}){0,4}", top_n in 0usize..30) {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let set = chunks(&refs);
        let ranked = TfIdfRanker::default().rank(&query, &set, top_n);
        prop_assert_eq!(ranked.len(), top_n.min(set.len()));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].similarity >= pair[1].similarity);
            if pair[0].similarity == pair[1].similarity {
                prop_assert!(pair[0].index < pair[1].index);
            }
        }
        for r in &ranked {
            prop_assert!((0.0..=1.0).contains(&r.similarity));
        }
    }
}
