//! Sparse TF-IDF vector space.
//!
//! Weights are raw term counts times the smoothed inverse document frequency
//! `ln((1 + n) / (1 + df)) + 1`; every vector is L2-normalized, so the cosine
//! similarity of two vectors is their dot product.

use std::collections::{BTreeMap, HashMap};

use crate::tokenize::Analyzer;

/// `(term id, weight)` pairs sorted by term id.
pub type SparseVector = Vec<(usize, f64)>;

pub struct VectorSpace {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl VectorSpace {
    /// Build the vocabulary and document vectors from `documents` alone.
    pub fn fit<'a, I>(analyzer: &Analyzer, documents: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();
        let mut counts: Vec<BTreeMap<usize, f64>> = Vec::new();

        for doc in documents {
            let mut tf: BTreeMap<usize, f64> = BTreeMap::new();
            for term in analyzer.terms(doc) {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(term).or_insert(next_id);
                if id == doc_freq.len() { doc_freq.push(0); }
                *tf.entry(id).or_insert(0.0) += 1.0;
            }
            for id in tf.keys() { doc_freq[*id] += 1; }
            counts.push(tf);
        }

        let n = counts.len() as f64;
        let idf: Vec<f64> = doc_freq.iter().map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0).collect();
        let rows = counts.into_iter().map(|tf| weigh(tf, &idf)).collect();
        Self { vocabulary, idf, rows }
    }

    /// Project `text` into the space; terms outside the vocabulary are ignored.
    pub fn embed(&self, analyzer: &Analyzer, text: &str) -> SparseVector {
        let mut tf: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyzer.terms(text) {
            if let Some(&id) = self.vocabulary.get(&term) { *tf.entry(id).or_insert(0.0) += 1.0; }
        }
        weigh(tf, &self.idf)
    }

    pub fn rows(&self) -> &[SparseVector] { &self.rows }

    pub fn vocabulary_len(&self) -> usize { self.vocabulary.len() }
}

fn weigh(tf: BTreeMap<usize, f64>, idf: &[f64]) -> SparseVector {
    let mut v: SparseVector = tf.into_iter().map(|(id, count)| (id, count * idf[id])).collect();
    let norm = v.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut v { *w /= norm; }
    }
    v
}

/// Cosine similarity of two normalized vectors, clamped to `[0, 1]`.
/// A zero vector has similarity 0 with everything.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j, mut dot) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0)
}
