//! orient-rank
//!
//! Lexical relevance ranking: a TF-IDF vector space built over the chunk set
//! being searched, cosine similarity against the query. Tokenization reuses
//! tantivy's text analyzer so ranking and any future index agree on terms.

pub mod ranker;
pub mod tfidf;
pub mod tokenize;

pub use ranker::TfIdfRanker;
pub use tokenize::Analyzer;
