//! orient-core
//!
//! Domain types, error taxonomy, collaborator traits and configuration shared
//! by the ranking, chain and pipeline crates. Also owns the corpus side of the
//! system: sources, the structural chunker and the chunked-corpus cache.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod cache;
pub mod chunker;
pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;
