//! The aggregation-and-ranking pipeline: keyword expansion, multi-source
//! collection, relevance filtering, pain point extraction, clustering, and
//! final ranking.

mod cluster;
mod expansion;
mod extract;
pub mod json;
mod oracle;
mod pipeline;
mod relevance;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cluster::Clusterer;
pub use expansion::KeywordExpander;
pub use extract::Extractor;
pub use oracle::{ClaudeOracle, Oracle};
pub use pipeline::{Pipeline, SearchRequest};
pub use relevance::RelevanceFilter;
