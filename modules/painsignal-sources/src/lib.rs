//! Source adapters and the multi-source collector.
//!
//! Each adapter normalizes one public content source into `CandidateRecord`s;
//! the collector fans out over (phrase × adapter) pairs and assembles the
//! deduplicated, ranked candidate pool.

mod adapter;
mod collector;
mod devto;
mod feeds;
mod github;
mod hackernews;
mod producthunt;
mod scrape;
mod stackoverflow;

pub use adapter::SourceAdapter;
pub use collector::{CandidatePool, Collector};
pub use devto::DevToAdapter;
pub use feeds::{IndieHackersAdapter, MediumAdapter};
pub use github::GitHubAdapter;
pub use hackernews::HackerNewsAdapter;
pub use producthunt::ProductHuntAdapter;
pub use scrape::{FailoryAdapter, QuoraAdapter, YcRfsAdapter};
pub use stackoverflow::StackOverflowAdapter;

use std::sync::Arc;

/// The full default adapter set, one per supported source.
pub fn default_adapters() -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(HackerNewsAdapter::new()),
        Arc::new(DevToAdapter::new()),
        Arc::new(GitHubAdapter::new()),
        Arc::new(StackOverflowAdapter::new()),
        Arc::new(IndieHackersAdapter::new()),
        Arc::new(MediumAdapter::new()),
        Arc::new(ProductHuntAdapter::new()),
        Arc::new(YcRfsAdapter::new()),
        Arc::new(FailoryAdapter::new()),
        Arc::new(QuoraAdapter::new()),
    ]
}
