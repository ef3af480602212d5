//! The schema corpus bundled with the generator.
//!
//! Units are embedded with `include_str!` so the generator can run without a
//! checkout of the corpus. Paths are relative to the `corpus/` directory of
//! this crate and are listed in sorted order.

use serde::Serialize;

/// One embedded schema unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BundledUnit {
    /// Path of the unit relative to the corpus root.
    pub path: &'static str,
    /// Raw schema text.
    pub text: &'static str,
}

macro_rules! unit {
    ($path:literal) => {
        BundledUnit {
            path: $path,
            text: include_str!(concat!("../corpus/", $path)),
        }
    };
}

/// Returns every bundled unit, sorted by path.
pub fn bundled_corpus() -> Vec<BundledUnit> {
    vec![
        unit!("specification/connector/update_pipeline/ConnectorUpdatePipelineRequest.ts"),
        unit!("specification/inference/put_anthropic/PutAnthropicRequest.ts"),
        unit!("specification/inference/put_elasticsearch/PutElasticsearchRequest.ts"),
        unit!("specs/master/analysis/tokenizers/ngram/edge_n_gram_tokenizer.ts"),
        unit!("specs/master/cluster/nodes_stats/memory_stats.ts"),
        unit!("specs/master/document/single/exists/document_exists_request.ts"),
    ]
}
