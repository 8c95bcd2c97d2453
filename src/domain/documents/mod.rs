//! Document domains served by the retrieval engine.
//!
//! Each domain is a strategy object: it names its vector collection, declares
//! its categorical dimension, maps raw candidates into its document shape, and
//! carries the hand-curated corpus used when no vector store answers.

mod precedents;
mod templates;

use std::fmt::Debug;

use serde::Serialize;

pub use precedents::Precedents;
pub use templates::ContractTemplates;

use super::models::{Candidate, RankedDocument, ALL_CATEGORIES};

pub trait DocumentDomain: Send + Sync + 'static {
    type Document: RankedDocument + Clone + Debug + PartialEq + Serialize + Send + 'static;

    /// Short label used in logs and tool names.
    fn name(&self) -> &'static str;

    fn default_collection(&self) -> &'static str;

    /// Request field carrying the category filter (`court`, `contractType`).
    fn category_field(&self) -> &'static str;

    /// Closed set of accepted category values, sentinels excluded.
    fn categories(&self) -> &'static [&'static str];

    /// Category values that disable filtering.
    fn passthrough_categories(&self) -> &'static [&'static str] {
        &[ALL_CATEGORIES]
    }

    fn is_passthrough(&self, category: &str) -> bool {
        self.passthrough_categories().contains(&category)
    }

    fn map_candidate(&self, candidate: Candidate) -> Self::Document;

    /// Static records served when the vector store is absent or failing.
    fn fallback_corpus(&self) -> Vec<Candidate>;
}

pub(crate) fn candidate(score: f32, payload: serde_json::Value) -> Candidate {
    Candidate::new(score, payload.as_object().cloned().unwrap_or_default())
}
