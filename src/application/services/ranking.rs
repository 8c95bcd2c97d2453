//! Post-retrieval stages: threshold re-ranking, category filtering, aggregation.

use std::time::Instant;

use crate::domain::{RankedDocument, SearchResult};

/// Drop everything under `threshold`, then sort by relevance, highest first.
///
/// The sort is stable: equal scores keep the order the candidate source gave them.
pub fn rerank<T: RankedDocument>(mut documents: Vec<T>, threshold: f32) -> Vec<T> {
    documents.retain(|doc| doc.relevance() >= threshold);
    documents.sort_by(|a, b| b.relevance().total_cmp(&a.relevance()));
    documents
}

/// Keep exact category matches unless `passthrough` says the category means "any".
pub fn filter_by_category<T, F>(documents: Vec<T>, category: &str, passthrough: F) -> Vec<T>
where
    T: RankedDocument,
    F: Fn(&str) -> bool,
{
    if passthrough(category) {
        return documents;
    }
    documents
        .into_iter()
        .filter(|doc| doc.category() == category)
        .collect()
}

pub fn average_relevance<T: RankedDocument>(documents: &[T]) -> f32 {
    if documents.is_empty() {
        return 0.0;
    }
    let sum: f64 = documents.iter().map(|doc| f64::from(doc.relevance())).sum();
    (sum / documents.len() as f64) as f32
}

/// Truncate to `limit` and assemble the response envelope.
pub fn aggregate<T: RankedDocument>(
    mut filtered: Vec<T>,
    limit: usize,
    query: &str,
    started: Instant,
) -> SearchResult<T> {
    let total_found = filtered.len();
    filtered.truncate(limit);
    let avg_relevance = average_relevance(&filtered);

    SearchResult {
        results: filtered,
        total_found,
        avg_relevance,
        query: query.to_string(),
        execution_time_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc(&'static str, f32, &'static str);

    impl RankedDocument for Doc {
        fn relevance(&self) -> f32 {
            self.1
        }

        fn category(&self) -> &str {
            self.2
        }
    }

    fn docs() -> Vec<Doc> {
        vec![
            Doc("a", 0.70, "STJ"),
            Doc("b", 0.90, "STF"),
            Doc("c", 0.70, "STF"),
            Doc("d", 0.40, "TST"),
            Doc("e", 0.70, "TST"),
        ]
    }

    #[test]
    fn rerank_filters_and_sorts_descending() {
        let ranked = rerank(docs(), 0.5);
        let ids: Vec<&str> = ranked.iter().map(|d| d.0).collect();
        assert_eq!(ids, vec!["b", "a", "c", "e"]);
    }

    #[test]
    fn rerank_keeps_scores_equal_to_threshold() {
        let ranked = rerank(docs(), 0.7);
        assert_eq!(ranked.len(), 4);
        assert!(ranked.iter().all(|d| d.1 >= 0.7));
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rerank(docs(), 0.7);
        let tied: Vec<&str> = ranked.iter().filter(|d| d.1 == 0.7).map(|d| d.0).collect();
        assert_eq!(tied, vec!["a", "c", "e"]);
    }

    #[test]
    fn category_filter_is_exact() {
        let filtered = filter_by_category(docs(), "STF", |c| c == "all");
        assert_eq!(filtered.len(), 2);
        assert!(filter_by_category(docs(), "stf", |c| c == "all").is_empty());
        assert_eq!(filter_by_category(docs(), "all", |c| c == "all"), docs());
    }

    #[test]
    fn aggregate_counts_before_truncation() {
        let result = aggregate(rerank(docs(), 0.0), 2, "greve", Instant::now());
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.total_found, 5);
        assert!((result.avg_relevance - 0.8).abs() < 1e-6);
        assert_eq!(result.query, "greve");
        assert!(result.has_more());
    }

    #[test]
    fn empty_results_average_to_zero() {
        let result = aggregate(Vec::<Doc>::new(), 10, "greve", Instant::now());
        assert_eq!(result.avg_relevance, 0.0);
        assert_eq!(result.total_found, 0);
    }
}
