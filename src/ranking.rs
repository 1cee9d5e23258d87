use std::cmp::Ordering;

use crate::data_models::{
    FALLBACK_DESCRIPTION, FALLBACK_TITLE, RankedResult, SearchOutcome, SearchResponse,
};

/// Joins scores with metadata and orders them for display.
///
/// Pairs are sorted by descending score. `sort_by` is stable, so equal scores
/// keep the order the backend emitted them in. URLs without a metadata entry
/// get the fallback title and description; metadata for URLs that were not
/// scored is dropped. `total_results` and the elapsed time are passed through
/// untouched.
pub fn rank(response: SearchResponse) -> SearchOutcome {
    let SearchResponse {
        urls,
        mut metadata,
        elapsed_ms,
        total_results,
    } = response;

    let mut scored = urls.into_pairs();
    scored.sort_by(|(_, a), (_, b)| compare_scores(*b, *a));

    let mut missing_metadata = 0usize;
    let results: Vec<RankedResult> = scored
        .into_iter()
        .enumerate()
        .map(|(rank, (url, _))| {
            let (title, description) = match metadata.remove(&url) {
                Some(meta) => (meta.title, meta.description),
                None => {
                    missing_metadata += 1;
                    (FALLBACK_TITLE.to_string(), FALLBACK_DESCRIPTION.to_string())
                }
            };
            RankedResult {
                id: rank.to_string(),
                url,
                title,
                description,
                rank,
                timestamp: None,
            }
        })
        .collect();

    if missing_metadata > 0 {
        log::debug!(
            "{} of {} ranked urls had no metadata, using fallback",
            missing_metadata,
            results.len()
        );
    }
    if !metadata.is_empty() {
        log::debug!("dropped {} metadata entries for unscored urls", metadata.len());
    }

    SearchOutcome {
        results,
        total_results,
        elapsed_seconds: elapsed_ms / 1000.0,
    }
}

/// Numeric ordering over scores where `-0.0 == 0.0`.
fn compare_scores(a: f64, b: f64) -> Ordering {
    normalize_zero(a).total_cmp(&normalize_zero(b))
}

fn normalize_zero(score: f64) -> f64 {
    if score == 0.0 { 0.0 } else { score }
}

#[test]
fn test_compare_scores() {
    assert_eq!(compare_scores(0.9, 0.5), Ordering::Greater);
    assert_eq!(compare_scores(-1.0, 0.0), Ordering::Less);
    assert_eq!(compare_scores(-0.0, 0.0), Ordering::Equal);
    assert_eq!(compare_scores(10.0, 9.5), Ordering::Greater);
    // numeric, not lexicographic: "10" < "9" as strings
    assert_eq!(compare_scores(10.0, 9.0), Ordering::Greater);
}
