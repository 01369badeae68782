//! Threshold filtering, ranking and presentation sorting of scored leads.

use crate::models::{Lead, SortField, SortOrder};
use std::cmp::Ordering;

/// Default minimum relevance score for a lead to be returned.
pub const DEFAULT_MIN_SCORE: f64 = 0.4;

fn score_of(lead: &Lead) -> f64 {
    lead.relevance_score.unwrap_or(0.0)
}

/// Drops leads scoring below `min_score`, orders the rest by descending score
/// and keeps at most `limit`. Ties keep their input order.
pub fn rank(leads: Vec<Lead>, min_score: f64, limit: usize) -> Vec<Lead> {
    let mut kept: Vec<Lead> = leads
        .into_iter()
        .filter(|lead| score_of(lead) >= min_score)
        .collect();
    // sort_by is stable
    kept.sort_by(|a, b| score_of(b).total_cmp(&score_of(a)));
    kept.truncate(limit);
    kept
}

/// Re-sorts ranked leads for display. Relevance in descending order is the
/// ranked order itself and leaves the list untouched.
pub fn sort_leads(leads: &mut [Lead], field: SortField, order: SortOrder) {
    if field == SortField::Relevance && order == SortOrder::Desc {
        return;
    }

    let compare = |a: &Lead, b: &Lead| -> Ordering {
        match field {
            SortField::Relevance => score_of(a).total_cmp(&score_of(b)),
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
            SortField::Rating => a
                .rating
                .unwrap_or(0.0)
                .total_cmp(&b.rating.unwrap_or(0.0)),
            SortField::Reviews => a.review_count.unwrap_or(0).cmp(&b.review_count.unwrap_or(0)),
        }
    };

    match order {
        SortOrder::Asc => leads.sort_by(compare),
        SortOrder::Desc => leads.sort_by(|a, b| compare(b, a)),
    }
}
