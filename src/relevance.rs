//! Relevance scoring of provider results against the searched niche.

use crate::models::RawBusiness;

const BASE_SCORE: f64 = 0.5;
const CATEGORY_MATCH_BONUS: f64 = 0.1;
const MAX_CATEGORY_BONUS: f64 = 0.3;
const TITLE_TERM_BONUS: f64 = 0.2;
const NAME_TERM_BONUS: f64 = 0.1;
const IRRELEVANT_PENALTY: f64 = 0.4;
const RATING_BONUS: f64 = 0.05;
const REVIEWS_BONUS: f64 = 0.05;
const HIGH_RATING: f64 = 4.0;
const MIN_REVIEWS: u64 = 10;

/// Scores `business` in `[0, 1]`.
///
/// Starts from 0.5 and adds bonuses for category overlap with `mapped`,
/// category titles or the name mentioning the search term, and good ratings
/// with enough reviews. Businesses tagged with an `irrelevant` category lose
/// 0.4 unless they also carry at least one mapped category.
pub fn score_business(
    business: &RawBusiness,
    search_term: &str,
    mapped: &[String],
    irrelevant: &[&str],
) -> f64 {
    let term = search_term.trim().to_lowercase();
    let mut score = BASE_SCORE;

    let category_ids = || business.categories.iter().filter_map(|c| c.id.as_deref());

    let mapped_matches = category_ids()
        .filter(|id| mapped.iter().any(|m| m.as_str() == *id))
        .count();
    score += (CATEGORY_MATCH_BONUS * mapped_matches as f64).min(MAX_CATEGORY_BONUS);

    if !term.is_empty() {
        let title_hit = business
            .categories
            .iter()
            .filter_map(|c| c.title.as_deref())
            .map(str::to_lowercase)
            .filter(|title| !title.is_empty())
            .any(|title| title.contains(term.as_str()) || term.contains(title.as_str()));
        if title_hit {
            score += TITLE_TERM_BONUS;
        }

        let name_hit = business
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(term.as_str()));
        if name_hit {
            score += NAME_TERM_BONUS;
        }
    }

    if mapped_matches == 0 && category_ids().any(|id| irrelevant.iter().any(|i| *i == id)) {
        score -= IRRELEVANT_PENALTY;
    }

    if business.rating.is_some_and(|r| r >= HIGH_RATING) {
        score += RATING_BONUS;
    }
    if business.review_count.is_some_and(|n| n >= MIN_REVIEWS) {
        score += REVIEWS_BONUS;
    }

    score.clamp(0.0, 1.0)
}
