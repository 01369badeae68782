/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use rust_leadgen_api::categories::{
    find_matching_categories, similarity, static_categories, DYNAMIC_MATCH_THRESHOLD,
    MAX_DYNAMIC_MATCHES,
};
use rust_leadgen_api::export::{leads_to_csv, slugify, CSV_HEADERS};
use rust_leadgen_api::models::{CategoryEntry, Lead, RawBusiness, RawCategory};
use rust_leadgen_api::ranking::rank;
use rust_leadgen_api::relevance::score_business;

fn lead(id: usize, score: f64) -> Lead {
    Lead {
        id: format!("lead-{}", id),
        name: format!("Business {}", id),
        relevance_score: Some(score),
        ..Lead::default()
    }
}

// Property: similarity is bounded, reflexive and symmetric
proptest! {
    #[test]
    fn similarity_in_unit_range(a in "\\PC{0,20}", b in "\\PC{0,20}") {
        let s = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn similarity_identity(a in "[a-zA-Z ]{0,20}") {
        prop_assert_eq!(similarity(&a, &a), 1.0);
    }

    #[test]
    fn similarity_commutative(a in "[a-z ]{0,16}", b in "[a-z ]{0,16}") {
        prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
    }
}

// Property: relevance scores are clamped to [0, 1]
proptest! {
    #[test]
    fn score_always_clamped(
        name in "[a-zA-Z ]{0,30}",
        term in "[a-z ]{0,12}",
        titles in prop::collection::vec(("[a-z]{1,10}", "[A-Za-z ]{0,15}"), 0..6),
        mapped in prop::collection::vec("[a-z]{1,10}", 0..6),
        rating in prop::option::of(0.0f64..5.0),
        reviews in prop::option::of(0u64..1000),
    ) {
        let business = RawBusiness {
            name: Some(name),
            categories: titles
                .into_iter()
                .map(|(id, title)| RawCategory { id: Some(id), title: Some(title) })
                .collect(),
            rating,
            review_count: reviews,
            ..RawBusiness::default()
        };
        let irrelevant = ["hospitals", "physicians"];
        let score = score_business(&business, &term, &mapped, &irrelevant);
        prop_assert!((0.0..=1.0).contains(&score));
    }
}

// Property: ranking filters, sorts and caps
proptest! {
    #[test]
    fn rank_respects_threshold_order_and_limit(
        scores in prop::collection::vec(0.0f64..=1.0, 0..40),
        min in 0.0f64..=1.0,
        limit in 1usize..30,
    ) {
        let leads: Vec<Lead> = scores.iter().enumerate().map(|(i, s)| lead(i, *s)).collect();
        let ranked = rank(leads, min, limit);

        let passing = scores.iter().filter(|s| **s >= min).count();
        prop_assert_eq!(ranked.len(), passing.min(limit));
        prop_assert!(ranked.iter().all(|l| l.relevance_score.unwrap_or(0.0) >= min));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
    }
}

// Property: dynamic matches are capped, above threshold and best first
proptest! {
    #[test]
    fn unmapped_niches_resolve_dynamically(
        niche in "[qxz]{4,10}",
        ids in prop::collection::vec("[qxz]{3,8}", 0..40),
    ) {
        prop_assert!(static_categories(&niche).is_none());

        let taxonomy: Vec<CategoryEntry> = ids
            .iter()
            .map(|id| CategoryEntry { id: id.clone(), title: id.to_uppercase() })
            .collect();
        let matched = find_matching_categories(&niche, &taxonomy);
        prop_assert!(matched.len() <= MAX_DYNAMIC_MATCHES);

        let entry_score = |id: &str| {
            taxonomy
                .iter()
                .find(|e| e.id == id)
                .map(|e| {
                    similarity(&niche, &e.title)
                        .max(similarity(&niche, &e.id.replace(['_', '-'], " ")))
                })
        };
        let scores: Vec<f64> = matched
            .iter()
            .map(|m| entry_score(m.as_str()))
            .collect::<Option<Vec<f64>>>()
            .unwrap_or_default();
        prop_assert_eq!(scores.len(), matched.len());
        prop_assert!(scores.iter().all(|s| *s >= DYNAMIC_MATCH_THRESHOLD));
        for pair in scores.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }
}

// Property: slugs are lowercase and whitespace free
proptest! {
    #[test]
    fn slug_has_no_whitespace_or_uppercase(value in "[A-Za-z \\t]{0,30}") {
        let slug = slugify(&value);
        prop_assert!(!slug.chars().any(char::is_whitespace));
        prop_assert!(!slug.chars().any(|c| c.is_ascii_uppercase()));
    }
}

#[test]
fn csv_escaping_survives_standard_reader() {
    let leads = vec![Lead {
        id: "b1".to_string(),
        name: "O'Brien, \"Best\" Cafe".to_string(),
        address: "1 Main St, Austin, TX".to_string(),
        rating: Some(4.5),
        review_count: Some(12),
        ..Lead::default()
    }];

    let csv = leads_to_csv(&leads).unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());

    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, CSV_HEADERS);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "O'Brien, \"Best\" Cafe");
    assert_eq!(&rows[0][2], "1 Main St, Austin, TX");
    assert_eq!(&rows[0][3], "4.5");
    assert_eq!(&rows[0][4], "12");
}
