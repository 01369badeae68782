//! Niche → provider category resolution.
//!
//! Resolution tries, in order:
//! 1. an exact hit in [`CATEGORY_MAPPINGS`],
//! 2. a substring hit in the same table (longest matching key wins),
//! 3. fuzzy matching against the provider taxonomy held in [`CategoryCache`].

use crate::category_cache::CategoryCache;
use crate::models::{CategoryEntry, CategorySource};
use crate::providers::TaxonomySource;
use std::sync::Arc;

/// Minimum similarity for a taxonomy entry to count as a dynamic match.
pub const DYNAMIC_MATCH_THRESHOLD: f64 = 0.5;

/// Maximum number of categories returned by the dynamic fallback.
pub const MAX_DYNAMIC_MATCHES: usize = 15;

/// Common niches and the Yelp category aliases they map to, in priority order.
pub const CATEGORY_MAPPINGS: &[(&str, &[&str])] = &[
    (
        "real estate",
        &[
            "realestate",
            "realestateagents",
            "realestateservices",
            "propertymgmt",
            "apartments",
            "homeinspectors",
            "mortgagebrokers",
            "titlecompanies",
        ],
    ),
    (
        "restaurant",
        &[
            "restaurants",
            "food",
            "breakfast_brunch",
            "cafes",
            "bars",
            "italian",
            "mexican",
            "chinese",
            "japanese",
            "indian",
            "thai",
            "vietnamese",
            "korean",
            "mediterranean",
            "french",
            "american",
            "pizza",
            "burgers",
            "seafood",
            "steakhouses",
            "sushi",
        ],
    ),
    (
        "restaurants",
        &["restaurants", "food", "breakfast_brunch", "cafes", "bars"],
    ),
    (
        "dentist",
        &[
            "dentists",
            "cosmeticdentists",
            "generaldentistry",
            "orthodontists",
            "endodontists",
            "oralsurgeons",
            "periodontists",
            "pediatricdentists",
        ],
    ),
    (
        "lawyer",
        &[
            "lawyers",
            "bankruptcy",
            "criminaldefense",
            "divorce",
            "employmentlaw",
            "estateplanning",
            "immigration",
            "personal_injury_lawyer",
            "realestate_lawyers",
            "taxlaw",
        ],
    ),
    (
        "attorney",
        &[
            "lawyers",
            "bankruptcy",
            "criminaldefense",
            "divorce",
            "employmentlaw",
            "estateplanning",
            "immigration",
            "personal_injury_lawyer",
        ],
    ),
    (
        "plumber",
        &["plumbing", "plumbers", "waterheaterinstallrepair"],
    ),
    ("electrician", &["electricians", "electrical"]),
    (
        "gym",
        &[
            "gyms",
            "fitness",
            "trainers",
            "yoga",
            "pilates",
            "martialarts",
            "boxing",
            "cycling",
        ],
    ),
    (
        "fitness",
        &["gyms", "fitness", "trainers", "yoga", "pilates"],
    ),
    (
        "salon",
        &[
            "hair",
            "hairsalons",
            "hairstylists",
            "barbers",
            "beautysvc",
            "nailsalons",
            "skincare",
            "spas",
        ],
    ),
    (
        "spa",
        &["spas", "massage", "skincare", "beautysvc", "medicalspa"],
    ),
    (
        "doctor",
        &[
            "doctors",
            "physicians",
            "familydr",
            "internists",
            "generalpractitioners",
        ],
    ),
    (
        "contractor",
        &["contractors", "generalcontractors", "homebuilders", "remodeling"],
    ),
    (
        "accountant",
        &["accountants", "bookkeepers", "taxservices", "payrollservices"],
    ),
    (
        "insurance",
        &[
            "insurance",
            "autoinsurance",
            "homeinsurance",
            "lifeinsurance",
            "healthinsurance",
        ],
    ),
    (
        "hotel",
        &[
            "hotels",
            "hotelstravel",
            "bedbreakfast",
            "hostels",
            "resorts",
            "vacation_rentals",
        ],
    ),
    (
        "car dealer",
        &["car_dealers", "usedcardealers", "autodealers"],
    ),
    (
        "auto repair",
        &["autorepair", "auto", "tires", "oilchange", "brakes", "transmission"],
    ),
    (
        "cafe",
        &["cafes", "coffee", "coffeeroasteries", "bubbletea", "juicebars"],
    ),
    ("coffee", &["coffee", "coffeeroasteries", "cafes"]),
    (
        "bakery",
        &["bakeries", "desserts", "cakeshop", "donuts", "cupcakes"],
    ),
    (
        "pet",
        &[
            "petservices",
            "petstore",
            "petgrooming",
            "veterinarians",
            "dogwalkers",
            "petsitting",
        ],
    ),
    ("veterinarian", &["veterinarians", "vet", "animalhospitals"]),
    (
        "photography",
        &[
            "photographers",
            "eventphotography",
            "portraitphotography",
            "videography",
        ],
    ),
    (
        "cleaning",
        &["homecleaning", "officecleaning", "carpetcleaning", "windowwashing"],
    ),
    ("moving", &["movers", "selfstorage", "truckrental"]),
    (
        "landscaping",
        &["landscaping", "gardeners", "lawn", "treeservices"],
    ),
    ("roofing", &["roofing", "roofinspectors", "gutterservices"]),
    ("hvac", &["hvac", "heating", "aircondrepair"]),
];

/// Categories that signal an off-topic result for a given niche.
pub const IRRELEVANT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "real estate",
        &[
            "banks",
            "financialservices",
            "investing",
            "loanservices",
            "creditunions",
            "paydayloans",
            "insurance",
        ],
    ),
    ("restaurant", &["grocery", "convenience", "gasstation"]),
    ("dentist", &["hospitals", "physicians", "surgeons"]),
    ("lawyer", &["mediation", "arbitration"]),
    ("gym", &["sportsbars", "sportinggoods"]),
];

/// Outcome of resolving a niche.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryResolution {
    pub categories: Vec<String>,
    pub source: CategorySource,
}

impl CategoryResolution {
    fn from_static(categories: &[&str]) -> Self {
        Self {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            source: CategorySource::Static,
        }
    }

    fn dynamic(categories: Vec<String>) -> Self {
        Self {
            categories,
            source: CategorySource::Dynamic,
        }
    }
}

fn normalize_niche(niche: &str) -> String {
    niche.trim().to_lowercase()
}

/// Looks `niche` up in the static table: exact key first, then the longest key
/// that contains or is contained in the niche. Ties go to the earlier entry.
pub fn static_categories(niche: &str) -> Option<(&'static str, &'static [&'static str])> {
    let niche = normalize_niche(niche);
    if niche.is_empty() {
        return None;
    }

    if let Some(&(key, categories)) = CATEGORY_MAPPINGS.iter().find(|(key, _)| *key == niche) {
        return Some((key, categories));
    }

    let mut best: Option<(&'static str, &'static [&'static str])> = None;
    for &(key, categories) in CATEGORY_MAPPINGS {
        if niche.contains(key) || key.contains(niche.as_str()) {
            match best {
                Some((best_key, _)) if best_key.len() >= key.len() => {}
                _ => best = Some((key, categories)),
            }
        }
    }
    best
}

/// Categories considered off-topic for `niche` (exact key match only).
pub fn irrelevant_categories(niche: &str) -> &'static [&'static str] {
    let niche = normalize_niche(niche);
    IRRELEVANT_CATEGORIES
        .iter()
        .find(|(key, _)| *key == niche)
        .map(|(_, categories)| *categories)
        .unwrap_or(&[])
}

fn matching_words(words: &[&str], others: &[&str]) -> usize {
    words
        .iter()
        .filter(|w| others.iter().any(|o| o.contains(**w) || w.contains(*o)))
        .count()
}

/// Case-insensitive string similarity in `[0, 1]`.
///
/// Equal strings score 1.0, containment 0.9, shared words
/// `0.7 + 0.2 * matches / max_words`, and anything else falls back to
/// normalized Levenshtein distance.
pub fn similarity(a: &str, b: &str) -> f64 {
    let s1 = a.to_lowercase();
    let s2 = b.to_lowercase();

    if s1 == s2 {
        return 1.0;
    }
    if s1.contains(s2.as_str()) || s2.contains(s1.as_str()) {
        return 0.9;
    }

    let words1: Vec<&str> = s1.split_whitespace().collect();
    let words2: Vec<&str> = s2.split_whitespace().collect();
    // max of both directions keeps the function commutative
    let matches = matching_words(&words1, &words2).max(matching_words(&words2, &words1));
    if matches > 0 {
        let max_words = words1.len().max(words2.len()) as f64;
        return 0.7 + 0.2 * matches as f64 / max_words;
    }

    strsim::normalized_levenshtein(&s1, &s2)
}

/// Scores every taxonomy entry against `niche` and returns the ids of the best
/// matches, highest first.
pub fn find_matching_categories(niche: &str, taxonomy: &[CategoryEntry]) -> Vec<String> {
    let niche = normalize_niche(niche);
    let mut scored: Vec<(&str, f64)> = taxonomy
        .iter()
        .filter_map(|entry| {
            let title_score = similarity(&niche, &entry.title);
            let id_score = similarity(&niche, &entry.id.replace(['_', '-'], " "));
            let score = title_score.max(id_score);
            (score >= DYNAMIC_MATCH_THRESHOLD).then_some((entry.id.as_str(), score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(MAX_DYNAMIC_MATCHES)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// Resolves niches to provider categories, consulting the shared taxonomy
/// cache only when the static table has nothing.
#[derive(Clone)]
pub struct CategoryResolver {
    cache: Arc<CategoryCache>,
}

impl CategoryResolver {
    pub fn new(cache: Arc<CategoryCache>) -> Self {
        Self { cache }
    }

    /// Resolves `niche`. Never fails: an unavailable taxonomy yields an empty
    /// dynamic resolution.
    pub async fn resolve<S: TaxonomySource>(&self, niche: &str, source: &S) -> CategoryResolution {
        if let Some((key, categories)) = static_categories(niche) {
            tracing::debug!("Using static categories for '{}' -> '{}'", niche, key);
            return CategoryResolution::from_static(categories);
        }

        if normalize_niche(niche).is_empty() {
            return CategoryResolution::dynamic(Vec::new());
        }

        tracing::info!("No static mapping for '{}', using dynamic search", niche);
        let taxonomy = match self.cache.get_taxonomy(source).await {
            Ok(taxonomy) => taxonomy,
            Err(e) => {
                tracing::warn!("Dynamic category search unavailable: {}", e);
                return CategoryResolution::dynamic(Vec::new());
            }
        };

        let matched = find_matching_categories(niche, &taxonomy);
        tracing::info!(
            "Dynamic search found {} categories for '{}': {:?}",
            matched.len(),
            niche,
            matched
        );
        CategoryResolution::dynamic(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category_cache::tests::{FakeClock, FakeTaxonomy};
    use std::sync::atomic::Ordering;

    fn resolver() -> CategoryResolver {
        CategoryResolver::new(Arc::new(CategoryCache::with_clock(FakeClock::new())))
    }

    #[tokio::test]
    async fn test_exact_static_hit() {
        let source = FakeTaxonomy::default();
        let resolution = resolver().resolve("  Dentist ", &source).await;

        assert_eq!(resolution.source, CategorySource::Static);
        assert_eq!(resolution.categories.len(), 8);
        assert_eq!(resolution.categories[0], "dentists");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_substring_prefers_longest_key() {
        let source = FakeTaxonomy::default();
        let resolution = resolver().resolve("best restaurants downtown", &source).await;

        assert_eq!(resolution.source, CategorySource::Static);
        assert_eq!(
            resolution.categories,
            vec!["restaurants", "food", "breakfast_brunch", "cafes", "bars"]
        );
    }

    #[test]
    fn test_substring_key_contains_niche() {
        let (key, _) = static_categories("estate").unwrap();
        assert_eq!(key, "real estate");

        let (key, _) = static_categories("divorce lawyer").unwrap();
        assert_eq!(key, "lawyer");
    }

    #[test]
    fn test_every_mapped_niche_resolves_to_its_own_categories() {
        for &(key, categories) in CATEGORY_MAPPINGS {
            assert_eq!(static_categories(key), Some((key, categories)), "key {}", key);
            assert_eq!(
                static_categories(&key.to_uppercase()),
                Some((key, categories)),
                "key {}",
                key
            );

            // Embedded in a longer niche, the winner is at least as long as the key
            let (winner, _) = static_categories(&format!("best {} nearby", key)).unwrap();
            assert!(winner.len() >= key.len(), "{} resolved to {}", key, winner);
        }
    }

    #[test]
    fn test_empty_niche_has_no_static_match() {
        assert!(static_categories("   ").is_none());
    }

    #[tokio::test]
    async fn test_dynamic_fallback_uses_taxonomy() {
        let source = FakeTaxonomy::with(&[
            ("florists", "Florists"),
            ("flowers", "Flowers & Gifts"),
            ("tattoo", "Tattoo"),
        ]);
        let resolution = resolver().resolve("florist", &source).await;

        assert_eq!(resolution.source, CategorySource::Dynamic);
        assert_eq!(resolution.categories[0], "florists");
        assert!(!resolution.categories.contains(&"tattoo".to_string()));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dynamic_fallback_degrades_when_taxonomy_unavailable() {
        let source = FakeTaxonomy::default();
        source.failing.store(true, Ordering::SeqCst);

        let resolution = resolver().resolve("florist", &source).await;
        assert_eq!(resolution, CategoryResolution::dynamic(Vec::new()));
    }

    #[test]
    fn test_dynamic_matches_are_capped() {
        let taxonomy: Vec<CategoryEntry> = (0..40)
            .map(|i| CategoryEntry {
                id: format!("tattoo_{}", i),
                title: format!("Tattoo Studio {}", i),
            })
            .collect();
        assert_eq!(
            find_matching_categories("tattoo", &taxonomy).len(),
            MAX_DYNAMIC_MATCHES
        );
    }

    #[test]
    fn test_identifier_separators_become_spaces() {
        let taxonomy = vec![CategoryEntry {
            id: "escape_games".to_string(),
            title: "Xyz".to_string(),
        }];
        assert_eq!(find_matching_categories("escape games", &taxonomy), vec!["escape_games"]);
    }

    #[test]
    fn test_irrelevant_categories_lookup() {
        assert_eq!(
            irrelevant_categories("Dentist"),
            &["hospitals", "physicians", "surgeons"]
        );
        assert!(irrelevant_categories("florist").is_empty());
    }

    #[test]
    fn test_similarity_tiers() {
        assert_eq!(similarity("Dentist", "dentist"), 1.0);
        assert_eq!(similarity("dentist", "dentists"), 0.9);
        // "auto" is contained in "autorepair": one of two words matches
        assert!((similarity("auto shop", "autorepair") - 0.8).abs() < 1e-9);
        assert!((similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_edit_distance_tier_normalizes_by_longer_string() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
        let expected = strsim::normalized_levenshtein("florist", "flowers");
        assert!((similarity("florist", "flowers") - expected).abs() < 1e-9);
    }
}
