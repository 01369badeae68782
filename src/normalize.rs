use crate::models::{Lead, RawBusiness};

const UNKNOWN_BUSINESS: &str = "Unknown Business";

/// Maps a provider record into a [`Lead`].
///
/// `index` is the record's position in the provider response and backs the
/// fallback id, so ids stay unique within one result set. Missing text fields
/// become empty strings; zero ratings and review counts are treated as absent.
pub fn normalize_lead(raw: &RawBusiness, index: usize) -> Lead {
    let all_categories: Vec<String> = raw
        .categories
        .iter()
        .filter_map(|c| c.title.clone())
        .collect();

    Lead {
        id: raw.id.clone().unwrap_or_else(|| format!("lead-{}", index)),
        job_id: None,
        name: raw
            .name
            .clone()
            .unwrap_or_else(|| UNKNOWN_BUSINESS.to_string()),
        website: raw.website.clone().unwrap_or_default(),
        email: raw.email.clone().unwrap_or_default(),
        phone: raw.phone.clone().unwrap_or_default(),
        address: format_address(raw),
        rating: raw.rating.filter(|r| *r > 0.0),
        review_count: raw.review_count.filter(|n| *n > 0),
        category: all_categories.first().cloned().unwrap_or_default(),
        all_categories,
        image_url: raw.image_url.clone().unwrap_or_default(),
        relevance_score: None,
    }
}

fn format_address(raw: &RawBusiness) -> String {
    let address = &raw.address;
    if let Some(formatted) = &address.formatted {
        return formatted.clone();
    }

    let display: Vec<&str> = address
        .display_lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();
    if !display.is_empty() {
        return display.join(", ");
    }

    [&address.street, &address.locality, &address.region]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
