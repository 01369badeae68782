//! CSV export of leads.

use crate::errors::AppError;
use crate::models::Lead;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub const CSV_HEADERS: [&str; 7] = [
    "Business Name",
    "Phone",
    "Address",
    "Rating",
    "Reviews",
    "Category",
    "Website",
];

/// Renders `leads` as CSV: one header row, one row per lead, rows joined by
/// `\n`. Fields containing a comma, quote or newline are quoted with embedded
/// quotes doubled. An empty lead list renders as an empty document.
pub fn leads_to_csv(leads: &[Lead]) -> Result<String, AppError> {
    if leads.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let csv_error = |e: csv::Error| AppError::InternalError(format!("CSV write failed: {}", e));

    writer.write_record(CSV_HEADERS).map_err(csv_error)?;
    for lead in leads {
        let rating = lead.rating.map(|r| r.to_string()).unwrap_or_default();
        let reviews = lead.review_count.map(|n| n.to_string()).unwrap_or_default();
        writer
            .write_record([
                lead.name.as_str(),
                lead.phone.as_str(),
                lead.address.as_str(),
                rating.as_str(),
                reviews.as_str(),
                lead.category.as_str(),
                lead.website.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV flush failed: {}", e)))?;
    let mut document = String::from_utf8(bytes)
        .map_err(|e| AppError::InternalError(format!("CSV is not valid UTF-8: {}", e)))?;
    if document.ends_with('\n') {
        document.pop();
    }
    Ok(document)
}

/// Lowercases `value` and replaces every whitespace run with a single hyphen.
pub fn slugify(value: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    re.replace_all(&value.to_lowercase(), "-").into_owned()
}

/// `leads_<niche>_<city>_<YYYY-MM-DD>.csv`
pub fn export_filename(niche: &str, city: &str, date: NaiveDate) -> String {
    format!(
        "leads_{}_{}_{}.csv",
        slugify(niche),
        slugify(city),
        date.format("%Y-%m-%d")
    )
}

/// `attachment` disposition for `filename`. Quotes, backslashes and control
/// characters cannot appear inside the quoted header parameter and are dropped.
pub fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawBusiness;
    use crate::normalize::normalize_lead;

    fn lead(name: &str) -> Lead {
        let mut lead = normalize_lead(&RawBusiness::default(), 0);
        lead.name = name.to_string();
        lead
    }

    #[test]
    fn test_header_and_plain_row() {
        let mut l = lead("Smile Dental");
        l.phone = "(512) 555-0100".to_string();
        l.rating = Some(4.0);
        l.review_count = Some(20);
        l.category = "Dentists".to_string();

        let csv = leads_to_csv(&[l]).unwrap();
        assert_eq!(
            csv,
            "Business Name,Phone,Address,Rating,Reviews,Category,Website\n\
             Smile Dental,(512) 555-0100,,4,20,Dentists,"
        );
    }

    #[test]
    fn test_quotes_and_commas_escaped() {
        let csv = leads_to_csv(&[lead(r#"O'Brien, "Best" Cafe"#)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(r#""O'Brien, ""Best"" Cafe","#));
    }

    #[test]
    fn test_newline_in_field_is_quoted() {
        let mut l = lead("Cafe");
        l.address = "1 Main St\nSuite 2".to_string();
        let csv = leads_to_csv(&[l]).unwrap();
        assert!(csv.contains("\"1 Main St\nSuite 2\""));
    }

    #[test]
    fn test_empty_leads_render_empty_document() {
        assert_eq!(leads_to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_filename("Real  Estate", "New\tYork City", date),
            "leads_real-estate_new-york-city_2024-03-09.csv"
        );
    }

    #[test]
    fn test_content_disposition_drops_quotes_and_controls() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let filename = export_filename("\"best\" tacos\\", "El Paso\r\nX", date);
        assert_eq!(
            content_disposition(&filename),
            "attachment; filename=\"leads_best-tacos_el-paso-x_2024-03-09.csv\""
        );
    }
}
