//! Best-effort metadata extraction from tagged-era archive text
//!
//! Both extractors keep the *first* match and silently drop the rest. A header
//! naming several country pairs yields only the first pair; an article header
//! with several dates yields only the first date.

use regex::Regex;
use std::sync::LazyLock;
use tally_domain::{CountryCodes, PublishedDate};

static COUNTRY_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2})-([A-Z]{2})\b").unwrap());

static PUBLISHED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)",
        r"\s\d{1,2},\s\d{4}",
        r"(?:,*\s?(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday))?\b",
    ))
    .unwrap()
});

/// Metadata attached to every chunk of one article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleMetadata {
    /// Country pair from the section header
    pub country_codes: Option<CountryCodes>,
    /// Publication date from the article header
    pub published_date: Option<PublishedDate>,
}

/// Find the first `XX-YY` country pair in a section header
///
/// # Examples
///
/// ```
/// use tally_ingest::extract_country_codes;
///
/// let codes = extract_country_codes("Topic: IQ-US conflict, also GB-FR").unwrap();
/// assert_eq!(codes.to_string(), "IQ-US");
/// assert!(extract_country_codes("no codes here").is_none());
/// ```
pub fn extract_country_codes(header: &str) -> Option<CountryCodes> {
    COUNTRY_PAIR_RE
        .captures(header)
        .map(|caps| CountryCodes::new(&caps[1], &caps[2]))
}

/// Find the first "Month Day, Year[, Weekday]" date in `text`
///
/// The matched string is returned verbatim.
pub fn extract_published_date(text: &str) -> Option<PublishedDate> {
    PUBLISHED_DATE_RE
        .find(text)
        .map(|m| PublishedDate::new(m.as_str()))
}

/// Extract both fields: codes from `header`, date from `text`
pub fn extract_metadata(header: &str, text: &str) -> ArticleMetadata {
    ArticleMetadata {
        country_codes: extract_country_codes(header),
        published_date: extract_published_date(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_date_together() {
        let meta = extract_metadata(
            "Search: US-GB\n",
            "Some Paper\nMarch 20, 2003, Thursday\nCopyright",
        );

        assert_eq!(meta.country_codes, Some(CountryCodes::new("US", "GB")));
        assert_eq!(
            meta.published_date.as_ref().map(|d| d.as_str()),
            Some("March 20, 2003, Thursday")
        );
    }

    #[test]
    fn test_header_without_pair() {
        let meta = extract_metadata("Search: military casualties", "March 20, 2003");
        assert!(meta.country_codes.is_none());
        assert!(meta.published_date.is_some());
    }

    #[test]
    fn test_first_pair_wins() {
        let codes = extract_country_codes("US-IQ and GB-IQ and FR-DE").unwrap();
        assert_eq!(codes.first(), "US");
        assert_eq!(codes.second(), "IQ");
    }

    #[test]
    fn test_long_letter_runs_are_not_pairs() {
        assert!(extract_country_codes("USA-IRAQ").is_none());
        assert!(extract_country_codes("us-gb").is_none());
    }

    #[test]
    fn test_date_without_weekday() {
        let date = extract_published_date("Published April 9, 2003 by staff").unwrap();
        assert_eq!(date.as_str(), "April 9, 2003");
        assert_eq!(date.weekday(), None);
    }

    #[test]
    fn test_date_with_weekday_no_comma() {
        let date = extract_published_date("April 9, 2003 Wednesday\n").unwrap();
        assert_eq!(date.as_str(), "April 9, 2003 Wednesday");
        assert_eq!(date.weekday(), Some("Wednesday"));
    }

    #[test]
    fn test_first_date_wins() {
        let date = extract_published_date(
            "January 2, 2004, Friday\nUpdated January 3, 2004, Saturday",
        )
        .unwrap();
        assert_eq!(date.as_str(), "January 2, 2004, Friday");
    }

    #[test]
    fn test_no_date() {
        assert!(extract_published_date("Spring 2003").is_none());
        assert!(extract_published_date("").is_none());
    }
}
