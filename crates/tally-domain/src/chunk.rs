//! Chunk module - the atomic retrieval unit

use std::fmt;

/// Weekday names accepted after a publication date
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// An ordered pair of two-letter country identifiers (e.g. `US-GB`)
///
/// Order is significant: it is the order in which the codes appeared in the
/// section header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCodes {
    first: String,
    second: String,
}

impl CountryCodes {
    /// Create a new country-code pair
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// First code of the pair
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Second code of the pair
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Parse the `XX-YY` form produced by `Display`
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_domain::CountryCodes;
    ///
    /// let codes = CountryCodes::parse("US-GB").unwrap();
    /// assert_eq!(codes.first(), "US");
    /// assert_eq!(codes.second(), "GB");
    /// assert!(CountryCodes::parse("USGB").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let (first, second) = s.split_once('-')?;
        if first.is_empty() || second.is_empty() {
            return None;
        }
        Some(Self::new(first, second))
    }
}

impl fmt::Display for CountryCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

/// Publication date exactly as it appeared in the article header
///
/// The string is kept verbatim ("March 20, 2003, Thursday"); consumers that
/// need a calendar type must parse it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublishedDate(String);

impl PublishedDate {
    /// Wrap a matched date string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The literal matched text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing weekday name, if the match carried one
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_domain::PublishedDate;
    ///
    /// assert_eq!(PublishedDate::new("March 20, 2003, Thursday").weekday(), Some("Thursday"));
    /// assert_eq!(PublishedDate::new("March 20, 2003").weekday(), None);
    /// ```
    pub fn weekday(&self) -> Option<&str> {
        let last = self
            .0
            .rsplit(|c: char| c == ',' || c.is_whitespace())
            .find(|part| !part.is_empty())?;
        WEEKDAYS.iter().copied().find(|day| *day == last)
    }
}

impl fmt::Display for PublishedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded span of archive text prepared for embedding and retrieval
///
/// Chunks produced from the same article always carry the same metadata;
/// metadata is attached at article granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The text span
    pub content: String,

    /// Country pair from the section header, if one was found
    pub country_codes: Option<CountryCodes>,

    /// Publication date from the article header, if one was found
    pub published_date: Option<PublishedDate>,
}

impl Chunk {
    /// Create a chunk without metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            country_codes: None,
            published_date: None,
        }
    }

    /// Attach a country-code pair
    pub fn with_country_codes(mut self, codes: Option<CountryCodes>) -> Self {
        self.country_codes = codes;
        self
    }

    /// Attach a publication date
    pub fn with_published_date(mut self, date: Option<PublishedDate>) -> Self {
        self.published_date = date;
        self
    }

    /// Whether any metadata is attached
    pub fn has_metadata(&self) -> bool {
        self.country_codes.is_some() || self.published_date.is_some()
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
