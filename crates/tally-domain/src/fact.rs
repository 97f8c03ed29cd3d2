//! Extracted facts - one row of the casualty report

/// Column headers of the casualty report, in order
pub const REPORT_HEADER: [&str; 3] = ["Date", "Death Count", "Countries involved"];

/// One (date, death count, countries) triple asserted by the LLM
///
/// All three fields are free text and are not validated further: "approximately
/// 10-15" is as legitimate a death count as "3".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFact {
    /// Date of the incident as stated by the model
    pub date: String,

    /// Death count, precise figure or range
    pub death_count: String,

    /// Countries involved, comma separated
    pub countries: String,
}

impl ExtractedFact {
    /// Create a new fact
    pub fn new(
        date: impl Into<String>,
        death_count: impl Into<String>,
        countries: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            death_count: death_count.into(),
            countries: countries.into(),
        }
    }

    /// Fields in report column order
    pub fn as_record(&self) -> [&str; 3] {
        [&self.date, &self.death_count, &self.countries]
    }
}
