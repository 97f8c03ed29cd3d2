//! Prompt assembly for casualty extraction
//!
//! All retrieved chunks are "stuffed" into one prompt. Each is preceded by its
//! metadata so the model can resolve relative dates and country names.

use tally_domain::Chunk;
use tally_store::ScoredChunk;

/// Rendered in place of missing metadata
const ABSENT: &str = "None";

/// Builds the single extraction prompt for one corpus
pub struct PromptBuilder<'a> {
    question: &'a str,
    documents: &'a [ScoredChunk],
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt over `documents` for `question`
    pub fn new(question: &'a str, documents: &'a [ScoredChunk]) -> Self {
        Self {
            question,
            documents,
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let context = self
            .documents
            .iter()
            .map(|doc| render_document(&doc.chunk))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut prompt = String::new();
        prompt.push_str(CONTEXT_PREAMBLE);
        prompt.push_str("\nContext:\n");
        prompt.push_str(&context);
        prompt.push_str("\n\nQuestion: ");
        prompt.push_str(self.question);
        prompt.push_str("\n\n");
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt
    }
}

fn render_document(chunk: &Chunk) -> String {
    let published = chunk
        .published_date
        .as_ref()
        .map(|d| d.to_string())
        .unwrap_or_else(|| ABSENT.to_string());
    let countries = chunk
        .country_codes
        .as_ref()
        .map(|c| c.to_string())
        .unwrap_or_else(|| ABSENT.to_string());

    format!(
        "Article published date and day of the week: {}\nCountries involved: {}\nContent: {}",
        published, countries, chunk.content
    )
}

const CONTEXT_PREAMBLE: &str =
    "Answer ONLY from the context below. Each article carries its own metadata.";

const EXTRACTION_INSTRUCTIONS: &str = r#"From the articles above, extract:
1. Dates on which military forces were killed in combat. The published date and day of the week may be used to work out the date.
2. The number of deaths: a precise figure when one is given, otherwise an approximate range.
3. Two or more countries involved in the conflict. The country codes may be used to identify them.

Write each incident as its own block, followed by a blank line, exactly like this:
- Date: [YYYY-MM-DD or approximate range]
- Death Count: [precise figure or approximate range]
- Countries involved: [comma separated list of countries]

List every incident the context supports. No explanations.
"#;
