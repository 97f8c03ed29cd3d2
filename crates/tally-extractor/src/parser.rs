//! Parsing the LLM's answer into report rows

use regex::Regex;
use std::sync::LazyLock;
use tally_domain::ExtractedFact;

/// One `- Date / - Death Count / - Countries involved` block, ended by a blank line
static FACT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)-\sDate:\s*(.+?)\n",
        r"\s*-\sDeath\sCount:\s*(.+?)\n",
        r"\s*-\sCountries\sinvolved:\s*(.+?)\n\n",
    ))
    .unwrap()
});

/// Extract every fact block from `answer`, in order
///
/// Fields are trimmed but otherwise kept verbatim. A block must end with a
/// blank line to count, so a final block without one is dropped. Text with no
/// blocks yields an empty vector.
///
/// # Examples
///
/// ```
/// use tally_extractor::parse_answer;
///
/// let facts = parse_answer("- Date: 2003-03-20\n- Death Count: 3\n- Countries involved: US, Iraq\n\n");
/// assert_eq!(facts.len(), 1);
/// assert_eq!(facts[0].countries, "US, Iraq");
///
/// assert!(parse_answer("Nothing relevant was reported.").is_empty());
/// ```
pub fn parse_answer(answer: &str) -> Vec<ExtractedFact> {
    FACT_BLOCK_RE
        .captures_iter(answer)
        .map(|caps| ExtractedFact::new(caps[1].trim(), caps[2].trim(), caps[3].trim()))
        .collect()
}
