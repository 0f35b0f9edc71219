//! Markdown BDD to Gherkin conversion.
//!
//! Zephyr Scale stores a BDD test script as a single text blob of indented
//! Gherkin steps. Authors (and AI assistants) tend to write the steps as
//! markdown with bolded keywords:
//!
//! ```text
//! **Given** a user with valid credentials
//! **When** the user attempts to log in
//! ---
//! **Then** the user should be authenticated successfully
//! ```
//!
//! [`convert`] turns that into:
//!
//! ```text
//!     Given a user with valid credentials
//!     When the user attempts to log in
//!     Then the user should be authenticated successfully
//! ```
//!
//! Only the four step keywords `Given`, `When`, `Then` and `And` are
//! recognised. Lines that match neither the bold nor the bare form are
//! dropped without error; [`unrecognized_lines`] reports them for callers
//! that want a diagnostic.

/// Step keywords accepted by the converter.
pub const KEYWORDS: [&str; 4] = ["Given", "When", "Then", "And"];

/// Indentation applied to every emitted step.
const INDENT: &str = "    ";

/// Prefix marking a separator line (markdown horizontal rule).
const SEPARATOR: &str = "---";

/// Classification of a single trimmed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    /// Blank line or `---` separator.
    Skip,
    /// A Gherkin step, ready to emit.
    Step(String),
    /// Anything else.
    Unrecognized(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with(SEPARATOR) {
        return Line::Skip;
    }

    for keyword in KEYWORDS {
        let marker = format!("**{keyword}**");
        if let Some(rest) = line.strip_prefix(marker.as_str()) {
            let rest = rest.trim();
            if rest.is_empty() {
                return Line::Step(keyword.to_string());
            }
            return Line::Step(format!("{keyword} {rest}"));
        }
    }

    let is_bare_step = KEYWORDS.iter().any(|keyword| {
        line.strip_prefix(keyword)
            .is_some_and(|rest| rest.starts_with(' '))
    });
    if is_bare_step {
        return Line::Step(line.to_string());
    }

    Line::Unrecognized(line)
}

/// Converts markdown-style BDD text into indented Gherkin steps.
///
/// Returns an empty string when no step survives classification.
#[must_use]
pub fn convert(bdd_text: &str) -> String {
    let steps: Vec<String> = bdd_text
        .split('\n')
        .filter_map(|raw| match classify(raw) {
            Line::Step(step) => Some(step),
            Line::Skip | Line::Unrecognized(_) => None,
        })
        .collect();

    if steps.is_empty() {
        return String::new();
    }

    format!("{INDENT}{}", steps.join(&format!("\n{INDENT}")))
}

/// Returns the trimmed lines that [`convert`] drops as unrecognised.
///
/// Blank lines and separators are not reported.
#[must_use]
pub fn unrecognized_lines(bdd_text: &str) -> Vec<String> {
    bdd_text
        .split('\n')
        .filter_map(|raw| match classify(raw) {
            Line::Unrecognized(line) => Some(line.to_string()),
            Line::Skip | Line::Step(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_bold_keywords() {
        let input = "**Given** a user\n**When** they log in\n**Then** success";
        assert_eq!(
            convert(input),
            "    Given a user\n    When they log in\n    Then success"
        );
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(convert(""), "");
    }

    #[test]
    fn unrecognized_only_yields_empty_string() {
        assert_eq!(convert("not a bdd line"), "");
    }

    #[test]
    fn separators_and_blanks_only_yield_empty_string() {
        assert_eq!(convert("\n   \n---\n------ section ---\n\t\n"), "");
    }

    #[test]
    fn bold_marker_without_remainder_has_no_trailing_space() {
        assert_eq!(convert("**Given**"), "    Given");
        assert_eq!(convert("**And**   "), "    And");
    }

    #[test]
    fn bold_marker_without_space_before_text() {
        assert_eq!(convert("**When**the button is pressed"), "    When the button is pressed");
    }

    #[test]
    fn mixed_bold_and_bare_lines_keep_order() {
        let input = "\
**Given** I am a new user
And I navigate to the application

---
When I attempt to access the main features
**Then** I should see the Privacy Policy modal
**And** the modal should have an 'Accept' button";

        assert_eq!(
            convert(input),
            "    Given I am a new user\n    \
             And I navigate to the application\n    \
             When I attempt to access the main features\n    \
             Then I should see the Privacy Policy modal\n    \
             And the modal should have an 'Accept' button"
        );
    }

    #[test]
    fn keyword_must_be_anchored_at_line_start() {
        assert_eq!(convert("xGiven foo"), "");
        assert_eq!(convert("a **Given** b"), "");
    }

    #[test]
    fn bare_keyword_requires_trailing_space() {
        assert_eq!(convert("Givenfoo"), "");
        assert_eq!(convert("Then"), "");
        assert_eq!(convert("Andromeda is a galaxy"), "");
    }

    #[test]
    fn lowercase_keywords_are_not_steps() {
        assert_eq!(convert("given a user"), "");
    }

    #[test]
    fn surrounding_whitespace_and_crlf_are_trimmed() {
        let input = "  **Given** a user  \r\n\t**Then** success\r\n";
        assert_eq!(convert(input), "    Given a user\n    Then success");
    }

    #[test]
    fn indented_gherkin_passes_through() {
        let input = "    Given a user\n    When they log in";
        assert_eq!(convert(input), input);
    }

    #[test]
    fn conversion_is_idempotent() {
        let input = "**Given** a user\nnoise\n**When** they log in\n---\nAnd more\n**Then** success";
        let once = convert(input);
        let twice = convert(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn every_output_line_is_indented_keyword_step() {
        let input = "**Given** a\nWhen b\n**Then** c\n**And** d\nrubbish\n";
        for line in convert(input).split('\n') {
            let step = line.strip_prefix(INDENT).expect("four-space indent");
            assert!(!step.starts_with(' '));
            assert!(KEYWORDS.iter().any(|k| step.starts_with(k)));
        }
    }

    #[test]
    fn reports_unrecognized_lines() {
        let input = "**Given** a user\nplease ignore me\n\n---\nxGiven foo\nThen done";
        assert_eq!(
            unrecognized_lines(input),
            vec!["please ignore me".to_string(), "xGiven foo".to_string()]
        );
    }

    #[test]
    fn no_unrecognized_lines_for_clean_input() {
        assert!(unrecognized_lines("**Given** a\n\n---\nWhen b").is_empty());
    }
}
