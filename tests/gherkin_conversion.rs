//! Integration tests for markdown BDD to Gherkin conversion.

use zephyr_scale_mcp::gherkin::{convert, unrecognized_lines, KEYWORDS};

#[test]
fn test_full_scenario() {
    let input = "\
**Given** a user with valid credentials
**When** the user attempts to log in
---
**Then** the user should be authenticated successfully
**And** the dashboard is shown";

    assert_eq!(
        convert(input),
        "    Given a user with valid credentials\n    \
         When the user attempts to log in\n    \
         Then the user should be authenticated successfully\n    \
         And the dashboard is shown"
    );
}

#[test]
fn test_mixed_bold_and_bare_steps() {
    let input = "  Given a cart  \n**When**   paying   \nThen order placed";
    assert_eq!(
        convert(input),
        "    Given a cart\n    When paying\n    Then order placed"
    );
}

#[test]
fn test_crlf_input() {
    assert_eq!(convert("**Given** a\r\n**Then** b\r\n"), "    Given a\n    Then b");
}

#[test]
fn test_other_gherkin_keywords_are_dropped() {
    let input = "Feature: Login\nScenario: happy path\nBut not this\n**Given** a";
    assert_eq!(convert(input), "    Given a");
    assert_eq!(
        unrecognized_lines(input),
        vec!["Feature: Login", "Scenario: happy path", "But not this"]
    );
}

#[test]
fn test_keyword_needs_a_separating_space() {
    assert_eq!(convert("Givena user"), "");
    assert_eq!(convert("given a user"), "");
}

#[test]
fn test_every_output_line_is_an_indented_step() {
    let input = "**Given** one\nnoise\n---\n\n**When** two\nAnd three\n* bullet";
    let output = convert(input);

    assert_eq!(output.lines().count(), 3);
    for line in output.lines() {
        let step = line.strip_prefix("    ").unwrap();
        assert!(
            KEYWORDS.iter().any(|k| step.starts_with(k)),
            "unexpected line: {line}"
        );
    }
}

#[test]
fn test_nothing_recognised_yields_empty() {
    assert_eq!(convert("just prose\nmore prose"), "");
    assert_eq!(convert("---\n\n   "), "");
    assert!(unrecognized_lines("---\n\n   ").is_empty());
}
