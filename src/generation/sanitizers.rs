//! Cleans free text from the document before it lands in generated comments

use once_cell::sync::Lazy;
use regex::Regex;

static UNICODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}\u{00A0}]")
        .expect("valid unicode regex")
});
static TRAILING_WS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+$").expect("valid whitespace regex"));

/// Sanitizes a description into comment lines
///
/// Smart quotes and dashes become ASCII, tabs become spaces, trailing
/// whitespace goes away, `*/` is broken up, and runs of blank lines collapse
/// to a single blank line. Leading and trailing blank lines are dropped.
///
/// # Examples
/// ```
/// use sdkgen::generation::sanitizers::comment_lines;
///
/// let lines = comment_lines("Returns a \u{201C}pet\u{201D}.\n\n\nSee docs.");
/// assert_eq!(lines, vec!["Returns a \"pet\".", "", "See docs."]);
/// ```
pub fn comment_lines(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in input.lines() {
        let line = UNICODE_RE.replace_all(raw, |caps: &regex::Captures| match &caps[0] {
            "\u{2018}" | "\u{2019}" => "'",
            "\u{201C}" | "\u{201D}" => "\"",
            "\u{2013}" | "\u{2014}" => "-",
            _ => " ",
        });
        let line = line.replace('\t', "    ").replace("*/", "* /");
        let line = TRAILING_WS_RE.replace(&line, "").into_owned();

        if line.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines
}

/// Collapses a description into one line, for inline positions
pub fn single_line(input: &str) -> String {
    comment_lines(input)
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_lines() {
        let lines = comment_lines("\n\nFirst line  \n\tindented\n\n\n\nLast \u{2014} line\n\n");
        assert_eq!(lines, vec!["First line", "    indented", "", "Last - line"]);
    }

    #[test]
    fn test_comment_terminator_is_broken() {
        assert_eq!(comment_lines("a */ b"), vec!["a * / b"]);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("Lists pets.\n\n  Paged.  "), "Lists pets. Paged.");
        assert_eq!(single_line(""), "");
    }
}
