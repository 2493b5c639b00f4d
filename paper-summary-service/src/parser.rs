//! Heuristic recovery of academic paper structure from extracted text.
//!
//! Each field is resolved by an ordered list of permissive patterns where the
//! first match wins. Nothing here can fail: a field whose patterns all miss
//! falls back to a placeholder (title, author) or to an empty string.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{PLACEHOLDER_AUTHOR, PLACEHOLDER_TITLE, PaperStructure};

/// Lines scanned from the top of the document when looking for a title.
const TITLE_SCAN_LINES: usize = 10;
/// A title line must be strictly longer than this many characters.
const TITLE_MIN_CHARS: usize = 10;
/// Characters from the top of the document searched for an author.
const AUTHOR_SCAN_CHARS: usize = 1000;

const MAX_KEY_SECTIONS: usize = 5;
const KEY_SECTION_BODY_CHARS: usize = 500;
const KEY_SECTION_MIN_BODY: usize = 50;

/// Parse extracted text into a [`PaperStructure`].
///
/// `full_text` is always the input, unchanged.
pub fn parse(text: &str) -> PaperStructure {
    let mut paper = PaperStructure::placeholder(text);

    if let Some(title) = find_title(text) {
        paper.title = title;
    }
    if let Some(author) = find_author(text) {
        paper.author = author;
    }
    paper.abstract_text = find_abstract(text).unwrap_or_default();
    paper.introduction = find_introduction(text).unwrap_or_default();
    paper.conclusion = find_conclusion(text).unwrap_or_default();

    paper
}

/// Collapse every run of whitespace, newlines included, into one space.
pub fn normalize_whitespace(text: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS_RE.replace_all(text, " ").trim().to_string()
}

/// First of the leading lines that is long enough and not shouting.
fn find_title(text: &str) -> Option<String> {
    text.lines()
        .take(TITLE_SCAN_LINES)
        .map(str::trim)
        .find(|line| line.chars().count() > TITLE_MIN_CHARS && !is_all_upper(line))
        .map(str::to_string)
}

/// True when the line has cased characters and none of them is lower-case.
fn is_all_upper(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

fn find_author(text: &str) -> Option<String> {
    static AUTHOR_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
        [
            // "by Jane Doe"; only the keyword ignores case
            Regex::new(r"(?i:\bby)[ \t]+([A-Z][a-z]+[ \t]+[A-Z][a-z]+)").unwrap(),
            // a line holding nothing but a two-word capitalized name
            Regex::new(r"(?m)^[ \t]*([A-Z][a-z]+[ \t]+[A-Z][a-z]+)[ \t]*$").unwrap(),
            // "Authors: ..."
            Regex::new(r"(?i)\bauthors?:[ \t]*([^\n]+)").unwrap(),
        ]
    });

    let head = char_prefix(text, AUTHOR_SCAN_CHARS);
    AUTHOR_PATTERNS.iter().find_map(|re| {
        re.captures(head)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|author| !author.is_empty())
    })
}

fn find_abstract(text: &str) -> Option<String> {
    static ABSTRACT_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?is)\b(?:abstract|summary)[\s:]*(.+?)(?:\n[ \t]*\n|\n[ \t]*(?:1\.|introduction|keywords))",
        )
        .unwrap()
    });
    capture_section(&ABSTRACT_RE, text)
}

fn find_introduction(text: &str) -> Option<String> {
    static INTRODUCTION_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?is)(?:\b1\.\s*introduction|\bintroduction)[\s:]*(.+?)(?:\n[ \t]*\n|\n[ \t]*(?:2\.|method|literature))",
        )
        .unwrap()
    });
    capture_section(&INTRODUCTION_RE, text)
}

fn find_conclusion(text: &str) -> Option<String> {
    static CONCLUSION_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?is)\b(?:conclusions?|discussion)[\s:]*(.+?)(?:\n[ \t]*\n|references|\z)")
            .unwrap()
    });
    capture_section(&CONCLUSION_RE, text)
}

fn capture_section(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|section| !section.is_empty())
}

/// Up to five numbered sections as `"<heading>: <start of body>"`.
///
/// A section is a line such as `3. Results` followed by body text running to
/// the next numbered line. Sections with a short body are skipped.
pub fn key_sections(text: &str) -> Vec<String> {
    static HEADING_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d+\.?[ \t]*[A-Z][^.\n]*?)\.?[ \t]*$").unwrap());

    let headings: Vec<_> = HEADING_RE.captures_iter(text).collect();
    headings
        .iter()
        .enumerate()
        .take(MAX_KEY_SECTIONS)
        .filter_map(|(index, caps)| {
            let heading = caps.get(1)?.as_str().trim();
            let body_start = caps.get(0)?.end();
            let body_end = headings
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            let body = text[body_start..body_end].trim();
            if body.chars().count() <= KEY_SECTION_MIN_BODY {
                return None;
            }
            Some(format!("{heading}: {}", char_prefix(body, KEY_SECTION_BODY_CHARS)))
        })
        .collect()
}

/// The first `limit` characters of `text`, never splitting a code point.
fn char_prefix(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = "Deep Learning for Climate Modeling
by John Smith
Abstract: We train neural networks on decades of reanalysis data and show
that they reproduce regional precipitation patterns.

Introduction
Climate models are expensive to run at high resolution. We ask whether
learned emulators can close the gap.
2. Methods
We use a convolutional architecture.

Conclusion
Learned emulators are a promising complement to physical models.
References
[1] A. Author. Some paper. 2020.";

    #[test]
    fn test_parses_well_formed_paper() {
        let paper = parse(PAPER);

        assert_eq!(paper.title, "Deep Learning for Climate Modeling");
        assert_eq!(paper.author, "John Smith");
        assert!(paper.abstract_text.starts_with("We train neural networks"));
        assert!(paper.abstract_text.ends_with("precipitation patterns."));
        assert!(!paper.abstract_text.contains("Introduction"));
        assert!(paper.introduction.starts_with("Climate models are expensive"));
        assert!(!paper.introduction.contains("Methods"));
        assert_eq!(
            paper.conclusion,
            "Learned emulators are a promising complement to physical models."
        );
        assert_eq!(paper.full_text, PAPER);
    }

    #[test]
    fn test_abstract_stops_at_introduction_heading() {
        let text = "A Study of Something Important\nAbstract: short findings\nIntroduction more text";
        let paper = parse(text);
        assert_eq!(paper.abstract_text, "short findings");
    }

    #[test]
    fn test_abstract_stops_at_numbered_heading_and_keywords() {
        let numbered = parse("Abstract\nfirst part\n1. Introduction\nbody");
        assert_eq!(numbered.abstract_text, "first part");

        let keywords = parse("Summary: the gist\nKeywords: a, b");
        assert_eq!(keywords.abstract_text, "the gist");
    }

    #[test]
    fn test_empty_input_is_total() {
        let paper = parse("");
        assert_eq!(paper.title, PLACEHOLDER_TITLE);
        assert_eq!(paper.author, PLACEHOLDER_AUTHOR);
        assert!(paper.abstract_text.is_empty());
        assert!(paper.introduction.is_empty());
        assert!(paper.conclusion.is_empty());
        assert_eq!(paper.full_text, "");
    }

    #[test]
    fn test_prose_keeps_full_text_unchanged() {
        let prose = "  it was a quiet   morning.\n\nnothing happened  ";
        let paper = parse(prose);
        assert_eq!(paper.full_text, prose);
        assert_eq!(paper.author, PLACEHOLDER_AUTHOR);
    }

    #[test]
    fn test_title_must_exceed_ten_characters() {
        let paper = parse("Ten chars!\nshort\nThis line is the title");
        assert_eq!(paper.title, "This line is the title");

        let exactly_ten = parse("0123456789");
        assert_eq!(exactly_ten.title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_title_skips_upper_case_lines() {
        let paper = parse("JOURNAL OF APPLIED THINGS\nA Much Better Title Line");
        assert_eq!(paper.title, "A Much Better Title Line");
    }

    #[test]
    fn test_title_only_scans_first_ten_lines() {
        let text = format!("{}A very late title line", "x\n".repeat(10));
        assert_eq!(parse(&text).title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_author_from_authors_label() {
        let text = "QUANTUM WIDGETS, VOL. 3\nAuthors: Ada Lovelace, Charles Babbage.\n";
        assert_eq!(parse(text).author, "Ada Lovelace, Charles Babbage.");
    }

    #[test]
    fn test_author_from_name_line() {
        let text = "Some Title Words Here!\nJane Doe\nAbstract: text";
        assert_eq!(parse(text).author, "Jane Doe");
    }

    #[test]
    fn test_author_name_line_after_plain_title() {
        let text = "Deep Learning for Climate Modeling\nJane Doe\nAbstract: text here.\n\n";
        assert_eq!(parse(text).author, "Jane Doe");
    }

    #[test]
    fn test_author_names_must_be_capitalized() {
        let text = "A Fine Paper Title Here\nwritten by the team at the lab\n";
        assert_eq!(parse(text).author, PLACEHOLDER_AUTHOR);
    }

    #[test]
    fn test_author_search_limited_to_document_head() {
        let text = format!("{}\nby Late Author", "-".repeat(1200));
        assert_eq!(parse(&text).author, PLACEHOLDER_AUTHOR);
    }

    #[test]
    fn test_conclusion_runs_to_end_of_text() {
        let paper = parse("Discussion: the results hold up well");
        assert_eq!(paper.conclusion, "the results hold up well");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn test_key_sections() {
        let body = "x".repeat(60);
        let text = format!("1. Introduction\n{body}\n2. Methods\ntoo short\n3. Results\n{body}");
        let sections = key_sections(&text);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], format!("1. Introduction: {body}"));
        assert!(sections[1].starts_with("3. Results: "));
    }

    #[test]
    fn test_key_section_body_is_capped() {
        let body = "y".repeat(800);
        let sections = key_sections(&format!("4. Discussion\n{body}"));
        assert_eq!(sections[0].len(), "4. Discussion: ".len() + 500);
    }
}
