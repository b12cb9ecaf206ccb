// Free-text cleanup: faculty identities, rating categories.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Identity;

// Separators are hyphens, colons, en and em dashes.
// "Section <code> <sep> <name>"
static SECTION_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^section\b\s*[-:\x{2013}\x{2014}]?\s*([a-z0-9]+)(?:\s*[-:\x{2013}\x{2014}]\s*|\s+)(.+)$",
    )
    .unwrap()
});

// "<name> <sep> Section <code>", optionally with the section in parentheses
static SECTION_LAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(.+?)(?:\s*[-:\x{2013}\x{2014}]\s*|\s+)\(?section\b\s*[-:\x{2013}\x{2014}]?\s*([a-z0-9]+)\)?$",
    )
    .unwrap()
});

static LEADING_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^section\b\s*[-:\x{2013}\x{2014}]?\s*[a-z0-9]+(?:\s*[-:\x{2013}\x{2014}]\s*|\s+)")
        .unwrap()
});

const RATING_PHRASE: &str = "Please give a rating";
const CONNECTIVES: [&str; 4] = ["for", "on", "to", "of"];

/// Splits the content of a faculty name cell into a section code and a name.
///
/// `Section A - Dr. Smith` and `Dr. Smith - Section A` both give section `A` and
/// name `Dr. Smith`. The section-first form is tried first. Anything else is
/// returned as a name without section.
pub fn extract_identity(text: &str) -> Identity {
    let text = text.trim();
    if let Some(caps) = SECTION_FIRST.captures(text) {
        return Identity {
            section: Some(caps[1].to_string()),
            name: caps[2].trim().to_string(),
        };
    }
    if let Some(caps) = SECTION_LAST.captures(text) {
        return Identity {
            section: Some(caps[2].to_string()),
            name: caps[1].trim().to_string(),
        };
    }
    Identity {
        section: None,
        name: text.to_string(),
    }
}

/// Removes any leftover `Section <code>` prefixes and collapses the whitespace.
/// The case is preserved.
pub fn normalize_faculty_name(name: &str) -> String {
    let mut s = name.trim();
    while let Some(m) = LEADING_SECTION.find(s) {
        let rest = s[m.end()..].trim_start();
        if rest.is_empty() {
            break;
        }
        s = rest;
    }
    collapse_whitespace(s)
}

/// The rating category of a rating question column, as used for aggregation.
///
/// The label inside `[...]` is used when the question has one. Otherwise this is
/// the text after the rating phrase. In both cases, anything from the first `(` on
/// is dropped and the result is lower-cased.
pub fn rating_category(label: &str) -> String {
    let raw = bracket_label(label)
        .or_else(|| text_after_rating_phrase(label))
        .unwrap_or(label);
    let res = truncate_and_fold(raw);
    if res.is_empty() {
        truncate_and_fold(label)
    } else {
        res
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn truncate_and_fold(s: &str) -> String {
    let head = s.split('(').next().unwrap_or("");
    collapse_whitespace(head).to_lowercase()
}

fn bracket_label(label: &str) -> Option<&str> {
    let end = label.rfind(']')?;
    let start = label[..end].rfind('[')?;
    let inner = label[start + 1..end].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

fn text_after_rating_phrase(label: &str) -> Option<&str> {
    let pos = label.find(RATING_PHRASE)?;
    let mut rest = label[pos + RATING_PHRASE.len()..]
        .trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
    for word in CONNECTIVES.iter() {
        let n = word.len();
        if rest.len() > n
            && rest.is_char_boundary(n)
            && rest[..n].eq_ignore_ascii_case(word)
            && rest[n..].starts_with(char::is_whitespace)
        {
            rest = rest[n..].trim_start();
            break;
        }
    }
    if let Some(inner) = rest.strip_prefix('(') {
        rest = inner.split(')').next().unwrap_or("");
    }
    let rest = rest.trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(section: Option<&str>, name: &str) -> Identity {
        Identity {
            section: section.map(|s| s.to_string()),
            name: name.to_string(),
        }
    }

    #[test]
    fn both_orderings_recover_identity() {
        let expected = ident(Some("A"), "Dr. Smith");
        assert_eq!(extract_identity("Section A - Dr. Smith"), expected);
        assert_eq!(extract_identity("Dr. Smith - Section A"), expected);
    }

    #[test]
    fn separators_and_case() {
        assert_eq!(extract_identity("SECTION 3: Prof. Rao"), ident(Some("3"), "Prof. Rao"));
        assert_eq!(extract_identity("Section-B-Dr X"), ident(Some("B"), "Dr X"));
        assert_eq!(extract_identity("section c Ms. Iyer"), ident(Some("c"), "Ms. Iyer"));
        assert_eq!(extract_identity("Dr. Y (Section D2)"), ident(Some("D2"), "Dr. Y"));
        assert_eq!(extract_identity("  Dr. Y section:E "), ident(Some("E"), "Dr. Y"));
    }

    #[test]
    fn dash_separators() {
        let expected = ident(Some("A"), "Dr. Smith");
        assert_eq!(extract_identity("Dr. Smith \u{2013} Section A"), expected);
        assert_eq!(extract_identity("Section A \u{2013} Dr. Smith"), expected);
        assert_eq!(extract_identity("Section A\u{2014}Dr. Smith"), expected);
        assert_eq!(
            normalize_faculty_name("Section B \u{2013} Dr. Smith"),
            "Dr. Smith"
        );
    }

    #[test]
    fn section_must_be_a_word() {
        assert_eq!(
            extract_identity("Sectional Dean Rao"),
            ident(None, "Sectional Dean Rao")
        );
        assert_eq!(
            extract_identity("Dr. Rao - Intersection 5"),
            ident(None, "Dr. Rao - Intersection 5")
        );
        assert_eq!(normalize_faculty_name("Sectional Dean Rao"), "Sectional Dean Rao");
    }

    #[test]
    fn no_section() {
        assert_eq!(extract_identity("  Dr. Smith "), ident(None, "Dr. Smith"));
        assert_eq!(extract_identity("Section A"), ident(None, "Section A"));
    }

    #[test]
    fn section_first_wins() {
        // Both forms would match, the leading one is used.
        assert_eq!(
            extract_identity("Section A - Dr. Smith - Section B"),
            ident(Some("A"), "Dr. Smith - Section B")
        );
    }

    #[test]
    fn faculty_name_normalization() {
        assert_eq!(normalize_faculty_name("  Dr.   X  "), "Dr. X");
        assert_eq!(normalize_faculty_name("Section A - Dr. X"), "Dr. X");
        assert_eq!(normalize_faculty_name("Section A - Section A - Dr. X"), "Dr. X");
        assert_eq!(normalize_faculty_name("Section A"), "Section A");
    }

    #[test]
    fn categories() {
        assert_eq!(rating_category("Please give a rating (Clarity)"), "clarity");
        assert_eq!(
            rating_category("Please give a rating [Subject  Knowledge (depth)]"),
            "subject knowledge"
        );
        assert_eq!(
            rating_category("Please give a rating for Punctuality (1 - 5)"),
            "punctuality"
        );
        assert_eq!(rating_category("Please give a rating: Pace"), "pace");
        assert_eq!(rating_category("Please give a rating"), "please give a rating");
        assert_eq!(rating_category("Please give a rating ()"), "please give a rating");
    }
}
