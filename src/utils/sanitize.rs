//! Text normalization for untrusted feed content and CSV output.
//!
//! Feed publishers routinely ship HTML fragments and double-encoded entities
//! (`&amp;#x27;`) in titles and descriptions. [`sanitize_text`] reduces such
//! input to plain text; [`sanitize_csv_field`] neutralizes values before they
//! are written to a spreadsheet-bound file.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static DECIMAL_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#([0-9]+);").unwrap());
static HEX_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#[xX]([0-9a-fA-F]+);").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Leading characters a spreadsheet treats as the start of a formula.
const FORMULA_LEADERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Named references decoded after the ampersand pass.
const NAMED_REFS: [(&str, &str); 5] = [
    ("&apos;", "'"),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
];

/// Decodes HTML character references and strips markup, returning plain text.
///
/// # Decoding
///
/// `&amp;` is resolved first so that double-encoded sequences such as
/// `&amp;#x27;` unwrap to `'`. Then `&apos;`, `&quot;`, `&lt;`, `&gt;`,
/// `&nbsp;` and decimal/hex numeric references are decoded. Leading zeros are
/// allowed in numeric references; those that overflow or do not name a valid
/// scalar value become `U+FFFD`.
///
/// # Stripping
///
/// Every `<...>` tag is removed from the decoded text, and any stray `<` or `>`
/// left behind (for example from a decoded `&lt;` with no closing bracket) is
/// dropped as well, so the result never contains angle brackets.
///
/// Decoding and stripping repeat until the text stops changing, which makes
/// the function idempotent. Every replacement is shorter than what it
/// replaces, so each round that changes the text also shrinks it and the loop
/// always ends.
///
/// # Examples
///
/// ```
/// use podcast_site::utils::sanitize::sanitize_text;
///
/// assert_eq!(sanitize_text("Tony&amp;#x27;s"), "Tony's");
/// assert_eq!(sanitize_text("<p>Hello <b>world</b></p>"), "Hello world");
/// ```
pub fn sanitize_text(input: &str) -> String {
    let mut current = input.to_string();

    loop {
        let next = strip_markup(&decode_entities(&current));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One decoding pass: ampersand first, then named and numeric references.
fn decode_entities(input: &str) -> String {
    let mut decoded = input.replace("&amp;", "&");

    for (entity, replacement) in NAMED_REFS {
        decoded = decoded.replace(entity, replacement);
    }

    let decoded = DECIMAL_REF.replace_all(&decoded, |caps: &Captures| {
        codepoint_to_string(parse_codepoint(&caps[1], 10))
    });
    let decoded = HEX_REF.replace_all(&decoded, |caps: &Captures| {
        codepoint_to_string(parse_codepoint(&caps[1], 16))
    });

    decoded.into_owned()
}

/// Parses the digits of a numeric reference. `None` on overflow.
fn parse_codepoint(digits: &str, radix: u32) -> Option<u32> {
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some(0);
    }
    u32::from_str_radix(significant, radix).ok()
}

fn codepoint_to_string(codepoint: Option<u32>) -> String {
    codepoint
        .filter(|&c| c != 0)
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}

fn strip_markup(input: &str) -> String {
    let without_tags: Cow<'_, str> = TAG.replace_all(input, "");
    without_tags.chars().filter(|c| *c != '<' && *c != '>').collect()
}

/// Prepares a value for inclusion as a single CSV field.
///
/// 1. Surrounding whitespace is trimmed.
/// 2. A value starting with `=`, `+`, `-`, `@`, tab or carriage return is
///    prefixed with `'` so spreadsheet software reads it as literal text.
/// 3. A value containing `,` or `"` is wrapped in quotes with inner quotes
///    doubled.
///
/// # Examples
///
/// ```
/// use podcast_site::utils::sanitize::sanitize_csv_field;
///
/// assert_eq!(sanitize_csv_field("=SUM(A1)"), "'=SUM(A1)");
/// assert_eq!(sanitize_csv_field("a,\"b\""), "\"a,\"\"b\"\"\"");
/// ```
pub fn sanitize_csv_field(value: &str) -> String {
    let trimmed = value.trim();

    let mut field = if trimmed.starts_with(FORMULA_LEADERS) {
        format!("'{trimmed}")
    } else {
        trimmed.to_string()
    };

    if field.contains('"') || field.contains(',') {
        field = format!("\"{}\"", field.replace('"', "\"\""));
    }

    field
}
