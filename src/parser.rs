//! Pure text helpers for turning free-form oracle output into structured data.
//!
//! Nothing in here talks to the oracle; every function is a plain
//! `&str -> value` transformation so it can be tested in isolation.

const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ':', ';'];

/// Splits a comma-separated oracle reply into names.
///
/// Tokens are trimmed of whitespace and surrounding punctuation. Empty
/// tokens and the literal `none` (any case) are dropped. Order is kept and
/// duplicates are not removed.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().trim_matches(TRAILING_PUNCTUATION).trim())
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("none"))
        .map(str::to_string)
        .collect()
}

/// Cleans up multi-line narrative text.
///
/// Carriage returns are removed, leading and trailing blank lines are
/// dropped, and runs of blank lines collapse into a single empty line.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace('\r', "");
    let lines: Vec<&str> = text.split('\n').collect();

    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return String::new(),
    };

    let mut out: Vec<&str> = Vec::with_capacity(end - start + 1);
    let mut previous_blank = false;
    for line in &lines[start..=end] {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(if blank { "" } else { *line });
        previous_blank = blank;
    }
    out.join("\n")
}

/// Upper-cases the first letter of each word and lower-cases the rest.
/// Whitespace runs collapse to single spaces.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Labeled fields found in a persona reply
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersonaFields {
    pub bio: Option<String>,
    pub backstory: Option<String>,
}

/// Scans a reply for `BIO:` and `BACKSTORY:` lines (labels match in any case).
/// A later line with the same label overrides an earlier one; empty values
/// count as missing.
pub fn parse_persona(reply: &str) -> PersonaFields {
    let mut fields = PersonaFields::default();
    for line in reply.lines() {
        let line = line.trim();
        if let Some(value) = strip_label(line, "BIO:") {
            fields.bio = non_empty(value);
        } else if let Some(value) = strip_label(line, "BACKSTORY:") {
            fields.backstory = non_empty(value);
        }
    }
    fields
}

/// Strips `label` from the front of `line`, ignoring ASCII case
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label)
        .then(|| line[label.len()..].trim())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
