/// Parsing of raw AI responses into candidate replacement texts.
///
/// Responses arrive as free-form text: sometimes the bare replacement,
/// sometimes wrapped in chatty prose or a code fence, sometimes an explicit
/// list of alternatives. `clean` strips the wrapping and `parse_multiple`
/// splits out the alternatives.
use std::sync::LazyLock;

use regex::Regex;

/// One candidate replacement for the original span.
pub type Suggestion = String;

/// First fenced code block; group 1 is its body.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[\w+-]*[ \t]*\r?\n(.*?)\r?\n?[ \t]*```").expect("valid fence regex")
});

/// Acknowledgement words that open a response ("Sure", "Certainly", ...).
static ACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:sure|certainly|of course|absolutely|okay|ok|great|no problem)\b")
        .expect("valid ack regex")
});

/// A line that is nothing but an acknowledgement: "Sure!", "Of course.".
static ACK_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:sure|certainly|of course|absolutely|okay|ok|great|no problem)(?:,?\s+thing)?[\s!.,]*$",
    )
    .expect("valid ack-only regex")
});

/// Openers that introduce the answer: "Here is ...", "Revised version".
static INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:here(?:'s|\s+is|\s+are)|below\s+(?:is|are)|(?:the\s+)?(?:rewritten|revised|improved|edited|updated|corrected|polished)\b)",
    )
    .expect("valid intro regex")
});

/// Sign-offs that talk about the reply itself; stripped wherever they sit.
static REPLY_SIGNOFF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:let me know\b|(?:i\s+)?hope (?:this|that|it) helps\b|would you like me to\b|feel free to (?:ask|reach out|let me know)\b|if you(?:'d)? (?:like|want|need) me to\b)",
    )
    .expect("valid reply sign-off regex")
});

/// Closing pleasantries ("I hope ...", "Feel free ..."); only stripped when
/// a blank line sets them apart from the body.
static SIGNOFF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:let me know|i hope|hope this|feel free|would you like|if you(?:'d)? (?:like|want|need))\b",
    )
    .expect("valid sign-off regex")
});

/// An enumerated alternative: `1.`, `2)`, `Option 3:`, `**Version 1:**`.
/// Group 1 is the number, group 2 the text on the same line.
static ENUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\*\*)?(?:(?:option|version|alternative|suggestion|variant|rewrite)\s+)?(\d{1,2})\s*[.):](?:\*\*)?(?:\s+|$)(.*)$",
    )
    .expect("valid enumeration regex")
});

/// A horizontal-rule delimiter between variants.
static DELIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").expect("valid delimiter regex")
});

/// Longest line still treated as a lead-in ending in `:`.
const MAX_LEAD_IN_WORDS: usize = 15;

/// Strips conversational scaffolding from a raw response.
///
/// Never turns non-blank input into blank output: if stripping would
/// leave nothing, the trimmed input is returned instead.
pub fn clean(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let body = match FENCE_RE.captures(trimmed) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => trimmed,
    };

    let mut lines: Vec<&str> = body.lines().collect();
    trim_blank_edges(&mut lines);

    while lines.len() > 1 && is_lead_in(lines[0]) {
        lines.remove(0);
        trim_blank_edges(&mut lines);
    }
    while lines.len() > 1 && is_sign_off(&lines) {
        lines.pop();
        trim_blank_edges(&mut lines);
    }

    let cleaned = strip_quotes(lines.join("\n").trim()).trim().to_string();
    if cleaned.is_empty() {
        trimmed.to_string()
    } else {
        cleaned
    }
}

/// Splits a cleaned response into its alternatives.
///
/// Returns an empty list for blank input, the enumerated or delimited
/// variants when at least two are present, and otherwise the whole text
/// as a single suggestion.
pub fn parse_multiple(cleaned: &str) -> Vec<Suggestion> {
    let text = cleaned.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if let Some(items) = split_enumerated(text) {
        return items;
    }
    if let Some(items) = split_delimited(text) {
        return items;
    }
    vec![text.to_string()]
}

/// `parse_multiple(clean(raw))`.
pub fn parse_response(raw: &str) -> Vec<Suggestion> {
    parse_multiple(&clean(raw))
}

fn trim_blank_edges(lines: &mut Vec<&str>) {
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

/// Whether a leading line is chatter rather than content.
///
/// Only a bare acknowledgement, or a short line ending in `:` that opens
/// with an acknowledgement or an introduction, counts. Headings such as
/// "Ingredients:" are content.
fn is_lead_in(line: &str) -> bool {
    let line = line.trim();
    if ENUM_RE.is_match(line) {
        return false;
    }
    if ACK_ONLY_RE.is_match(line) {
        return true;
    }
    line.ends_with(':')
        && line.split_whitespace().count() <= MAX_LEAD_IN_WORDS
        && (ACK_RE.is_match(line) || INTRO_RE.is_match(line))
}

/// Whether the last of `lines` is a sign-off. `lines` has at least two
/// entries and no blank edges.
fn is_sign_off(lines: &[&str]) -> bool {
    let last = lines[lines.len() - 1].trim();
    if REPLY_SIGNOFF_RE.is_match(last) {
        return true;
    }
    let set_apart = lines.len() > 2 && lines[lines.len() - 2].trim().is_empty();
    set_apart && SIGNOFF_RE.is_match(last)
}

/// Removes one pair of matching wrapping quotes.
fn strip_quotes(text: &str) -> &str {
    const PAIRS: [(char, char); 4] = [('"', '"'), ('\u{201C}', '\u{201D}'), ('\'', '\''), ('`', '`')];
    for (open, close) in PAIRS {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            if !inner.contains(open) && !inner.contains(close) {
                return inner;
            }
        }
    }
    text
}

/// Splits `1. ... 2. ...` style lists. Numbering must start at 1, count up
/// by one, and nothing but blank lines may precede the first item.
fn split_enumerated(text: &str) -> Option<Vec<Suggestion>> {
    let mut items: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = ENUM_RE.captures(line) {
            let number: usize = caps.get(1)?.as_str().parse().ok()?;
            if number != items.len() + 1 {
                return None;
            }
            items.push(caps.get(2).map_or("", |m| m.as_str()).trim().to_string());
        } else if let Some(current) = items.last_mut() {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line.trim());
        } else if !line.trim().is_empty() {
            return None;
        }
    }

    finish(items)
}

/// Splits variants separated by `---` style rules.
fn split_delimited(text: &str) -> Option<Vec<Suggestion>> {
    let mut items = vec![String::new()];
    for line in text.lines() {
        if DELIM_RE.is_match(line) {
            items.push(String::new());
        } else if let Some(current) = items.last_mut() {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    finish(items)
}

fn finish(items: Vec<String>) -> Option<Vec<Suggestion>> {
    let items: Vec<Suggestion> = items
        .iter()
        .map(|s| strip_quotes(s.trim()).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (items.len() >= 2).then_some(items)
}
