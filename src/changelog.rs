//! Changelog normalization
//!
//! Platforms deliver changelogs as HTML, markdown, or double-quoted
//! strings with escape sequences. [`process`] reduces any of them to
//! plain text: markup stripped, quote pair and backslash escapes decoded,
//! carriage returns dropped, horizontal whitespace collapsed to single
//! spaces, blank lines removed, and the result trimmed.

use scraper::Html;

/// Normalizes raw changelog markup to plain text
pub fn process(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let text: String = document.root_element().text().collect();
    normalize(&text)
}

fn normalize(input: &str) -> String {
    let unquoted = match input.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner,
        None => input,
    };
    let decoded = decode_escapes(unquoted).replace('\r', "");

    let spaced: String = decoded
        .chars()
        .map(|c| {
            if c.is_whitespace() && c != '\n' {
                ' '
            } else {
                c
            }
        })
        .collect();

    collapse_spaces(&spaced)
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn collapse_spaces(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_space = false;
    for c in input.chars() {
        if c == ' ' {
            if !previous_space {
                out.push(' ');
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out
}

/// Decodes java-style backslash escapes; unknown escapes keep the escaped
/// character, a trailing backslash is kept literally
fn decode_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
