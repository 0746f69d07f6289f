use regex::Regex;
use std::sync::LazyLock;
use validator::{ValidateEmail, ValidateUrl};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}'-]+").expect("word pattern is valid"));

pub fn strip_tags(input: &str) -> String {
    TAG_RE.replace_all(input, "").into_owned()
}

/// Single-line text: tags removed, whitespace runs collapsed, ends trimmed.
pub fn sanitize_text(input: &str) -> String {
    strip_tags(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-line text: tags removed, line breaks kept, each line trimmed.
pub fn sanitize_textarea(input: &str) -> String {
    strip_tags(input)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Only absolute http(s) URLs survive; anything else becomes empty.
pub fn sanitize_url(input: &str) -> String {
    let candidate = input.trim();
    let lower = candidate.to_ascii_lowercase();
    if (lower.starts_with("http://") || lower.starts_with("https://")) && candidate.validate_url() {
        candidate.to_string()
    } else {
        String::new()
    }
}

pub fn is_valid_email(input: &str) -> bool {
    !input.is_empty() && input.validate_email()
}

/// First `limit` whitespace-separated words of the tag-stripped text.
pub fn trim_words(input: &str, limit: usize, more: &str) -> String {
    let stripped = strip_tags(input);
    let words: Vec<&str> = stripped.split_whitespace().collect();
    if words.len() > limit {
        format!("{}{}", words[..limit].join(" "), more)
    } else {
        words.join(" ")
    }
}

pub fn word_count(input: &str) -> usize {
    WORD_RE.find_iter(&strip_tags(input)).count()
}
