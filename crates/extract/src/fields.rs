use regex::Regex;
use std::sync::LazyLock;

use crate::schema::{fields, ExtractedElements};

/// Only this many leading characters of the source are searched for a name.
const NAME_WINDOW_CHARS: usize = 200;

static COMPANY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]+").expect("company name pattern"));

static FOUNDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{4}[-/年][0-9]{1,2}[-/月][0-9]{1,2}日?").expect("founded date pattern")
});

static SECTOR: LazyLock<Regex> = LazyLock::new(|| labeled_line(&["行业", "sector", "industry"]));

static ONE_LINER: LazyLock<Regex> =
    LazyLock::new(|| labeled_line(&["价值主张", "value proposition", "one-liner", "one liner"]));

static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| labeled_line(&["简介", "description"]));

static FOUNDER: LazyLock<Regex> = LazyLock::new(|| labeled_line(&["创始人", "founders", "founder"]));

/// Builds a pattern for a line that starts with one of `labels` followed by
/// `:` or `：`. Markdown bullets, quotes and bold markers around the label are
/// tolerated; the capture is the rest of the line.
fn labeled_line(labels: &[&str]) -> Regex {
    let alternatives = labels
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r"(?mi)^[ \t>#*\-]*(?:{alternatives})\**[ \t]*[：:]\**[ \t]*([^\n]+)$"
    );
    Regex::new(&pattern).expect("labeled line pattern")
}

fn capture_trimmed(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_end_matches("**").trim().to_string())
        .filter(|v| !v.is_empty())
}

fn leading_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Input shared by every field rule.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    pub source: &'a str,
    pub response: &'a str,
}

/// First capitalized word within the leading characters of the source.
/// Names in non-Latin scripts are not recognized.
pub fn company_name(source: &str) -> Option<String> {
    COMPANY_NAME
        .find(leading_chars(source, NAME_WINDOW_CHARS))
        .map(|m| m.as_str().to_string())
}

/// First date-like token, accepting `-`, `/` and `年`/`月`/`日` separators.
pub fn founded(response: &str) -> Option<String> {
    FOUNDED.find(response).map(|m| m.as_str().to_string())
}

pub fn sector(response: &str) -> Option<String> {
    capture_trimmed(&SECTOR, response)
}

pub fn one_liner(response: &str) -> Option<String> {
    capture_trimmed(&ONE_LINER, response)
}

pub fn description(response: &str) -> Option<String> {
    capture_trimmed(&DESCRIPTION, response)
}

pub fn founder(response: &str) -> Option<String> {
    capture_trimmed(&FOUNDER, response)
}

pub type FieldRule = fn(&ExtractionInput<'_>) -> Option<String>;

/// Runs a list of independent field rules; a rule that finds nothing is skipped.
#[derive(Clone)]
pub struct FieldExtractor {
    rules: Vec<(&'static str, FieldRule)>,
}

impl FieldExtractor {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn standard() -> Self {
        Self::empty()
            .with_rule(fields::COMPANY_NAME, |i| company_name(i.source))
            .with_rule(fields::FOUNDED, |i| founded(i.response))
            .with_rule(fields::SECTOR, |i| sector(i.response))
            .with_rule(fields::ONE_LINER, |i| one_liner(i.response))
            .with_rule(fields::DESCRIPTION, |i| description(i.response))
    }

    pub fn with_rule(mut self, key: &'static str, rule: FieldRule) -> Self {
        self.rules.push((key, rule));
        self
    }

    pub fn extract(&self, source: &str, response: &str) -> ExtractedElements {
        let input = ExtractionInput { source, response };
        let mut elements = ExtractedElements::new();

        for (key, rule) in &self.rules {
            match rule(&input) {
                Some(value) => elements.insert(*key, value),
                None => tracing::debug!(field = *key, "field not found"),
            }
        }

        elements
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::standard()
    }
}
