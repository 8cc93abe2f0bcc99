use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::schema::KeywordWeight;

static CJK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{4e00}-\u{9fa5}]{2,}").expect("cjk token pattern"));

static LATIN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]{3,}\b").expect("latin token pattern"));

const STOP_WORDS: &[&str] = &[
    "公司", "我们", "以及", "一个", "的", "和", "是", "在", "对", "与", "及", "等",
];

pub struct KeywordWeighterConfig {
    pub max_keywords: usize,
    pub stop_words: HashSet<String>,
}

impl Default for KeywordWeighterConfig {
    fn default() -> Self {
        Self {
            max_keywords: 20,
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Term frequencies normalized against the most frequent term of the same text.
pub struct KeywordWeighter {
    config: KeywordWeighterConfig,
}

impl KeywordWeighter {
    pub fn new(config: KeywordWeighterConfig) -> Self {
        Self { config }
    }

    /// Weighs the terms of `source` and `response` taken together.
    pub fn weigh(&self, source: &str, response: &str) -> Vec<KeywordWeight> {
        let all_text = format!("{} {}", source, response);
        self.weigh_text(&all_text)
    }

    pub fn weigh_text(&self, text: &str) -> Vec<KeywordWeight> {
        // CJK runs first, then Latin words; ties keep this order
        let tokens = CJK_RUN
            .find_iter(text)
            .chain(LATIN_WORD.find_iter(text))
            .map(|m| m.as_str())
            .filter(|t| t.chars().count() > 1 && !self.config.stop_words.contains(*t));

        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in tokens {
            let count = counts.entry(token).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }

        let Some(max_count) = counts.values().copied().max() else {
            return Vec::new();
        };

        let mut keywords: Vec<KeywordWeight> = order
            .into_iter()
            .map(|term| KeywordWeight::new(term, counts[term] as f64 / max_count as f64))
            .collect();

        // stable: equal weights stay in first-occurrence order
        keywords.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        keywords.truncate(self.config.max_keywords);
        keywords
    }
}

impl Default for KeywordWeighter {
    fn default() -> Self {
        Self::new(KeywordWeighterConfig::default())
    }
}
