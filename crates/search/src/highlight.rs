use crate::lexical::tokenize;
use regex::RegexBuilder;

pub const DEFAULT_MARKER: &str = "**";

/// Wraps case-insensitive occurrences of query tokens in a marker
#[derive(Debug, Clone)]
pub struct Highlighter {
    marker: String,
}

impl Highlighter {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn highlight(&self, text: &str, query: &str) -> String {
        let mut tokens = tokenize(query);
        if tokens.is_empty() {
            return text.to_string();
        }
        // longest first so "deployment" wins over "deploy"
        tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        tokens.dedup();

        let pattern = tokens
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|");
        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => re
                .replace_all(text, |caps: &regex::Captures<'_>| {
                    format!("{}{}{}", self.marker, &caps[0], self.marker)
                })
                .into_owned(),
            Err(e) => {
                log::warn!("Highlighting disabled for this query: {e}");
                text.to_string()
            }
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}
