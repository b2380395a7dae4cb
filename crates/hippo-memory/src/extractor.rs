// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag extractors: a rule-based keyword extractor and an LLM-backed one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use hippo_core::error::HippoError;
use hippo_core::traits::{CompletionProvider, TagExtractor};
use hippo_core::types::TagRequest;
use tracing::{debug, warn};

use crate::embedder::normalize_text;

const MIN_TOKEN_CHARS: usize = 3;

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "and", "any", "are", "but", "can", "could", "does", "for", "from",
    "has", "have", "how", "into", "its", "just", "not", "now", "our", "should", "that", "the",
    "their", "them", "then", "there", "these", "this", "use", "was", "what", "when", "where",
    "which", "who", "why", "will", "with", "would", "you", "your",
];

const TAGGING_PROMPT: &str = r#"Extract short topic tags for the following user queries. Output as a JSON array of strings.

Rules:
- Each tag is one to three words, lowercase.
- Prefer reusing a known tag when it fits.
- Return at most {max_tags} tags. If nothing stands out, return [].

Known tags: {existing}

Queries:
{queries}

Output JSON array only, no explanation:"#;

/// Frequency-based keyword tagger. Needs no external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTagExtractor;

impl KeywordTagExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Picks tags from `request` synchronously.
    ///
    /// Tokens are scored by frequency across the window, plus one when the
    /// token is already a known tag. Ties keep first-occurrence order.
    pub fn pick(&self, request: &TagRequest) -> Vec<String> {
        let known: HashSet<String> = request.existing.iter().map(|t| normalize_text(t)).collect();

        let mut scores: HashMap<String, (usize, usize)> = HashMap::new();
        let mut order = 0usize;
        for text in &request.texts {
            let normalized = normalize_text(text);
            for raw in normalized.split_whitespace() {
                let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
                if !is_keyword(token) {
                    continue;
                }
                let entry = scores.entry(token.to_string()).or_insert((0, order));
                entry.0 += 1;
                order += 1;
            }
        }

        let mut ranked: Vec<(String, usize, usize)> = scores
            .into_iter()
            .map(|(token, (count, first))| {
                let bonus = usize::from(known.contains(&token));
                (token, count + bonus, first)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
        ranked
            .into_iter()
            .take(request.max_tags)
            .map(|(token, _, _)| token)
            .collect()
    }
}

fn is_keyword(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_CHARS
        && !token.chars().all(|c| c.is_ascii_digit())
        && !STOPWORDS.contains(&token)
}

#[async_trait]
impl TagExtractor for KeywordTagExtractor {
    async fn extract(&self, request: TagRequest) -> Result<Vec<String>, HippoError> {
        Ok(self.pick(&request))
    }
}

/// Tags queries by prompting a completion provider.
pub struct LlmTagExtractor {
    provider: Arc<dyn CompletionProvider>,
}

impl LlmTagExtractor {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TagExtractor for LlmTagExtractor {
    async fn extract(&self, request: TagRequest) -> Result<Vec<String>, HippoError> {
        let prompt = build_tagging_prompt(&request);
        let response = self.provider.complete(&prompt).await?;
        let tags = clean_tags(parse_tag_response(&response), request.max_tags);
        debug!(
            provider = self.provider.name(),
            tags = tags.len(),
            "llm tag extraction finished"
        );
        Ok(tags)
    }
}

fn build_tagging_prompt(request: &TagRequest) -> String {
    let existing = if request.existing.is_empty() {
        "(none)".to_string()
    } else {
        request.existing.join(", ")
    };
    let queries: String = request.texts.iter().map(|t| format!("- {t}\n")).collect();
    TAGGING_PROMPT
        .replace("{max_tags}", &request.max_tags.to_string())
        .replace("{existing}", &existing)
        .replace("{queries}", &queries)
}

/// Parses a JSON array of strings out of an LLM response.
///
/// Tolerates markdown code fences and prose around the array. Returns an
/// empty list when no array can be parsed.
pub fn parse_tag_response(response: &str) -> Vec<String> {
    let trimmed = response.trim();
    let start = trimmed.find('[');
    let end = trimmed.rfind(']');
    let json_str = match (start, end) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    match serde_json::from_str::<Vec<String>>(json_str) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("Failed to parse tag response: {e}");
            debug!("Raw response: {response}");
            Vec::new()
        }
    }
}

/// Trims, lowercases, dedupes and truncates tags.
fn clean_tags(tags: Vec<String>, max_tags: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .take(max_tags)
        .collect()
}
