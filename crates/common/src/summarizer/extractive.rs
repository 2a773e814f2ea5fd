//! Extractive article summarizer
//!
//! Downloads the page, converts it to plain text with html2text, and keeps the
//! sentences whose words are most frequent across the article.

use crate::config::SummarizerConfig;
use crate::errors::{AppError, Result};
use crate::summarizer::Summarizer;
use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Lines shorter than this are navigation, captions, bylines...
const MIN_LINE_WORDS: usize = 5;
const MIN_SENTENCE_WORDS: usize = 4;
/// Wide enough that html2text never wraps a paragraph mid-sentence
const RENDER_WIDTH: usize = 10_000;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "his", "how", "its", "may", "new", "now", "old", "see",
    "who", "did", "get", "him", "she", "too", "use", "that", "this", "with", "from", "they",
    "will", "would", "there", "their", "what", "about", "which", "when", "were", "been",
    "than", "them", "then", "these", "those", "into", "more", "some", "such", "also", "only",
    "over", "very", "just", "your", "said", "could", "should", "after", "before", "while",
];

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

fn sentence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?\n]+[.!?]*").expect("static regex"))
}

/// `[3]: http://...` reference lines and `[3]` markers html2text emits for links
fn link_footnote_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\d+\]:").expect("static regex"))
}

fn link_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d+\]").expect("static regex"))
}

/// Fetches articles over HTTP and summarizes them by sentence ranking
pub struct ArticleSummarizer {
    client: Client,
    max_sentences: usize,
    max_content_bytes: usize,
}

impl ArticleSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_sentences: config.max_sentences.max(1),
            max_content_bytes: config.max_content_bytes,
        })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let mut response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Summarizer {
                message: format!("Fetching {} returned {}", url, response.status()),
            });
        }

        let too_large = |size: u64| AppError::Summarizer {
            message: format!(
                "Article at {} is at least {} bytes, limit is {}",
                url, size, self.max_content_bytes
            ),
        };

        if let Some(length) = response.content_length() {
            if length > self.max_content_bytes as u64 {
                return Err(too_large(length));
            }
        }

        // Chunked responses carry no length; stop reading once past the cap
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_content_bytes {
                return Err(too_large(body.len() as u64));
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl Summarizer for ArticleSummarizer {
    async fn summarize(&self, url: &str) -> Result<String> {
        let html = self.fetch(url).await?;
        let text = extract_text(&html)?;

        let sentences = rank_sentences(&text, self.max_sentences);
        if sentences.is_empty() {
            return Err(AppError::Summarizer {
                message: format!("No summarizable text found at {}", url),
            });
        }

        tracing::debug!(
            url = %url,
            html_bytes = html.len(),
            text_chars = text.len(),
            sentences = sentences.len(),
            "Article summarized"
        );

        Ok(sentences.join(" "))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

/// Readable body text of an HTML page, one paragraph per line
pub fn extract_text(html: &str) -> Result<String> {
    let text = html2text::from_read(html.as_bytes(), RENDER_WIDTH).map_err(|e| {
        AppError::Summarizer {
            message: format!("Failed to convert HTML to text: {}", e),
        }
    })?;

    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !link_footnote_regex().is_match(line))
        .map(|line| {
            link_marker_regex()
                .replace_all(line, "")
                .replace(['[', ']'], "")
                .trim_start_matches(['#', '*', '>', '-', ' '])
                .trim()
                .to_string()
        })
        .filter(|line| line.split_whitespace().count() >= MIN_LINE_WORDS)
        .collect();

    Ok(lines.join("\n"))
}

fn content_words(sentence: &str) -> impl Iterator<Item = String> + '_ {
    word_regex()
        .find_iter(sentence)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w.as_str()))
}

/// Pick up to `max_sentences` sentences by keyword density, in article order
pub fn rank_sentences(text: &str, max_sentences: usize) -> Vec<&str> {
    let sentences: Vec<&str> = sentence_regex()
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| s.split_whitespace().count() >= MIN_SENTENCE_WORDS)
        .collect();

    if sentences.len() <= max_sentences {
        return sentences;
    }

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for sentence in &sentences {
        for word in content_words(sentence) {
            *frequencies.entry(word).or_default() += 1;
        }
    }
    let max_frequency = frequencies.values().copied().max().unwrap_or(1) as f64;

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let total_words = sentence.split_whitespace().count().max(1) as f64;
            let keyword_weight: f64 = content_words(sentence)
                .map(|w| frequencies.get(&w).copied().unwrap_or(0) as f64 / max_frequency)
                .sum();
            (index, keyword_weight / total_words)
        })
        .collect();

    // Highest score first, earlier sentence wins ties
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut keep: Vec<usize> = scored.into_iter().take(max_sentences).map(|(i, _)| i).collect();
    keep.sort_unstable();

    keep.into_iter().map(|i| sentences[i]).collect()
}
