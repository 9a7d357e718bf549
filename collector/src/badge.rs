use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use click_engine::parse_counter;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

/// Attributes identifying the SVG `<text>` element that carries the counter.
const COUNTER_ATTRIBUTES: &[(&str, &str)] = &[
    ("x", "102.5"),
    ("y", "15"),
    ("fill", "#010101"),
    ("fill-opacity", ".3"),
];

static TEXT_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").expect("valid regex"));

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w:-]+)\s*=\s*"([^"]*)""#).expect("valid regex"));

pub trait CounterTextExt {
    fn counter_text(&self) -> Option<String>;
}

impl CounterTextExt for str {
    /// Text content of the first `<text>` element carrying every counter attribute.
    fn counter_text(&self) -> Option<String> {
        TEXT_ELEMENT.captures_iter(self).find_map(|element| {
            let attributes: HashMap<&str, &str> = ATTRIBUTE
                .captures_iter(element.get(1)?.as_str())
                .filter_map(|a| Some((a.get(1)?.as_str(), a.get(2)?.as_str())))
                .collect();
            let matches = COUNTER_ATTRIBUTES
                .iter()
                .all(|(name, value)| attributes.get(name) == Some(value));
            if !matches {
                return None;
            }
            element.get(2).map(|body| body.as_str().trim().to_owned())
        })
    }
}

/// Reads the current counter value from a badge page.
pub struct BadgeReader {
    client: Client,
    url: String,
}

impl BadgeReader {
    pub fn new(url: String) -> Result<Self> {
        if url.trim().is_empty() {
            bail!("No counter source configured (set source_url or COUNTER_SOURCE_URL)");
        }
        Ok(Self {
            client: Client::new(),
            url,
        })
    }

    pub async fn read(&self) -> Result<f64> {
        debug!("Fetching {}", self.url);

        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("HTTP request failed")?
            .error_for_status()
            .context("HTTP error response")?
            .text()
            .await
            .context("Failed to read response body")?;

        let text = body
            .counter_text()
            .context("Counter element not found in badge")?;
        parse_counter(&text).with_context(|| format!("Unexpected counter text {text:?}"))
    }
}
