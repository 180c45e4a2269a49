//! Description generation adapter (OpenAI-compatible chat completions)
//!
//! A generated description must read as a lead paragraph followed by four
//! bold-titled sections. Anything else is reported as malformed so the
//! degradation policy can retry it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use shared::{DescriptionResult, EnrichmentKind, EnrichmentPayload, FetchError};
use crate::error::EnrichResult;
use crate::services::providers::http::{build_client, endpoint, require_query, send_json};
use crate::traits::UpstreamProvider;
use crate::types::ProviderQuery;

/// Section titles every description carries, in order
pub const REQUIRED_SECTIONS: [&str; 4] = [
    "Physical Characteristics",
    "Habitat and Distribution",
    "Behavior and Lifestyle",
    "Diet and Hunting",
];

const SYSTEM_PROMPT: &str =
    "You are a wildlife reference writer. Answer in plain prose with bold section titles only.";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct OpenAiTextProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiTextProvider {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> EnrichResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

pub fn build_prompt(name: &str, scientific_name: Option<&str>) -> String {
    let subject = match scientific_name {
        Some(scientific) => format!("the {name} ({scientific})"),
        None => format!("the {name}"),
    };
    let sections = REQUIRED_SECTIONS
        .iter()
        .map(|title| format!("**{title}**"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write a short encyclopedia entry about {subject}. Start with one introductory \
         paragraph, then add these sections, each title on its own line exactly as written:\n\
         {sections}\n\
         Do not use any other headings or nested lists."
    )
}

/// Title text when `line` is a standalone bold title such as `**Diet and Hunting**`
fn section_title(line: &str) -> Option<&str> {
    let inner = line.trim().strip_prefix("**")?;
    let inner = inner.strip_suffix("**:").or_else(|| inner.strip_suffix("**"))?;
    Some(inner.trim().trim_end_matches(':').trim())
}

/// Reject text that lacks the lead paragraph or any required section
pub fn check_structure(text: &str) -> Result<(), FetchError> {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| FetchError::Malformed("empty description".to_string()))?;
    if section_title(first).is_some() {
        return Err(FetchError::Malformed("description has no introductory paragraph".to_string()));
    }

    let titles: Vec<&str> = text.lines().filter_map(section_title).collect();
    for required in REQUIRED_SECTIONS {
        if !titles.iter().any(|title| title.eq_ignore_ascii_case(required)) {
            return Err(FetchError::Malformed(format!("description is missing section '{required}'")));
        }
    }
    Ok(())
}

#[async_trait]
impl UpstreamProvider for OpenAiTextProvider {
    fn kind(&self) -> EnrichmentKind {
        EnrichmentKind::Description
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<EnrichmentPayload, FetchError> {
        let name = require_query(&query.name)?;
        let url = endpoint(&self.base_url, "v1/chat/completions", &[])?;
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(&name, query.scientific_name.as_deref()) },
            ],
            "temperature": 0.7,
            "max_tokens": 900,
        });
        debug!(model = %self.model, subject = %name, "Requesting description");

        let completion: ChatCompletion =
            send_json(self.client.post(url).bearer_auth(&self.api_key).json(&body)).await?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| FetchError::Malformed("completion has no content".to_string()))?;

        check_structure(&text)?;
        Ok(EnrichmentPayload::Description(DescriptionResult::generated(text)))
    }
}
