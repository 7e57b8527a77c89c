//! Grounded research per item.

use std::sync::LazyLock;

use futures::future::try_join_all;
use regex::Regex;
use versus_llm::{ChatClient, ChatMessage, ChatRequest, LlmError};

use crate::error::CompareError;
use crate::types::ResearchResult;

const SYSTEM_PROMPT: &str = "You are a research assistant. Provide detailed information \
about the item including specifications, features, pricing, pros/cons. Also provide an \
image URL if available - format it as [IMAGE_URL: url] at the end of your response.";

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[IMAGE_URL:\s*(https?://[^\]]+)\]").expect("valid image url regex")
});

static IMAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[IMAGE_URL:[^\]]+\]").expect("valid image marker regex"));

/// Researches every item concurrently.
///
/// Results come back in `items` order. The first failure wins: remaining
/// in-flight requests are dropped and the error is returned.
///
/// # Errors
///
/// Returns [`CompareError::Research`] naming the first item whose request
/// failed.
pub async fn research_all(
    client: &ChatClient,
    model: &str,
    items: &[String],
) -> Result<Vec<ResearchResult>, CompareError> {
    try_join_all(items.iter().map(|item| research_item(client, model, item))).await
}

/// Researches one item.
///
/// # Errors
///
/// Returns [`CompareError::Research`] on transport failure, non-2xx status,
/// or a response without content.
pub async fn research_item(
    client: &ChatClient,
    model: &str,
    item: &str,
) -> Result<ResearchResult, CompareError> {
    let request = ChatRequest::new(
        model,
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Provide detailed information about: {item}. Include specifications, features, \
                 price range, pros and cons. If there's a well-known product image, include it \
                 as [IMAGE_URL: url] at the end."
            )),
        ],
    )
    .max_tokens(1024)
    .temperature(0.2)
    .with_citations()
    .without_related_questions();

    let completion = client
        .complete(&request)
        .await
        .map_err(|e| research_failure(item, e))?;

    let raw = completion
        .content()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| CompareError::Research {
            item: item.to_owned(),
            reason: "no content returned".to_owned(),
            source: None,
        })?;

    let (content, image_url) = split_image_marker(raw);
    tracing::debug!(
        item,
        citations = completion.citations.len(),
        has_image = image_url.is_some(),
        "research complete"
    );

    Ok(ResearchResult {
        item: item.to_owned(),
        content,
        citations: completion.citations,
        image_url,
    })
}

fn research_failure(item: &str, err: LlmError) -> CompareError {
    tracing::warn!(item, error = %err, "research request failed");
    let reason = match &err {
        LlmError::Status { .. } => err
            .provider_message()
            .map_or_else(|| format!("Search failed for \"{item}\""), str::to_owned),
        _ => err.to_string(),
    };
    CompareError::Research {
        item: item.to_owned(),
        reason,
        source: Some(err),
    }
}

/// Pulls an `[IMAGE_URL: ...]` marker out of research text.
///
/// Returns the text with the first marker removed and trimmed, plus the
/// image URL when the marker held an `http(s)` URL.
pub(crate) fn split_image_marker(content: &str) -> (String, Option<String>) {
    let image_url = IMAGE_URL
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned());
    let stripped = IMAGE_MARKER.replacen(content, 1, "");
    (stripped.trim().to_owned(), image_url)
}
