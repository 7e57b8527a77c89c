//! Comparison synthesis: research in, structured metrics out.

use versus_llm::{ChatClient, ChatMessage, ChatRequest};

use crate::error::{CompareError, SynthesisError};
use crate::extract::parse_embedded;
use crate::types::{ComparisonData, ResearchResult};

const SYSTEM_PROMPT: &str = "Generate comparison data as valid JSON only.";

/// Everything the synthesis prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub items: &'a [String],
    pub research: &'a [ResearchResult],
    pub custom_params: &'a [String],
    pub custom_only: bool,
}

/// Requests the structured comparison and parses it.
///
/// When `json_mode` is set the request carries
/// `response_format: {"type": "json_object"}`; the answer is still scanned
/// for an embedded object in case the provider ignores the hint.
///
/// # Errors
///
/// Returns [`CompareError::Synthesis`] on transport failure, empty content,
/// unparsable JSON, or a JSON object missing `metrics`/`comparison`.
pub async fn synthesize(
    client: &ChatClient,
    model: &str,
    json_mode: bool,
    input: SynthesisInput<'_>,
) -> Result<ComparisonData, CompareError> {
    let mut request = ChatRequest::new(
        model,
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(input)),
        ],
    )
    .temperature(0.3)
    .max_tokens(3000);
    if json_mode {
        request = request.json_object();
    }

    let completion = client.complete(&request).await.map_err(|e| {
        let message = e
            .provider_message()
            .unwrap_or("Comparison generation failed")
            .to_owned();
        SynthesisError::Provider { message, source: e }
    })?;

    let content = completion
        .content()
        .filter(|c| !c.trim().is_empty())
        .ok_or(SynthesisError::EmptyResponse)?;

    let data = parse_comparison(content)?;
    tracing::info!(
        metrics = data.metrics.len(),
        winners = data.winners.len(),
        follow_ups_requested = data.needs_more_info.len(),
        "comparison synthesized"
    );
    Ok(data)
}

/// Parses the model's answer into [`ComparisonData`].
///
/// # Errors
///
/// [`SynthesisError::Parse`] if no JSON object can be read;
/// [`SynthesisError::InvalidStructure`] if required keys are missing.
pub fn parse_comparison(content: &str) -> Result<ComparisonData, SynthesisError> {
    let value: serde_json::Value = parse_embedded(content, b'{', b'}').map_err(|e| {
        tracing::warn!(error = %e, "comparison JSON did not parse");
        SynthesisError::Parse(e)
    })?;
    ComparisonData::from_value(value)
}

/// Builds the user prompt for the synthesis call.
#[must_use]
pub fn build_prompt(input: SynthesisInput<'_>) -> String {
    let item_list = input.items.join(", ");

    let search_summary = input
        .research
        .iter()
        .map(|r| format!("Item: {}\nInformation:\n{}\n", r.item, r.content))
        .collect::<Vec<_>>()
        .join("\n---\n");

    let custom_instruction = if input.custom_params.is_empty() {
        String::new()
    } else if input.custom_only {
        format!(
            "\n\nIMPORTANT: Use ONLY these custom parameters specified by the user \
             (do NOT add any other metrics): {}",
            input.custom_params.join(", ")
        )
    } else {
        format!(
            "\n\nIMPORTANT: Make sure to include these custom parameters specified by the user \
             IN ADDITION to other relevant metrics: {}",
            input.custom_params.join(", ")
        )
    };

    let metric_rule = if input.custom_only && !input.custom_params.is_empty() {
        "ONLY the custom parameters"
    } else {
        "5-10 metrics"
    };

    format!(
        r#"You are a comparison expert. Based on the following web search results, create a comprehensive comparison of: {item_list}.

Search Results:
{search_summary}
{custom_instruction}

Respond with a JSON object:
{{
    "metrics": [
        {{
            "name": "Metric Name",
            "description": "Brief 1-2 sentence explanation.",
            "isObjective": true
        }}
    ],
    "comparison": {{
        "Item Name": {{
            "Metric Name": "value WITH UNIT (e.g., $999, 6.7 inches)"
        }}
    }},
    "chartScores": {{
        "Metric Name": {{
            "Item Name": 75
        }}
    }},
    "winners": {{
        "Metric Name": "Best item name or null if subjective"
    }},
    "needsMoreInfo": [
        {{
            "metric": "Metric Name",
            "query": "Focused web search query that would settle the winner"
        }}
    ]
}}

RULES:
1. Include {metric_rule}
2. "comparison" contains DISPLAY values with proper units (e.g., "$999", "6.7 inches", "4500mAh")
3. "chartScores" contains NORMALIZED scores from 0-100 for radar chart visualization:
   - For each metric, score each item relative to the others (best = 90-100, worst = 20-40)
   - Higher score = better (even for price: cheaper = higher score)
   - Score based on how good the value is in real-world context
4. In "winners", mark the best item per metric (null if subjective)
5. Use exact item names: {item_list}
6. Return ONLY valid JSON
7. ALWAYS include proper units in comparison values:
   - Price: "$999", "₹79,999" | Battery: "4500mAh" | Display: "6.7 inches"
   - Weight: "187g" | Storage: "256GB" | RAM: "8GB" | Refresh: "120Hz"
8. Only add a "needsMoreInfo" entry when an objective metric's winner cannot be determined from the search results; otherwise return an empty list"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn research(item: &str, content: &str) -> ResearchResult {
        ResearchResult {
            item: item.to_owned(),
            content: content.to_owned(),
            citations: Vec::new(),
            image_url: None,
        }
    }

    fn items() -> Vec<String> {
        vec!["iPhone 15".to_owned(), "Galaxy S24".to_owned()]
    }

    #[test]
    fn prompt_embeds_items_and_research() {
        let items = items();
        let research = vec![research("iPhone 15", "A16 chip"), research("Galaxy S24", "Snapdragon")];
        let prompt = build_prompt(SynthesisInput {
            items: &items,
            research: &research,
            custom_params: &[],
            custom_only: false,
        });
        assert!(prompt.contains("comparison of: iPhone 15, Galaxy S24."));
        assert!(prompt.contains("Item: iPhone 15\nInformation:\nA16 chip\n\n---\nItem: Galaxy S24"));
        assert!(prompt.contains("1. Include 5-10 metrics"));
        assert!(!prompt.contains("IMPORTANT"));
    }

    #[test]
    fn custom_only_restricts_metrics() {
        let items = items();
        let params = vec!["battery life".to_owned(), "price".to_owned()];
        let prompt = build_prompt(SynthesisInput {
            items: &items,
            research: &[],
            custom_params: &params,
            custom_only: true,
        });
        assert!(prompt.contains("Use ONLY these custom parameters"));
        assert!(prompt.contains("battery life, price"));
        assert!(prompt.contains("1. Include ONLY the custom parameters"));
    }

    #[test]
    fn custom_params_add_to_defaults() {
        let items = items();
        let params = vec!["weight".to_owned()];
        let prompt = build_prompt(SynthesisInput {
            items: &items,
            research: &[],
            custom_params: &params,
            custom_only: false,
        });
        assert!(prompt.contains("IN ADDITION to other relevant metrics: weight"));
        assert!(prompt.contains("1. Include 5-10 metrics"));
    }

    #[test]
    fn custom_only_without_params_keeps_default_rule() {
        let items = items();
        let prompt = build_prompt(SynthesisInput {
            items: &items,
            research: &[],
            custom_params: &[],
            custom_only: true,
        });
        assert!(prompt.contains("1. Include 5-10 metrics"));
    }

    #[test]
    fn parse_comparison_handles_prose_wrapping() {
        let content = "Sure! Here you go:\n{\"metrics\": [\"Price\"], \"comparison\": {\"A\": {\"Price\": \"$10\"}}}\nLet me know.";
        let data = parse_comparison(content).unwrap();
        assert_eq!(data.metrics[0].name, "Price");
        assert_eq!(data.value("A", "Price"), Some("$10"));
    }

    #[test]
    fn parse_comparison_rejects_garbage() {
        let err = parse_comparison("I cannot help with that.").unwrap_err();
        assert!(matches!(err, SynthesisError::Parse(_)));
        assert_eq!(err.to_string(), "Failed to parse comparison data");
    }

    #[test]
    fn trailing_comma_is_a_parse_error_not_a_structure_error() {
        let content = r#"{"metrics": [{"name": "Price"}], "comparison": {"A": {"Price": "$10"}},}"#;
        let err = parse_comparison(content).unwrap_err();
        assert!(matches!(err, SynthesisError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn parse_comparison_requires_structure() {
        let err = parse_comparison(r#"{"metrics": []}"#).unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidStructure { .. }));
    }
}
