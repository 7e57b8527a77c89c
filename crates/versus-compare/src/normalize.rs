//! Spelling normalization of item names.

use versus_llm::{ChatClient, ChatMessage, ChatRequest};

use crate::extract::parse_embedded;

const SYSTEM_PROMPT: &str = "You correct spelling mistakes in product/item names. \
Return a JSON array of corrected names in the same order. Only fix obvious spelling \
mistakes, keep the meaning the same. If a name is already correct, return it as-is.";

/// Asks the completion provider to fix obvious misspellings.
///
/// Never fails: any transport error, non-2xx status, missing content,
/// unparsable answer or length mismatch returns `items` unchanged.
pub async fn correct_spelling(client: &ChatClient, model: &str, items: &[String]) -> Vec<String> {
    let encoded = serde_json::to_string(items).unwrap_or_default();
    let request = ChatRequest::new(
        model,
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Correct any spelling mistakes in these item names: {encoded}\n\n\
                 Return ONLY a JSON array of corrected names, nothing else. \
                 Example: [\"iPhone 15 Pro\", \"Samsung Galaxy S24\"]"
            )),
        ],
    )
    .temperature(0.1)
    .max_tokens(500);

    let completion = match client.complete(&request).await {
        Ok(completion) => completion,
        Err(e) => {
            tracing::warn!(error = %e, "spelling correction failed, using original items");
            return items.to_vec();
        }
    };

    match completion.content().and_then(|c| parse_corrections(c, items)) {
        Some(corrected) => {
            tracing::debug!(?items, ?corrected, "spelling correction applied");
            corrected
        }
        None => {
            tracing::warn!("could not parse spelling correction, using original items");
            items.to_vec()
        }
    }
}

/// Reads the model's answer as a same-length array of non-blank names.
fn parse_corrections(content: &str, items: &[String]) -> Option<Vec<String>> {
    let parsed: Vec<serde_json::Value> = parse_embedded(content, b'[', b']').ok()?;
    if parsed.len() != items.len() {
        return None;
    }
    parsed
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn accepts_same_length_array() {
        let original = items(&["ihpone 15", "galaxy s24"]);
        let got = parse_corrections(r#"["iPhone 15", "Galaxy S24"]"#, &original);
        assert_eq!(got, Some(items(&["iPhone 15", "Galaxy S24"])));
    }

    #[test]
    fn accepts_fenced_array() {
        let original = items(&["a", "b"]);
        let got = parse_corrections("```json\n[\"A\", \"B\"]\n```", &original);
        assert_eq!(got, Some(items(&["A", "B"])));
    }

    #[test]
    fn rejects_length_mismatch() {
        let original = items(&["a", "b"]);
        assert!(parse_corrections(r#"["A"]"#, &original).is_none());
        assert!(parse_corrections(r#"["A", "B", "C"]"#, &original).is_none());
    }

    #[test]
    fn rejects_non_string_or_blank_entries() {
        let original = items(&["a", "b"]);
        assert!(parse_corrections(r#"["A", 2]"#, &original).is_none());
        assert!(parse_corrections(r#"["A", "  "]"#, &original).is_none());
    }

    #[test]
    fn rejects_prose() {
        let original = items(&["a", "b"]);
        assert!(parse_corrections("The names look fine.", &original).is_none());
    }
}
