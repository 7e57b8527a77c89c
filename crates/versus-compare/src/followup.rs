//! Follow-up research for metrics the synthesizer could not settle.
//!
//! Best effort throughout: every failure is logged and skipped, and the
//! winners map keeps whatever value it had.

use versus_llm::{ChatClient, ChatMessage, ChatRequest};

use crate::context::RunContext;
use crate::types::ComparisonData;

/// Caps the number of follow-up queries issued in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUpBudget {
    cap: usize,
    used: usize,
}

impl FollowUpBudget {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self { cap, used: 0 }
    }

    /// Takes one unit of budget. Returns `false` once the cap is reached.
    pub fn try_consume(&mut self) -> bool {
        if self.used >= self.cap {
            return false;
        }
        self.used += 1;
        true
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.cap
    }
}

/// The two provider handles a follow-up needs.
#[derive(Clone, Copy)]
pub struct FollowUpClients<'a> {
    pub research: &'a ChatClient,
    pub research_model: &'a str,
    pub completion: &'a ChatClient,
    pub completion_model: &'a str,
}

/// Works through the first `cap` entries of `data.needs_more_info`, in order.
///
/// For each entry: one short grounded search, then (if it returned text) one
/// winner pick. A pick that names a known item overwrites the metric's
/// winner. An entry with a blank query still occupies one of the `cap`
/// slots but issues no search and is not counted as used.
/// Returns early, leaving `data` as it is, if the run is cancelled.
pub async fn resolve_follow_ups(
    clients: FollowUpClients<'_>,
    ctx: &mut RunContext,
    data: &mut ComparisonData,
    items: &[String],
) {
    let requests: Vec<_> = data
        .needs_more_info
        .iter()
        .take(ctx.follow_ups.cap())
        .cloned()
        .collect();
    for request in requests {
        if ctx.follow_ups.is_exhausted() {
            tracing::debug!(metric = %request.metric, "follow-up budget exhausted, skipping");
            break;
        }
        let query = request.query.trim();
        if query.is_empty() {
            continue;
        }
        ctx.follow_ups.try_consume();
        ctx.detail(format!(
            "Additional research: {}...",
            query.chars().take(50).collect::<String>()
        ));

        let Ok(info) = ctx
            .cancellable(additional_search(clients.research, clients.research_model, query))
            .await
        else {
            return;
        };
        let Some((content, citations)) = info else {
            continue;
        };
        ctx.sources.record_follow_up_citations(&citations);
        if content.trim().is_empty() {
            continue;
        }

        let Ok(winner) = ctx
            .cancellable(determine_winner(
                clients.completion,
                clients.completion_model,
                &request.metric,
                items,
                &content,
            ))
            .await
        else {
            return;
        };

        match winner {
            Some(winner) if data.has_metric(&request.metric) => {
                tracing::info!(metric = %request.metric, winner = %winner, "follow-up settled winner");
                data.winners.insert(request.metric.clone(), Some(winner));
            }
            Some(winner) => {
                tracing::debug!(metric = %request.metric, winner = %winner, "follow-up named a winner for an unlisted metric");
            }
            None => {
                tracing::debug!(metric = %request.metric, "follow-up did not settle a winner");
            }
        }
    }
}

/// Issues one brief grounded query. Returns the answer text and its citations.
async fn additional_search(
    client: &ChatClient,
    model: &str,
    query: &str,
) -> Option<(String, Vec<String>)> {
    let request = ChatRequest::new(
        model,
        vec![
            ChatMessage::system("Provide a brief, factual answer."),
            ChatMessage::user(query),
        ],
    )
    .max_tokens(512)
    .temperature(0.2)
    .with_citations();

    match client.complete(&request).await {
        Ok(completion) => {
            let content = completion.content().unwrap_or_default().to_owned();
            Some((content, completion.citations))
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "follow-up search failed");
            None
        }
    }
}

/// Asks the completion provider which item wins `metric` given `info`.
async fn determine_winner(
    client: &ChatClient,
    model: &str,
    metric: &str,
    items: &[String],
    info: &str,
) -> Option<String> {
    let request = ChatRequest::new(
        model,
        vec![
            ChatMessage::system(
                "Determine which item is better for the metric. Respond with ONLY the item name or \"null\".",
            ),
            ChatMessage::user(format!(
                "Which is better for \"{metric}\"?\nItems: {}\nInfo: {info}\n\
                 Respond with ONLY the winning item name or \"null\".",
                items.join(", ")
            )),
        ],
    )
    .temperature(0.1)
    .max_tokens(100);

    match client.complete(&request).await {
        Ok(completion) => completion.content().and_then(|a| match_winner(a, items)),
        Err(e) => {
            tracing::warn!(metric, error = %e, "winner determination failed");
            None
        }
    }
}

/// Accepts the answer only if, trimmed, it is exactly one of `items`.
pub(crate) fn match_winner(answer: &str, items: &[String]) -> Option<String> {
    let answer = answer.trim();
    if answer == "null" {
        return None;
    }
    items.iter().find(|item| item.as_str() == answer).cloned()
}
