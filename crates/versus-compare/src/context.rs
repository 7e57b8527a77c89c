//! Per-run state.
//!
//! Everything a comparison accumulates (sources, images, the follow-up
//! budget, the current state) lives here and is dropped with the run, so two
//! runs never share mutable state.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::CompareError;
use crate::followup::FollowUpBudget;
use crate::sources::SourceLedger;
use crate::types::ResearchResult;

/// Stage of a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    Normalizing,
    Researching,
    Synthesizing,
    Resolving,
    Done,
    Error,
    Cancelled,
}

impl RunState {
    /// Status line shown while the stage is in progress.
    #[must_use]
    pub fn loading_message(self) -> Option<&'static str> {
        match self {
            RunState::Normalizing => Some("Checking item names..."),
            RunState::Researching => Some("Searching for information..."),
            RunState::Synthesizing => Some("Analyzing and generating comparison..."),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Error | RunState::Cancelled)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Validating => "validating",
            RunState::Normalizing => "normalizing",
            RunState::Researching => "researching",
            RunState::Synthesizing => "synthesizing",
            RunState::Resolving => "resolving",
            RunState::Done => "done",
            RunState::Error => "error",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A progress notification delivered to a run observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub state: RunState,
    pub message: Option<String>,
}

/// Callback invoked on every state change and progress detail.
pub type Observer = Arc<dyn Fn(&Progress) + Send + Sync>;

pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub sources: SourceLedger,
    pub images: BTreeMap<String, String>,
    pub follow_ups: FollowUpBudget,
    state: RunState,
    cancel: CancellationToken,
    observer: Option<Observer>,
}

impl RunContext {
    #[must_use]
    pub fn new(
        max_additional_searches: usize,
        cancel: CancellationToken,
        observer: Option<Observer>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            sources: SourceLedger::new(),
            images: BTreeMap::new(),
            follow_ups: FollowUpBudget::new(max_additional_searches),
            state: RunState::Idle,
            cancel,
            observer,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn transition(&mut self, next: RunState) {
        tracing::info!(run_id = %self.run_id, from = %self.state, to = %next, "run state change");
        self.state = next;
        self.notify(next.loading_message().map(str::to_owned));
    }

    /// Reports a progress detail without changing state.
    pub fn detail(&self, message: impl Into<String>) {
        self.notify(Some(message.into()));
    }

    fn notify(&self, message: Option<String>) {
        if let Some(observer) = &self.observer {
            observer(&Progress {
                state: self.state,
                message,
            });
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs `fut` unless the run is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Cancelled`] if the token fires before `fut`
    /// completes; `fut` is dropped in that case.
    pub async fn cancellable<F, T>(&self, fut: F) -> Result<T, CompareError>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CompareError::Cancelled),
            out = fut => Ok(out),
        }
    }

    /// Folds one item's research into the run: citations into the source
    /// ledger, the image URL (if any) into the image map.
    pub fn ingest_research(&mut self, result: &ResearchResult) {
        self.sources
            .record_item_citations(&result.item, &result.citations);
        if let Some(url) = &result.image_url {
            self.images.insert(result.item.clone(), url.clone());
        }
    }
}
