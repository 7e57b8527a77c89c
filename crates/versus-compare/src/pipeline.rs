//! Comparison run orchestration.

use tokio_util::sync::CancellationToken;
use versus_core::AppConfig;
use versus_llm::{ChatClient, ClientOptions};

use crate::context::{Observer, RunContext, RunState};
use crate::error::CompareError;
use crate::followup::{resolve_follow_ups, FollowUpClients};
use crate::input::{validate_request, ItemLimits};
use crate::normalize::correct_spelling;
use crate::research::research_all;
use crate::synthesize::{synthesize, SynthesisInput};
use crate::types::{ComparisonReport, ComparisonRequest, Item};

/// Per-comparison knobs that are not transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareSettings {
    pub limits: ItemLimits,
    pub max_additional_searches: usize,
    pub completion_model: String,
    pub research_model: String,
    /// Request `response_format: json_object` for synthesis.
    pub json_mode: bool,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            limits: ItemLimits::default(),
            max_additional_searches: 2,
            completion_model: "llama-3.3-70b-versatile".to_owned(),
            research_model: "sonar".to_owned(),
            json_mode: true,
        }
    }
}

impl CompareSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            limits: ItemLimits {
                min: config.min_items,
                max: config.max_items,
            },
            max_additional_searches: config.max_additional_searches,
            completion_model: config.groq_model.clone(),
            research_model: config.perplexity_model.clone(),
            json_mode: config.json_mode,
        }
    }
}

/// The completion and research provider clients.
pub struct Providers {
    pub completion: ChatClient,
    pub research: ChatClient,
}

impl Providers {
    #[must_use]
    pub fn new(completion: ChatClient, research: ChatClient) -> Self {
        Self {
            completion,
            research,
        }
    }

    /// Builds both clients from config.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Client`] if either base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CompareError> {
        let options = ClientOptions {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        };
        Ok(Self {
            completion: ChatClient::new(&config.groq_api_key, &config.groq_base_url, &options)?,
            research: ChatClient::new(
                &config.perplexity_api_key,
                &config.perplexity_base_url,
                &options,
            )?,
        })
    }
}

/// Runs comparisons against a fixed pair of providers.
///
/// A `Comparator` holds no per-run state; each call to [`Comparator::run`]
/// gets its own [`RunContext`], so concurrent or retried runs are isolated.
pub struct Comparator {
    providers: Providers,
    settings: CompareSettings,
}

impl Comparator {
    #[must_use]
    pub fn new(providers: Providers, settings: CompareSettings) -> Self {
        Self {
            providers,
            settings,
        }
    }

    /// # Errors
    ///
    /// Returns [`CompareError::Client`] if a provider client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CompareError> {
        Ok(Self::new(
            Providers::from_config(config)?,
            CompareSettings::from_config(config),
        ))
    }

    #[must_use]
    pub fn settings(&self) -> &CompareSettings {
        &self.settings
    }

    /// Runs one comparison.
    ///
    /// 1. Validate input (no network on failure).
    /// 2. Correct spelling; falls back to the typed names.
    /// 3. Research every item concurrently; the first failure aborts the run.
    /// 4. Synthesize metrics, values, scores and winners.
    /// 5. Resolve under-determined winners within the follow-up budget.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] for validation, research and synthesis
    /// failures, or [`CompareError::Cancelled`] if `cancel` fires first.
    pub async fn run(
        &self,
        request: &ComparisonRequest,
        cancel: &CancellationToken,
    ) -> Result<ComparisonReport, CompareError> {
        self.execute(request, cancel.clone(), None).await
    }

    /// Like [`Comparator::run`], reporting each state change to `observer`.
    ///
    /// # Errors
    ///
    /// See [`Comparator::run`].
    pub async fn run_observed(
        &self,
        request: &ComparisonRequest,
        cancel: &CancellationToken,
        observer: Observer,
    ) -> Result<ComparisonReport, CompareError> {
        self.execute(request, cancel.clone(), Some(observer)).await
    }

    async fn execute(
        &self,
        request: &ComparisonRequest,
        cancel: CancellationToken,
        observer: Option<Observer>,
    ) -> Result<ComparisonReport, CompareError> {
        let mut ctx = RunContext::new(self.settings.max_additional_searches, cancel, observer);
        let result = self.drive(&mut ctx, request).await;
        match &result {
            Ok(report) => {
                ctx.transition(RunState::Done);
                tracing::info!(
                    run_id = %report.run_id,
                    metrics = report.comparison.metrics.len(),
                    sources = report.sources.len(),
                    follow_ups = report.follow_up_searches,
                    "comparison complete"
                );
            }
            Err(CompareError::Cancelled) => ctx.transition(RunState::Cancelled),
            Err(e) => {
                tracing::warn!(run_id = %ctx.run_id, error = %e, "comparison failed");
                ctx.transition(RunState::Error);
            }
        }
        result
    }

    async fn drive(
        &self,
        ctx: &mut RunContext,
        request: &ComparisonRequest,
    ) -> Result<ComparisonReport, CompareError> {
        let settings = &self.settings;
        let providers = &self.providers;

        ctx.transition(RunState::Validating);
        let request = validate_request(request, settings.limits)?;

        ctx.transition(RunState::Normalizing);
        let corrected = ctx
            .cancellable(correct_spelling(
                &providers.completion,
                &settings.completion_model,
                &request.items,
            ))
            .await?;
        let items: Vec<Item> = request
            .items
            .iter()
            .zip(&corrected)
            .map(|(original, corrected)| Item {
                original: original.clone(),
                corrected: corrected.clone(),
            })
            .collect();

        ctx.transition(RunState::Researching);
        let research = ctx
            .cancellable(research_all(
                &providers.research,
                &settings.research_model,
                &corrected,
            ))
            .await??;
        for result in &research {
            ctx.ingest_research(result);
        }

        ctx.transition(RunState::Synthesizing);
        let mut data = ctx
            .cancellable(synthesize(
                &providers.completion,
                &settings.completion_model,
                settings.json_mode,
                SynthesisInput {
                    items: &corrected,
                    research: &research,
                    custom_params: &request.custom_params,
                    custom_only: request.custom_only,
                },
            ))
            .await??;

        ctx.transition(RunState::Resolving);
        let clients = FollowUpClients {
            research: &providers.research,
            research_model: &settings.research_model,
            completion: &providers.completion,
            completion_model: &settings.completion_model,
        };
        resolve_follow_ups(clients, ctx, &mut data, &corrected).await;
        if ctx.is_cancelled() {
            return Err(CompareError::Cancelled);
        }

        Ok(ComparisonReport {
            run_id: ctx.run_id,
            started_at: ctx.started_at,
            items,
            comparison: data,
            sources: std::mem::take(&mut ctx.sources).into_sources(),
            images: std::mem::take(&mut ctx.images),
            follow_up_searches: ctx.follow_ups.used(),
        })
    }
}

/// Hands out one cancellation token per run and cancels the previous run
/// when a new one begins.
#[derive(Debug, Default)]
pub struct ComparisonSession {
    current: Option<CancellationToken>,
}

impl ComparisonSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any in-flight run and returns the token for the next one.
    pub fn begin(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    /// Cancels the current run, if any.
    pub fn cancel(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
    }
}
