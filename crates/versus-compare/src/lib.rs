//! Product comparison pipeline for Versus.
//!
//! Corrects item spelling, researches every item concurrently through a
//! grounded-search provider, synthesizes a structured comparison with a
//! completion provider, and spends a small budget of follow-up searches on
//! winners the synthesis could not settle. [`Comparator`] drives one run;
//! [`report`] turns the result into table, chart and gallery views.

pub mod context;
pub mod error;
pub mod followup;
pub mod input;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod research;
pub mod sources;
pub mod synthesize;
pub mod types;

mod extract;

pub use context::{Observer, Progress, RunState};
pub use error::{CompareError, SynthesisError};
pub use input::ItemLimits;
pub use pipeline::{CompareSettings, Comparator, ComparisonSession, Providers};
pub use types::{
    ComparisonData, ComparisonReport, ComparisonRequest, FollowUpRequest, Item, Metric, Source,
};
