//! Input collection and validation.

use crate::error::CompareError;
use crate::types::ComparisonRequest;

/// Bounds on how many items one comparison may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self { min: 2, max: 5 }
    }
}

/// Trims names and parameters, drops blanks, and checks the item count.
///
/// # Errors
///
/// Returns [`CompareError::TooFewItems`] or [`CompareError::TooManyItems`]
/// when the number of non-blank items is outside `limits`.
pub fn validate_request(
    request: &ComparisonRequest,
    limits: ItemLimits,
) -> Result<ComparisonRequest, CompareError> {
    let items = non_blank(&request.items);
    if items.len() < limits.min {
        return Err(CompareError::TooFewItems {
            min: limits.min,
            got: items.len(),
        });
    }
    if items.len() > limits.max {
        return Err(CompareError::TooManyItems {
            max: limits.max,
            got: items.len(),
        });
    }

    Ok(ComparisonRequest {
        items,
        custom_params: non_blank(&request.custom_params),
        custom_only: request.custom_only,
    })
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}
