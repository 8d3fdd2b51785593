//! Score Combiner — weighted linear combination of criterion sub-scores.
//!
//! final = Σ weight[c] × score[c], summed in `Criterion::ALL` order so identical inputs are
//! bitwise-identical. No renormalisation and no clamping.

use thiserror::Error;

use crate::ranking::models::{Criterion, CriterionScores, CriterionWeights, ErrorKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombineError {
    #[error("criterion '{}' has a non-zero weight but no usable score", .0.as_str())]
    IncompleteScoring(Criterion),

    #[error("weighted sum overflowed to {0}")]
    NonFiniteTotal(f64),
}

impl CombineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CombineError::IncompleteScoring(_) | CombineError::NonFiniteTotal(_) => {
                ErrorKind::IncompleteScoring
            }
        }
    }
}

/// Combines sub-scores into one final score.
///
/// A zero-weighted criterion is never read, so a missing or NaN score there cannot affect the
/// result. A weighted criterion whose score is missing or non-finite fails the whole candidate,
/// as does a sum that overflows.
pub fn combine(scores: &CriterionScores, weights: &CriterionWeights) -> Result<f64, CombineError> {
    let mut total = 0.0_f64;
    for (criterion, weight) in weights.active() {
        let score = scores
            .get(criterion)
            .filter(|s| s.is_finite())
            .ok_or(CombineError::IncompleteScoring(criterion))?;
        total += weight * score;
    }
    if !total.is_finite() {
        return Err(CombineError::NonFiniteTotal(total));
    }
    Ok(total)
}
