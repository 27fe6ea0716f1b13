//! Effective context budget calculation.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::util::pattern_matches;

/// Fraction of the context window reserved for prompt scaffolding and the
/// model's response when nothing else is configured.
pub const DEFAULT_OVERHEAD_FACTOR: f64 = 0.15;

/// Check that an overhead factor leaves some room for content.
///
/// Accepts values in `[0.0, 1.0)`.
pub fn validate_overhead_factor(factor: f64) -> Result<f64> {
    if !factor.is_finite() || !(0.0..1.0).contains(&factor) {
        anyhow::bail!(
            "Overhead factor must be at least 0.0 and below 1.0, got {}",
            factor
        );
    }
    Ok(factor)
}

/// Tokens left for file content once `overhead_factor` is reserved.
pub fn effective_budget(context_window: usize, overhead_factor: f64) -> usize {
    (context_window as f64 * (1.0 - overhead_factor)).floor() as usize
}

/// Overhead factors per review type.
///
/// Overrides are glob patterns over the review type name. When several
/// patterns match, the one added last wins.
#[derive(Debug, Clone, PartialEq)]
pub struct OverheadPolicy {
    default_factor: f64,
    overrides: Vec<(String, f64)>,
}

impl OverheadPolicy {
    /// Create a policy with a default factor.
    pub fn new(default_factor: f64) -> Result<Self> {
        Ok(Self {
            default_factor: validate_overhead_factor(default_factor)?,
            overrides: Vec::new(),
        })
    }

    /// Add an override for review types matching `pattern`.
    pub fn with_override(mut self, pattern: impl Into<String>, factor: f64) -> Result<Self> {
        self.overrides
            .push((pattern.into(), validate_overhead_factor(factor)?));
        Ok(self)
    }

    /// The factor that applies to `review_type`.
    pub fn factor_for(&self, review_type: &str) -> f64 {
        self.overrides
            .iter()
            .rev()
            .find(|(pattern, _)| pattern_matches(pattern, review_type))
            .map(|(_, factor)| *factor)
            .unwrap_or(self.default_factor)
    }

    pub fn default_factor(&self) -> f64 {
        self.default_factor
    }
}

impl Default for OverheadPolicy {
    fn default() -> Self {
        Self {
            default_factor: DEFAULT_OVERHEAD_FACTOR,
            overrides: Vec::new(),
        }
    }
}

/// The budget a single analysis runs under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBudget {
    /// Raw context window of the model.
    pub context_window: usize,
    /// Whether the window came from the model registry rather than the default.
    pub known_model: bool,
    pub overhead_factor: f64,
    pub effective_budget: usize,
}

impl ContextBudget {
    pub fn new(context_window: usize, known_model: bool, overhead_factor: f64) -> Self {
        Self {
            context_window,
            known_model,
            overhead_factor,
            effective_budget: effective_budget(context_window, overhead_factor),
        }
    }

    /// Whether `tokens` fit in a single pass.
    pub fn fits(&self, tokens: usize) -> bool {
        tokens <= self.effective_budget
    }

    /// `tokens` as a fraction of the effective budget.
    pub fn utilization(&self, tokens: usize) -> f64 {
        tokens as f64 / self.effective_budget.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_budget() {
        assert_eq!(effective_budget(10_000, 0.15), 8_500);
        assert_eq!(effective_budget(1_000_000, DEFAULT_OVERHEAD_FACTOR), 850_000);
        assert_eq!(effective_budget(100, 0.0), 100);
        assert_eq!(effective_budget(0, 0.5), 0);
    }

    #[test]
    fn test_validate_overhead_factor() {
        assert!(validate_overhead_factor(0.0).is_ok());
        assert!(validate_overhead_factor(0.15).is_ok());
        assert!(validate_overhead_factor(0.99).is_ok());
        assert!(validate_overhead_factor(1.0).is_err());
        assert!(validate_overhead_factor(-0.1).is_err());
        assert!(validate_overhead_factor(f64::NAN).is_err());
    }

    #[test]
    fn test_policy_default() {
        let policy = OverheadPolicy::default();
        assert_eq!(policy.factor_for("quick-fixes"), DEFAULT_OVERHEAD_FACTOR);
    }

    #[test]
    fn test_policy_overrides_last_match_wins() {
        let policy = OverheadPolicy::new(0.1)
            .unwrap()
            .with_override("arch*", 0.25)
            .unwrap()
            .with_override("architectural", 0.3)
            .unwrap();

        assert_eq!(policy.factor_for("architectural"), 0.3);
        assert_eq!(policy.factor_for("arch-deep"), 0.25);
        assert_eq!(policy.factor_for("security"), 0.1);
    }

    #[test]
    fn test_policy_rejects_invalid_factor() {
        assert!(OverheadPolicy::new(1.5).is_err());
        assert!(OverheadPolicy::default().with_override("x", 1.0).is_err());
    }

    #[test]
    fn test_context_budget() {
        let budget = ContextBudget::new(10_000, true, 0.15);
        assert_eq!(budget.effective_budget, 8_500);
        assert!(budget.fits(8_500));
        assert!(!budget.fits(8_501));
        assert!((budget.utilization(4_250) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_budget_utilization_is_finite() {
        let budget = ContextBudget::new(0, false, 0.15);
        assert!(budget.utilization(10).is_finite());
    }
}
