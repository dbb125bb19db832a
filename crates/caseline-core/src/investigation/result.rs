//! Investigation result types.
//!
//! Field names mirror the backend's computation payload. Every collection
//! carries `#[serde(default)]`: absence means an empty sequence, never null.

use serde::{Deserialize, Serialize};

/// Success probability breakdown for the user's current strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessProbability {
    /// Raw sustained rate among similar cases.
    #[serde(rename = "base_probability", default)]
    pub base: f64,
    /// Adjustment from the arguments already on file.
    #[serde(default)]
    pub argument_boost: f64,
    /// Combined estimate.
    #[serde(rename = "probability", default)]
    pub combined: f64,
    /// Confidence label derived from sample size ("low", "medium", ...).
    #[serde(default)]
    pub confidence: String,
    /// Number of similar cases behind the estimate.
    #[serde(default)]
    pub sample_size: u32,
    /// How many of those similar cases were sustained.
    #[serde(rename = "sustained_in_similar", default)]
    pub sustained_count: u32,
}

/// A single "add this argument" recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The argument to add.
    #[serde(rename = "add")]
    pub argument: String,
    /// Human-readable impact summary.
    #[serde(default)]
    pub impact: String,
    /// Confidence label for this recommendation.
    #[serde(default)]
    pub confidence: String,
    /// Number of cases supporting it.
    #[serde(default)]
    pub sample_size: u32,
}

/// An argument combination observed in sustained cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningPattern {
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Fraction of cases with this combination that were sustained (0..1).
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub sample_size: u32,
}

/// An association rule mined over the full case corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    /// Arguments on the left-hand side of the rule.
    #[serde(default)]
    pub antecedents: Vec<String>,
    /// Rule confidence (0..1).
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub lift: f64,
    #[serde(default)]
    pub sample_size: u32,
}

/// Everything the backend computation produces for one investigation run.
///
/// Immutable after creation; owned by the active session's investigation
/// context until a new investigation replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationResult {
    pub success_probability: SuccessProbability,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub winning_patterns: Vec<WinningPattern>,
    #[serde(default)]
    pub association_rules: Vec<AssociationRule>,
    /// One-line risk statement for the strategy as currently filed.
    #[serde(default)]
    pub current_strategy_risk: String,
    /// Narrative explanation of the overall result.
    #[serde(default)]
    pub explanation: String,
}
