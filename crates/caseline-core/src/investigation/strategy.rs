//! Strategy option builder.
//!
//! Turns an [`InvestigationResult`] into a ranked, padded list of at most
//! four presentable options. Pure and deterministic: the same result always
//! produces the same options in the same order.

use super::result::{AssociationRule, InvestigationResult, Recommendation, WinningPattern};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of options the builder returns.
pub const MAX_STRATEGY_OPTIONS: usize = 4;

/// What kind of evidence an option is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyOptionKind {
    Recommendation,
    WinningPattern,
    AssociationRule,
    RiskAssessment,
}

/// Structured detail backing the pros/cons/required-evidence breakdown.
///
/// Rendering rules for this detail are presentational and live outside the
/// core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDetail {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub required_evidence: Vec<String>,
}

/// One ranked, presentable strategy option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOption {
    pub kind: StrategyOptionKind,
    pub title: String,
    /// Impact / confidence summary line.
    pub summary: String,
    pub sample_size: u32,
    pub detail: OptionDetail,
}

/// Formats a 0..1 fraction as a whole percentage.
fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn from_recommendation(rec: &Recommendation) -> StrategyOption {
    StrategyOption {
        kind: StrategyOptionKind::Recommendation,
        title: format!("Add the '{}' argument", rec.argument),
        summary: format!("{} ({} confidence)", rec.impact, rec.confidence),
        sample_size: rec.sample_size,
        detail: OptionDetail {
            pros: vec![
                format!("'{}' correlates with sustained outcomes in similar cases", rec.argument),
                rec.impact.clone(),
            ],
            cons: vec![format!(
                "Based on {} similar cases; outcomes vary with case specifics",
                rec.sample_size
            )],
            required_evidence: vec![format!(
                "Documentation supporting the '{}' argument",
                rec.argument
            )],
        },
    }
}

fn from_pattern(pattern: &WinningPattern) -> StrategyOption {
    let combo = pattern.arguments.join(" + ");
    StrategyOption {
        kind: StrategyOptionKind::WinningPattern,
        title: format!("Argue {combo} together"),
        summary: format!("{} success rate in sustained cases", percent(pattern.success_rate)),
        sample_size: pattern.sample_size,
        detail: OptionDetail {
            pros: vec![format!(
                "The combination {combo} appears in {} of sustained appeals",
                percent(pattern.success_rate)
            )],
            cons: vec!["Requires building every argument in the combination".to_string()],
            required_evidence: pattern
                .arguments
                .iter()
                .map(|a| format!("Evidence for '{a}'"))
                .collect(),
        },
    }
}

fn from_rule(rule: &AssociationRule) -> StrategyOption {
    let lhs = rule.antecedents.join(" + ");
    StrategyOption {
        kind: StrategyOptionKind::AssociationRule,
        title: format!("Lean on {lhs}"),
        summary: format!("{} rule confidence across the full corpus", percent(rule.confidence)),
        sample_size: rule.sample_size,
        detail: OptionDetail {
            pros: vec![format!(
                "{lhs} predicts a sustained outcome with {} confidence",
                percent(rule.confidence)
            )],
            cons: vec!["Corpus-wide correlation; not specific to your fact pattern".to_string()],
            required_evidence: rule
                .antecedents
                .iter()
                .map(|a| format!("Evidence for '{a}'"))
                .collect(),
        },
    }
}

fn risk_assessment(result: &InvestigationResult) -> StrategyOption {
    let prob = &result.success_probability;
    let risk = if result.current_strategy_risk.is_empty() {
        "unassessed".to_string()
    } else {
        result.current_strategy_risk.clone()
    };
    StrategyOption {
        kind: StrategyOptionKind::RiskAssessment,
        title: "Stand on the current strategy".to_string(),
        summary: format!(
            "{} estimated success (base {}, argument boost +{}); risk: {risk}",
            percent(prob.combined),
            percent(prob.base),
            percent(prob.argument_boost),
        ),
        sample_size: prob.sample_size,
        detail: OptionDetail {
            pros: vec!["No additional filings or evidence required".to_string()],
            cons: vec![
                format!(
                    "{} of {} similar cases were sustained as filed",
                    prob.sustained_count, prob.sample_size
                ),
                format!("Assessed risk: {risk}"),
            ],
            required_evidence: Vec::new(),
        },
    }
}

/// Builds the ranked, padded option list for an investigation result.
///
/// Construction order:
/// 1. First recommendation, if any.
/// 2. First winning pattern, if any.
/// 3. First association rule, if any.
/// 4. A risk assessment of the current strategy, always.
///
/// If fewer than four options exist, the list is padded from the unused
/// recommendations, then the unused association rules, until four options
/// are reached or both sources are exhausted. The result always holds
/// between 1 and [`MAX_STRATEGY_OPTIONS`] options.
pub fn build_strategy_options(result: &InvestigationResult) -> Vec<StrategyOption> {
    let mut options = Vec::with_capacity(MAX_STRATEGY_OPTIONS);

    if let Some(rec) = result.recommendations.first() {
        options.push(from_recommendation(rec));
    }
    if let Some(pattern) = result.winning_patterns.first() {
        options.push(from_pattern(pattern));
    }
    if let Some(rule) = result.association_rules.first() {
        options.push(from_rule(rule));
    }
    options.push(risk_assessment(result));

    // Pad: unused recommendations first, then unused rules.
    let mut spare_recs = result.recommendations.iter().skip(1);
    let mut spare_rules = result.association_rules.iter().skip(1);
    while options.len() < MAX_STRATEGY_OPTIONS {
        if let Some(rec) = spare_recs.next() {
            options.push(from_recommendation(rec));
        } else if let Some(rule) = spare_rules.next() {
            options.push(from_rule(rule));
        } else {
            break;
        }
    }

    options
}
