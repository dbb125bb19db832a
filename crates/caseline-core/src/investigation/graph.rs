//! Supporting graph data for the investigation narrative.
//!
//! Fetched once per investigation attempt, used only to animate and phrase
//! the scripted steps, and discarded afterwards. When the fetch times out or
//! fails, a synthetic placeholder stands in; that degradation is cosmetic and
//! is never surfaced as an error.

use serde::{Deserialize, Serialize};

/// A prior case in the similarity graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Decision outcome ("SUSTAINED", "DISMISSED", ...), if known.
    #[serde(default)]
    pub outcome: Option<String>,
}

/// Profile extracted from the user's uploaded documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseProfile {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_type: String,
    #[serde(default)]
    pub rfe_issues: Vec<String>,
}

/// A snapshot of comparable prior cases and their similarity relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<CaseNode>,
    /// Similarity edges between case ids.
    #[serde(default)]
    pub edges: Vec<(String, String)>,
    /// Ids of the cases closest to the user's.
    #[serde(default)]
    pub similar_ids: Vec<String>,
    /// The node representing the user's own case.
    pub user_node: CaseNode,
}

impl GraphSnapshot {
    /// Synthetic snapshot used when the real fetch times out or fails.
    pub fn placeholder() -> Self {
        let outcomes = [
            Some("SUSTAINED"),
            Some("DISMISSED"),
            Some("DISMISSED"),
            Some("SUSTAINED"),
            Some("DISMISSED"),
            None,
        ];
        let nodes: Vec<CaseNode> = outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| CaseNode {
                id: format!("placeholder-{i}"),
                label: format!("Comparable case {}", i + 1),
                outcome: outcome.map(str::to_string),
            })
            .collect();
        let user_node = CaseNode {
            id: "user".to_string(),
            label: "Your case".to_string(),
            outcome: None,
        };
        let edges = nodes
            .iter()
            .map(|n| (user_node.id.clone(), n.id.clone()))
            .collect();
        let similar_ids = nodes.iter().map(|n| n.id.clone()).collect();
        Self {
            nodes,
            edges,
            similar_ids,
            user_node,
        }
    }

    /// Counts `(sustained, total)` outcomes among the similar cases.
    ///
    /// Cases without a recorded outcome count toward the total.
    pub fn similar_outcome_counts(&self) -> (usize, usize) {
        let similar: Vec<&CaseNode> = self
            .nodes
            .iter()
            .filter(|n| self.similar_ids.contains(&n.id))
            .collect();
        let sustained = similar
            .iter()
            .filter(|n| n.outcome.as_deref() == Some("SUSTAINED"))
            .count();
        (sustained, similar.len())
    }
}
