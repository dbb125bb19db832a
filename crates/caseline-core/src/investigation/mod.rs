//! Investigation domain module.
//!
//! Types produced by the backend's strategy computation, the transient graph
//! snapshot used to drive the scripted narrative, and the deterministic
//! strategy option builder.

mod graph;
mod result;
mod strategy;

pub use graph::{CaseNode, CaseProfile, GraphSnapshot};
pub use result::{
    AssociationRule, InvestigationResult, Recommendation, SuccessProbability, WinningPattern,
};
pub use strategy::{
    MAX_STRATEGY_OPTIONS, OptionDetail, StrategyOption, StrategyOptionKind, build_strategy_options,
};
