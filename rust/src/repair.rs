//! Reference repair pass.
//!
//! Rewrites near-miss `uses`/`requires` references in place before validation.
//! The pass never fails: every reference ends up either untouched, corrected
//! (logged in `corrections`) or left verbatim for the validator to report
//! (logged in `unresolved`).

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::log_changes;
use crate::matcher::fuzzy_match;
use crate::models::{RecipeGraph, Step};

/// Which step relation a reference came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefField {
    Uses,
    Requires,
}

impl std::fmt::Display for RefField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefField::Uses => write!(f, "uses"),
            RefField::Requires => write!(f, "requires"),
        }
    }
}

/// A reference rewritten to its nearest valid identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub step_id: String,
    pub field: RefField,
    pub original: String,
    pub corrected: String,
}

/// A reference with no valid identifier within the distance bound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedRef {
    pub step_id: String,
    pub field: RefField,
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Outcome of one repair pass over all steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RepairReport {
    pub corrections: Vec<Correction>,
    pub unresolved: Vec<UnresolvedRef>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty() && self.unresolved.is_empty()
    }
}

/// Repair one list of references against `valid`, in place.
fn repair_field(
    step_id: &str,
    field: RefField,
    refs: &mut [String],
    valid: &FxHashSet<String>,
    config: &EngineConfig,
    report: &mut RepairReport,
) {
    for reference in refs.iter_mut() {
        if valid.contains(reference.as_str()) {
            continue;
        }
        match fuzzy_match(reference, valid, config.max_fuzzy_distance) {
            Some(matched) => {
                log_changes!(
                    config.verbosity,
                    "Auto-corrected step '{}' {}: '{}' -> '{}'",
                    step_id,
                    field,
                    reference,
                    matched
                );
                report.corrections.push(Correction {
                    step_id: step_id.to_string(),
                    field,
                    original: std::mem::replace(reference, matched.to_string()),
                    corrected: matched.to_string(),
                });
            }
            None => {
                log_changes!(
                    config.verbosity,
                    "Step '{}' {} unknown id '{}', no close match found",
                    step_id,
                    field,
                    reference
                );
                report.unresolved.push(UnresolvedRef {
                    step_id: step_id.to_string(),
                    field,
                    reference: reference.clone(),
                });
            }
        }
    }
}

/// Repair every step's references.
///
/// `uses` references are matched against ingredient ids and state ids together,
/// `requires` references against state ids only. All steps are processed even
/// when early ones leave references unresolved.
pub fn repair_references(
    steps: &mut [Step],
    ingredient_ids: &FxHashSet<String>,
    state_ids: &FxHashSet<String>,
    config: &EngineConfig,
) -> RepairReport {
    let all_valid: FxHashSet<String> = ingredient_ids.union(state_ids).cloned().collect();
    let mut report = RepairReport::default();

    for step in steps.iter_mut() {
        repair_field(
            &step.id,
            RefField::Uses,
            &mut step.uses,
            &all_valid,
            config,
            &mut report,
        );
        repair_field(
            &step.id,
            RefField::Requires,
            &mut step.requires,
            state_ids,
            config,
            &mut report,
        );
    }

    if !report.corrections.is_empty() {
        log_changes!(
            config.verbosity,
            "Fuzzy matching corrected {} reference(s), {} left unresolved",
            report.corrections.len(),
            report.unresolved.len()
        );
    }

    report
}

/// Repair a whole graph, taking the valid identifiers from the graph itself.
pub fn repair_graph(graph: &mut RecipeGraph, config: &EngineConfig) -> RepairReport {
    let ingredient_ids: FxHashSet<String> =
        graph.ingredients.iter().map(|i| i.id.clone()).collect();
    let state_ids: FxHashSet<String> = graph
        .steps
        .iter()
        .filter_map(|s| s.produced_state())
        .map(str::to_string)
        .collect();
    repair_references(&mut graph.steps, &ingredient_ids, &state_ids, config)
}
