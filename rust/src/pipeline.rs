//! Repair, validate and schedule in one call.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::critical_path::{calculate_critical_path, RecipeTimes, SchedulingError};
use crate::log_changes;
use crate::models::RecipeGraph;
use crate::repair::{repair_graph, Correction, UnresolvedRef};
use crate::validate::{validate, Violation};

/// Everything one pass over a recipe graph found out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessReport {
    pub corrections: Vec<Correction>,
    pub unresolved: Vec<UnresolvedRef>,
    pub violations: Vec<Violation>,
    /// Present only when the repaired graph validated.
    pub times: Option<RecipeTimes>,
    pub valid: bool,
}

/// Repair `recipe` in place, validate it, and schedule it when valid.
///
/// Violations are returned as data. An invalid config or a scheduler contract
/// failure is an `Err`, and an invalid config is rejected before the graph is touched.
pub fn process_recipe(
    recipe: &mut RecipeGraph,
    config: &EngineConfig,
) -> Result<ProcessReport, SchedulingError> {
    config.check()?;
    let repair = repair_graph(recipe, config);

    let (violations, times) = match validate(recipe, config) {
        Ok(valid) => (Vec::new(), Some(calculate_critical_path(&valid, config)?)),
        Err(violations) => {
            log_changes!(
                config.verbosity,
                "Recipe graph has {} violation(s), skipping scheduling",
                violations.len()
            );
            (violations, None)
        }
    };

    Ok(ProcessReport {
        corrections: repair.corrections,
        unresolved: repair.unresolved,
        valid: violations.is_empty(),
        violations,
        times,
    })
}
