//! Critical path calculation using forward and backward passes.
//!
//! The forward pass is the longest-path recurrence over the topological order:
//! `earliest_finish[s] = duration[s] + max(earliest_finish[p] for p in preds(s))`.
//! The step producing the final state terminates the recipe; walking its
//! critical predecessors back to a root gives the critical path, whose
//! durations split into active and passive time.

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::duration::parse_duration_minutes;
use crate::graph::StepIndex;
use crate::validate::ValidGraph;
use crate::{log_checks, log_debug};

use super::types::{RecipeTimes, StepTiming};

/// Errors that can occur during critical path scheduling.
///
/// These are contract violations. `TerminalStepMissing` cannot be reached
/// through [`crate::validate::validate`], which rejects a graph whose final
/// state has no producer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("No step produces the final state '{0}'")]
    TerminalStepMissing(String),
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Resolve each step's duration in minutes, applying the configured fallbacks.
fn step_durations(valid: &ValidGraph<'_>, config: &EngineConfig) -> Vec<f64> {
    valid
        .recipe()
        .steps
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let parsed = step.duration.as_deref().and_then(parse_duration_minutes);
            match parsed {
                Some(minutes) => minutes,
                None => {
                    let fallback = if valid.is_equipment_step(idx) {
                        config.equipment_step_minutes
                    } else {
                        config.default_step_minutes
                    };
                    log_checks!(
                        config.verbosity,
                        "Step '{}' has no usable duration ({:?}), assuming {} min",
                        step.id,
                        step.duration,
                        fallback
                    );
                    fallback
                }
            }
        })
        .collect()
}

/// Compute total, active and passive time for a validated recipe graph.
///
/// # Returns
/// * `Ok(RecipeTimes)` with totals, ISO 8601 renderings, the critical path and per-step timings
/// * `Err(SchedulingError::TerminalStepMissing)` if no step produces the final state
/// * `Err(SchedulingError::InvalidConfig)` if a fallback duration is negative or not finite
pub fn calculate_critical_path(
    valid: &ValidGraph<'_>,
    config: &EngineConfig,
) -> Result<RecipeTimes, SchedulingError> {
    config.check()?;

    let recipe = valid.recipe();
    let graph = valid.graph();
    let steps = &recipe.steps;
    let n = steps.len();

    let terminal = graph
        .producer_of(&recipe.final_state)
        .ok_or_else(|| SchedulingError::TerminalStepMissing(recipe.final_state.clone()))?;

    let durations = step_durations(valid, config);

    // Forward pass: earliest start/finish and critical predecessor
    let mut earliest_start = vec![0.0_f64; n];
    let mut earliest_finish = vec![0.0_f64; n];
    let mut critical_pred: Vec<Option<StepIndex>> = vec![None; n];

    for &step in valid.topological_order() {
        let mut start = 0.0;
        let mut chosen = None;
        // Predecessors are ascending, strict > keeps the earliest-listed one on ties
        for &pred in graph.predecessors(step) {
            if chosen.is_none() || earliest_finish[pred] > start {
                start = earliest_finish[pred];
                chosen = Some(pred);
            }
        }
        earliest_start[step] = start;
        earliest_finish[step] = start + durations[step];
        critical_pred[step] = chosen;

        log_debug!(
            config.verbosity,
            "ef[{}] = {} + {} (via {:?})",
            steps[step].id,
            start,
            durations[step],
            chosen.map(|p| steps[p].id.as_str())
        );
    }

    let total = earliest_finish[terminal];

    // Backward pass: latest start/finish (reverse topological order)
    let mut latest_finish = vec![total; n];
    let mut latest_start = vec![0.0_f64; n];
    for &step in valid.topological_order().iter().rev() {
        let mut finish = f64::MAX;
        for &succ in graph.successors(step) {
            if latest_start[succ] < finish {
                finish = latest_start[succ];
            }
        }
        if finish == f64::MAX {
            // No dependents: may finish as late as the recipe itself
            finish = total.max(earliest_finish[step]);
        }
        latest_finish[step] = finish;
        latest_start[step] = finish - durations[step];
    }

    // Reconstruct the critical path from the terminal step
    let mut path: Vec<StepIndex> = Vec::new();
    let mut current = Some(terminal);
    while let Some(step) = current {
        path.push(step);
        current = critical_pred[step];
    }
    path.reverse();

    let mut on_path = vec![false; n];
    let (mut active, mut passive) = (0.0, 0.0);
    for &step in &path {
        on_path[step] = true;
        if steps[step].is_passive {
            passive += durations[step];
        } else {
            active += durations[step];
        }
    }

    let step_timings: Vec<StepTiming> = (0..n)
        .map(|idx| StepTiming {
            step_id: steps[idx].id.clone(),
            duration_minutes: durations[idx],
            is_passive: steps[idx].is_passive,
            earliest_start: earliest_start[idx],
            earliest_finish: earliest_finish[idx],
            latest_start: latest_start[idx],
            latest_finish: latest_finish[idx],
            slack: latest_start[idx] - earliest_start[idx],
            on_critical_path: on_path[idx],
        })
        .collect();

    let critical_path: Vec<String> = path.iter().map(|&i| steps[i].id.clone()).collect();

    Ok(RecipeTimes::new(
        total,
        active,
        passive,
        critical_path,
        step_timings,
    ))
}
