//! Structural validation of a repaired recipe graph.
//!
//! Every check runs and every problem is collected, so one report covers the
//! whole graph. A graph with no violations is handed back as a [`ValidGraph`],
//! the only input the critical path scheduler accepts.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::graph::{StepGraph, StepIndex};
use crate::models::RecipeGraph;
use crate::{log_changes, log_checks};

/// Machine-readable violation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    DuplicateStepId,
    DuplicateIngredientId,
    DuplicateProduces,
    MissingProduces,
    EmptyUsesOnNonEquipmentStep,
    UnknownUsesRef,
    UnknownRequiresRef,
    UnusedRequiredIngredient,
    OrphanState,
    FinalStateNotProduced,
    CycleDetected,
}

/// One broken invariant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    /// Offending step, when the violation belongs to one.
    pub step_id: Option<String>,
    /// Offending reference, state or ingredient id.
    pub subject: Option<String>,
    pub detail: String,
}

/// A recipe graph that passed validation, with its dependency structure.
///
/// Only [`validate`] can build one.
#[derive(Debug)]
pub struct ValidGraph<'g> {
    recipe: &'g RecipeGraph,
    graph: StepGraph,
    order: Vec<StepIndex>,
    equipment: Vec<bool>,
}

impl<'g> ValidGraph<'g> {
    pub fn recipe(&self) -> &'g RecipeGraph {
        self.recipe
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// Steps in dependency order.
    pub fn topological_order(&self) -> &[StepIndex] {
        &self.order
    }

    pub fn is_equipment_step(&self, step: StepIndex) -> bool {
        self.equipment[step]
    }
}

#[cfg(test)]
impl<'g> ValidGraph<'g> {
    /// Wrap a graph without running any check. A cycle leaves the order empty.
    pub(crate) fn unchecked(recipe: &'g RecipeGraph, config: &EngineConfig) -> Self {
        let graph = StepGraph::build(&recipe.steps);
        let order = graph.topological_order().unwrap_or_default();
        let equipment = recipe
            .steps
            .iter()
            .map(|s| config.is_equipment_action(&s.action))
            .collect();
        Self {
            recipe,
            graph,
            order,
            equipment,
        }
    }
}

struct Collector {
    violations: Vec<Violation>,
    verbosity: u8,
}

impl Collector {
    fn record(
        &mut self,
        kind: ViolationKind,
        step_id: Option<&str>,
        subject: Option<&str>,
        detail: String,
    ) {
        log_checks!(self.verbosity, "{:?}: {}", kind, detail);
        self.violations.push(Violation {
            kind,
            step_id: step_id.map(str::to_string),
            subject: subject.map(str::to_string),
            detail,
        });
    }
}

/// Validate a repaired graph.
///
/// # Returns
/// * `Ok(ValidGraph)` when every invariant holds
/// * `Err(violations)` listing every broken invariant, in check order
pub fn validate<'g>(
    recipe: &'g RecipeGraph,
    config: &EngineConfig,
) -> Result<ValidGraph<'g>, Vec<Violation>> {
    let mut out = Collector {
        violations: Vec::new(),
        verbosity: config.verbosity,
    };
    let steps = &recipe.steps;
    let graph = StepGraph::build(steps);
    let equipment: Vec<bool> = steps
        .iter()
        .map(|s| config.is_equipment_action(&s.action))
        .collect();

    // Identity: unique step ids and ingredient ids
    let mut seen_steps: FxHashSet<&str> = FxHashSet::default();
    for step in steps {
        if !seen_steps.insert(step.id.as_str()) {
            out.record(
                ViolationKind::DuplicateStepId,
                Some(step.id.as_str()),
                None,
                format!("Step id '{}' is used by more than one step.", step.id),
            );
        }
    }
    let mut ingredient_ids: FxHashSet<&str> = FxHashSet::default();
    for ingredient in &recipe.ingredients {
        if !ingredient_ids.insert(ingredient.id.as_str()) {
            out.record(
                ViolationKind::DuplicateIngredientId,
                None,
                Some(ingredient.id.as_str()),
                format!("Ingredient id '{}' is declared more than once.", ingredient.id),
            );
        }
    }

    // 1. Each state is produced once; non-equipment steps must produce something
    for (idx, step) in steps.iter().enumerate() {
        match step.produced_state() {
            Some(state) => {
                if let Some(first) = graph.producer_of(state).filter(|&first| first != idx) {
                    out.record(
                        ViolationKind::DuplicateProduces,
                        Some(step.id.as_str()),
                        Some(state),
                        format!(
                            "Duplicate state: '{}' is produced by both step '{}' and '{}'.",
                            state, steps[first].id, step.id
                        ),
                    );
                }
            }
            None if !equipment[idx] => out.record(
                ViolationKind::MissingProduces,
                Some(step.id.as_str()),
                None,
                format!(
                    "Step '{}' produces no state but is not an equipment step.",
                    step.id
                ),
            ),
            None => {}
        }
    }

    // 2. Empty uses only on equipment steps
    for (idx, step) in steps.iter().enumerate() {
        if step.uses.is_empty() && !equipment[idx] {
            out.record(
                ViolationKind::EmptyUsesOnNonEquipmentStep,
                Some(step.id.as_str()),
                None,
                format!(
                    "Step '{}' has empty `uses` but is not an equipment step.",
                    step.id
                ),
            );
        }
    }

    // 3. uses -> ingredient or produced state
    for step in steps {
        for reference in &step.uses {
            if !ingredient_ids.contains(reference.as_str()) && !graph.is_produced(reference) {
                out.record(
                    ViolationKind::UnknownUsesRef,
                    Some(step.id.as_str()),
                    Some(reference.as_str()),
                    format!(
                        "Step '{}' uses '{}' which is neither an ingredient id nor a produced state.",
                        step.id, reference
                    ),
                );
            }
        }
    }

    // 4. requires -> produced state
    for step in steps {
        for reference in &step.requires {
            if !graph.is_produced(reference) {
                out.record(
                    ViolationKind::UnknownRequiresRef,
                    Some(step.id.as_str()),
                    Some(reference.as_str()),
                    format!(
                        "Step '{}' requires '{}' which is not produced by any step.",
                        step.id, reference
                    ),
                );
            }
        }
    }

    // 5. Every non-optional ingredient is used
    let used: FxHashSet<&str> = steps
        .iter()
        .flat_map(|s| s.uses.iter())
        .map(String::as_str)
        .filter(|r| ingredient_ids.contains(r))
        .collect();
    let mut reported: FxHashSet<&str> = FxHashSet::default();
    for ingredient in &recipe.ingredients {
        let id = ingredient.id.as_str();
        if !ingredient.optional && !used.contains(id) && reported.insert(id) {
            out.record(
                ViolationKind::UnusedRequiredIngredient,
                None,
                Some(id),
                format!("Ingredient '{}' is not referenced in any step's `uses`.", id),
            );
        }
    }

    // 6. Every produced state is consumed or is the final state
    let consumed: FxHashSet<&str> = steps
        .iter()
        .flat_map(|s| s.uses.iter().chain(s.requires.iter()))
        .map(String::as_str)
        .filter(|r| graph.is_produced(r))
        .collect();
    for (idx, step) in steps.iter().enumerate() {
        let Some(state) = step.produced_state() else {
            continue;
        };
        // Report each orphan once, against its first producer
        if graph.producer_of(state) != Some(idx) {
            continue;
        }
        if !consumed.contains(state) && state != recipe.final_state {
            out.record(
                ViolationKind::OrphanState,
                Some(step.id.as_str()),
                Some(state),
                format!(
                    "State '{}' produced by step '{}' is never consumed and is not the final state.",
                    state, step.id
                ),
            );
        }
    }

    // 7. Final state is produced
    if !graph.is_produced(&recipe.final_state) {
        out.record(
            ViolationKind::FinalStateNotProduced,
            None,
            Some(recipe.final_state.as_str()),
            format!(
                "finalState '{}' is not produced by any step.",
                recipe.final_state
            ),
        );
    }

    // 8. Acyclic
    let order = match graph.topological_order() {
        Ok(order) => order,
        Err(cycle) => {
            let representative = cycle.cycle.first().copied().unwrap_or(cycle.unsorted[0]);
            let names: Vec<&str> = cycle.cycle.iter().map(|&i| steps[i].id.as_str()).collect();
            out.record(
                ViolationKind::CycleDetected,
                Some(steps[representative].id.as_str()),
                None,
                format!(
                    "Circular dependency through steps [{}] ({} step(s) cannot be ordered).",
                    names.join(" <- "),
                    cycle.unsorted.len()
                ),
            );
            Vec::new()
        }
    };

    if !out.violations.is_empty() {
        log_changes!(
            config.verbosity,
            "Graph validation failed with {} violation(s)",
            out.violations.len()
        );
        return Err(out.violations);
    }

    log_changes!(
        config.verbosity,
        "Graph validated: {} steps, {} ingredients",
        steps.len(),
        recipe.ingredients.len()
    );
    Ok(ValidGraph {
        recipe,
        graph,
        order,
        equipment,
    })
}
