//! Core data types for the recipe preparation graph.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed input rejected at the boundary, before any graph algorithm runs.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Invalid recipe JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Ingredient at position {0} has an empty id")]
    EmptyIngredientId(usize),
    #[error("Step at position {0} has an empty id")]
    EmptyStepId(usize),
    #[error("Ingredient '{id}' has invalid quantity {quantity} (must be a positive number)")]
    InvalidQuantity { id: String, quantity: f64 },
    #[error("Ingredient '{id}' has unit '{unit}' but no quantity")]
    UnitWithoutQuantity { id: String, unit: String },
}

/// An ingredient extracted upstream. Immutable inside the engine.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    #[serde(default)]
    pub quantity: Option<f64>,
    #[pyo3(get, set)]
    #[serde(default)]
    pub unit: Option<String>,
    #[pyo3(get, set)]
    #[serde(default)]
    pub optional: bool,
}

#[pymethods]
impl Ingredient {
    #[new]
    #[pyo3(signature = (id, quantity=None, unit=None, optional=false))]
    fn new(id: String, quantity: Option<f64>, unit: Option<String>, optional: bool) -> Self {
        Self {
            id,
            quantity,
            unit,
            optional,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Ingredient(id={:?}, quantity={:?}, unit={:?}, optional={})",
            self.id, self.quantity, self.unit, self.optional
        )
    }
}

/// A preparation step and its three relations to ingredients and states.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub action: String,
    /// Raw duration text, usually ISO 8601 ("PT5M")
    #[pyo3(get, set)]
    #[serde(default)]
    pub duration: Option<String>,
    #[pyo3(get, set)]
    #[serde(default)]
    pub is_passive: bool,
    /// Ingredient ids or state ids consumed by this step
    #[pyo3(get, set)]
    #[serde(default)]
    pub uses: Vec<String>,
    /// State created by this step (None for equipment-only steps)
    #[pyo3(get, set)]
    #[serde(default)]
    pub produces: Option<String>,
    /// States that must exist but are not consumed
    #[pyo3(get, set)]
    #[serde(default)]
    pub requires: Vec<String>,
}

impl Step {
    /// The produced state, treating an empty string as "produces nothing".
    pub fn produced_state(&self) -> Option<&str> {
        self.produces.as_deref().filter(|s| !s.is_empty())
    }
}

#[pymethods]
impl Step {
    #[new]
    #[pyo3(signature = (
        id,
        action,
        uses=Vec::new(),
        produces=None,
        requires=Vec::new(),
        duration=None,
        is_passive=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: String,
        action: String,
        uses: Vec<String>,
        produces: Option<String>,
        requires: Vec<String>,
        duration: Option<String>,
        is_passive: bool,
    ) -> Self {
        Self {
            id,
            action,
            duration,
            is_passive,
            uses,
            produces,
            requires,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Step(id={:?}, uses={}, produces={:?}, requires={}, duration={:?})",
            self.id,
            self.uses.len(),
            self.produces,
            self.requires.len(),
            self.duration
        )
    }
}

/// A whole recipe graph as emitted by the upstream structuring stage.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeGraph {
    #[pyo3(get, set)]
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[pyo3(get, set)]
    #[serde(default)]
    pub steps: Vec<Step>,
    #[pyo3(get, set)]
    pub final_state: String,
}

impl RecipeGraph {
    /// Parse the upstream JSON shape and check field-level constraints.
    pub fn from_json(payload: &str) -> Result<Self, InputError> {
        let mut graph: RecipeGraph = serde_json::from_str(payload)?;
        for step in &mut graph.steps {
            if step.produces.as_deref() == Some("") {
                step.produces = None;
            }
        }
        graph.check_fields()?;
        Ok(graph)
    }

    pub fn to_json(&self) -> Result<String, InputError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Field-level checks that do not need the graph structure.
    ///
    /// Structural problems (unknown references, cycles, ...) are left to the validator.
    pub fn check_fields(&self) -> Result<(), InputError> {
        for (pos, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.id.is_empty() {
                return Err(InputError::EmptyIngredientId(pos));
            }
            match (ingredient.quantity, &ingredient.unit) {
                (Some(q), _) if !q.is_finite() || q <= 0.0 => {
                    return Err(InputError::InvalidQuantity {
                        id: ingredient.id.clone(),
                        quantity: q,
                    });
                }
                (None, Some(unit)) => {
                    return Err(InputError::UnitWithoutQuantity {
                        id: ingredient.id.clone(),
                        unit: unit.clone(),
                    });
                }
                _ => {}
            }
        }
        for (pos, step) in self.steps.iter().enumerate() {
            if step.id.is_empty() {
                return Err(InputError::EmptyStepId(pos));
            }
        }
        Ok(())
    }
}

#[pymethods]
impl RecipeGraph {
    #[new]
    #[pyo3(signature = (ingredients, steps, final_state))]
    fn new(ingredients: Vec<Ingredient>, steps: Vec<Step>, final_state: String) -> Self {
        Self {
            ingredients,
            steps,
            final_state,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "RecipeGraph(ingredients={}, steps={}, final_state={:?})",
            self.ingredients.len(),
            self.steps.len(),
            self.final_state
        )
    }
}
