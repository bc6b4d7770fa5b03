//! Rust implementation of the recipe preparation graph engine.
//!
//! Identifier normalization, fuzzy reference repair, structural validation and
//! critical path timing for recipe graphs, exposed to Python as `recipe_graph.rust`.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashSet;

pub mod logging;

mod config;
pub mod critical_path;
pub mod duration;
pub mod graph;
pub mod matcher;
mod models;
pub mod normalize;
pub mod pipeline;
pub mod repair;
pub mod validate;

pub use config::{ConfigError, EngineConfig, UnitConfig};
pub use critical_path::{calculate_critical_path, RecipeTimes, SchedulingError, StepTiming};
pub use graph::{CycleError, StepGraph, StepIndex};
pub use models::{Ingredient, InputError, RecipeGraph, Step};
pub use pipeline::{process_recipe, ProcessReport};
pub use repair::{repair_graph, repair_references, Correction, RefField, RepairReport, UnresolvedRef};
pub use validate::{validate, ValidGraph, Violation, ViolationKind};

fn input_err(e: InputError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Resolve the optional config, rejecting bad fallback durations set from Python.
fn engine_config(config: Option<EngineConfig>) -> PyResult<EngineConfig> {
    let config = config.unwrap_or_default();
    config
        .check()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(config)
}

fn report_to_json(report: &ProcessReport) -> PyResult<String> {
    serde_json::to_string(report).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Build a snake_case identifier from a display name.
#[pyfunction]
#[pyo3(name = "make_id")]
fn py_make_id(name: &str) -> String {
    normalize::make_id(name)
}

/// Build identifiers for a list of names, suffixing collisions with `_1`, `_2`, ...
#[pyfunction]
#[pyo3(name = "make_ids")]
fn py_make_ids(names: Vec<String>) -> Vec<String> {
    normalize::make_ids(&names)
}

/// Normalize a unit phrase to its canonical short form.
///
/// # Arguments
/// * `raw` - Unit phrase as written ("heaped tablespoons", "Cups")
/// * `units` - Unit tables (defaults to the built-in tables)
#[pyfunction]
#[pyo3(name = "normalize_unit", signature = (raw, units=None))]
fn py_normalize_unit(raw: &str, units: Option<UnitConfig>) -> String {
    normalize::normalize_unit(raw, &units.unwrap_or_default())
}

/// Levenshtein distance between two strings, counted in characters.
#[pyfunction]
#[pyo3(name = "levenshtein")]
fn py_levenshtein(a: &str, b: &str) -> usize {
    matcher::levenshtein(a, b)
}

/// Closest valid id within `max_distance` edits, or None.
#[pyfunction]
#[pyo3(name = "fuzzy_match", signature = (reference, valid_ids, max_distance=matcher::DEFAULT_MAX_DISTANCE))]
fn py_fuzzy_match(
    reference: &str,
    valid_ids: HashSet<String>,
    max_distance: usize,
) -> Option<String> {
    matcher::fuzzy_match(reference, &valid_ids, max_distance).map(str::to_string)
}

/// Parse an ISO 8601 or free-text duration into minutes. Returns None when unparseable.
#[pyfunction]
#[pyo3(name = "parse_duration_minutes")]
fn py_parse_duration_minutes(text: &str) -> Option<f64> {
    duration::parse_duration_minutes(text)
}

/// Render minutes as an ISO 8601 duration ("PT1H30M").
#[pyfunction]
#[pyo3(name = "minutes_to_iso8601")]
fn py_minutes_to_iso8601(minutes: f64) -> String {
    duration::minutes_to_iso8601(minutes)
}

/// Repair, validate and schedule a recipe graph.
///
/// The graph's step references are corrected in place.
///
/// # Returns
/// * JSON report `{corrections, unresolved, violations, times, valid}`
///
/// # Raises
/// * ValueError if a field is malformed or a fallback duration is negative or not finite
/// * RuntimeError if scheduling fails on a graph that passed validation
#[pyfunction]
#[pyo3(name = "process_recipe", signature = (graph, config=None))]
fn py_process_recipe(
    mut graph: PyRefMut<'_, RecipeGraph>,
    config: Option<EngineConfig>,
) -> PyResult<String> {
    graph.check_fields().map_err(input_err)?;
    let config = engine_config(config)?;
    let report = process_recipe(&mut graph, &config)
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
    report_to_json(&report)
}

/// Same as `process_recipe`, taking the upstream JSON graph directly.
#[pyfunction]
#[pyo3(name = "process_recipe_json", signature = (payload, config=None))]
fn py_process_recipe_json(payload: &str, config: Option<EngineConfig>) -> PyResult<String> {
    let mut graph = RecipeGraph::from_json(payload).map_err(input_err)?;
    let config = engine_config(config)?;
    let report = process_recipe(&mut graph, &config)
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
    report_to_json(&report)
}

/// The recipe_graph.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Ingredient>()?;
    m.add_class::<Step>()?;
    m.add_class::<RecipeGraph>()?;

    // Config types
    m.add_class::<EngineConfig>()?;
    m.add_class::<UnitConfig>()?;

    // Identifier and unit helpers
    m.add_function(wrap_pyfunction!(py_make_id, m)?)?;
    m.add_function(wrap_pyfunction!(py_make_ids, m)?)?;
    m.add_function(wrap_pyfunction!(py_normalize_unit, m)?)?;
    m.add_function(wrap_pyfunction!(py_levenshtein, m)?)?;
    m.add_function(wrap_pyfunction!(py_fuzzy_match, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_duration_minutes, m)?)?;
    m.add_function(wrap_pyfunction!(py_minutes_to_iso8601, m)?)?;

    // Pipeline
    m.add_function(wrap_pyfunction!(py_process_recipe, m)?)?;
    m.add_function(wrap_pyfunction!(py_process_recipe_json, m)?)?;

    Ok(())
}
