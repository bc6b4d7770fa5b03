use pretty_assertions::assert_eq;
use std::collections::HashSet;

use recipe_graph::matcher::fuzzy_match;
use recipe_graph::{
    process_recipe, repair_graph, validate, Correction, EngineConfig, RecipeGraph, RefField,
    ViolationKind,
};

const SEARED_CHICKEN: &str = r#"{
    "ingredients": [
        {"id": "chicken_thighs", "quantity": 4, "unit": "piece", "optional": false},
        {"id": "salt", "quantity": null, "unit": null, "optional": false}
    ],
    "steps": [
        {"id": "season", "action": "Season the chicken thighs", "duration": "PT2M",
         "isPassive": false, "uses": ["chicken_thighs", "salt"], "produces": "seasoned", "requires": []},
        {"id": "sear", "action": "Sear skin side down", "duration": "PT8M",
         "isPassive": false, "uses": ["seasoned"], "produces": "final_dish", "requires": []}
    ],
    "finalState": "final_dish"
}"#;

fn seared_chicken() -> RecipeGraph {
    RecipeGraph::from_json(SEARED_CHICKEN).unwrap()
}

#[test]
fn seared_chicken_end_to_end() {
    let mut graph = seared_chicken();
    let report = process_recipe(&mut graph, &EngineConfig::default()).unwrap();

    assert!(report.valid);
    assert!(report.violations.is_empty());
    assert!(report.corrections.is_empty());
    let times = report.times.unwrap();
    assert_eq!(times.total_time_minutes, 10.0);
    assert_eq!(times.total_active_time_minutes, 10.0);
    assert_eq!(times.total_passive_time_minutes, 0.0);
    assert_eq!(times.total_time, "PT10M");
    assert_eq!(times.total_passive_time, "PT0M");
}

#[test]
fn typo_is_repaired_then_validates() {
    let mut graph = seared_chicken();
    graph.steps[1].uses = vec!["seasonned".to_string()];
    let config = EngineConfig::default();

    let repair = repair_graph(&mut graph, &config);
    assert_eq!(
        repair.corrections,
        vec![Correction {
            step_id: "sear".to_string(),
            field: RefField::Uses,
            original: "seasonned".to_string(),
            corrected: "seasoned".to_string(),
        }]
    );
    assert!(validate(&graph, &config).is_ok());

    // Second pass over the repaired graph has nothing left to fix
    assert!(repair_graph(&mut graph, &config).corrections.is_empty());
}

#[test]
fn unused_required_ingredient_is_named() {
    let mut graph = seared_chicken();
    graph.ingredients.push(recipe_graph::Ingredient {
        id: "pepper".to_string(),
        quantity: None,
        unit: None,
        optional: false,
    });

    let violations = validate(&graph, &EngineConfig::default()).unwrap_err();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::UnusedRequiredIngredient);
    assert_eq!(violations[0].subject.as_deref(), Some("pepper"));
}

#[test]
fn optional_ingredient_may_go_unused() {
    let mut graph = seared_chicken();
    graph.ingredients.push(recipe_graph::Ingredient {
        id: "parsley".to_string(),
        quantity: None,
        unit: None,
        optional: true,
    });
    assert!(validate(&graph, &EngineConfig::default()).is_ok());
}

#[test]
fn two_step_cycle_reported_once() {
    let payload = r#"{
        "ingredients": [],
        "steps": [
            {"id": "a", "action": "stir", "uses": ["s2"], "produces": "s1"},
            {"id": "b", "action": "fold", "uses": ["s1"], "produces": "s2"}
        ],
        "finalState": "s2"
    }"#;
    let mut graph = RecipeGraph::from_json(payload).unwrap();
    let report = process_recipe(&mut graph, &EngineConfig::default()).unwrap();

    let cycles: Vec<_> = report
        .violations
        .iter()
        .filter(|v| v.kind == ViolationKind::CycleDetected)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert!(!report.valid);
    assert!(report.times.is_none());
}

#[test]
fn fuzzy_match_distance_bound() {
    let valid: HashSet<String> = ["onion", "garlic"].iter().map(|s| s.to_string()).collect();
    assert_eq!(fuzzy_match("oinion", &valid, 3), Some("onion"));
    assert_eq!(fuzzy_match("xyz123", &valid, 3), None);
}

#[test]
fn empty_recipe_reports_final_state_not_produced() {
    let mut graph = RecipeGraph::from_json(r#"{"finalState": "dish"}"#).unwrap();
    let report = process_recipe(&mut graph, &EngineConfig::default()).unwrap();

    let kinds: Vec<ViolationKind> = report.violations.iter().map(|v| v.kind).collect();
    assert_eq!(kinds, vec![ViolationKind::FinalStateNotProduced]);
}

#[test]
fn unit_without_quantity_rejected_at_boundary() {
    let payload = r#"{
        "ingredients": [{"id": "salt", "quantity": null, "unit": "pinch"}],
        "steps": [],
        "finalState": "dish"
    }"#;
    assert!(RecipeGraph::from_json(payload).is_err());
}

#[test]
fn linear_chain_total_is_steps_times_duration() {
    let n = 5;
    let steps: Vec<String> = (0..n)
        .map(|i| {
            let uses = if i == 0 {
                "\"stock\"".to_string()
            } else {
                format!("\"reduced_{}\"", i - 1)
            };
            format!(
                r#"{{"id": "reduce_{i}", "action": "Reduce", "duration": "PT6M", "isPassive": true,
                    "uses": [{uses}], "produces": "reduced_{i}"}}"#
            )
        })
        .collect();
    let payload = format!(
        r#"{{"ingredients": [{{"id": "stock", "quantity": 1, "unit": "l"}}],
            "steps": [{}], "finalState": "reduced_{}"}}"#,
        steps.join(","),
        n - 1
    );

    let mut graph = RecipeGraph::from_json(&payload).unwrap();
    let report = process_recipe(&mut graph, &EngineConfig::default()).unwrap();
    let times = report.times.unwrap();
    assert_eq!(times.total_time_minutes, 30.0);
    assert_eq!(times.total_passive_time_minutes, 30.0);
    assert_eq!(times.critical_path.len(), n);
}
