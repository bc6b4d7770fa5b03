//! Types for critical path scheduling.

use serde::Serialize;

use crate::duration::minutes_to_iso8601;

/// Per-step timing from the forward and backward passes, in minutes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTiming {
    pub step_id: String,
    pub duration_minutes: f64,
    pub is_passive: bool,
    /// Earliest possible start time (from forward pass).
    pub earliest_start: f64,
    /// Earliest possible finish time (from forward pass).
    pub earliest_finish: f64,
    /// Latest allowable start time (from backward pass).
    pub latest_start: f64,
    /// Latest allowable finish time (from backward pass).
    pub latest_finish: f64,
    /// Slack = latest_start - earliest_start.
    pub slack: f64,
    /// Whether the step lies on the reconstructed critical path.
    pub on_critical_path: bool,
}

impl StepTiming {
    pub fn has_slack(&self) -> bool {
        // Allow small epsilon for floating point comparison
        self.slack > 1e-9
    }
}

/// Recipe-level timing derived from the critical path.
///
/// Serializes to the recipe metadata shape (`totalTime`, `totalActiveTime`, ...).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeTimes {
    pub total_time: String,
    pub total_active_time: String,
    pub total_passive_time: String,
    pub total_time_minutes: f64,
    pub total_active_time_minutes: f64,
    pub total_passive_time_minutes: f64,
    /// Step ids on the critical path, first step first.
    pub critical_path: Vec<String>,
    /// Timing for every step, in recipe step order.
    pub step_timings: Vec<StepTiming>,
}

impl RecipeTimes {
    pub fn new(
        total_minutes: f64,
        active_minutes: f64,
        passive_minutes: f64,
        critical_path: Vec<String>,
        step_timings: Vec<StepTiming>,
    ) -> Self {
        Self {
            total_time: minutes_to_iso8601(total_minutes),
            total_active_time: minutes_to_iso8601(active_minutes),
            total_passive_time: minutes_to_iso8601(passive_minutes),
            total_time_minutes: total_minutes,
            total_active_time_minutes: active_minutes,
            total_passive_time_minutes: passive_minutes,
            critical_path,
            step_timings,
        }
    }

    /// Timing entry for a step id.
    pub fn timing(&self, step_id: &str) -> Option<&StepTiming> {
        self.step_timings.iter().find(|t| t.step_id == step_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_times_iso_rendering() {
        let times = RecipeTimes::new(90.0, 20.0, 70.0, vec![], vec![]);
        assert_eq!(times.total_time, "PT1H30M");
        assert_eq!(times.total_active_time, "PT20M");
        assert_eq!(times.total_passive_time, "PT1H10M");
    }

    #[test]
    fn test_step_timing_slack() {
        let timing = StepTiming {
            earliest_start: 0.0,
            earliest_finish: 5.0,
            latest_start: 0.0,
            latest_finish: 5.0,
            slack: 0.0,
            ..StepTiming::default()
        };
        assert!(!timing.has_slack());

        let timing_with_slack = StepTiming {
            slack: 2.0,
            ..timing
        };
        assert!(timing_with_slack.has_slack());
    }

    #[test]
    fn test_serialized_keys() {
        let times = RecipeTimes::new(10.0, 10.0, 0.0, vec!["sear".to_string()], vec![]);
        let json = serde_json::to_value(&times).unwrap();
        assert_eq!(json["totalTime"], "PT10M");
        assert_eq!(json["totalActiveTimeMinutes"], 10.0);
        assert_eq!(json["totalPassiveTime"], "PT0M");
        assert_eq!(json["criticalPath"][0], "sear");
    }
}
