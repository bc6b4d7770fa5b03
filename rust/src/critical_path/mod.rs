//! Critical path timing for validated recipe graphs.
//!
//! Total time is the longest duration-weighted path ending at the step that
//! produces the final state. Active and passive time partition that path.

mod calculation;
mod types;

pub use calculation::{calculate_critical_path, SchedulingError};
pub use types::{RecipeTimes, StepTiming};
