//! Detectors run by the rule engine.
//!
//! - `behavior_change`: non-exempt files whose edits alter runtime behavior
//! - `invariant_violation`: removed exported declarations

pub mod behavior_change;
pub mod invariant_violation;

pub use behavior_change::{detect_behavior_change, BehaviorChangeResult, BehaviorFinding};
pub use invariant_violation::{detect_invariant_violations, INVARIANT_VIOLATION_RULE};
