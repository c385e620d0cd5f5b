pub mod actuator;
pub mod evaluator;

pub use actuator::{AlertActuator, AlertPulse, LogActuator};
pub use evaluator::{evaluate, AlertDecision, AlertReason};
