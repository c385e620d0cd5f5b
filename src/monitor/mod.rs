pub mod context;
pub mod loop_worker;
pub mod state;

pub use context::MonitoringContext;
pub use loop_worker::{LoopTiming, MonitoringLoop, Ports, SlowCycle};
pub use state::MonitorState;
