//! Application services: the decision cycle, hedge orchestration, and the
//! per-asset scheduler.

pub mod engine;
pub mod orchestrator;
pub mod scheduler;
pub mod state;

pub use engine::{DecisionEngine, EngineSettings};
pub use orchestrator::{HedgeOrchestrator, HedgeOutcome, HedgeSettings};
pub use scheduler::{Scheduler, SlotOutcome};
pub use state::EngineState;
