//! 认知层：ReAct 推理引擎、推理步骤与过程事件

pub mod events;
pub mod loop_;
pub mod step;

pub use events::ReactEvent;
pub use loop_::{ReasoningEngine, ReasoningOutcome, DEFAULT_STEP_BUDGET};
pub use step::{ReasoningStep, StepKind};
