//! 推理后端层：Reasoner 抽象、默认占位策略与 Mock 实现

pub mod mock;
pub mod traits;

pub use mock::MockReasoner;
pub use traits::{
    confidence_heuristic, normalize_confidence, sufficiency_heuristic, Context, Reasoner, ToolCall,
};
