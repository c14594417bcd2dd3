//! 核心编排层：错误与恢复、任务状态机、审批检查点、协作编排器

pub mod approval;
pub mod error;
pub mod orchestrator;
pub mod recovery;
pub mod state;

pub use approval::{ApprovalDecision, ApprovalGate, AutoApprove, MaxSubtasks};
pub use error::{HiveError, RecoveryAction};
pub use orchestrator::{CollaborativeResult, ExecuteOptions, Orchestrator};
pub use recovery::RecoveryEngine;
pub use state::TaskStatus;
