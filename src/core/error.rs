//! 引擎错误类型与恢复动作
//!
//! 与 RecoveryEngine 配合：根据 HiveError 决定 Retry / Abort。

use thiserror::Error;

use crate::core::state::TaskStatus;

/// 协作任务执行过程中可能出现的错误（工具、推理后端、取消、超时、审批等）
#[derive(Error, Debug)]
pub enum HiveError {
    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// 推理后端（Reasoner）返回的错误
    #[error("Reasoner error: {0}")]
    Reasoner(String),

    #[error("Cancelled")]
    Cancelled,

    /// 调用方设置的整体超时已到
    #[error("Task timed out after {0} ms")]
    Timeout(u64),

    #[error("Approval rejected: {0}")]
    ApprovalRejected(String),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Agent already registered: {0}")]
    DuplicateAgent(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Memory import failed: {0}")]
    MemoryImport(String),
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// 原样重试（如工具超时、偶发失败）
    Retry,
    /// 不再重试，错误交回调用方
    Abort,
}
