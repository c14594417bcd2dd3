//! 审批检查点
//!
//! require_approval 时，编排器在选好 Agent、分配好子任务之后、开始执行之前调用 ApprovalGate。

use async_trait::async_trait;

use crate::workflow::CollaborativeTask;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved,
    Rejected(String),
}

#[async_trait]
pub trait ApprovalGate: Send + Sync {
    async fn review(&self, task: &CollaborativeTask) -> ApprovalDecision;
}

/// 一律放行
#[derive(Debug, Default, Clone)]
pub struct AutoApprove;

#[async_trait]
impl ApprovalGate for AutoApprove {
    async fn review(&self, _task: &CollaborativeTask) -> ApprovalDecision {
        ApprovalDecision::Approved
    }
}

/// 子任务数超过上限时拒绝
#[derive(Debug, Clone)]
pub struct MaxSubtasks(pub usize);

#[async_trait]
impl ApprovalGate for MaxSubtasks {
    async fn review(&self, task: &CollaborativeTask) -> ApprovalDecision {
        if task.subtasks.len() > self.0 {
            ApprovalDecision::Rejected(format!(
                "plan has {} subtasks, limit is {}",
                task.subtasks.len(),
                self.0
            ))
        } else {
            ApprovalDecision::Approved
        }
    }
}
