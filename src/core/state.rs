//! 协作任务状态机
//!
//! Pending -> InProgress -> Completed | Failed；终态不可再变，状态不回退。
//! 允许 Pending -> Failed（如审批被拒，任务尚未开始执行即终止）。

use serde::{Deserialize, Serialize};

use crate::core::HiveError;

/// 协作任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::Pending, TaskStatus::Failed)
                | (TaskStatus::InProgress, TaskStatus::Completed)
                | (TaskStatus::InProgress, TaskStatus::Failed)
        )
    }

    /// 校验并返回下一状态；非法迁移返回 InvalidTransition
    pub fn transition(self, next: TaskStatus) -> Result<TaskStatus, HiveError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HiveError::InvalidTransition { from: self, to: next })
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}
