//! 协作任务类型定义
//!
//! CollaborativeTask 由一组 SubTask 组成；子任务依赖只能指向同一任务中更早的子任务（由 TaskBuilder 保证）。

use serde::{Deserialize, Serialize};

use crate::agents::{AgentId, Selection};
use crate::core::{HiveError, TaskStatus};

pub type TaskId = String;

/// 子任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: TaskId,
    pub description: String,
    /// 执行该子任务所需的能力
    pub capability: String,
    pub assigned_to: Option<AgentId>,
    pub status: TaskStatus,
    pub dependencies: Vec<TaskId>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl SubTask {
    pub fn new(
        id: impl Into<TaskId>,
        description: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            capability: capability.into(),
            assigned_to: None,
            status: TaskStatus::Pending,
            dependencies: Vec::new(),
            result: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// 状态迁移并记录开始 / 结束时间
    pub fn set_status(&mut self, next: TaskStatus) -> Result<(), HiveError> {
        self.status = self.status.transition(next)?;
        let now = chrono::Utc::now().timestamp_millis();
        match next {
            TaskStatus::InProgress => self.started_at = Some(now),
            TaskStatus::Completed | TaskStatus::Failed => self.completed_at = Some(now),
            TaskStatus::Pending => {}
        }
        Ok(())
    }
}

/// 规划结果：非空子任务 DAG 与所需能力（按首次出现顺序去重）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub subtasks: Vec<SubTask>,
    pub required_capabilities: Vec<String>,
}

/// 协作任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeTask {
    pub id: TaskId,
    pub description: String,
    /// 任务类别，用作经验记忆的键
    pub category: String,
    pub required_capabilities: Vec<String>,
    pub assigned_agents: Vec<AgentId>,
    pub status: TaskStatus,
    pub subtasks: Vec<SubTask>,
    pub result: Option<String>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl CollaborativeTask {
    pub fn new(description: impl Into<String>, category: impl Into<String>, plan: Plan) -> Self {
        Self {
            id: format!("task_{}", uuid::Uuid::new_v4()),
            description: description.into(),
            category: category.into(),
            required_capabilities: plan.required_capabilities,
            assigned_agents: Vec::new(),
            status: TaskStatus::Pending,
            subtasks: plan.subtasks,
            result: None,
            created_at: chrono::Utc::now().timestamp_millis(),
            started_at: None,
            completed_at: None,
        }
    }

    /// 状态只前进不回退；非法迁移返回 InvalidTransition
    pub fn set_status(&mut self, next: TaskStatus) -> Result<(), HiveError> {
        self.status = self.status.transition(next)?;
        let now = chrono::Utc::now().timestamp_millis();
        match next {
            TaskStatus::InProgress => self.started_at = Some(now),
            TaskStatus::Completed | TaskStatus::Failed => self.completed_at = Some(now),
            TaskStatus::Pending => {}
        }
        Ok(())
    }

    /// 按能力分配子任务；无人具备的能力交给 synthesizer
    pub fn assign(&mut self, selection: &Selection) {
        self.assigned_agents = selection.agent_ids();
        let fallback = selection
            .synthesizer()
            .or_else(|| selection.agents.first())
            .map(|a| a.id.clone());
        for subtask in &mut self.subtasks {
            subtask.assigned_to = selection
                .agent_for(&subtask.capability)
                .map(|a| a.id.clone())
                .or_else(|| fallback.clone());
        }
    }

    pub fn subtask(&self, id: &str) -> Option<&SubTask> {
        self.subtasks.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{default_roster, AgentSelector};
    use crate::config::MemorySection;
    use std::sync::Arc;

    fn plan() -> Plan {
        Plan {
            subtasks: vec![
                SubTask::new("s1", "look it up", "research"),
                SubTask::new("s2", "translate it", "translation").with_dependencies(["s1"]),
            ],
            required_capabilities: vec!["research".into(), "translation".into()],
        }
    }

    #[test]
    fn test_status_timestamps() {
        let mut task = CollaborativeTask::new("demo", "demo", plan());
        assert!(task.started_at.is_none());
        task.set_status(TaskStatus::InProgress).unwrap();
        assert!(task.started_at.is_some());
        task.set_status(TaskStatus::Completed).unwrap();
        assert!(task.completed_at.is_some());
        assert!(task.set_status(TaskStatus::InProgress).is_err());
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_assign_falls_back_to_synthesizer() {
        let agents: Vec<_> = default_roster(&MemorySection::default())
            .into_iter()
            .map(Arc::new)
            .collect();
        let mut task = CollaborativeTask::new("demo", "demo", plan());
        let selection = AgentSelector::new(5).select(&agents, &task.required_capabilities);
        task.assign(&selection);

        assert_eq!(task.subtasks[0].assigned_to.as_deref(), Some("researcher"));
        assert_eq!(task.subtasks[1].assigned_to.as_deref(), Some("synthesizer"));
        assert_eq!(task.assigned_agents, vec!["researcher", "synthesizer"]);
    }
}
