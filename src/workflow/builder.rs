//! 子任务计划构建器
//!
//! 提供流畅的 API 来构建 Plan；依赖只由 chain 生成，总是指向更早的子任务。

use std::collections::HashSet;

use crate::core::HiveError;
use crate::workflow::types::*;

#[derive(Debug, Default)]
pub struct TaskBuilder {
    subtasks: Vec<SubTask>,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加子任务
    pub fn subtask(
        mut self,
        id: impl Into<TaskId>,
        description: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        self.subtasks.push(SubTask::new(id, description, capability));
        self
    }

    /// 把已添加的子任务串成一条链
    pub fn chain(mut self) -> Self {
        for i in 1..self.subtasks.len() {
            let prev = self.subtasks[i - 1].id.clone();
            if !self.subtasks[i].dependencies.contains(&prev) {
                self.subtasks[i].dependencies.push(prev);
            }
        }
        self
    }

    pub fn build(self) -> Result<Plan, HiveError> {
        if self.subtasks.is_empty() {
            return Err(HiveError::InvalidPlan("plan has no subtasks".to_string()));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for task in &self.subtasks {
            if !seen.insert(task.id.as_str()) {
                return Err(HiveError::InvalidPlan(format!("duplicate subtask id {}", task.id)));
            }
        }

        let mut required_capabilities: Vec<String> = Vec::new();
        for task in &self.subtasks {
            if !required_capabilities.contains(&task.capability) {
                required_capabilities.push(task.capability.clone());
            }
        }

        Ok(Plan {
            subtasks: self.subtasks,
            required_capabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chain() {
        let plan = TaskBuilder::new()
            .subtask("s1", "find", "research")
            .subtask("s2", "do", "execution")
            .subtask("s3", "check", "validation")
            .chain()
            .build()
            .expect("valid chain");

        assert_eq!(plan.subtasks.len(), 3);
        assert!(plan.subtasks[0].dependencies.is_empty());
        assert_eq!(plan.subtasks[2].dependencies, vec!["s2"]);
        assert_eq!(plan.required_capabilities, vec!["research", "execution", "validation"]);
    }

    #[test]
    fn test_unchained_subtasks_are_independent() {
        let plan = TaskBuilder::new()
            .subtask("s1", "a", "execution")
            .subtask("s2", "b", "execution")
            .build()
            .expect("valid plan");
        assert!(plan.subtasks.iter().all(|s| s.dependencies.is_empty()));
        assert_eq!(plan.required_capabilities, vec!["execution"]);
    }

    #[test]
    fn test_empty_and_duplicate_rejected() {
        assert!(matches!(TaskBuilder::new().build(), Err(HiveError::InvalidPlan(_))));
        let dup = TaskBuilder::new()
            .subtask("s1", "a", "execution")
            .subtask("s1", "b", "execution")
            .build();
        assert!(dup.is_err());
    }

    #[test]
    fn test_capabilities_deduplicated() {
        let plan = TaskBuilder::new()
            .subtask("s1", "a", "execution")
            .subtask("s2", "b", "execution")
            .build()
            .unwrap();
        assert_eq!(plan.required_capabilities, vec!["execution"]);
    }
}
