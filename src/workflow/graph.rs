//! 子任务依赖图
//!
//! 使用邻接表和入度表：就绪集合 = 依赖全部 Completed 的 Pending 子任务；
//! Kahn 拓扑排序找出永远无法就绪的子任务（环或未知依赖）。

use std::collections::{HashMap, VecDeque};

use crate::core::TaskStatus;
use crate::workflow::types::*;

pub struct DependencyGraph {
    /// 邻接表：子任务 ID -> 依赖该子任务的子任务列表
    pub adjacency: HashMap<TaskId, Vec<TaskId>>,
    /// 入度表：子任务 ID -> 依赖数（含未知依赖）
    pub in_degree: HashMap<TaskId, usize>,
}

impl DependencyGraph {
    pub fn new(subtasks: &[SubTask]) -> Self {
        let mut adjacency: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        let mut in_degree: HashMap<TaskId, usize> = HashMap::new();

        for task in subtasks {
            in_degree.insert(task.id.clone(), task.dependencies.len());
            adjacency.entry(task.id.clone()).or_default();
        }
        for task in subtasks {
            for dep in &task.dependencies {
                adjacency.entry(dep.clone()).or_default().push(task.id.clone());
            }
        }

        Self { adjacency, in_degree }
    }

    /// 当前可执行的子任务下标（保持列表顺序）
    pub fn ready(&self, subtasks: &[SubTask]) -> Vec<usize> {
        let status: HashMap<&str, TaskStatus> =
            subtasks.iter().map(|t| (t.id.as_str(), t.status)).collect();
        subtasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == TaskStatus::Pending)
            .filter(|(_, t)| {
                t.dependencies
                    .iter()
                    .all(|d| status.get(d.as_str()) == Some(&TaskStatus::Completed))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// 永远无法被调度的子任务（处于环中、依赖环或依赖未知 ID）
    pub fn unschedulable(&self) -> Vec<TaskId> {
        let mut degree = self.in_degree.clone();
        let mut queue: VecDeque<TaskId> = degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| id.clone())
            .collect();

        while let Some(id) = queue.pop_front() {
            if let Some(dependents) = self.adjacency.get(&id) {
                for dependent in dependents {
                    if let Some(d) = degree.get_mut(dependent) {
                        *d -= 1;
                        if *d == 0 {
                            queue.push_back(dependent.clone());
                        }
                    }
                }
            }
        }

        let mut stuck: Vec<TaskId> = degree
            .into_iter()
            .filter(|(_, d)| *d > 0)
            .map(|(id, _)| id)
            .collect();
        stuck.sort();
        stuck
    }
}
