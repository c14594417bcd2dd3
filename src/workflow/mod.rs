//! 任务层：规划、子任务 DAG 与按波次的依赖感知调度

pub mod builder;
pub mod graph;
pub mod planner;
pub mod scheduler;
pub mod types;

pub use builder::TaskBuilder;
pub use graph::DependencyGraph;
pub use planner::{default_plan, infer_capability, TaskPlanner};
pub use scheduler::{ScheduleReport, Scheduler, ORCHESTRATOR};
pub use types::{CollaborativeTask, Plan, SubTask, TaskId};
