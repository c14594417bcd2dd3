//! Hive - Rust 多智能体协作任务引擎
//!
//! 模块划分：
//! - **agents**: Agent 定义、注册表、默认阵容与能力选择器
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误与恢复、任务状态机、审批检查点、协作编排器
//! - **llm**: Reasoner 抽象与 Mock 实现
//! - **memory**: 短期 / 工作 / 情景 / 长期记忆与持久化
//! - **messaging**: Agent 间消息日志
//! - **observability**: tracing 初始化
//! - **react**: ReAct 推理引擎
//! - **review**: 综合、校验、反思与记忆沉淀
//! - **tools**: Tool trait、注册表、执行器与内置工具
//! - **workflow**: 任务规划、子任务 DAG 与波次调度

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod messaging;
pub mod observability;
pub mod react;
pub mod review;
pub mod tools;
pub mod workflow;

pub use crate::core::{CollaborativeResult, ExecuteOptions, HiveError, Orchestrator};
