//! Agent 定义：身份、角色、能力集合、可用工具子集、指令与独占记忆
//!
//! 记忆由 tokio Mutex 保护：同一 Agent 被同一波次的多个子任务使用时写入也不会竞争；
//! 调用方只在读写记忆的瞬间持锁，不跨推理或工具调用的 await 持有。
//! 同一波次内同一 Agent 的多个子任务共用工作记忆：目标以最后写入者为准，
//! 按工具名记录的输出也会互相覆盖；各子任务的依赖结果仍通过各自的上下文传入。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::memory::AgentMemory;

pub type AgentId = String;

/// 内置能力标签
pub mod capability {
    pub const RESEARCH: &str = "research";
    pub const EXECUTION: &str = "execution";
    pub const VALIDATION: &str = "validation";
    pub const SYNTHESIS: &str = "synthesis";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Researcher,
    Executor,
    Critic,
    Synthesizer,
    /// 调用方自定义的专家角色
    Specialist,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Researcher => write!(f, "researcher"),
            AgentRole::Executor => write!(f, "executor"),
            AgentRole::Critic => write!(f, "critic"),
            AgentRole::Synthesizer => write!(f, "synthesizer"),
            AgentRole::Specialist => write!(f, "specialist"),
        }
    }
}

pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: AgentRole,
    pub capabilities: BTreeSet<String>,
    /// 该 Agent 可调用的工具名；注册表中不存在的名字会被忽略
    pub tools: Vec<String>,
    pub directive: String,
    memory: Mutex<AgentMemory>,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, role: AgentRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            capabilities: BTreeSet::new(),
            tools: Vec::new(),
            directive: String::new(),
            memory: Mutex::new(AgentMemory::default()),
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(capabilities.into_iter().map(Into::into));
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    pub fn with_memory(mut self, memory: AgentMemory) -> Self {
        self.memory = Mutex::new(memory);
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub async fn memory(&self) -> MutexGuard<'_, AgentMemory> {
        self.memory.lock().await
    }

    /// 一行摘要，供反思 / 日志使用
    pub fn summary(&self) -> String {
        let caps: Vec<&str> = self.capabilities.iter().map(String::as_str).collect();
        format!("{} ({}) [{}]", self.name, self.role, caps.join(", "))
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("capabilities", &self.capabilities)
            .field("tools", &self.tools)
            .finish()
    }
}
