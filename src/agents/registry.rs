//! Agent 注册表
//!
//! 按注册顺序保存 Arc<Agent>（选人时"第一个满足能力的 Agent"依赖该顺序）；同一 id 只能注册一次。

use std::sync::{Arc, RwLock};

use crate::agents::Agent;
use crate::core::HiveError;

#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<Vec<Arc<Agent>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, agent: Agent) -> Result<Arc<Agent>, HiveError> {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        if agents.iter().any(|a| a.id == agent.id) {
            return Err(HiveError::DuplicateAgent(agent.id));
        }
        tracing::debug!(agent = %agent.id, role = %agent.role, "agent registered");
        let agent = Arc::new(agent);
        agents.push(Arc::clone(&agent));
        Ok(agent)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Agent>> {
        self.agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// 按注册顺序返回全部 Agent
    pub fn all(&self) -> Vec<Arc<Agent>> {
        self.agents.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.agents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
