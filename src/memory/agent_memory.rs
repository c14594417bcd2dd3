//! 四层记忆聚合：单个 Agent 独占的短期 / 工作 / 情景 / 长期记忆
//!
//! export / import 是唯一的持久化边界；工作记忆是任务级草稿，不参与导出。

use serde::{Deserialize, Serialize};

use crate::config::MemorySection;
use crate::memory::{
    Episode, EpisodicMemory, LongTermExport, LongTermMemory, Message, ShortTermMemory,
    WorkingMemory,
};

#[derive(Debug, Clone)]
pub struct AgentMemory {
    pub short_term: ShortTermMemory,
    pub working: WorkingMemory,
    pub episodic: EpisodicMemory,
    pub long_term: LongTermMemory,
}

/// 单个 Agent 的记忆导出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMemoryExport {
    pub short_term: Vec<Message>,
    pub long_term: LongTermExport,
    pub episodic: Vec<Episode>,
}

impl AgentMemory {
    pub fn new(short_term_capacity: usize, episodic_cap: usize, episodic_keep: usize) -> Self {
        Self {
            short_term: ShortTermMemory::new(short_term_capacity),
            working: WorkingMemory::new(),
            episodic: EpisodicMemory::new(episodic_cap, episodic_keep),
            long_term: LongTermMemory::new(),
        }
    }

    pub fn from_config(cfg: &MemorySection) -> Self {
        Self::new(cfg.short_term_capacity, cfg.episodic_cap, cfg.episodic_keep)
    }

    /// 新子任务开始：清空草稿区并设置目标
    pub fn begin_task(&mut self, goal: &str) {
        self.working.clear();
        self.working.set_goal(goal);
    }

    pub fn export(&self) -> AgentMemoryExport {
        AgentMemoryExport {
            short_term: self.short_term.messages().to_vec(),
            long_term: self.long_term.export(),
            episodic: self.episodic.episodes().to_vec(),
        }
    }

    pub fn import(&mut self, export: AgentMemoryExport) {
        self.short_term.set_messages(export.short_term);
        self.long_term.import(export.long_term);
        self.episodic.set_episodes(export.episodic);
    }
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self::from_config(&MemorySection::default())
    }
}
