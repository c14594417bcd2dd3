//! 情景记忆：已完成子任务的执行记录（Episode）
//!
//! 按时间顺序追加；长度超过 cap（默认 100）时只保留最近 keep（默认 50）条。

use serde::{Deserialize, Serialize};

pub const DEFAULT_EPISODIC_CAP: usize = 100;
pub const DEFAULT_EPISODIC_KEEP: usize = 50;

/// 子任务执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
    /// 步数预算耗尽，仅得到尽力而为的答案
    Partial,
}

/// 一次子任务执行记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub task: String,
    pub actions: Vec<String>,
    pub outcome: Outcome,
    pub timestamp: i64,
    pub reflection: String,
}

impl Episode {
    pub fn new(task: impl Into<String>, actions: Vec<String>, outcome: Outcome) -> Self {
        Self {
            id: format!("ep_{}", uuid::Uuid::new_v4()),
            task: task.into(),
            actions,
            outcome,
            timestamp: chrono::Utc::now().timestamp_millis(),
            reflection: String::new(),
        }
    }

    pub fn with_reflection(mut self, reflection: impl Into<String>) -> Self {
        self.reflection = reflection.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct EpisodicMemory {
    episodes: Vec<Episode>,
    cap: usize,
    keep: usize,
}

impl EpisodicMemory {
    pub fn new(cap: usize, keep: usize) -> Self {
        let cap = cap.max(1);
        Self {
            episodes: Vec::new(),
            cap,
            keep: keep.clamp(1, cap),
        }
    }

    pub fn push(&mut self, episode: Episode) {
        self.episodes.push(episode);
        self.enforce_cap();
    }

    /// 超过 cap 时裁剪为最近 keep 条；返回被丢弃的条数
    pub fn enforce_cap(&mut self) -> usize {
        if self.episodes.len() <= self.cap {
            return 0;
        }
        let dropped = self.episodes.len() - self.keep;
        self.episodes.drain(..dropped);
        dropped
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn set_episodes(&mut self, episodes: Vec<Episode>) {
        self.episodes = episodes;
        self.enforce_cap();
    }

    pub fn last(&self) -> Option<&Episode> {
        self.episodes.last()
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

impl Default for EpisodicMemory {
    fn default() -> Self {
        Self::new(DEFAULT_EPISODIC_CAP, DEFAULT_EPISODIC_KEEP)
    }
}
