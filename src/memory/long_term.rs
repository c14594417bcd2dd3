//! 长期记忆：事实（facts）、任务经验（experiences）、学习条目（learnings）
//!
//! 三张按键索引的表；经验按粗粒度任务类型累积计数，学习条目每次任务完成追加一条。
//! recall(query, k) 按关键词重叠检索学习条目与经验摘要，供推理时注入上下文。

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::normalize_confidence;

/// 每类经验保留的 patterns / pitfalls 条数
pub const MAX_EXPERIENCE_NOTES: usize = 20;

/// 某类任务的滚动统计（只更新，不替换）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskExperience {
    pub success_count: u64,
    pub failure_count: u64,
    /// 平均耗时（毫秒）
    pub average_duration_ms: f64,
    pub patterns: Vec<String>,
    pub pitfalls: Vec<String>,
}

impl TaskExperience {
    pub fn total_runs(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// 记录一次运行：计数 + 滚动平均耗时
    pub fn record_run(&mut self, passed: bool, duration_ms: u64) {
        if passed {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        let n = self.total_runs() as f64;
        self.average_duration_ms += (duration_ms as f64 - self.average_duration_ms) / n;
    }

    pub fn add_pattern(&mut self, note: impl Into<String>) {
        push_capped(&mut self.patterns, note.into());
    }

    pub fn add_pitfall(&mut self, note: impl Into<String>) {
        push_capped(&mut self.pitfalls, note.into());
    }
}

/// 追加一条，超出上限时丢弃最旧的
fn push_capped(notes: &mut Vec<String>, note: String) {
    notes.push(note);
    if notes.len() > MAX_EXPERIENCE_NOTES {
        let excess = notes.len() - MAX_EXPERIENCE_NOTES;
        notes.drain(..excess);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learning {
    pub concept: String,
    pub description: String,
    pub examples: Vec<String>,
    pub confidence: f64,
    pub last_updated: i64,
}

impl Learning {
    pub fn new(concept: impl Into<String>, description: impl Into<String>, confidence: f64) -> Self {
        Self {
            concept: concept.into(),
            description: description.into(),
            examples: Vec::new(),
            confidence: normalize_confidence(confidence),
            last_updated: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_examples(mut self, examples: Vec<String>) -> Self {
        self.examples = examples;
        self
    }
}

/// 导出格式：各表转为按键排序的 (key, value) 列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermExport {
    pub facts: Vec<(String, Value)>,
    pub experiences: Vec<(String, TaskExperience)>,
    pub learnings: Vec<(String, Learning)>,
}

#[derive(Debug, Clone, Default)]
pub struct LongTermMemory {
    pub facts: HashMap<String, Value>,
    pub experiences: HashMap<String, TaskExperience>,
    pub learnings: HashMap<String, Learning>,
}

/// 将文本切分为小写词集合，用于简单相似度（词重叠数）
fn tokenize_lower(s: &str) -> HashSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 1)
        .collect()
}

fn sorted_pairs<T: Clone>(map: &HashMap<String, T>) -> Vec<(String, T)> {
    let mut pairs: Vec<(String, T)> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

impl LongTermMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember_fact(&mut self, key: impl Into<String>, value: Value) {
        self.facts.insert(key.into(), value);
    }

    /// 取出（不存在则创建）某类任务的经验
    pub fn experience_mut(&mut self, task_type: &str) -> &mut TaskExperience {
        self.experiences.entry(task_type.to_string()).or_default()
    }

    pub fn experience(&self, task_type: &str) -> Option<&TaskExperience> {
        self.experiences.get(task_type)
    }

    /// 以新 id 追加学习条目，返回该 id
    pub fn add_learning(&mut self, learning: Learning) -> String {
        let id = format!("learn_{}", uuid::Uuid::new_v4());
        self.learnings.insert(id.clone(), learning);
        id
    }

    /// 关键词重叠检索：返回最相关的 k 条学习/经验摘要
    pub fn recall(&self, query: &str, k: usize) -> Vec<String> {
        let query_tokens = tokenize_lower(query);
        if query_tokens.is_empty() || k == 0 {
            return Vec::new();
        }
        let learnings = self.learnings.values().map(|l| {
            format!("[{}] {} (confidence {:.1})", l.concept, l.description, l.confidence)
        });
        let experiences = self.experiences.iter().map(|(kind, e)| {
            format!(
                "[{}] {} succeeded / {} failed; pitfalls: {}",
                kind,
                e.success_count,
                e.failure_count,
                e.pitfalls.join("; ")
            )
        });
        let mut scored: Vec<(usize, String)> = learnings
            .chain(experiences)
            .map(|text| (tokenize_lower(&text).intersection(&query_tokens).count(), text))
            .filter(|(s, _)| *s > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.into_iter().take(k).map(|(_, t)| t).collect()
    }

    pub fn export(&self) -> LongTermExport {
        LongTermExport {
            facts: sorted_pairs(&self.facts),
            experiences: sorted_pairs(&self.experiences),
            learnings: sorted_pairs(&self.learnings),
        }
    }

    pub fn import(&mut self, export: LongTermExport) {
        self.facts = export.facts.into_iter().collect();
        self.experiences = export.experiences.into_iter().collect();
        self.learnings = export.learnings.into_iter().collect();
    }
}
