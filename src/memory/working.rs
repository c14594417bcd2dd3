//! 工作记忆：当前任务目标与键值草稿区
//!
//! 每个协作任务开始时清空：依赖结果（按子任务 ID）与工具输出（按工具名）写入这里，供后续推理步骤引用。
//! 同一 Agent 的并行子任务共用这一份，后写覆盖。

use std::collections::BTreeMap;

use serde_json::Value;

#[derive(Clone, Debug, Default)]
pub struct WorkingMemory {
    pub goal: Option<String>,
    entries: BTreeMap<String, Value>,
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        self.goal = Some(goal.into());
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// 合并一组键值（后写覆盖）
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.goal = None;
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.goal.is_none() && self.entries.is_empty()
    }
}
