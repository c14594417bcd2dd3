//! 记忆持久化
//!
//! MemoryExport 是所有 Agent 记忆的序列化边界；MemoryPersistence 将其写入/读出单个 JSON 文件（可选使用）。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::memory::AgentMemoryExport;

pub const MEMORY_EXPORT_VERSION: u32 = 1;

/// 全部 Agent 的记忆导出：agent_id -> 记忆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryExport {
    pub version: u32,
    pub agents: BTreeMap<String, AgentMemoryExport>,
}

impl Default for MemoryExport {
    fn default() -> Self {
        Self {
            version: MEMORY_EXPORT_VERSION,
            agents: BTreeMap::new(),
        }
    }
}

/// 简单的文件持久化：单文件 JSON
#[derive(Debug)]
pub struct MemoryPersistence {
    path: PathBuf,
}

impl MemoryPersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 从 JSON 文件加载；文件不存在时返回空导出
    pub fn load(&self) -> anyhow::Result<MemoryExport> {
        if !self.path.exists() {
            return Ok(MemoryExport::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        let export: MemoryExport = serde_json::from_str(&data)?;
        if export.version != MEMORY_EXPORT_VERSION {
            anyhow::bail!(
                "unsupported memory export version {} (expected {})",
                export.version,
                MEMORY_EXPORT_VERSION
            );
        }
        Ok(export)
    }

    /// 写入 JSON 文件；父目录不存在时自动创建
    pub fn save(&self, export: &MemoryExport) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(export)?)?;
        Ok(())
    }
}
