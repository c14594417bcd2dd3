//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__ORCHESTRATOR__MAX_AGENTS=3`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub orchestrator: OrchestratorSection,
    pub tools: ToolsSection,
    pub memory: MemorySection,
}

/// [orchestrator] 段：选人上限、推理步数预算、验证阈值、默认超时
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
    /// 单次 ReAct 推理的最大循环次数
    #[serde(default = "default_step_budget")]
    pub step_budget: usize,
    /// 验证置信度严格大于该值视为通过
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    /// 调用方未指定 timeout 时使用；None 表示不限时
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,
}

fn default_max_agents() -> usize {
    5
}

fn default_step_budget() -> usize {
    10
}

fn default_pass_threshold() -> f64 {
    0.7
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            max_agents: default_max_agents(),
            step_budget: default_step_budget(),
            pass_threshold: default_pass_threshold(),
            default_timeout_secs: None,
        }
    }
}

/// [tools] 段：单次调用超时与有限重试
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// 失败后的额外重试次数（总调用次数 = 1 + max_retries）
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// 线性退避基数（毫秒）：第 n 次重试前等待 n * retry_backoff_ms
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_tool_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    200
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// [memory] 段：短期记忆容量、情景记忆上限与裁剪后保留数
#[derive(Debug, Clone, Deserialize)]
pub struct MemorySection {
    #[serde(default = "default_short_term_capacity")]
    pub short_term_capacity: usize,
    #[serde(default = "default_episodic_cap")]
    pub episodic_cap: usize,
    #[serde(default = "default_episodic_keep")]
    pub episodic_keep: usize,
}

fn default_short_term_capacity() -> usize {
    20
}

fn default_episodic_cap() -> usize {
    crate::memory::episodic::DEFAULT_EPISODIC_CAP
}

fn default_episodic_keep() -> usize {
    crate::memory::episodic::DEFAULT_EPISODIC_KEEP
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            short_term_capacity: default_short_term_capacity(),
            episodic_cap: default_episodic_cap(),
            episodic_keep: default_episodic_keep(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.orchestrator.max_agents, 5);
        assert_eq!(cfg.orchestrator.step_budget, 10);
        assert!((cfg.orchestrator.pass_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(cfg.tools.max_retries, 2);
        assert_eq!(cfg.memory.episodic_cap, 100);
        assert_eq!(cfg.memory.episodic_keep, 50);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.toml");
        std::fs::write(
            &path,
            "[orchestrator]\nmax_agents = 3\nstep_budget = 6\n\n[tools]\ntool_timeout_secs = 5\n",
        )
        .unwrap();
        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.orchestrator.max_agents, 3);
        assert_eq!(cfg.orchestrator.step_budget, 6);
        assert_eq!(cfg.tools.tool_timeout_secs, 5);
        assert_eq!(cfg.tools.max_retries, 2);
        assert_eq!(cfg.memory.short_term_capacity, 20);
    }
}
