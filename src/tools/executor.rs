//! 工具执行器
//!
//! 持有共享的 ToolRegistry、单次调用超时与重试次数；execute(tool_name, input) 在超时内调用工具，
//! 失败或超时由 RecoveryEngine 决定是否重试（线性退避），最终转为 HiveError；每次尝试输出结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::time::timeout;

use crate::config::ToolsSection;
use crate::core::{HiveError, RecoveryAction, RecoveryEngine};
use crate::tools::ToolRegistry;

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
    recovery: RecoveryEngine,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
            max_retries: 0,
            backoff: Duration::ZERO,
            recovery: RecoveryEngine::new(),
        }
    }

    pub fn from_config(registry: Arc<ToolRegistry>, cfg: &ToolsSection) -> Self {
        Self::new(registry, cfg.tool_timeout_secs)
            .with_retries(cfg.max_retries, Duration::from_millis(cfg.retry_backoff_ms))
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 执行指定工具；未注册返回 UnknownTool（不重试），超时返回 ToolTimeout，工具返回 Err 则转为 ToolExecutionFailed
    pub async fn execute(&self, tool_name: &str, input: Value) -> Result<Value, HiveError> {
        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| HiveError::UnknownTool(tool_name.to_string()))?;
        let input_preview = input_preview(&input);

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let start = Instant::now();
            let result = timeout(self.timeout, tool.execute(input.clone())).await;

            let (ok, outcome): (bool, &str) = match &result {
                Ok(Ok(_)) => (true, "ok"),
                Ok(Err(_)) => (false, "error"),
                Err(_) => (false, "timeout"),
            };
            let audit = serde_json::json!({
                "event": "tool_audit",
                "tool": tool_name,
                "attempt": attempt,
                "ok": ok,
                "outcome": outcome,
                "duration_ms": start.elapsed().as_millis() as u64,
                "input_preview": input_preview,
            });
            tracing::info!(audit = %audit, "tool");

            let err = match result {
                Ok(Ok(output)) => return Ok(output),
                Ok(Err(e)) => HiveError::ToolExecutionFailed(format!("{tool_name}: {e}")),
                Err(_) => HiveError::ToolTimeout(tool_name.to_string()),
            };

            match self.recovery.handle(&err) {
                RecoveryAction::Retry if attempt <= self.max_retries => {
                    tracing::warn!(tool = tool_name, attempt, error = %err, "retrying tool call");
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                _ => return Err(err),
            }
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

fn input_preview(input: &Value) -> String {
    let s = input.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
