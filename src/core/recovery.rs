//! 错误恢复引擎
//!
//! 根据 HiveError 类型返回 RecoveryAction，供 ToolExecutor 决定是否重试。

use crate::core::{HiveError, RecoveryAction};

/// 语义化错误恢复：将错误映射为可执行动作
#[derive(Debug, Default, Clone)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 根据错误类型返回建议的恢复动作
    pub fn handle(&self, err: &HiveError) -> RecoveryAction {
        match err {
            HiveError::ToolTimeout(_) | HiveError::ToolExecutionFailed(_) => RecoveryAction::Retry,
            _ => RecoveryAction::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_tool_timeout() {
        let engine = RecoveryEngine::new();
        let action = engine.handle(&HiveError::ToolTimeout("calculator".to_string()));
        assert_eq!(action, RecoveryAction::Retry);
    }

    #[test]
    fn test_recovery_tool_failure() {
        let engine = RecoveryEngine::new();
        let action = engine.handle(&HiveError::ToolExecutionFailed("boom".to_string()));
        assert_eq!(action, RecoveryAction::Retry);
    }

    #[test]
    fn test_recovery_unknown_tool() {
        let engine = RecoveryEngine::new();
        let action = engine.handle(&HiveError::UnknownTool("fake_tool".to_string()));
        assert_eq!(action, RecoveryAction::Abort);
    }

    #[test]
    fn test_recovery_cancelled() {
        let engine = RecoveryEngine::new();
        assert_eq!(engine.handle(&HiveError::Cancelled), RecoveryAction::Abort);
    }

    #[test]
    fn test_recovery_reasoner_error() {
        let engine = RecoveryEngine::new();
        let action = engine.handle(&HiveError::Reasoner("rate limited".to_string()));
        assert_eq!(action, RecoveryAction::Abort);
    }
}
