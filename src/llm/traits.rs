//! 推理后端抽象
//!
//! 真实的推理/生成由外部后端实现 Reasoner：think（生成下一条思考）、select_tool（选择工具与输入）、
//! answer（根据已有步骤给出答案）。停止判断与置信度评估带有占位默认实现，后端可覆盖。

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::react::step::{count_kinds, ReasoningStep};
use crate::tools::ToolSpec;

/// 推理上下文：依赖结果、历史经验等
pub type Context = BTreeMap<String, Value>;

/// 后端选择的工具调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    pub input: Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, input: Value) -> Self {
        Self {
            tool: tool.into(),
            input,
        }
    }
}

/// 思考文本中表示「可以结束」的信号
const COMPLETION_SIGNALS: [&str; 3] = ["final answer", "sufficient", "task complete"];

/// 默认停止判断：累计 ≥4 步，或最新思考声明已可作答
pub fn sufficiency_heuristic(steps: &[ReasoningStep]) -> bool {
    if steps.len() >= 4 {
        return true;
    }
    steps
        .iter()
        .rev()
        .find(|s| s.is_thought())
        .map(|s| {
            let text = s.content.to_lowercase();
            COMPLETION_SIGNALS.iter().any(|signal| text.contains(signal))
        })
        .unwrap_or(false)
}

/// 默认置信度：无观察 0.3；thought:observation > 2 为 0.9；否则 0.7
pub fn confidence_heuristic(steps: &[ReasoningStep]) -> f64 {
    let (thoughts, observations) = count_kinds(steps);
    if observations == 0 {
        0.3
    } else if thoughts as f64 / observations as f64 > 2.0 {
        0.9
    } else {
        0.7
    }
}

/// 置信度收敛到 [0, 1]；NaN 与无穷视为 0
pub fn normalize_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    /// 基于查询、上下文与已有步骤生成下一条思考
    async fn think(
        &self,
        query: &str,
        context: &Context,
        steps: &[ReasoningStep],
    ) -> Result<String, String>;

    /// 选择下一步要调用的工具；None 表示本轮不调用工具
    async fn select_tool(
        &self,
        query: &str,
        thought: &str,
        tools: &[ToolSpec],
    ) -> Result<Option<ToolCall>, String>;

    /// 根据已有步骤生成答案（正常结束或步数耗尽时调用）
    async fn answer(
        &self,
        query: &str,
        context: &Context,
        steps: &[ReasoningStep],
    ) -> Result<String, String>;

    fn is_sufficient(&self, steps: &[ReasoningStep]) -> bool {
        sufficiency_heuristic(steps)
    }

    fn assess_confidence(&self, steps: &[ReasoningStep]) -> f64 {
        confidence_heuristic(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sufficiency_by_step_count() {
        let steps: Vec<ReasoningStep> = (0..3).map(|i| ReasoningStep::thought(format!("t{i}"))).collect();
        assert!(!sufficiency_heuristic(&steps));
        let mut steps = steps;
        steps.push(ReasoningStep::thought("t3"));
        assert!(sufficiency_heuristic(&steps));
    }

    #[test]
    fn test_sufficiency_by_signal() {
        let steps = vec![ReasoningStep::thought("I have the Final Answer now")];
        assert!(sufficiency_heuristic(&steps));
    }

    #[test]
    fn test_confidence_policy() {
        assert_eq!(confidence_heuristic(&[ReasoningStep::thought("a")]), 0.3);

        let obs = || ReasoningStep::observation("echo", json!({}), "{}");
        let balanced = vec![ReasoningStep::thought("a"), obs()];
        assert_eq!(confidence_heuristic(&balanced), 0.7);

        let thought_heavy = vec![
            ReasoningStep::thought("a"),
            ReasoningStep::thought("b"),
            ReasoningStep::thought("c"),
            obs(),
        ];
        assert_eq!(confidence_heuristic(&thought_heavy), 0.9);
    }

    #[test]
    fn test_normalize_confidence() {
        assert_eq!(normalize_confidence(0.4), 0.4);
        assert_eq!(normalize_confidence(1.7), 1.0);
        assert_eq!(normalize_confidence(-2.0), 0.0);
        assert_eq!(normalize_confidence(f64::NAN), 0.0);
        assert_eq!(normalize_confidence(f64::INFINITY), 0.0);
    }
}
