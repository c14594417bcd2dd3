//! ReAct 过程事件：可选推送给观察者（日志、前端）展示思考、工具调用、观察与答案

use serde::Serialize;

/// 单步过程事件（可序列化为 JSON）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactEvent {
    /// 当前推理循环序号
    StepUpdate { step: usize, max_steps: usize },
    Thought { text: String },
    ToolCall {
        tool: String,
        input: serde_json::Value,
    },
    /// 工具返回（预览，避免过长）
    Observation { tool: String, preview: String },
    ToolFailure { tool: String, reason: String },
    /// 选中的工具不存在或不在该 Agent 的工具子集内，忽略
    ToolSkipped { tool: String },
    Answer { confidence: f64, total_steps: usize },
}
