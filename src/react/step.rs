//! 推理步骤：thought / action / observation，单次推理内只追加

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Thought,
    Action,
    Observation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub kind: StepKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<Value>,
    pub timestamp: i64,
}

impl ReasoningStep {
    fn new(kind: StepKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tool: None,
            tool_input: None,
            tool_output: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn thought(content: impl Into<String>) -> Self {
        Self::new(StepKind::Thought, content)
    }

    pub fn action(tool: &str, input: Value) -> Self {
        let mut step = Self::new(StepKind::Action, format!("Calling {tool} with {input}"));
        step.tool = Some(tool.to_string());
        step.tool_input = Some(input);
        step
    }

    pub fn observation(tool: &str, output: Value, content: impl Into<String>) -> Self {
        let mut step = Self::new(StepKind::Observation, content);
        step.tool = Some(tool.to_string());
        step.tool_output = Some(output);
        step
    }

    pub fn is_thought(&self) -> bool {
        self.kind == StepKind::Thought
    }

    pub fn is_observation(&self) -> bool {
        self.kind == StepKind::Observation
    }
}

/// 统计 (thought 数, observation 数)
pub fn count_kinds(steps: &[ReasoningStep]) -> (usize, usize) {
    steps.iter().fold((0, 0), |(t, o), s| match s.kind {
        StepKind::Thought => (t + 1, o),
        StepKind::Observation => (t, o + 1),
        StepKind::Action => (t, o),
    })
}
