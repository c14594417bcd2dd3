//! Mock 推理后端（用于演示与测试，无需外部服务）
//!
//! 确定性行为：首轮思考后，若查询中含算术表达式且可用 calculator 则调用之，否则可用 echo 时回显查询；
//! 拿到观察后声明可作答。有成功观察时置信度 0.85，否则 0.4。

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use crate::llm::{Context, Reasoner, ToolCall};
use crate::react::step::{ReasoningStep, StepKind};
use crate::tools::ToolSpec;

static EXPRESSION_RE: OnceLock<Regex> = OnceLock::new();

fn find_expression(text: &str) -> Option<String> {
    let re = EXPRESSION_RE.get_or_init(|| {
        Regex::new(r"\(?\d+(?:\.\d+)?(?:\s*[-+*/%^]\s*\(?\s*\d+(?:\.\d+)?\s*\)?)+").unwrap()
    });
    re.find(text).map(|m| m.as_str().trim().to_string())
}

fn first_line(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max_chars {
        format!("{}...", line.chars().take(max_chars).collect::<String>())
    } else {
        line.to_string()
    }
}

fn successful_observations(steps: &[ReasoningStep]) -> Vec<&ReasoningStep> {
    steps
        .iter()
        .filter(|s| s.kind == StepKind::Observation && !s.content.starts_with("Error:"))
        .collect()
}

#[derive(Debug, Default)]
pub struct MockReasoner;

#[async_trait]
impl Reasoner for MockReasoner {
    async fn think(
        &self,
        query: &str,
        context: &Context,
        steps: &[ReasoningStep],
    ) -> Result<String, String> {
        match steps.last() {
            None => Ok(format!(
                "Analyzing '{}' with {} context entries.",
                first_line(query, 80),
                context.len()
            )),
            Some(last) if last.kind == StepKind::Observation => Ok(format!(
                "Observed {}: {}. Final answer can be composed.",
                last.tool.as_deref().unwrap_or("tool"),
                first_line(&last.content, 80)
            )),
            Some(_) => Ok(format!("Continuing analysis (step {}).", steps.len() + 1)),
        }
    }

    async fn select_tool(
        &self,
        query: &str,
        _thought: &str,
        tools: &[ToolSpec],
    ) -> Result<Option<ToolCall>, String> {
        let has = |name: &str| tools.iter().any(|t| t.name == name);
        if has("calculator") {
            if let Some(expression) = find_expression(query) {
                return Ok(Some(ToolCall::new("calculator", json!({ "expression": expression }))));
            }
        }
        if has("echo") {
            return Ok(Some(ToolCall::new("echo", json!({ "text": first_line(query, 120) }))));
        }
        Ok(None)
    }

    async fn answer(
        &self,
        query: &str,
        _context: &Context,
        steps: &[ReasoningStep],
    ) -> Result<String, String> {
        let observations = successful_observations(steps);
        if observations.is_empty() {
            return Ok(format!("Completed: {}", first_line(query, 120)));
        }
        let findings: Vec<&str> = observations.iter().map(|s| s.content.as_str()).collect();
        Ok(format!(
            "Answer to '{}' based on {} observation(s): {}",
            first_line(query, 80),
            findings.len(),
            findings.join("; ")
        ))
    }

    fn assess_confidence(&self, steps: &[ReasoningStep]) -> f64 {
        if successful_observations(steps).is_empty() {
            0.4
        } else {
            0.85
        }
    }
}
