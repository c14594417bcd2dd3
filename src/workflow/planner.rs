//! 任务规划器：把自然语言描述拆成子任务 DAG
//!
//! - 编号行（`1. ...` / `2) ...`）或 `then` 分隔的子句 -> 顺序链
//! - 列表行（`- ...` / `* ...`）-> 互不依赖的子任务（同一波次并行）
//! - 可拆出的步骤少于 2 个 -> 默认链 research -> execute -> validate
//!
//! 每步能力按关键词推断（文中最早出现的关键词优先，默认 execution）。规划从不失败。

use std::sync::OnceLock;

use regex::Regex;

use crate::agents::capability::{EXECUTION, RESEARCH, SYNTHESIS, VALIDATION};
use crate::workflow::builder::TaskBuilder;
use crate::workflow::types::{Plan, SubTask};

static NUMBERED_RE: OnceLock<Regex> = OnceLock::new();
static BULLET_RE: OnceLock<Regex> = OnceLock::new();
static THEN_RE: OnceLock<Regex> = OnceLock::new();

const CAPABILITY_KEYWORDS: &[(&str, &str)] = &[
    ("research", RESEARCH),
    ("investigate", RESEARCH),
    ("search", RESEARCH),
    ("find", RESEARCH),
    ("gather", RESEARCH),
    ("look up", RESEARCH),
    ("explore", RESEARCH),
    ("analyze", RESEARCH),
    ("analyse", RESEARCH),
    ("verify", VALIDATION),
    ("validate", VALIDATION),
    ("check", VALIDATION),
    ("review", VALIDATION),
    ("test", VALIDATION),
    ("critique", VALIDATION),
    ("evaluate", VALIDATION),
    ("summarize", SYNTHESIS),
    ("summarise", SYNTHESIS),
    ("synthesize", SYNTHESIS),
    ("combine", SYNTHESIS),
    ("merge", SYNTHESIS),
    ("report", SYNTHESIS),
    ("conclude", SYNTHESIS),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Chain,
    Parallel,
}

/// 关键词在词首出现的位置（"testing" 命中 test，"latest" 不命中）
fn find_word_start(haystack: &str, keyword: &str) -> Option<usize> {
    haystack.match_indices(keyword).map(|(pos, _)| pos).find(|&pos| {
        haystack[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

/// 按关键词推断能力
pub fn infer_capability(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    CAPABILITY_KEYWORDS
        .iter()
        .filter_map(|(kw, cap)| find_word_start(&lower, kw).map(|pos| (pos, *cap)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, cap)| cap)
        .unwrap_or(EXECUTION)
}

fn capture_lines(re: &Regex, description: &str) -> Vec<String> {
    description
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn structured_steps(description: &str) -> Option<(Shape, Vec<String>)> {
    let numbered = NUMBERED_RE.get_or_init(|| Regex::new(r"^\s*\d+[.)]\s+(.+)$").unwrap());
    let steps = capture_lines(numbered, description);
    if steps.len() >= 2 {
        return Some((Shape::Chain, steps));
    }

    let bullet = BULLET_RE.get_or_init(|| Regex::new(r"^\s*[-*•]\s+(.+)$").unwrap());
    let steps = capture_lines(bullet, description);
    if steps.len() >= 2 {
        return Some((Shape::Parallel, steps));
    }

    let then = THEN_RE
        .get_or_init(|| Regex::new(r"(?i)\s*,?\s*(?:and\s+)?\bthen\b\s*,?\s*").unwrap());
    let steps: Vec<String> = then
        .split(description.trim())
        .map(|s| s.trim().trim_end_matches(['.', ';']).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if steps.len() >= 2 {
        return Some((Shape::Chain, steps));
    }

    None
}

/// 默认链：research -> execute -> validate
pub fn default_plan(description: &str) -> Plan {
    let d = description.trim();
    Plan {
        subtasks: vec![
            SubTask::new("research", format!("Research: {d}"), RESEARCH),
            SubTask::new("execute", format!("Execute: {d}"), EXECUTION).with_dependencies(["research"]),
            SubTask::new("validate", format!("Validate: {d}"), VALIDATION).with_dependencies(["execute"]),
        ],
        required_capabilities: vec![RESEARCH.into(), EXECUTION.into(), VALIDATION.into()],
    }
}

#[derive(Debug, Default, Clone)]
pub struct TaskPlanner;

impl TaskPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, description: &str) -> Plan {
        let Some((shape, steps)) = structured_steps(description) else {
            tracing::debug!("no explicit structure, using default chain");
            return default_plan(description);
        };

        let mut builder = TaskBuilder::new();
        for (i, step) in steps.iter().enumerate() {
            builder = builder.subtask(format!("s{}", i + 1), step.clone(), infer_capability(step));
        }
        if shape == Shape::Chain {
            builder = builder.chain();
        }

        match builder.build() {
            Ok(plan) => {
                tracing::info!(
                    subtasks = plan.subtasks.len(),
                    shape = ?shape,
                    capabilities = ?plan.required_capabilities,
                    "plan created"
                );
                plan
            }
            Err(e) => {
                tracing::warn!(error = %e, "structured plan rejected, using default chain");
                default_plan(description)
            }
        }
    }
}
