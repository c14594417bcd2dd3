//! 记忆沉淀：任务结束后更新每个参与 Agent 的长期记忆
//!
//! 经验按任务类别累计（成功 / 失败计数、滚动平均耗时、模式 / 教训），
//! 追加一条 Learning（通过 0.9，未通过 0.5），记录事实 `last_result:<category>`，并裁剪情景记忆。

use std::sync::Arc;

use serde_json::json;

use crate::agents::Agent;
use crate::memory::Learning;
use crate::review::ValidationReport;
use crate::workflow::CollaborativeTask;

const PASSED_CONFIDENCE: f64 = 0.9;
const FAILED_CONFIDENCE: f64 = 0.5;
const FALLBACK_CATEGORY: &str = "general";

/// 任务类别：调用方指定优先，否则取描述首词（小写）
pub fn task_category(description: &str, explicit: Option<&str>) -> String {
    if let Some(category) = explicit.map(str::trim).filter(|c| !c.is_empty()) {
        return category.to_lowercase();
    }
    description
        .split_whitespace()
        .next()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

pub async fn consolidate(
    agents: &[Arc<Agent>],
    task: &CollaborativeTask,
    validation: &ValidationReport,
    duration_ms: u64,
    reflection: &str,
) {
    let category = task.category.as_str();
    let passed = validation.passed;

    for agent in agents {
        let mut memory = agent.memory().await;

        let experience = memory.long_term.experience_mut(category);
        experience.record_run(passed, duration_ms);
        if passed {
            experience.add_pattern(format!("passed: {}", task.description));
        } else {
            experience.add_pitfall(format!(
                "failed: {} ({:.2} confidence)",
                task.description, validation.confidence
            ));
        }

        let description = if reflection.is_empty() {
            validation.feedback.clone()
        } else {
            reflection.to_string()
        };
        let confidence = if passed { PASSED_CONFIDENCE } else { FAILED_CONFIDENCE };
        memory.long_term.add_learning(
            Learning::new(category, description, confidence).with_examples(vec![task.description.clone()]),
        );

        memory.long_term.remember_fact(
            format!("last_result:{category}"),
            json!({
                "task_id": task.id,
                "passed": passed,
                "confidence": validation.confidence,
                "result": task.result,
            }),
        );

        let dropped = memory.episodic.enforce_cap();
        tracing::debug!(agent = %agent.id, category, passed, dropped, "memory consolidated");
    }
    tracing::info!(task = %task.id, category, agents = agents.len(), "consolidation finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentRole;
    use crate::workflow::TaskPlanner;

    #[test]
    fn test_task_category() {
        assert_eq!(task_category("Research and summarize X", None), "research");
        assert_eq!(task_category("  Deploy: the app", None), "deploy");
        assert_eq!(task_category("anything", Some("Ops")), "ops");
        assert_eq!(task_category("anything", Some("  ")), "anything");
        assert_eq!(task_category("", None), "general");
    }

    #[tokio::test]
    async fn test_consolidate_updates_experience_and_facts() {
        let agent = Arc::new(Agent::new("a", "A", AgentRole::Researcher));
        let task = CollaborativeTask::new("Research rust", "research", TaskPlanner::new().plan("Research rust"));
        let report = |passed| ValidationReport {
            passed,
            confidence: if passed { 0.85 } else { 0.4 },
            issues: Vec::new(),
            feedback: "ok".into(),
        };

        for passed in [true, true, true, false] {
            consolidate(&[Arc::clone(&agent)], &task, &report(passed), 100, "reflection").await;
        }

        let memory = agent.memory().await;
        let exp = memory.long_term.experience("research").unwrap();
        assert_eq!(exp.success_count, 3);
        assert_eq!(exp.failure_count, 1);
        assert_eq!(exp.patterns.len(), 3);
        assert_eq!(exp.pitfalls.len(), 1);
        assert_eq!(memory.long_term.learnings.len(), 4);
        let fact = memory.long_term.facts.get("last_result:research").unwrap();
        assert_eq!(fact["passed"], false);
        let confidences: Vec<f64> = memory.long_term.learnings.values().map(|l| l.confidence).collect();
        assert_eq!(confidences.iter().filter(|c| **c == 0.9).count(), 3);
        assert_eq!(confidences.iter().filter(|c| **c == 0.5).count(), 1);
    }
}
