//! 协作任务端到端测试：规划、选人、波次调度、校验、审批与超时

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use hive::config::AppConfig;
use hive::core::{MaxSubtasks, TaskStatus};
use hive::llm::{Context, MockReasoner, Reasoner, ToolCall};
use hive::messaging::MessageKind;
use hive::react::{ReasoningStep, StepKind};
use hive::tools::{Tool, ToolSpec};
use hive::{ExecuteOptions, HiveError, Orchestrator};

fn orchestrator() -> Orchestrator {
    Orchestrator::with_default_roster(Arc::new(MockReasoner), AppConfig::default()).unwrap()
}

/// 评审时按开关给出高 / 低置信度，其余调用立即作答
struct SwitchableCritic {
    fail: Arc<AtomicBool>,
}

#[async_trait]
impl Reasoner for SwitchableCritic {
    async fn think(&self, query: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
        if query.starts_with("Critique") && self.fail.load(Ordering::SeqCst) {
            Ok("final answer: result is wrong".to_string())
        } else {
            Ok("final answer ready".to_string())
        }
    }

    async fn select_tool(&self, _q: &str, _t: &str, _tools: &[ToolSpec]) -> Result<Option<ToolCall>, String> {
        Ok(None)
    }

    async fn answer(&self, query: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
        Ok(format!("answer for {}", query.lines().next().unwrap_or_default()))
    }

    fn assess_confidence(&self, steps: &[ReasoningStep]) -> f64 {
        let wrong = steps
            .iter()
            .any(|s| s.kind == StepKind::Thought && s.content.contains("wrong"));
        if wrong {
            0.2
        } else {
            0.9
        }
    }
}

/// 每次思考都要很久
struct Sluggish;

#[async_trait]
impl Reasoner for Sluggish {
    async fn think(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("final answer".to_string())
    }

    async fn select_tool(&self, _q: &str, _t: &str, _tools: &[ToolSpec]) -> Result<Option<ToolCall>, String> {
        Ok(None)
    }

    async fn answer(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
        Ok("late".to_string())
    }
}

#[tokio::test]
async fn test_research_and_summarize_scenario() {
    let orch = orchestrator();
    let result = orch
        .execute_collaborative_task("Research and summarize Rust ownership", ExecuteOptions::default())
        .await
        .unwrap();

    assert_eq!(result.agents, vec!["researcher", "executor", "critic", "synthesizer"]);
    assert!(result.missing_capabilities.is_empty());
    assert!(!result.result.is_empty());
    assert_eq!(result.task.result.as_deref(), Some(result.result.as_str()));
    assert_eq!(result.task.category, "research");
    assert!((0.0..=1.0).contains(&result.validation.confidence));
    let expected = if result.validation.confidence > 0.7 {
        TaskStatus::Completed
    } else {
        TaskStatus::Failed
    };
    assert_eq!(result.task.status, expected);
    assert!(!result.reflection.is_empty());

    for subtask in &result.task.subtasks {
        assert_eq!(subtask.status, TaskStatus::Completed);
        for dep in &subtask.dependencies {
            let dep = result.task.subtask(dep).unwrap();
            assert!(dep.completed_at.unwrap() <= subtask.started_at.unwrap());
        }
    }
    let task = &result.task;
    assert!(task.created_at <= task.started_at.unwrap());
    assert!(task.started_at.unwrap() <= task.completed_at.unwrap());

    let delegations = result
        .messages
        .iter()
        .filter(|m| m.kind == MessageKind::Delegation)
        .count();
    assert_eq!(delegations, 3);
}

#[tokio::test]
async fn test_parallel_bullets_share_one_wave() {
    let orch = orchestrator();
    let result = orch
        .execute_collaborative_task("Do these:\n- compute 2+2\n- compute 3*3", ExecuteOptions::default())
        .await
        .unwrap();

    let subtasks = &result.task.subtasks;
    assert_eq!(subtasks.len(), 2);
    assert!(subtasks.iter().all(|s| s.status == TaskStatus::Completed));
    let latest_start = subtasks.iter().filter_map(|s| s.started_at).max().unwrap();
    let earliest_end = subtasks.iter().filter_map(|s| s.completed_at).min().unwrap();
    assert!(latest_start <= earliest_end);
    assert!(subtasks[0].result.as_deref().unwrap().contains("4"));
}

#[tokio::test]
async fn test_capped_selection_reports_missing() {
    let orch = orchestrator();
    let result = orch
        .execute_collaborative_task(
            "Research and summarize async Rust",
            ExecuteOptions::default().with_max_agents(1),
        )
        .await
        .unwrap();

    assert_eq!(result.agents, vec!["researcher", "synthesizer"]);
    assert_eq!(result.missing_capabilities, vec!["execution", "validation"]);
    assert!(result
        .messages
        .iter()
        .any(|m| m.kind == MessageKind::Broadcast && m.content.contains("missing capabilities")));
    let execute = result.task.subtask("execute").unwrap();
    assert_eq!(execute.assigned_to.as_deref(), Some("synthesizer"));
    assert_eq!(execute.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_experience_counts_across_runs() {
    let fail = Arc::new(AtomicBool::new(false));
    let reasoner = SwitchableCritic { fail: Arc::clone(&fail) };
    let orch = Orchestrator::with_default_roster(Arc::new(reasoner), AppConfig::default()).unwrap();

    for failing in [false, false, false, true] {
        fail.store(failing, Ordering::SeqCst);
        let result = orch
            .execute_collaborative_task(
                "Look into cache eviction",
                ExecuteOptions::default().with_category("research"),
            )
            .await
            .unwrap();
        assert_eq!(result.validation.passed, !failing);
        assert_eq!(
            result.task.status,
            if failing { TaskStatus::Failed } else { TaskStatus::Completed }
        );
    }

    for agent in orch.agents() {
        let memory = agent.memory().await;
        let exp = memory.long_term.experience("research").unwrap();
        assert_eq!(exp.success_count, 3, "agent {}", agent.id);
        assert_eq!(exp.failure_count, 1, "agent {}", agent.id);
        assert_eq!(exp.pitfalls.len(), 1);
        assert!(memory.long_term.facts.contains_key("last_result:research"));
        assert_eq!(memory.long_term.learnings.len(), 4);
    }
}

#[tokio::test]
async fn test_approval_rejection() {
    let orch = orchestrator().with_approval_gate(Arc::new(MaxSubtasks(2)));
    let err = orch
        .execute_collaborative_task("Research Rust", ExecuteOptions::default().with_approval())
        .await
        .unwrap_err();
    assert!(matches!(err, HiveError::ApprovalRejected(reason) if reason.contains("limit is 2")));

    let researcher = orch.agent("researcher").unwrap();
    assert!(researcher.memory().await.episodic.is_empty());
}

#[tokio::test]
async fn test_timeout_cancels_run_but_not_caller() {
    let orch = Orchestrator::with_default_roster(Arc::new(Sluggish), AppConfig::default()).unwrap();
    let caller = CancellationToken::new();
    let err = orch
        .execute_collaborative_task(
            "Research Rust",
            ExecuteOptions::default()
                .with_timeout(Duration::from_millis(50))
                .with_cancel(caller.clone()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HiveError::Timeout(50)));
    assert!(!caller.is_cancelled());
}

#[tokio::test]
async fn test_caller_cancellation() {
    let orch = orchestrator();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = orch
        .execute_collaborative_task("Research Rust", ExecuteOptions::default().with_cancel(cancel))
        .await
        .unwrap_err();
    assert!(matches!(err, HiveError::Cancelled));
}

#[tokio::test]
async fn test_calculator_two_plus_two() {
    let orch = orchestrator();
    let calculator = orch.tools().get("calculator").unwrap();
    let output = calculator.execute(json!({"expression": "2+2"})).await.unwrap();
    assert_eq!(output, json!({"result": 4}));
}
