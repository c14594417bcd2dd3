//! 依赖感知调度器
//!
//! 按波次执行：每轮取就绪集合并发执行（join_all），全部返回后再计算下一轮，
//! 因此依赖的完成时间一定早于被依赖方的开始时间。没有就绪子任务时停止；
//! 处于环中、依赖未知 ID 或依赖失败的子任务保持 Pending。
//!
//! 单个子任务失败（推理后端错误或取消）只把该子任务标记为 Failed，不中断同一波次的其他子任务。

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::agents::Agent;
use crate::core::{HiveError, TaskStatus};
use crate::llm::Context;
use crate::memory::{Episode, Outcome};
use crate::messaging::{AgentMessage, MessageKind, MessageLog};
use crate::react::{ReasoningEngine, ReasoningOutcome, StepKind};
use crate::workflow::graph::DependencyGraph;
use crate::workflow::types::{CollaborativeTask, TaskId};

/// 消息中调度方的身份
pub const ORCHESTRATOR: &str = "orchestrator";

/// 一次调度的统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleReport {
    pub waves: usize,
    pub completed: usize,
    pub failed: usize,
    /// 调度结束时仍未执行的子任务
    pub pending: Vec<TaskId>,
}

struct Job {
    index: usize,
    id: TaskId,
    description: String,
    agent: Arc<Agent>,
    context: Context,
}

pub struct Scheduler {
    engine: Arc<ReasoningEngine>,
    messages: Arc<MessageLog>,
}

fn episode_actions(outcome: &ReasoningOutcome) -> Vec<String> {
    outcome
        .reasoning
        .iter()
        .filter(|s| s.kind == StepKind::Action)
        .map(|s| {
            let tool = s.tool.as_deref().unwrap_or("tool");
            match &s.tool_input {
                Some(input) => format!("{tool}({input})"),
                None => tool.to_string(),
            }
        })
        .collect()
}

impl Scheduler {
    pub fn new(engine: Arc<ReasoningEngine>, messages: Arc<MessageLog>) -> Self {
        Self { engine, messages }
    }

    pub async fn run(
        &self,
        task: &mut CollaborativeTask,
        agents: &[Arc<Agent>],
        cancel: &CancellationToken,
    ) -> Result<ScheduleReport, HiveError> {
        let graph = DependencyGraph::new(&task.subtasks);
        let mut report = ScheduleReport::default();

        loop {
            let ready = graph.ready(&task.subtasks);
            if ready.is_empty() {
                break;
            }
            report.waves += 1;
            let wave = report.waves;
            tracing::info!(task = %task.id, wave, size = ready.len(), "wave started");

            let mut jobs: Vec<Job> = Vec::with_capacity(ready.len());
            for index in ready {
                let subtask = &task.subtasks[index];
                let context: Context = subtask
                    .dependencies
                    .iter()
                    .filter_map(|dep| {
                        task.subtask(dep)
                            .and_then(|d| d.result.clone())
                            .map(|r| (dep.clone(), json!(r)))
                    })
                    .collect();
                let agent = subtask
                    .assigned_to
                    .as_deref()
                    .and_then(|id| agents.iter().find(|a| a.id == id))
                    .cloned();

                let subtask = &mut task.subtasks[index];
                let Some(agent) = agent else {
                    tracing::warn!(subtask = %subtask.id, "no agent assigned, marking failed");
                    subtask.error = Some("no agent assigned".to_string());
                    subtask.set_status(TaskStatus::Failed)?;
                    report.failed += 1;
                    continue;
                };

                subtask.set_status(TaskStatus::InProgress)?;
                self.messages.send(
                    AgentMessage::new(ORCHESTRATOR, &agent.id, MessageKind::Delegation, &subtask.description)
                        .with_payload(json!({
                            "subtask": subtask.id,
                            "wave": wave,
                            "dependencies": subtask.dependencies,
                        })),
                );
                let mut context = context;
                context.insert("task".to_string(), json!(task.description));
                jobs.push(Job {
                    index,
                    id: subtask.id.clone(),
                    description: subtask.description.clone(),
                    agent,
                    context,
                });
            }

            let mut busy: HashSet<&str> = HashSet::new();
            for job in &jobs {
                if !busy.insert(job.agent.id.as_str()) {
                    tracing::debug!(
                        agent = %job.agent.id,
                        subtask = %job.id,
                        wave,
                        "agent runs several subtasks in this wave; working memory is shared"
                    );
                }
            }

            let results = join_all(jobs.iter().map(|job| self.execute_subtask(job, cancel))).await;

            for (job, result) in jobs.iter().zip(results) {
                let subtask = &mut task.subtasks[job.index];
                match result {
                    Ok(outcome) => {
                        subtask.result = Some(outcome.answer.clone());
                        subtask.set_status(TaskStatus::Completed)?;
                        report.completed += 1;
                        self.messages.send(
                            AgentMessage::new(&job.agent.id, ORCHESTRATOR, MessageKind::Response, &outcome.answer)
                                .with_payload(json!({
                                    "subtask": job.id,
                                    "confidence": outcome.confidence,
                                    "tools_used": outcome.tools_used,
                                    "total_steps": outcome.total_steps,
                                })),
                        );
                    }
                    Err(e) => {
                        tracing::warn!(subtask = %job.id, agent = %job.agent.id, error = %e, "subtask failed");
                        subtask.error = Some(e.to_string());
                        subtask.set_status(TaskStatus::Failed)?;
                        report.failed += 1;
                        self.messages.send(
                            AgentMessage::new(
                                &job.agent.id,
                                ORCHESTRATOR,
                                MessageKind::Response,
                                format!("failed: {e}"),
                            )
                            .with_payload(json!({ "subtask": job.id, "error": e.to_string() })),
                        );
                    }
                }
            }
            tracing::info!(task = %task.id, wave, "wave finished");
        }

        report.pending = task
            .subtasks
            .iter()
            .filter(|s| s.status == TaskStatus::Pending)
            .map(|s| s.id.clone())
            .collect();
        if !report.pending.is_empty() {
            tracing::warn!(
                pending = ?report.pending,
                unschedulable = ?graph.unschedulable(),
                "subtasks left pending"
            );
        }
        Ok(report)
    }

    /// 以指定 Agent 执行一个子任务，并把结果写入其情景记忆
    async fn execute_subtask(
        &self,
        job: &Job,
        cancel: &CancellationToken,
    ) -> Result<ReasoningOutcome, HiveError> {
        {
            let mut memory = job.agent.memory().await;
            memory.working.set_goal(&job.description);
            memory.working.merge(job.context.clone());
        }

        let result = self
            .engine
            .reason_as(&job.agent, &job.description, &job.context, cancel)
            .await;

        let episode = match &result {
            Ok(outcome) => {
                let kind = if outcome.budget_exhausted {
                    Outcome::Partial
                } else {
                    Outcome::Success
                };
                Episode::new(&job.description, episode_actions(outcome), kind)
            }
            Err(e) => Episode::new(&job.description, Vec::new(), Outcome::Failure)
                .with_reflection(e.to_string()),
        };
        job.agent.memory().await.episodic.push(episode);

        result
    }
}
