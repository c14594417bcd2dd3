//! 综合器：把所有子任务结果拼进一个提示，由 synthesizer Agent 给出最终结果

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::agents::Agent;
use crate::core::HiveError;
use crate::llm::Context;
use crate::react::ReasoningEngine;
use crate::workflow::CollaborativeTask;

pub struct Synthesizer {
    engine: Arc<ReasoningEngine>,
}

/// 子任务结果汇总（失败的子任务附带错误，未执行的标注 pending）
pub fn render_results(task: &CollaborativeTask) -> String {
    task.subtasks
        .iter()
        .map(|s| match (&s.result, &s.error) {
            (Some(result), _) => format!("[{}] {}\n{}", s.id, s.description, result),
            (None, Some(error)) => format!("[{}] {}\nfailed: {}", s.id, s.description, error),
            (None, None) => format!("[{}] {}\n(not executed)", s.id, s.description),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl Synthesizer {
    pub fn new(engine: Arc<ReasoningEngine>) -> Self {
        Self { engine }
    }

    pub async fn synthesize(
        &self,
        agent: &Agent,
        task: &CollaborativeTask,
        cancel: &CancellationToken,
    ) -> Result<String, HiveError> {
        let prompt = format!(
            "Combine the following subtask results into one answer for the task: {}\n\n{}",
            task.description,
            render_results(task)
        );
        let context: Context = task
            .subtasks
            .iter()
            .filter_map(|s| s.result.as_ref().map(|r| (s.id.clone(), json!(r))))
            .collect();

        let outcome = self.engine.reason_as(agent, &prompt, &context, cancel).await?;
        tracing::info!(task = %task.id, agent = %agent.id, "results synthesized");
        Ok(outcome.answer)
    }
}
