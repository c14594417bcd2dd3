//! 反思器：对整次协作（参与 Agent、子任务结果、校验结论）给出自由文本评述，原样返回

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::agents::Agent;
use crate::core::HiveError;
use crate::llm::Context;
use crate::react::ReasoningEngine;
use crate::review::synthesizer::render_results;
use crate::review::ValidationReport;
use crate::workflow::CollaborativeTask;

pub struct Reflector {
    engine: Arc<ReasoningEngine>,
}

impl Reflector {
    pub fn new(engine: Arc<ReasoningEngine>) -> Self {
        Self { engine }
    }

    pub async fn reflect(
        &self,
        agent: &Agent,
        task: &CollaborativeTask,
        team: &[Arc<Agent>],
        validation: &ValidationReport,
        cancel: &CancellationToken,
    ) -> Result<String, HiveError> {
        let members: Vec<String> = team.iter().map(|a| a.summary()).collect();
        let prompt = format!(
            "Reflect on this collaboration and note what went well and what to improve.\n\
             Task: {}\nAgents: {}\nValidation: passed={} confidence={:.2}\n\n{}",
            task.description,
            members.join("; "),
            validation.passed,
            validation.confidence,
            render_results(task)
        );
        let mut context = Context::new();
        context.insert("validation".to_string(), json!(validation));

        let outcome = self.engine.reason_as(agent, &prompt, &context, cancel).await?;
        Ok(outcome.answer)
    }
}
