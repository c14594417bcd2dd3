//! 校验器：让推理后端对照任务评审结果；置信度高于阈值即通过

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::agents::Agent;
use crate::core::HiveError;
use crate::llm::Context;
use crate::react::ReasoningEngine;
use crate::workflow::CollaborativeTask;

pub const DEFAULT_PASS_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    /// 评审意见原文
    pub feedback: String,
}

pub struct Validator {
    engine: Arc<ReasoningEngine>,
    threshold: f64,
}

impl Validator {
    pub fn new(engine: Arc<ReasoningEngine>) -> Self {
        Self {
            engine,
            threshold: DEFAULT_PASS_THRESHOLD,
        }
    }

    /// 非有限阈值沿用默认值
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        if threshold.is_finite() {
            self.threshold = threshold.clamp(0.0, 1.0);
        }
        self
    }

    pub async fn validate(
        &self,
        agent: &Agent,
        task: &CollaborativeTask,
        result: &str,
        cancel: &CancellationToken,
    ) -> Result<ValidationReport, HiveError> {
        let prompt = format!(
            "Critique this result against the task.\nTask: {}\nResult: {}",
            task.description, result
        );
        let mut context = Context::new();
        context.insert("result".to_string(), json!(result));

        let outcome = self.engine.reason_as(agent, &prompt, &context, cancel).await?;
        let report = ValidationReport {
            passed: outcome.confidence > self.threshold,
            confidence: outcome.confidence,
            issues: Vec::new(),
            feedback: outcome.answer,
        };
        tracing::info!(
            task = %task.id,
            agent = %agent.id,
            passed = report.passed,
            confidence = report.confidence,
            threshold = self.threshold,
            "validation finished"
        );
        Ok(report)
    }
}
