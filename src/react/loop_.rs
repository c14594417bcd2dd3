//! ReAct 推理引擎
//!
//! Thought -> (Action -> Observation) -> 下一轮 Thought；最多 step_budget 轮，由 Reasoner 判断何时停止。
//! reason_as 以某个 Agent 身份执行：工具限于该 Agent 的子集，观察写入其工作记忆，query/answer 写入其短期记忆。
//! 可选 event_tx：推送 Thought / ToolCall / Observation / Answer 等事件。

use std::future::Future;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::agents::Agent;
use crate::core::HiveError;
use crate::llm::{normalize_confidence, Context, Reasoner};
use crate::memory::Message;
use crate::react::step::ReasoningStep;
use crate::react::ReactEvent;
use crate::tools::ToolExecutor;

/// 默认推理步数预算
pub const DEFAULT_STEP_BUDGET: usize = 10;
/// 步数耗尽时尽力而为答案的置信度
const BUDGET_EXHAUSTED_CONFIDENCE: f64 = 0.5;
/// 注入上下文的长期记忆条数
const RECALL_LIMIT: usize = 3;
const OBSERVATION_PREVIEW_CHARS: usize = 200;

/// 单次推理结果
#[derive(Debug, Clone)]
pub struct ReasoningOutcome {
    pub answer: String,
    pub reasoning: Vec<ReasoningStep>,
    /// 始终在 [0, 1]
    pub confidence: f64,
    pub tools_used: Vec<String>,
    /// 实际执行的推理轮数，≤ step_budget
    pub total_steps: usize,
    pub budget_exhausted: bool,
}

pub struct ReasoningEngine {
    reasoner: Arc<dyn Reasoner>,
    executor: Arc<ToolExecutor>,
    step_budget: usize,
    event_tx: Option<UnboundedSender<ReactEvent>>,
}

fn preview(text: &str) -> String {
    if text.chars().count() > OBSERVATION_PREVIEW_CHARS {
        format!("{}...", text.chars().take(OBSERVATION_PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

/// 等待推理后端调用，期间可被取消
async fn guarded<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, String>>,
) -> Result<T, HiveError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(HiveError::Cancelled),
        r = fut => r.map_err(HiveError::Reasoner),
    }
}

impl ReasoningEngine {
    pub fn new(reasoner: Arc<dyn Reasoner>, executor: Arc<ToolExecutor>) -> Self {
        Self {
            reasoner,
            executor,
            step_budget: DEFAULT_STEP_BUDGET,
            event_tx: None,
        }
    }

    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = budget.max(1);
        self
    }

    pub fn with_event_tx(mut self, tx: UnboundedSender<ReactEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn send_event(&self, ev: ReactEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(ev);
        }
    }

    /// 不绑定 Agent 的推理：可用全部已注册工具
    pub async fn reason(
        &self,
        query: &str,
        context: Option<&Context>,
    ) -> Result<ReasoningOutcome, HiveError> {
        let context = context.cloned().unwrap_or_default();
        self.run(query, context, None, &CancellationToken::new()).await
    }

    /// 以 Agent 身份推理：注入指令与相关长期记忆，记录短期记忆
    pub async fn reason_as(
        &self,
        agent: &Agent,
        query: &str,
        context: &Context,
        cancel: &CancellationToken,
    ) -> Result<ReasoningOutcome, HiveError> {
        let mut context = context.clone();
        if !agent.directive.is_empty() {
            context.insert("directive".to_string(), json!(agent.directive));
        }
        {
            let mut memory = agent.memory().await;
            let recalled = memory.long_term.recall(query, RECALL_LIMIT);
            if !recalled.is_empty() {
                context.insert("past_learnings".to_string(), json!(recalled));
            }
            memory.short_term.push(Message::user(query));
        }

        let outcome = self.run(query, context, Some(agent), cancel).await?;

        agent
            .memory()
            .await
            .short_term
            .push(Message::assistant(outcome.answer.clone()));
        Ok(outcome)
    }

    async fn run(
        &self,
        query: &str,
        context: Context,
        agent: Option<&Agent>,
        cancel: &CancellationToken,
    ) -> Result<ReasoningOutcome, HiveError> {
        let registry = self.executor.registry();
        let specs = registry.specs(agent.map(|a| a.tools.as_slice()));
        let agent_id = agent.map(|a| a.id.as_str()).unwrap_or("-");

        let mut steps: Vec<ReasoningStep> = Vec::new();
        let mut tools_used: Vec<String> = Vec::new();
        let mut iterations = 0;

        while iterations < self.step_budget {
            if cancel.is_cancelled() {
                return Err(HiveError::Cancelled);
            }
            iterations += 1;
            self.send_event(ReactEvent::StepUpdate {
                step: iterations,
                max_steps: self.step_budget,
            });

            let thought = guarded(cancel, self.reasoner.think(query, &context, &steps)).await?;
            self.send_event(ReactEvent::Thought { text: thought.clone() });
            steps.push(ReasoningStep::thought(thought.clone()));

            if self.reasoner.is_sufficient(&steps) {
                let answer = guarded(cancel, self.reasoner.answer(query, &context, &steps)).await?;
                let confidence = normalize_confidence(self.reasoner.assess_confidence(&steps));
                tracing::debug!(agent = agent_id, iterations, confidence, "reasoning finished");
                self.send_event(ReactEvent::Answer {
                    confidence,
                    total_steps: iterations,
                });
                return Ok(ReasoningOutcome {
                    answer,
                    reasoning: steps,
                    confidence,
                    tools_used,
                    total_steps: iterations,
                    budget_exhausted: false,
                });
            }

            let Some(call) = guarded(cancel, self.reasoner.select_tool(query, &thought, &specs)).await?
            else {
                continue;
            };
            if !specs.iter().any(|s| s.name == call.tool) {
                tracing::warn!(agent = agent_id, tool = %call.tool, "selected tool unavailable, skipping");
                self.send_event(ReactEvent::ToolSkipped { tool: call.tool });
                continue;
            }

            self.send_event(ReactEvent::ToolCall {
                tool: call.tool.clone(),
                input: call.input.clone(),
            });
            steps.push(ReasoningStep::action(&call.tool, call.input.clone()));

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(HiveError::Cancelled),
                r = self.executor.execute(&call.tool, call.input) => r,
            };
            let (output, content) = match result {
                Ok(v) => {
                    let content = v.to_string();
                    (v, content)
                }
                Err(e) => {
                    self.send_event(ReactEvent::ToolFailure {
                        tool: call.tool.clone(),
                        reason: e.to_string(),
                    });
                    (json!({ "error": e.to_string() }), format!("Error: {e}"))
                }
            };
            self.send_event(ReactEvent::Observation {
                tool: call.tool.clone(),
                preview: preview(&content),
            });
            steps.push(ReasoningStep::observation(&call.tool, output.clone(), content));
            if !tools_used.contains(&call.tool) {
                tools_used.push(call.tool.clone());
            }
            if let Some(agent) = agent {
                agent.memory().await.working.set(call.tool.clone(), output);
            }
        }

        tracing::warn!(agent = agent_id, budget = self.step_budget, "step budget exhausted");
        let answer = guarded(cancel, self.reasoner.answer(query, &context, &steps)).await?;
        self.send_event(ReactEvent::Answer {
            confidence: BUDGET_EXHAUSTED_CONFIDENCE,
            total_steps: iterations,
        });
        Ok(ReasoningOutcome {
            answer,
            reasoning: steps,
            confidence: BUDGET_EXHAUSTED_CONFIDENCE,
            tools_used,
            total_steps: iterations,
            budget_exhausted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Agent, AgentRole};
    use crate::llm::{MockReasoner, ToolCall};
    use crate::react::step::StepKind;
    use crate::tools::{CalculatorTool, EchoTool, ToolRegistry, ToolSpec};
    use async_trait::async_trait;
    use std::time::Duration;

    fn executor() -> Arc<ToolExecutor> {
        let registry = ToolRegistry::new();
        registry.register(CalculatorTool);
        registry.register(EchoTool);
        Arc::new(ToolExecutor::new(Arc::new(registry), 5))
    }

    /// 永不满足、每轮都调用 echo 的后端，用于检验步数预算
    struct Relentless;

    #[async_trait]
    impl Reasoner for Relentless {
        async fn think(&self, _q: &str, _c: &Context, steps: &[ReasoningStep]) -> Result<String, String> {
            Ok(format!("still thinking ({})", steps.len()))
        }

        async fn select_tool(&self, _q: &str, _t: &str, _tools: &[ToolSpec]) -> Result<Option<ToolCall>, String> {
            Ok(Some(ToolCall::new("echo", json!({"text": "again"}))))
        }

        async fn answer(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
            Ok("best effort".to_string())
        }

        fn is_sufficient(&self, _steps: &[ReasoningStep]) -> bool {
            false
        }
    }

    /// 选择一个不存在的工具
    struct Hallucinating;

    #[async_trait]
    impl Reasoner for Hallucinating {
        async fn think(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
            Ok("thinking".to_string())
        }

        async fn select_tool(&self, _q: &str, _t: &str, _tools: &[ToolSpec]) -> Result<Option<ToolCall>, String> {
            Ok(Some(ToolCall::new("teleport", json!({}))))
        }

        async fn answer(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
            Ok("no tools".to_string())
        }
    }

    /// 置信度评估返回 NaN
    struct Unsure;

    #[async_trait]
    impl Reasoner for Unsure {
        async fn think(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
            Ok("done".to_string())
        }

        async fn select_tool(&self, _q: &str, _t: &str, _tools: &[ToolSpec]) -> Result<Option<ToolCall>, String> {
            Ok(None)
        }

        async fn answer(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
            Ok("maybe".to_string())
        }

        fn is_sufficient(&self, _steps: &[ReasoningStep]) -> bool {
            true
        }

        fn assess_confidence(&self, _steps: &[ReasoningStep]) -> f64 {
            f64::NAN
        }
    }

    /// think 永远挂起，用于检验取消
    struct Stuck;

    #[async_trait]
    impl Reasoner for Stuck {
        async fn think(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }

        async fn select_tool(&self, _q: &str, _t: &str, _tools: &[ToolSpec]) -> Result<Option<ToolCall>, String> {
            Ok(None)
        }

        async fn answer(&self, _q: &str, _c: &Context, _s: &[ReasoningStep]) -> Result<String, String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_calculator_action_step() {
        let engine = ReasoningEngine::new(Arc::new(MockReasoner), executor());
        let outcome = engine.reason("what is 2+2", None).await.unwrap();

        let action = outcome.reasoning.iter().find(|s| s.kind == StepKind::Action).unwrap();
        assert_eq!(action.tool.as_deref(), Some("calculator"));
        assert_eq!(action.tool_input, Some(json!({"expression": "2+2"})));
        let observation = outcome.reasoning.iter().find(|s| s.is_observation()).unwrap();
        assert_eq!(observation.tool_output, Some(json!({"result": 4})));
        assert_eq!(outcome.tools_used, vec!["calculator".to_string()]);
        assert!(!outcome.budget_exhausted);
    }

    #[tokio::test]
    async fn test_budget_exhausted_is_best_effort() {
        let engine = ReasoningEngine::new(Arc::new(Relentless), executor()).with_step_budget(3);
        let outcome = engine.reason("loop forever", None).await.unwrap();
        assert_eq!(outcome.total_steps, 3);
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.confidence, 0.5);
        assert_eq!(outcome.answer, "best effort");
        assert_eq!(outcome.reasoning.len(), 9);
    }

    #[tokio::test]
    async fn test_total_steps_within_default_budget() {
        let engine = ReasoningEngine::new(Arc::new(Relentless), executor());
        let outcome = engine.reason("loop forever", None).await.unwrap();
        assert!(outcome.total_steps <= DEFAULT_STEP_BUDGET);
        assert!((0.0..=1.0).contains(&outcome.confidence));
    }

    #[tokio::test]
    async fn test_non_finite_confidence_is_zero() {
        let engine = ReasoningEngine::new(Arc::new(Unsure), executor());
        let outcome = engine.reason("q", None).await.unwrap();
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.total_steps, 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_noop() {
        let engine = ReasoningEngine::new(Arc::new(Hallucinating), executor());
        let outcome = engine.reason("anything", None).await.unwrap();
        assert!(outcome.reasoning.iter().all(|s| s.is_thought()));
        assert!(outcome.tools_used.is_empty());
        assert_eq!(outcome.confidence, 0.3);
        assert_eq!(outcome.total_steps, 4);
    }

    #[tokio::test]
    async fn test_reason_as_restricts_tools_and_writes_memory() {
        let engine = ReasoningEngine::new(Arc::new(MockReasoner), executor());
        let agent = Agent::new("r1", "Researcher", AgentRole::Researcher).with_tools(["echo"]);
        let outcome = engine
            .reason_as(&agent, "compute 2+2", &Context::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.tools_used, vec!["echo".to_string()]);

        let memory = agent.memory().await;
        assert!(memory.working.get("echo").is_some());
        assert_eq!(memory.short_term.len(), 2);
    }

    #[tokio::test]
    async fn test_cancellation() {
        let engine = ReasoningEngine::new(Arc::new(Stuck), executor());
        let agent = Agent::new("r1", "Researcher", AgentRole::Researcher);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let err = engine
            .reason_as(&agent, "q", &Context::new(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, HiveError::Cancelled));
    }

    #[tokio::test]
    async fn test_events_are_emitted() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let engine = ReasoningEngine::new(Arc::new(MockReasoner), executor()).with_event_tx(tx);
        engine.reason("what is 2+2", None).await.unwrap();
        drop(engine);
        let mut saw_tool_call = false;
        let mut saw_answer = false;
        while let Some(ev) = rx.recv().await {
            match ev {
                ReactEvent::ToolCall { tool, .. } => saw_tool_call = tool == "calculator",
                ReactEvent::Answer { .. } => saw_answer = true,
                _ => {}
            }
        }
        assert!(saw_tool_call && saw_answer);
    }
}
