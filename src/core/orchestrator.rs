//! 协作编排器：对外入口
//!
//! 流程：规划 -> 选人与分配 -> （审批）-> 按波次调度子任务 -> 综合 -> 校验 -> 反思 -> 记忆沉淀。
//! 整个运行可设超时：到期后取消本次运行的 CancellationToken 并返回 Timeout。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::agents::capability::VALIDATION;
use crate::agents::{default_roster, Agent, AgentId, AgentRegistry, AgentSelector};
use crate::config::AppConfig;
use crate::core::approval::{ApprovalDecision, ApprovalGate};
use crate::core::{HiveError, TaskStatus};
use crate::llm::Reasoner;
use crate::memory::persistence::MEMORY_EXPORT_VERSION;
use crate::memory::MemoryExport;
use crate::messaging::{AgentMessage, MessageKind, MessageLog};
use crate::react::ReasoningEngine;
use crate::review::{consolidate, task_category, Reflector, Synthesizer, ValidationReport, Validator};
use crate::tools::{CalculatorTool, EchoTool, Tool, ToolExecutor, ToolRegistry};
use crate::workflow::{CollaborativeTask, Scheduler, TaskPlanner, ORCHESTRATOR};

/// 单次协作任务的调用选项
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// 整体超时；None 时使用配置中的 default_timeout_secs
    pub timeout: Option<Duration>,
    /// 覆盖配置中的 max_agents
    pub max_agents: Option<usize>,
    pub require_approval: bool,
    /// 任务类别（经验记忆的键）；None 时取描述首词
    pub category: Option<String>,
    /// 调用方的取消令牌；本次运行使用其子令牌
    pub cancel: Option<CancellationToken>,
}

impl ExecuteOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_agents(mut self, max_agents: usize) -> Self {
        self.max_agents = Some(max_agents);
        self
    }

    pub fn with_approval(mut self) -> Self {
        self.require_approval = true;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollaborativeResult {
    pub task: CollaborativeTask,
    pub result: String,
    pub agents: Vec<AgentId>,
    pub duration_ms: u64,
    pub messages: Vec<AgentMessage>,
    pub reflection: String,
    pub validation: ValidationReport,
    /// 没有任何已注册 Agent 能满足的能力
    pub missing_capabilities: Vec<String>,
}

pub struct Orchestrator {
    tools: Arc<ToolRegistry>,
    agents: AgentRegistry,
    engine: Arc<ReasoningEngine>,
    planner: TaskPlanner,
    approval: Option<Arc<dyn ApprovalGate>>,
    config: AppConfig,
}

impl Orchestrator {
    /// 空编排器：无工具、无 Agent
    pub fn new(reasoner: Arc<dyn Reasoner>, config: AppConfig) -> Self {
        let tools = Arc::new(ToolRegistry::new());
        let executor = Arc::new(ToolExecutor::from_config(Arc::clone(&tools), &config.tools));
        let engine = ReasoningEngine::new(reasoner, executor)
            .with_step_budget(config.orchestrator.step_budget);
        Self {
            tools,
            agents: AgentRegistry::new(),
            engine: Arc::new(engine),
            planner: TaskPlanner::new(),
            approval: None,
            config,
        }
    }

    /// 注册内置工具（calculator、echo）与默认四个 Agent
    pub fn with_default_roster(reasoner: Arc<dyn Reasoner>, config: AppConfig) -> Result<Self, HiveError> {
        let orchestrator = Self::new(reasoner, config);
        orchestrator.register_tool(CalculatorTool);
        orchestrator.register_tool(EchoTool);
        for agent in default_roster(&orchestrator.config.memory) {
            orchestrator.register_agent(agent)?;
        }
        Ok(orchestrator)
    }

    pub fn with_approval_gate(mut self, gate: Arc<dyn ApprovalGate>) -> Self {
        self.approval = Some(gate);
        self
    }

    /// 同名工具会被覆盖；返回是否发生覆盖
    pub fn register_tool(&self, tool: impl Tool + 'static) -> bool {
        let name = tool.name().to_string();
        let replaced = self.tools.register(tool);
        if replaced {
            tracing::info!(tool = %name, "tool re-registered, previous entry replaced");
        }
        replaced
    }

    pub fn register_agent(&self, agent: Agent) -> Result<Arc<Agent>, HiveError> {
        self.agents.register(agent)
    }

    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.agents.all()
    }

    pub fn agent(&self, id: &str) -> Option<Arc<Agent>> {
        self.agents.get(id)
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn execute_collaborative_task(
        &self,
        description: &str,
        options: ExecuteOptions,
    ) -> Result<CollaborativeResult, HiveError> {
        let cancel = options
            .cancel
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_else(CancellationToken::new);
        let limit = options.timeout.or_else(|| {
            self.config
                .orchestrator
                .default_timeout_secs
                .map(Duration::from_secs)
        });

        match limit {
            Some(limit) => {
                match tokio::time::timeout(limit, self.run(description, &options, &cancel)).await {
                    Ok(result) => result,
                    Err(_) => {
                        cancel.cancel();
                        let ms = limit.as_millis() as u64;
                        tracing::warn!(timeout_ms = ms, "collaborative task timed out");
                        Err(HiveError::Timeout(ms))
                    }
                }
            }
            None => self.run(description, &options, &cancel).await,
        }
    }

    async fn run(
        &self,
        description: &str,
        options: &ExecuteOptions,
        cancel: &CancellationToken,
    ) -> Result<CollaborativeResult, HiveError> {
        let started = Instant::now();
        let messages = Arc::new(MessageLog::new());

        let candidates = self.agents.all();
        if candidates.is_empty() {
            return Err(HiveError::Config("no agents registered".to_string()));
        }

        let plan = self.planner.plan(description);
        let category = task_category(description, options.category.as_deref());
        let mut task = CollaborativeTask::new(description, category, plan);
        tracing::info!(
            task = %task.id,
            category = %task.category,
            subtasks = task.subtasks.len(),
            "task planned"
        );

        let max_agents = options.max_agents.unwrap_or(self.config.orchestrator.max_agents);
        let selection = AgentSelector::new(max_agents).select(&candidates, &task.required_capabilities);
        if !selection.missing.is_empty() {
            messages.send(
                AgentMessage::new(
                    ORCHESTRATOR,
                    crate::messaging::BROADCAST,
                    MessageKind::Broadcast,
                    format!("missing capabilities: {}", selection.missing.join(", ")),
                )
                .with_payload(serde_json::json!({ "missing": selection.missing })),
            );
        }
        task.assign(&selection);
        tracing::info!(task = %task.id, agents = ?task.assigned_agents, "agents selected");

        let lead = selection
            .synthesizer()
            .or_else(|| selection.agents.first())
            .or_else(|| candidates.first())
            .cloned()
            .ok_or_else(|| HiveError::Config("no agents registered".to_string()))?;

        if options.require_approval {
            let gate = self.approval.as_ref().ok_or_else(|| {
                HiveError::Config("approval required but no approval gate configured".to_string())
            })?;
            if let ApprovalDecision::Rejected(reason) = gate.review(&task).await {
                task.set_status(TaskStatus::Failed)?;
                messages.broadcast(ORCHESTRATOR, format!("task rejected: {reason}"));
                tracing::warn!(task = %task.id, %reason, "approval rejected");
                return Err(HiveError::ApprovalRejected(reason));
            }
            tracing::info!(task = %task.id, "approval granted");
        }

        for agent in &selection.agents {
            agent.memory().await.begin_task(description);
            messages.send(AgentMessage::new(
                ORCHESTRATOR,
                &agent.id,
                MessageKind::Request,
                format!("join task: {description}"),
            ));
        }
        task.set_status(TaskStatus::InProgress)?;

        let scheduler = Scheduler::new(Arc::clone(&self.engine), Arc::clone(&messages));
        let report = scheduler.run(&mut task, &selection.agents, cancel).await?;
        tracing::info!(
            task = %task.id,
            waves = report.waves,
            completed = report.completed,
            failed = report.failed,
            pending = report.pending.len(),
            "subtasks scheduled"
        );

        let result = Synthesizer::new(Arc::clone(&self.engine))
            .synthesize(&lead, &task, cancel)
            .await?;
        task.result = Some(result.clone());

        let critic = selection.agent_for(VALIDATION).cloned().unwrap_or_else(|| Arc::clone(&lead));
        let validation = Validator::new(Arc::clone(&self.engine))
            .with_threshold(self.config.orchestrator.pass_threshold)
            .validate(&critic, &task, &result, cancel)
            .await?;
        task.set_status(if validation.passed {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        })?;

        let reflection = Reflector::new(Arc::clone(&self.engine))
            .reflect(&lead, &task, &selection.agents, &validation, cancel)
            .await?;

        let duration_ms = started.elapsed().as_millis() as u64;
        consolidate(&selection.agents, &task, &validation, duration_ms, &reflection).await;
        messages.broadcast(ORCHESTRATOR, format!("task {}: {}", task.id, task.status));
        tracing::info!(
            task = %task.id,
            status = %task.status,
            confidence = validation.confidence,
            duration_ms,
            "collaborative task finished"
        );

        Ok(CollaborativeResult {
            agents: task.assigned_agents.clone(),
            task,
            result,
            duration_ms,
            messages: messages.snapshot(),
            reflection,
            validation,
            missing_capabilities: selection.missing,
        })
    }

    /// 导出所有已注册 Agent 的记忆
    pub async fn export_memories(&self) -> MemoryExport {
        let mut agents = BTreeMap::new();
        for agent in self.agents.all() {
            agents.insert(agent.id.clone(), agent.memory().await.export());
        }
        MemoryExport {
            version: MEMORY_EXPORT_VERSION,
            agents,
        }
    }

    /// 导入记忆；未注册的 Agent 被跳过。返回导入的 Agent 数
    pub async fn import_memories(&self, export: MemoryExport) -> Result<usize, HiveError> {
        if export.version != MEMORY_EXPORT_VERSION {
            return Err(HiveError::MemoryImport(format!(
                "unsupported version {} (expected {})",
                export.version, MEMORY_EXPORT_VERSION
            )));
        }
        let mut imported = 0;
        for (id, memory) in export.agents {
            match self.agents.get(&id) {
                Some(agent) => {
                    agent.memory().await.import(memory);
                    imported += 1;
                }
                None => tracing::warn!(agent = %id, "skipping memories of unknown agent"),
            }
        }
        Ok(imported)
    }
}
