//! Hive 命令行入口
//!
//! 用法：`hive [--memory <file>] [--config <file>] <task description...>`
//! 使用确定性的 MockReasoner 执行一次协作任务，把结果以 JSON 打印到 stdout。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use hive::config::{load_config, AppConfig};
use hive::llm::MockReasoner;
use hive::memory::MemoryPersistence;
use hive::{observability, ExecuteOptions, Orchestrator};

struct Args {
    memory: Option<PathBuf>,
    config: Option<PathBuf>,
    task: String,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut memory = None;
    let mut config = None;
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--memory" => memory = Some(PathBuf::from(args.next().context("--memory needs a path")?)),
            "--config" => config = Some(PathBuf::from(args.next().context("--config needs a path")?)),
            _ => words.push(arg),
        }
    }
    if words.is_empty() {
        bail!("usage: hive [--memory <file>] [--config <file>] <task description...>");
    }
    Ok(Args {
        memory,
        config,
        task: words.join(" "),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();
    let args = parse_args()?;

    let cfg = load_config(args.config.clone()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let orchestrator = Orchestrator::with_default_roster(Arc::new(MockReasoner), cfg)
        .context("Failed to build orchestrator")?;

    let store = args.memory.as_ref().map(MemoryPersistence::new);
    if let Some(store) = &store {
        let export = store.load().context("Failed to load memories")?;
        let imported = orchestrator.import_memories(export).await?;
        tracing::info!(imported, "memories loaded");
    }

    let result = orchestrator
        .execute_collaborative_task(&args.task, ExecuteOptions::default())
        .await
        .context("Collaborative task failed")?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(store) = &store {
        store
            .save(&orchestrator.export_memories().await)
            .context("Failed to save memories")?;
    }
    Ok(())
}
