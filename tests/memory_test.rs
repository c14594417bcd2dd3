//! 记忆导出 / 导入与文件持久化

use std::sync::Arc;

use hive::config::AppConfig;
use hive::llm::MockReasoner;
use hive::memory::{MemoryPersistence, Outcome};
use hive::{ExecuteOptions, Orchestrator};

fn orchestrator() -> Orchestrator {
    Orchestrator::with_default_roster(Arc::new(MockReasoner), AppConfig::default()).unwrap()
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let source = orchestrator();
    source
        .execute_collaborative_task("Research and summarize borrow checking", ExecuteOptions::default())
        .await
        .unwrap();
    let exported = source.export_memories().await;

    let researcher = &exported.agents["researcher"];
    assert!(!researcher.short_term.is_empty());
    assert_eq!(researcher.episodic.len(), 1);
    assert_eq!(researcher.episodic[0].outcome, Outcome::Success);
    assert_eq!(researcher.long_term.experiences.len(), 1);

    let target = orchestrator();
    assert_eq!(target.import_memories(exported.clone()).await.unwrap(), 4);
    assert_eq!(target.export_memories().await, exported);
}

#[tokio::test]
async fn test_memories_survive_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryPersistence::new(dir.path().join("memories.json"));

    let first = orchestrator();
    first
        .execute_collaborative_task("Compute 6 * 7", ExecuteOptions::default())
        .await
        .unwrap();
    let exported = first.export_memories().await;
    store.save(&exported).unwrap();

    let second = orchestrator();
    second.import_memories(store.load().unwrap()).await.unwrap();
    assert_eq!(second.export_memories().await, exported);

    second
        .execute_collaborative_task("Compute 1 + 1", ExecuteOptions::default())
        .await
        .unwrap();
    let executor = second.agent("executor").unwrap();
    let memory = executor.memory().await;
    assert_eq!(memory.long_term.experience("compute").unwrap().total_runs(), 2);
    assert_eq!(memory.episodic.len(), 2);
}
