//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），由 ToolRegistry 按名注册与查找；
//! 同名注册后写覆盖。ToolExecutor 在调用时加超时与重试并统一转 HiveError。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// 工具 trait：名称、描述（供推理后端理解）、参数 schema、异步执行（输入输出均为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（注册表中的唯一键）
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认返回空对象，表示参数格式不限
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, String>;
}

/// 交给推理后端的工具描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// 工具注册表：按名称存储 Arc<dyn Tool>；内部 RwLock，读多写少
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；同名已存在时覆盖并返回 true
    pub fn register(&self, tool: impl Tool + 'static) -> bool {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.name().to_string();
        let mut tools = self.tools.write().unwrap_or_else(|e| e.into_inner());
        let replaced = tools.insert(name.clone(), tool).is_some();
        if replaced {
            tracing::debug!(tool = %name, "tool re-registered, previous entry replaced");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// 生成工具描述列表；allowed 非空时只返回其中的工具
    pub fn specs(&self, allowed: Option<&[String]>) -> Vec<ToolSpec> {
        let tools = self.tools.read().unwrap_or_else(|e| e.into_inner());
        let mut specs: Vec<ToolSpec> = tools
            .values()
            .filter(|t| match allowed {
                Some(names) => names.iter().any(|n| n == t.name()),
                None => true,
            })
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
