//! Echo 工具：回显文本

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use crate::tools::Tool;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EchoArgs {
    /// 要回显的文本
    #[serde(default)]
    pub text: Option<String>,
}

pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo text back as an observation. Args: {\"text\": \"message\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schema_for!(EchoArgs)).unwrap_or(Value::Null)
    }

    async fn execute(&self, input: Value) -> Result<Value, String> {
        let args: EchoArgs =
            serde_json::from_value(input).map_err(|e| format!("invalid arguments: {e}"))?;
        let text = args.text.unwrap_or_else(|| "(empty)".to_string());
        Ok(serde_json::json!({ "text": text }))
    }
}
