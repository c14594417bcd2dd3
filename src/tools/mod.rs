//! 工具层：Tool trait、注册表、带超时/重试的执行器与内置工具（calculator、echo）

pub mod calculator;
pub mod echo;
pub mod executor;
pub mod registry;

pub use calculator::CalculatorTool;
pub use echo::EchoTool;
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry, ToolSpec};
