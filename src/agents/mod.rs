//! Agent 层：Agent 定义、注册表、默认阵容与能力匹配选择器

pub mod agent;
pub mod registry;
pub mod roster;
pub mod selector;

pub use agent::{capability, Agent, AgentId, AgentRole};
pub use registry::AgentRegistry;
pub use roster::default_roster;
pub use selector::{AgentSelector, Selection};
