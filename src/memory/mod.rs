//! 记忆层：短期（近期消息）、工作（任务草稿）、情景（Episode）、长期（事实/经验/学习）、持久化

pub mod agent_memory;
pub mod conversation;
pub mod episodic;
pub mod long_term;
pub mod persistence;
pub mod working;

pub use agent_memory::{AgentMemory, AgentMemoryExport};
pub use conversation::{Message, Role, ShortTermMemory};
pub use episodic::{Episode, EpisodicMemory, Outcome};
pub use long_term::{Learning, LongTermExport, LongTermMemory, TaskExperience};
pub use persistence::{MemoryExport, MemoryPersistence};
pub use working::WorkingMemory;
