//! 收尾阶段：综合、校验、反思与记忆沉淀

pub mod consolidation;
pub mod reflector;
pub mod synthesizer;
pub mod validator;

pub use consolidation::{consolidate, task_category};
pub use reflector::Reflector;
pub use synthesizer::{render_results, Synthesizer};
pub use validator::{ValidationReport, Validator, DEFAULT_PASS_THRESHOLD};
