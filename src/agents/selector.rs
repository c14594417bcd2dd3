//! Agent 选择器
//!
//! 贪心匹配：按所需能力顺序，为每项能力挑选第一个尚未入选且具备该能力的 Agent，直到达到 max_agents；
//! 无法满足的能力记入 missing（不报错）；synthesizer 不受上限约束，总是入选。

use std::sync::Arc;

use crate::agents::agent::capability::SYNTHESIS;
use crate::agents::Agent;

#[derive(Debug, Clone)]
pub struct Selection {
    pub agents: Vec<Arc<Agent>>,
    /// 没有任何入选 Agent 具备的能力
    pub missing: Vec<String>,
}

impl Selection {
    pub fn agent_ids(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    /// 入选 Agent 中第一个具备该能力的
    pub fn agent_for(&self, capability: &str) -> Option<&Arc<Agent>> {
        self.agents.iter().find(|a| a.has_capability(capability))
    }

    pub fn synthesizer(&self) -> Option<&Arc<Agent>> {
        self.agent_for(SYNTHESIS)
    }
}

#[derive(Debug, Clone)]
pub struct AgentSelector {
    max_agents: usize,
}

impl AgentSelector {
    pub fn new(max_agents: usize) -> Self {
        Self { max_agents }
    }

    pub fn select(&self, candidates: &[Arc<Agent>], required: &[String]) -> Selection {
        let mut selected: Vec<Arc<Agent>> = Vec::new();

        for capability in required {
            if selected.len() >= self.max_agents {
                break;
            }
            let pick = candidates
                .iter()
                .find(|a| a.has_capability(capability) && !selected.iter().any(|s| s.id == a.id));
            if let Some(agent) = pick {
                selected.push(Arc::clone(agent));
            }
        }

        if !selected.iter().any(|a| a.has_capability(SYNTHESIS)) {
            if let Some(synth) = candidates.iter().find(|a| a.has_capability(SYNTHESIS)) {
                selected.push(Arc::clone(synth));
            }
        }

        let mut missing: Vec<String> = Vec::new();
        for capability in required {
            if !selected.iter().any(|a| a.has_capability(capability)) && !missing.contains(capability) {
                missing.push(capability.clone());
            }
        }
        if !missing.is_empty() {
            tracing::warn!(?missing, "required capabilities could not be filled");
        }

        Selection {
            agents: selected,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::roster::default_roster;
    use crate::config::MemorySection;

    fn roster() -> Vec<Arc<Agent>> {
        default_roster(&MemorySection::default())
            .into_iter()
            .map(Arc::new)
            .collect()
    }

    fn caps(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_chain_selects_full_roster() {
        let selection = AgentSelector::new(5)
            .select(&roster(), &caps(&["research", "execution", "validation"]));
        assert_eq!(
            selection.agent_ids(),
            vec!["researcher", "executor", "critic", "synthesizer"]
        );
        assert!(selection.missing.is_empty());
    }

    #[test]
    fn test_cap_still_includes_synthesizer() {
        let selection = AgentSelector::new(1)
            .select(&roster(), &caps(&["research", "execution"]));
        assert_eq!(selection.agent_ids(), vec!["researcher", "synthesizer"]);
        assert_eq!(selection.missing, caps(&["execution"]));
    }

    #[test]
    fn test_unfillable_capability_is_skipped() {
        let selection = AgentSelector::new(5)
            .select(&roster(), &caps(&["research", "translation"]));
        assert_eq!(selection.agent_ids(), vec!["researcher", "synthesizer"]);
        assert_eq!(selection.missing, caps(&["translation"]));
    }

    #[test]
    fn test_synthesis_requirement_not_duplicated() {
        let selection = AgentSelector::new(5)
            .select(&roster(), &caps(&["synthesis", "research"]));
        assert_eq!(selection.agent_ids(), vec!["synthesizer", "researcher"]);
    }
}
