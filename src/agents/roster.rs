//! 默认 Agent 阵容：researcher / executor / critic / synthesizer

use crate::agents::agent::capability::{EXECUTION, RESEARCH, SYNTHESIS, VALIDATION};
use crate::agents::{Agent, AgentRole};
use crate::config::MemorySection;
use crate::memory::AgentMemory;

pub fn default_roster(memory: &MemorySection) -> Vec<Agent> {
    vec![
        Agent::new("researcher", "Researcher", AgentRole::Researcher)
            .with_capabilities([RESEARCH])
            .with_tools(["echo"])
            .with_directive("Gather relevant facts and sources; report findings concisely.")
            .with_memory(AgentMemory::from_config(memory)),
        Agent::new("executor", "Executor", AgentRole::Executor)
            .with_capabilities([EXECUTION])
            .with_tools(["calculator", "echo"])
            .with_directive("Carry out the concrete work using the findings from earlier steps.")
            .with_memory(AgentMemory::from_config(memory)),
        Agent::new("critic", "Critic", AgentRole::Critic)
            .with_capabilities([VALIDATION])
            .with_tools(["echo"])
            .with_directive("Check results against the task; point out gaps and errors.")
            .with_memory(AgentMemory::from_config(memory)),
        Agent::new("synthesizer", "Synthesizer", AgentRole::Synthesizer)
            .with_capabilities([SYNTHESIS])
            .with_directive("Combine the outputs of all agents into one coherent result.")
            .with_memory(AgentMemory::from_config(memory)),
    ]
}
