//! Turn execution: the orchestration loop, element id allocation and the system prompt

pub mod element_ids;
pub mod prompts;
pub mod tool_loop;

pub use element_ids::ElementIdAllocator;
pub use prompts::build_system_instruction;
pub use tool_loop::{LoopConfig, LoopOutcome, MapToolLoop, StopReason};
