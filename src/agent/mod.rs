//! Tool registry and the tool-calling conversation loop.

mod registry;
mod runner;
mod toolset;

pub use registry::{Tool, ToolHandler, ToolRegistry};
pub use runner::{Agent, AgentResponse, ToolCallRecord, ToolFailurePolicy};
pub use toolset::builtin_registry;
