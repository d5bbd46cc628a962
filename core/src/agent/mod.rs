pub mod conversation;
pub mod invoker;
pub mod loop_;
pub mod registry;

pub use conversation::Conversation;
pub use invoker::{InvocationErrorKind, InvocationResult, SENTINEL_REQUEST_ID, ToolInvoker};
pub use loop_::{AgentError, AgentLoop};
pub use registry::{RegistryError, ToolRegistry};
