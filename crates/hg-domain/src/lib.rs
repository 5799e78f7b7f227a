pub mod capability;
pub mod config;
pub mod error;
pub mod session;
pub mod tool;
pub mod trace;
pub mod turn;

pub use capability::{LlmCapabilities, ModelRole, ToolSupport};
pub use config::{AppEnv, Config, ConfigError, ConfigSeverity};
pub use error::{Error, Result};
pub use session::{HistoryRole, RateBucket, Session, SessionMessage, ToolCallStatus, ToolInvocationTrace, Warning};
pub use tool::{ContentPart, Message, MessageContent, Role, ToolCall, ToolDefinition};
pub use trace::TraceEvent;
pub use turn::{AudioInput, AudioOutput, TurnInput, TurnInputError, TurnOutput, MAX_INLINE_BYTES};
