//! Engine crate – the EcoEngineer quiz core.
//!
//! Holds the four module engines, the session rollup and the JSON command
//! boundary. It knows nothing about rendering, so the terminal shell and any
//! other front end drive the same logic.

pub mod catalog;
pub mod commands;
pub mod context;
pub mod quiz;
pub mod scenario;
pub mod session;
pub mod stage;
pub mod types;

// Re-exports for convenience
pub use commands::CommandRegistry;
pub use context::AppContext;
pub use quiz::{ModuleId, ModuleState, Outcome, QuizModule};
pub use session::{ProgressAggregate, Session};
pub use stage::{Answer, StageKind, StageSpec};
pub use types::{CommandResult, ErrorCode, ErrorInfo, Status};
