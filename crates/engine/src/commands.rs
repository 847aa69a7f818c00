//! Command registry – the JSON boundary a presentation shell talks to.
//!
//! Commands are registered by name and invoked with JSON input/output.

use crate::context::AppContext;
use crate::quiz::{ModuleId, UnknownModule};
use crate::stage::Answer;
use crate::types::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Instant;

/// Signature for all engine commands.
pub type CommandHandler = fn(Value, &AppContext) -> Result<Value, CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    UnknownModule(#[from] UnknownModule),
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::InvalidInput(_) | CommandError::UnknownModule(_) => {
                ErrorCode::InvalidInput
            }
            CommandError::Other(_) => ErrorCode::InternalError,
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        CommandError::Other(format!("serialization failed: {}", e))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            handlers: HashMap::new(),
        };
        reg.register("ping", cmd_ping);
        reg.register("modules", cmd_modules);
        reg.register("state", cmd_state);
        reg.register("stage", cmd_stage);
        reg.register("submit", cmd_submit);
        reg.register("reset", cmd_reset);
        reg.register("aggregate", cmd_aggregate);
        reg.register("lesson", cmd_lesson);
        reg
    }

    pub fn register(&mut self, name: &str, handler: CommandHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Execute a command by name and return a full CommandResult.
    pub fn execute(&self, name: &str, args: Value, ctx: &AppContext) -> CommandResult {
        let run_id = new_run_id();
        let start = Instant::now();

        let handler = match self.handlers.get(name) {
            Some(h) => h,
            None => {
                return result_err(
                    "call",
                    name,
                    &run_id,
                    start.elapsed().as_millis() as u64,
                    ErrorCode::InvalidInput,
                    format!("unknown command: {}", name),
                );
            }
        };

        match handler(args, ctx) {
            Ok(data) => {
                let mut r = result_ok("call", name, &run_id, start.elapsed().as_millis() as u64);
                r.data = Some(data);
                r
            }
            Err(e) => {
                tracing::debug!(command = name, error = %e, "command failed");
                result_err(
                    "call",
                    name,
                    &run_id,
                    start.elapsed().as_millis() as u64,
                    e.error_code(),
                    e.to_string(),
                )
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn module_arg(args: &Value) -> Result<ModuleId, CommandError> {
    let name = args
        .get("module")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CommandError::InvalidInput("missing 'module' string field".into()))?;
    Ok(name.parse()?)
}

/// Any number is accepted. Numbers that cannot name a stage map to 0 or
/// `u32::MAX`, neither of which is ever current.
fn stage_arg(args: &Value) -> Result<u32, CommandError> {
    let value = match args.get("stage") {
        None | Some(Value::Null) => {
            return Err(CommandError::InvalidInput("missing 'stage' field".into()))
        }
        Some(v) => v,
    };
    let n = match (value.as_i64(), value.as_f64()) {
        (Some(n), _) => n,
        (None, Some(f)) if f.fract() == 0.0 => f as i64,
        (None, Some(_)) => 0,
        (None, None) => {
            return Err(CommandError::InvalidInput(format!(
                "'stage' must be a number, got {}",
                value
            )))
        }
    };
    Ok(u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

// ===========================================================================
// Built-in commands
// ===========================================================================

/// `ping` – returns { "pong": true }. Proves wiring works.
fn cmd_ping(_args: Value, _ctx: &AppContext) -> Result<Value, CommandError> {
    Ok(json!({ "pong": true }))
}

/// `modules` – list every module with its headline progress.
fn cmd_modules(_args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let session = ctx.session();
    let modules: Vec<Value> = ModuleId::ALL
        .iter()
        .map(|&id| {
            let state = session.get_state(id);
            json!({
                "id": id,
                "name": id.name(),
                "icon": id.def().icon,
                "score": state.score,
                "completed": state.completed,
            })
        })
        .collect();
    Ok(json!({ "modules": modules }))
}

/// `state` – read one module's state.
///
/// Args: `{ "module": "solar" }`
/// Returns: `{ "stage": 1, "score": 0, "completed": false, "hint": null }`
fn cmd_state(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let id = module_arg(&args)?;
    let state = ctx.session().get_state(id);
    Ok(serde_json::to_value(state)?)
}

/// `stage` – what the shell should render for a module right now.
///
/// Args: `{ "module": "solar" }`
/// Returns the module state, the current stage view (absent once completed)
/// and per-stage status markers.
fn cmd_stage(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let id = module_arg(&args)?;
    let mut session = ctx.session();
    let module = session.init(id);
    Ok(json!({
        "module": id,
        "name": id.name(),
        "state": module.state(),
        "current": module.current_view(),
        "stages": module.stage_progress(),
    }))
}

/// `submit` – evaluate an answer for the current stage.
///
/// Args: `{ "module": "wind", "stage": 6, "answer": 0.25 }`. A missing or
/// null `answer` is replaced by the stage's sentinel value.
fn cmd_submit(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let id = module_arg(&args)?;
    let stage = stage_arg(&args)?;
    let answer = match args.get("answer") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            serde_json::from_value::<Answer>(v.clone())
                .map_err(|_| CommandError::InvalidInput(format!("unsupported answer: {}", v)))?,
        ),
    };

    let mut session = ctx.session();
    let outcome = match answer {
        Some(answer) => session.submit_answer(id, stage, &answer),
        None => session.submit_blank(id, stage),
    };
    Ok(serde_json::to_value(outcome)?)
}

/// `reset` – clear the whole session; returns the (empty) aggregate.
fn cmd_reset(_args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let mut session = ctx.session();
    session.reset_all();
    Ok(serde_json::to_value(session.aggregate())?)
}

/// `aggregate` – total score, completed modules and achievements.
fn cmd_aggregate(_args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    Ok(serde_json::to_value(ctx.session().aggregate())?)
}

/// `lesson` – learning content for a module.
fn cmd_lesson(args: Value, _ctx: &AppContext) -> Result<Value, CommandError> {
    let id = module_arg(&args)?;
    Ok(serde_json::to_value(id.def())?)
}

// ===========================================================================
// Tests
// ===========================================================================
