//! `ecoctl` – terminal front end for the EcoEngineer quiz engine.
//!
//! Plays the four energy modules interactively, invokes engine commands
//! one-shot with JSON args, runs scripted scenarios, and serves the same
//! command boundary over a Unix socket.

mod config;
mod logging;
mod play;
mod serve;

use clap::{Parser, Subcommand};
use eco_engine::types::*;
use eco_engine::{AppContext, CommandRegistry, CommandResult, ModuleId};
use std::path::{Path, PathBuf};

// ===========================================================================
// CLI definition
// ===========================================================================

#[derive(Parser)]
#[command(
    name = "ecoctl",
    version,
    about = "Learn how renewable energy systems work, one stage at a time"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the quiz interactively.
    Play {
        /// Jump straight into a module (solar, wind, hydro, biomass).
        module: Option<String>,
        /// Skip the lesson text before the first stage.
        #[arg(long)]
        no_lesson: bool,
    },

    /// Invoke an engine command by name with JSON args.
    Call {
        /// Command name (e.g. "modules", "stage", "submit").
        cmd: String,
        /// JSON args to pass to the command.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the lesson content for a module.
    Lesson {
        /// Module key or display name.
        module: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a scripted scenario from a YAML file.
    RunScenario {
        /// Path to the scenario YAML file.
        file: PathBuf,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start daemon mode over a Unix socket.
    Serve {
        /// Path for the Unix domain socket.
        #[arg(long)]
        socket: PathBuf,
    },
}

// ===========================================================================
// Main
// ===========================================================================

#[tokio::main]
async fn main() {
    let config = config::get_config();
    logging::init_logging(&config.logging);

    let cli = Cli::parse();
    let ctx = AppContext::new();
    let registry = CommandRegistry::new();

    match cli.command {
        Commands::Play { module, no_lesson } => {
            cmd_play(module, !no_lesson && config.play.show_lesson, &ctx)
        }
        Commands::Call { cmd, args, json } => cmd_call(&cmd, &args, json, &ctx, &registry),
        Commands::Lesson { module, json } => cmd_lesson(&module, json),
        Commands::RunScenario { file, json } => cmd_run_scenario(&file, json, &ctx, &registry),
        Commands::Serve { socket } => serve::run_daemon(socket, ctx, registry).await,
    }
}

// ===========================================================================
// Subcommand implementations
// ===========================================================================

fn parse_module(name: &str) -> ModuleId {
    match name.parse() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
}

fn cmd_play(module: Option<String>, show_lesson: bool, ctx: &AppContext) {
    let module = module
        .or_else(|| config::get_config().play.default_module.clone())
        .map(|name| parse_module(&name));

    let mut session = ctx.session();
    let opts = play::PlayOptions {
        module,
        show_lesson,
    };
    if let Err(e) = play::run(&mut session, opts) {
        eprintln!("error: {}", e);
        std::process::exit(2);
    }
}

fn cmd_call(cmd: &str, args_str: &str, json: bool, ctx: &AppContext, registry: &CommandRegistry) {
    let args: serde_json::Value = match serde_json::from_str(args_str) {
        Ok(v) => v,
        Err(e) => {
            let r = result_err(
                "call",
                cmd,
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                format!("invalid JSON args: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let result = registry.execute(cmd, args, ctx);
    output_result(&result, json);
}

fn cmd_lesson(module: &str, json: bool) {
    let def = parse_module(module).def();
    if json {
        let j = serde_json::to_string_pretty(def).unwrap_or_default();
        println!("{}", j);
    } else {
        println!("{} {}", def.icon, def.name);
        play::print_lesson(def);
    }
}

fn cmd_run_scenario(file: &Path, json: bool, ctx: &AppContext, registry: &CommandRegistry) {
    let target = file.display().to_string();
    let yaml = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &target,
                &new_run_id(),
                0,
                ErrorCode::IoError,
                format!("cannot read scenario file: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario = match eco_engine::scenario::load_scenario(&yaml) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &target,
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                e,
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario_result = eco_engine::scenario::run_scenario(&scenario, ctx, registry);

    if json {
        let j = serde_json::to_string_pretty(&scenario_result).unwrap_or_default();
        println!("{}", j);
    } else {
        println!(
            "Scenario: {}",
            scenario_result.name.as_deref().unwrap_or("<unnamed>")
        );
        println!("Overall: {}", scenario_result.overall_status.as_str());
        for (i, sr) in scenario_result.step_results.iter().enumerate() {
            println!(
                "  Step {}: {} -> {} ({}ms)",
                i,
                sr.target,
                sr.status.as_str(),
                sr.timing_ms
            );
        }
    }

    exit_for(scenario_result.overall_status);
}

// ===========================================================================
// Output helpers
// ===========================================================================

fn output_result(result: &CommandResult, json: bool) {
    if json {
        let j = serde_json::to_string_pretty(result).unwrap_or_default();
        println!("{}", j);
    } else {
        print_human(result);
    }
    exit_for(result.status);
}

fn exit_for(status: Status) {
    match status {
        Status::Pass => {}
        Status::Fail => std::process::exit(1),
        Status::Error => std::process::exit(2),
    }
}

fn print_human(r: &CommandResult) {
    let status_icon = match r.status {
        Status::Pass => "PASS",
        Status::Fail => "FAIL",
        Status::Error => "ERROR",
    };

    println!("[{}] {} {}", status_icon, r.command, r.target);
    println!("  run_id: {}", r.run_id);
    println!("  timing: {}ms", r.timing_ms);

    if let Some(ref err) = r.error {
        println!("  error:  {} – {}", err.code, err.message);
    }

    if let Some(ref data) = r.data {
        if let Ok(s) = serde_json::to_string_pretty(data) {
            for line in s.lines() {
                println!("  {}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_play_with_module() {
        let cli = Cli::try_parse_from(["ecoctl", "play", "wind", "--no-lesson"]).unwrap();
        match cli.command {
            Commands::Play { module, no_lesson } => {
                assert_eq!(module.as_deref(), Some("wind"));
                assert!(no_lesson);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_cli_call_defaults_args() {
        let cli = Cli::try_parse_from(["ecoctl", "call", "modules"]).unwrap();
        match cli.command {
            Commands::Call { cmd, args, json } => {
                assert_eq!(cmd, "modules");
                assert_eq!(args, "{}");
                assert!(!json);
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn test_cli_rejects_missing_socket() {
        assert!(Cli::try_parse_from(["ecoctl", "serve"]).is_err());
    }

    #[test]
    fn test_cli_run_scenario_path() {
        let cli =
            Cli::try_parse_from(["ecoctl", "run-scenario", "scenarios/solar.yaml", "--json"])
                .unwrap();
        match cli.command {
            Commands::RunScenario { file, json } => {
                assert_eq!(file, PathBuf::from("scenarios/solar.yaml"));
                assert!(json);
            }
            _ => panic!("expected run-scenario"),
        }
    }
}
