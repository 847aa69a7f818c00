//! Scenario runner – execute scripted play-throughs from YAML files.

use crate::commands::CommandRegistry;
use crate::context::AppContext;
use crate::types::*;
use serde_json::Value;

/// Load a scenario from a YAML string.
pub fn load_scenario(yaml: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse scenario YAML: {}", e))
}

/// Execute a scenario against `ctx` and return the overall result.
///
/// Every step runs even after a mismatch so the report is complete.
pub fn run_scenario(
    scenario: &Scenario,
    ctx: &AppContext,
    registry: &CommandRegistry,
) -> ScenarioResult {
    let mut step_results = Vec::new();
    let mut overall = Status::Pass;

    for (i, step) in scenario.steps.iter().enumerate() {
        let r = registry.execute(&step.call, step.args.clone(), ctx);

        if r.status != step.expect_status {
            tracing::warn!(
                step = i,
                call = %step.call,
                expected = step.expect_status.as_str(),
                actual = r.status.as_str(),
                "scenario step status mismatch"
            );
            overall = Status::Fail;
        } else if let Some(expected) = &step.expect {
            let actual = r.data.as_ref().unwrap_or(&Value::Null);
            if !json_contains(actual, expected) {
                tracing::warn!(
                    step = i,
                    call = %step.call,
                    expected = %expected,
                    actual = %actual,
                    "scenario step data mismatch"
                );
                overall = Status::Fail;
            }
        }
        step_results.push(r);
    }

    ScenarioResult {
        name: scenario.name.clone(),
        overall_status: overall,
        step_results,
    }
}

/// True when every field in `expected` appears in `actual` with a matching
/// value. Arrays must match element-wise; numbers compare as floats.
fn json_contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => e
            .iter()
            .all(|(k, ev)| a.get(k).is_some_and(|av| json_contains(av, ev))),
        (Value::Array(a), Value::Array(e)) => {
            a.len() == e.len() && a.iter().zip(e).all(|(av, ev)| json_contains(av, ev))
        }
        (Value::Number(a), Value::Number(e)) => a.as_f64() == e.as_f64(),
        _ => actual == expected,
    }
}
