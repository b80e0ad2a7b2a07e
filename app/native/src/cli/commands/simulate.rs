//! `deskshell simulate`: replays a command script against a fresh desktop.

use std::io;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::cli::output::{self, format_rect, print_highlighted_json};
use crate::config::DeskshellConfig;
use crate::desktop::events::drain;
use crate::desktop::{CommandOutcome, Desktop, DesktopCommand, DesktopEvent, Monitor, Window, WindowGroup};
use crate::error::DeskshellError;

/// One replayed command and what it did.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub index: usize,
    pub op: String,
    pub outcome: CommandOutcome,
}

/// Final state after a replay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub steps: Vec<Step>,
    pub windows: Vec<Window>,
    pub groups: Vec<WindowGroup>,
    pub monitors: Vec<Monitor>,
    pub violations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<DesktopEvent>>,
}

/// Parses a script: a JSON array of commands.
///
/// # Errors
///
/// Returns a script error naming the offending position when the JSON does
/// not describe a command list.
pub fn parse_script(text: &str) -> Result<Vec<DesktopCommand>, DeskshellError> {
    serde_json::from_str(text).map_err(|err| DeskshellError::ScriptError(err.to_string()))
}

/// Applies `commands` in order to a desktop built from `config`.
#[must_use]
pub fn run_script(config: DeskshellConfig, commands: Vec<DesktopCommand>, collect_events: bool) -> SimulationReport {
    let mut desktop = Desktop::new(config);
    let mut receiver = desktop.subscribe();
    let mut events = Vec::new();
    let mut steps = Vec::with_capacity(commands.len());

    for (index, command) in commands.into_iter().enumerate() {
        let op = op_name(&command);
        let outcome = desktop.dispatch(command);
        if !outcome.is_applied() {
            tracing::debug!(index, op = %op, ?outcome, "simulate: command not applied");
        }
        steps.push(Step { index: index + 1, op, outcome });

        // Drained per step so a long script cannot overrun the channel.
        let batch = drain(&mut receiver);
        if collect_events {
            events.extend(batch);
        }
    }

    SimulationReport {
        steps,
        windows: desktop.windows(),
        groups: desktop.groups().groups(),
        monitors: desktop.monitors().get_monitors(),
        violations: desktop.validate().iter().map(ToString::to_string).collect(),
        events: collect_events.then_some(events),
    }
}

/// The `op` tag a command serializes with.
fn op_name(command: &DesktopCommand) -> String {
    serde_json::to_value(command)
        .ok()
        .and_then(|value| value.get("op").and_then(|op| op.as_str()).map(str::to_string))
        .unwrap_or_else(|| "?".to_string())
}

fn describe(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Done => "done".green().to_string(),
        CommandOutcome::Ignored => "ignored".dimmed().to_string(),
        CommandOutcome::Opened { window_id } => format!("opened window {window_id}").green().to_string(),
        CommandOutcome::GroupCreated { group_id } => format!("created group {group_id}").green().to_string(),
        CommandOutcome::Placed { frame } => format!("placed at {}", format_rect(frame)).green().to_string(),
        CommandOutcome::Arranged { report } => {
            let mut text = format!("arranged {}", report.placed.len());
            if !report.skipped.is_empty() {
                text.push_str(&format!(", skipped {}", report.skipped.len()));
            }
            text.green().to_string()
        }
        CommandOutcome::MonitorsUpdated { change, reassigned } => format!(
            "monitors +{} -{} ~{}, {} window(s) moved",
            change.added.len(),
            change.removed.len(),
            change.updated.len(),
            reassigned.len()
        )
        .green()
        .to_string(),
        CommandOutcome::Healed { repairs } => format!("{repairs} repair(s)").green().to_string(),
        CommandOutcome::Failed { error } => error.red().to_string(),
    }
}

fn read_script(path: &Path) -> Result<String, DeskshellError> {
    if path.as_os_str() == "-" {
        return Ok(io::read_to_string(io::stdin())?);
    }
    std::fs::read_to_string(path).map_err(|err| {
        DeskshellError::ScriptError(format!("Failed to read {}: {err}", path.display()))
    })
}

/// Executes `deskshell simulate`.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, or if the final
/// state violates a desktop invariant.
pub fn execute(config: DeskshellConfig, script: &Path, json: bool, events: bool) -> Result<(), DeskshellError> {
    let commands = parse_script(&read_script(script)?)?;
    tracing::info!(commands = commands.len(), script = %script.display(), "simulate: replaying script");

    let report = run_script(config, commands, events);

    if json {
        print_highlighted_json(&serde_json::to_value(&report)?);
    } else {
        for step in &report.steps {
            println!("{:>4}  {:<18} {}", step.index, step.op.bold(), describe(&step.outcome));
        }
        println!();
        output::print_windows(&report.windows, &report.groups);
        output::print_groups(&report.groups);
        output::print_monitors(&report.monitors);

        if let Some(events) = &report.events {
            println!("{}", format!("Events ({})", events.len()).bold());
            for event in events {
                println!("  {}", event.name());
            }
        }

        for violation in &report.violations {
            println!("{} {violation}", "✗".red());
        }
    }

    if report.violations.is_empty() {
        Ok(())
    } else {
        Err(DeskshellError::LayoutError(format!(
            "{} invariant violation(s) after replay",
            report.violations.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::desktop::{LifecycleState, WindowId};

    const SCRIPT: &str = r#"[
        { "op": "open", "componentId": "notepad" },
        { "op": "open", "componentId": "files" },
        { "op": "open", "componentId": "doom" },
        { "op": "createGroup", "name": "Work", "windowIds": [1, 2] },
        { "op": "collapseGroup", "group": "Work" },
        { "op": "close", "windowId": 42 }
    ]"#;

    #[test]
    fn test_parse_script_reports_errors() {
        let err = parse_script(r#"[{ "op": "open" }]"#).unwrap_err();
        assert!(matches!(err, DeskshellError::ScriptError(_)));
    }

    #[test]
    fn test_run_script_collects_outcomes() {
        let report = run_script(DeskshellConfig::default(), parse_script(SCRIPT).unwrap(), false);

        let ops: Vec<&str> = report.steps.iter().map(|s| s.op.as_str()).collect();
        assert_eq!(ops, ["open", "open", "open", "createGroup", "collapseGroup", "close"]);
        assert_eq!(report.steps[0].outcome, CommandOutcome::Opened { window_id: WindowId(1) });
        assert!(matches!(report.steps[2].outcome, CommandOutcome::Failed { .. }));
        assert_eq!(report.steps[5].outcome, CommandOutcome::Ignored);

        assert_eq!(report.windows.len(), 2);
        assert!(report.windows.iter().all(|w| w.lifecycle == LifecycleState::Minimized));
        assert_eq!(report.groups.len(), 1);
        assert!(report.violations.is_empty());
        assert!(report.events.is_none());
    }

    #[test]
    fn test_run_script_collects_events() {
        let script = r#"[{ "op": "open", "componentId": "calculator" }]"#;
        let report = run_script(DeskshellConfig::default(), parse_script(script).unwrap(), true);

        let events = report.events.unwrap();
        assert!(events.iter().any(|e| e.name() == "windowOpened"));
    }

    #[test]
    fn test_report_serializes() {
        let report = run_script(DeskshellConfig::default(), Vec::new(), false);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"], serde_json::json!([]));
        assert!(json.get("events").is_none());
        assert_eq!(json["monitors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_execute_reads_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, SCRIPT).unwrap();

        execute(DeskshellConfig::default(), &path, true, false).unwrap();
        assert!(execute(DeskshellConfig::default(), &dir.path().join("missing.json"), false, false).is_err());
    }
}
