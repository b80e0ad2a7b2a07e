//! `deskshell templates`: lists grid layout templates.

use serde::Serialize;

use crate::cli::output::{format_rect, print_highlighted_json, print_templates};
use crate::config::DeskshellConfig;
use crate::desktop::{Desktop, Rect};
use crate::error::DeskshellError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CellFrame {
    id: String,
    frame: Rect,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateSummary {
    id: String,
    name: String,
    columns: u32,
    rows: u32,
    active: bool,
    /// Cell frames on the primary monitor.
    cells: Vec<CellFrame>,
}

fn summarize(desktop: &Desktop) -> Vec<TemplateSummary> {
    let grid = desktop.grid();
    let usable = grid.usable_bounds(desktop.monitors());
    let active = grid.active_layout().map(|t| t.id.as_str());

    grid.templates()
        .iter()
        .map(|template| TemplateSummary {
            id: template.id.clone(),
            name: template.name.clone(),
            columns: template.columns,
            rows: template.rows,
            active: active == Some(template.id.as_str()),
            cells: template
                .cells
                .iter()
                .map(|cell| CellFrame { id: cell.id.clone(), frame: template.cell_frame(cell, &usable) })
                .collect(),
        })
        .collect()
}

/// Executes `deskshell templates`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(config: &DeskshellConfig, json: bool) -> Result<(), DeskshellError> {
    let desktop = Desktop::new(config.clone());
    let summaries = summarize(&desktop);

    if json {
        print_highlighted_json(&serde_json::to_value(&summaries)?);
        return Ok(());
    }

    let grid = desktop.grid();
    print_templates(grid.templates(), grid.active_layout().map(|t| t.id.as_str()));

    if let Some(active) = summaries.iter().find(|s| s.active) {
        println!("\nCells of '{}' on the primary monitor:", active.id);
        for cell in &active.cells {
            println!("  {:<14} {}", cell.id, format_rect(&cell.frame));
        }
    }
    Ok(())
}
