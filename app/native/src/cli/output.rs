//! CLI output formatting.
//!
//! Tables for desktop state and syntax-highlighted JSON.

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::desktop::grid::GridTemplate;
use crate::desktop::{LifecycleState, Monitor, Rect, Window, WindowGroup};

// ============================================================================
// JSON
// ============================================================================

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, and booleans and null magenta.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    println!("{}", highlight_json(&text));
}

/// Colors a pretty-printed JSON document.
fn highlight_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut chars = json.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                let mut literal = String::from('"');
                let mut escaped = false;
                for c in chars.by_ref() {
                    literal.push(c);
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
                // Keys are the only strings followed by a colon.
                let is_key = chars.peek() == Some(&':');
                let colored = if is_key { literal.cyan() } else { literal.green() };
                out.push_str(&colored.to_string());
            }
            '{' | '}' | '[' | ']' => out.push_str(&ch.to_string().white().bold().to_string()),
            c if c == '-' || c.is_ascii_digit() => {
                let mut number = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || matches!(next, '.' | 'e' | 'E' | '+' | '-') {
                        number.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&number.yellow().to_string());
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !next.is_ascii_alphabetic() {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(&word.magenta().to_string());
            }
            other => out.push(other),
        }
    }

    out
}

// ============================================================================
// Cell formatting
// ============================================================================

/// Truncates to `max_chars` characters, ending with an ellipsis when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// `x,y wxh` with whole pixels.
#[must_use]
pub fn format_rect(rect: &Rect) -> String {
    format!("{:.0},{:.0} {:.0}x{:.0}", rect.x, rect.y, rect.width, rect.height)
}

#[must_use]
fn format_lifecycle(state: LifecycleState) -> String {
    match state {
        LifecycleState::Normal => "normal".to_string(),
        LifecycleState::Minimized => "minimized".dimmed().to_string(),
        LifecycleState::Maximized => "maximized".cyan().to_string(),
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".dimmed().to_string(), |v| v.to_string())
}

fn print_table(title: &str, count: usize, table: &str) {
    println!("{}", format!("{title} ({count})").bold());
    println!("{table}");
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Frame")]
    frame: String,
    #[tabled(rename = "Z")]
    z: u32,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Monitor")]
    monitor: String,
    #[tabled(rename = "Focused")]
    focused: String,
}

/// Prints windows, topmost first.
pub fn print_windows(windows: &[Window], groups: &[WindowGroup]) {
    if windows.is_empty() {
        println!("{}", "No windows open.".dimmed());
        return;
    }

    let rows: Vec<WindowRow> = windows
        .iter()
        .rev()
        .map(|w| {
            let group = w.group_id.and_then(|id| groups.iter().find(|g| g.id == id));
            let title = group.map_or_else(
                || w.title.clone(),
                |g| format!("{} [{}]", w.title, g.name),
            );
            WindowRow {
                id: w.id.to_string(),
                app: w.component_id.to_string(),
                title: truncate(&title, 32),
                frame: format_rect(&w.geometry),
                z: w.z_index,
                state: format_lifecycle(w.lifecycle),
                monitor: optional(w.monitor_id),
                focused: format_bool(w.focused),
            }
        })
        .collect();

    let count = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::right()))
        .with(Modify::new(Columns::new(7..8)).with(Alignment::center()))
        .to_string();
    print_table("Windows", count, &table);
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Windows")]
    windows: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Collapsed")]
    collapsed: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// Prints groups in creation order.
pub fn print_groups(groups: &[WindowGroup]) {
    if groups.is_empty() {
        return;
    }

    let rows: Vec<GroupRow> = groups
        .iter()
        .map(|g| GroupRow {
            name: g.name.clone(),
            windows: g.window_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            active: g.active_window_id.to_string(),
            collapsed: format_bool(g.collapsed),
            id: g.id.to_string().dimmed().to_string(),
        })
        .collect();

    let count = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::center()))
        .to_string();
    print_table("Groups", count, &table);
}

#[derive(Tabled)]
struct MonitorRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Bounds")]
    bounds: String,
    #[tabled(rename = "Scale")]
    scale: String,
    #[tabled(rename = "Primary")]
    primary: String,
}

/// Prints monitors in enumeration order.
pub fn print_monitors(monitors: &[Monitor]) {
    let rows: Vec<MonitorRow> = monitors
        .iter()
        .map(|m| MonitorRow {
            id: m.id.0,
            name: m.name.clone(),
            bounds: format_rect(&m.bounds),
            scale: format!("{}x", m.scale_factor),
            primary: format_bool(m.is_primary),
        })
        .collect();

    let count = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()))
        .to_string();
    print_table("Monitors", count, &table);
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Grid")]
    grid: String,
    #[tabled(rename = "Cells")]
    cells: String,
    #[tabled(rename = "Active")]
    active: String,
}

/// Prints grid templates. `active` marks the selected one.
pub fn print_templates(templates: &[GridTemplate], active: Option<&str>) {
    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            id: t.id.clone(),
            name: t.name.clone(),
            grid: format!("{}x{}", t.columns, t.rows),
            cells: t.cells.iter().map(|c| c.id.as_str()).collect::<Vec<_>>().join(", "),
            active: format_bool(active == Some(t.id.as_str())),
        })
        .collect();

    let count = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::center()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()))
        .to_string();
    print_table("Grid templates", count, &table);
}
