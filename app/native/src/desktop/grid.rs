//! Grid layouts.
//!
//! A template divides a monitor into `columns × rows` tracks. Its named cells
//! are auto-placed row-major into the first free slot that fits their span,
//! the same way CSS grid places items without explicit positions. The engine
//! keeps one active template, tracks which window occupies which cell, and
//! maps cells onto the active monitor's usable bounds.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::geometry::{Insets, Rect};
use super::monitor::{Monitor, MonitorRegistry};
use super::store::WindowStateStore;
use super::types::{LifecycleState, MonitorId, Window, WindowId};
use crate::config::{GridConfig, GridTemplateConfig};
use crate::constants;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid grid template '{layout}': {reason}")]
    InvalidTemplate { layout: String, reason: String },

    #[error("grid template '{0}' already exists")]
    DuplicateLayout(String),

    #[error("unknown grid layout '{0}'")]
    UnknownLayout(String),

    #[error("no grid layout is selected")]
    NoActiveLayout,

    #[error("unknown cell '{0}' in the active layout")]
    UnknownCell(String),

    #[error("cell '{cell}' is occupied by window {window}")]
    CellOccupied { cell: String, window: WindowId },

    #[error("window {0} does not exist")]
    WindowNotFound(WindowId),

    #[error("window {0} cannot be placed")]
    PlacementRejected(WindowId),
}

// ============================================================================
// Templates
// ============================================================================

/// A cell with its resolved track position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub id: String,
    pub column: u32,
    pub row: u32,
    pub col_span: u32,
    pub row_span: u32,
}

/// A validated grid template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridTemplate {
    pub id: String,
    pub name: String,
    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<GridCell>,
}

impl GridTemplate {
    /// Validates a configured template and places its cells.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidTemplate` for zero dimensions or spans, an
    /// empty or duplicated cell id, no cells, or a cell that does not fit.
    pub fn from_config(config: &GridTemplateConfig) -> Result<Self, GridError> {
        let invalid = |reason: String| GridError::InvalidTemplate {
            layout: config.id.clone(),
            reason,
        };

        if config.id.is_empty() {
            return Err(invalid("layout id is empty".to_string()));
        }
        if config.columns == 0 || config.rows == 0 {
            return Err(invalid("columns and rows must be at least 1".to_string()));
        }
        if config.cells.is_empty() {
            return Err(invalid("template has no cells".to_string()));
        }

        let columns = config.columns as usize;
        let rows = config.rows as usize;
        let mut taken = vec![false; columns * rows];
        let mut cells: Vec<GridCell> = Vec::with_capacity(config.cells.len());

        for cell in &config.cells {
            if cell.id.is_empty() {
                return Err(invalid("cell id is empty".to_string()));
            }
            if cells.iter().any(|c| c.id == cell.id) {
                return Err(invalid(format!("duplicate cell '{}'", cell.id)));
            }
            if cell.col_span == 0 || cell.row_span == 0 {
                return Err(invalid(format!("cell '{}' has a zero span", cell.id)));
            }

            let (col_span, row_span) = (cell.col_span as usize, cell.row_span as usize);
            let slot = (0..rows * columns).map(|i| (i / columns, i % columns)).find(|&(r, c)| {
                r + row_span <= rows
                    && c + col_span <= columns
                    && (r..r + row_span).all(|rr| (c..c + col_span).all(|cc| !taken[rr * columns + cc]))
            });
            let Some((row, column)) = slot else {
                return Err(invalid(format!("cell '{}' does not fit", cell.id)));
            };

            for rr in row..row + row_span {
                for cc in column..column + col_span {
                    taken[rr * columns + cc] = true;
                }
            }
            #[allow(clippy::cast_possible_truncation)] // bounded by u32 columns and rows
            cells.push(GridCell {
                id: cell.id.clone(),
                column: column as u32,
                row: row as u32,
                col_span: cell.col_span,
                row_span: cell.row_span,
            });
        }

        let name = if config.name.is_empty() { config.id.clone() } else { config.name.clone() };
        Ok(Self { id: config.id.clone(), name, columns: config.columns, rows: config.rows, cells })
    }

    #[must_use]
    pub fn cell(&self, id: &str) -> Option<&GridCell> { self.cells.iter().find(|c| c.id == id) }

    /// Maps a cell onto `usable`.
    ///
    /// Edges are computed from track boundaries so adjacent cells share edges
    /// exactly.
    #[must_use]
    pub fn cell_frame(&self, cell: &GridCell, usable: &Rect) -> Rect {
        let columns = f64::from(self.columns);
        let rows = f64::from(self.rows);
        let left = usable.x + usable.width * f64::from(cell.column) / columns;
        let right = usable.x + usable.width * f64::from(cell.column + cell.col_span) / columns;
        let top = usable.y + usable.height * f64::from(cell.row) / rows;
        let bottom = usable.y + usable.height * f64::from(cell.row + cell.row_span) / rows;
        Rect::new(left, top, right - left, bottom - top)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// A cell of the active layout and its occupant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStatus {
    #[serde(flatten)]
    pub cell: GridCell,
    pub occupied_by: Option<WindowId>,
}

/// Outcome of [`LayoutGridEngine::auto_arrange_windows`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeReport {
    /// Windows placed, with the cell each received.
    pub placed: Vec<(WindowId, String)>,
    /// Windows left where they were: no free cell, closed, or not placeable.
    pub skipped: Vec<WindowId>,
}

/// Grid template catalog with cell-occupancy bookkeeping.
pub struct LayoutGridEngine {
    /// Templates in catalog order.
    templates: Vec<GridTemplate>,

    /// Index of the selected template.
    active: Option<usize>,

    /// Monitor cells are mapped onto. `None` follows the primary monitor.
    active_monitor: Option<MonitorId>,

    /// Cell id to occupying window, for the active template.
    occupancy: BTreeMap<String, WindowId>,

    /// Chrome excluded from the usable bounds.
    insets: Insets,
}

impl LayoutGridEngine {
    /// Builds the catalog from configuration.
    ///
    /// Invalid or duplicated templates are skipped with a warning. The
    /// configured default layout is selected, else the first template.
    #[must_use]
    pub fn from_config(config: &GridConfig, insets: Insets) -> Self {
        let mut engine = Self {
            templates: Vec::with_capacity(config.templates.len()),
            active: None,
            active_monitor: None,
            occupancy: BTreeMap::new(),
            insets,
        };
        for template in &config.templates {
            if let Err(err) = engine.add_template(template) {
                tracing::warn!(error = %err, "desktop: skipping grid template");
            }
        }

        let default = config.default_layout.as_deref().and_then(|id| {
            let index = engine.index_of(id);
            if index.is_none() {
                tracing::warn!(layout = id, "desktop: default grid layout not found");
            }
            index
        });
        engine.active = default.or_else(|| (!engine.templates.is_empty()).then_some(0));
        engine
    }

    /// Adds a template to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidTemplate` or `GridError::DuplicateLayout`.
    pub fn add_template(&mut self, config: &GridTemplateConfig) -> Result<(), GridError> {
        let template = GridTemplate::from_config(config)?;
        if self.index_of(&template.id).is_some() {
            return Err(GridError::DuplicateLayout(template.id));
        }
        self.templates.push(template);
        Ok(())
    }

    fn index_of(&self, id: &str) -> Option<usize> { self.templates.iter().position(|t| t.id == id) }

    #[must_use]
    pub fn templates(&self) -> &[GridTemplate] { &self.templates }

    #[must_use]
    pub fn active_layout(&self) -> Option<&GridTemplate> { self.active.map(|i| &self.templates[i]) }

    /// Selects a template and clears all occupancy.
    ///
    /// # Errors
    ///
    /// Returns `GridError::UnknownLayout` without changing the selection.
    pub fn select_layout(&mut self, id: &str) -> Result<(), GridError> {
        let index = self.index_of(id).ok_or_else(|| GridError::UnknownLayout(id.to_string()))?;
        self.active = Some(index);
        self.occupancy.clear();
        tracing::debug!(layout = id, "desktop: grid layout selected");
        Ok(())
    }

    /// The monitor cells are mapped onto; the primary unless one was set and
    /// still exists.
    #[must_use]
    pub fn active_monitor(&self, monitors: &MonitorRegistry) -> Monitor {
        self.active_monitor
            .and_then(|id| monitors.get_monitor(id))
            .unwrap_or_else(|| monitors.get_primary_monitor())
    }

    /// Maps cells onto another monitor, clearing occupancy. Stale id: false.
    pub fn set_active_monitor(&mut self, id: MonitorId, monitors: &MonitorRegistry) -> bool {
        if !monitors.contains(id) {
            return false;
        }
        if self.active_monitor != Some(id) {
            self.active_monitor = Some(id);
            self.occupancy.clear();
        }
        true
    }

    /// Usable bounds of the active monitor.
    #[must_use]
    pub fn usable_bounds(&self, monitors: &MonitorRegistry) -> Rect {
        self.active_monitor(monitors).bounds.inset(&self.insets)
    }

    /// Every cell of the active layout with its occupant.
    #[must_use]
    pub fn cells(&self) -> Vec<CellStatus> {
        self.active_layout().map_or_else(Vec::new, |layout| {
            layout
                .cells
                .iter()
                .map(|cell| CellStatus {
                    cell: cell.clone(),
                    occupied_by: self.occupancy.get(&cell.id).copied(),
                })
                .collect()
        })
    }

    /// Unoccupied cells of the active layout, in template order.
    #[must_use]
    pub fn get_available_cells(&self) -> Vec<GridCell> {
        self.cells().into_iter().filter(|c| c.occupied_by.is_none()).map(|c| c.cell).collect()
    }

    /// Absolute geometry of a cell on the active monitor.
    ///
    /// # Errors
    ///
    /// Returns `GridError::NoActiveLayout` or `GridError::UnknownCell`.
    pub fn cell_geometry(&self, cell_id: &str, monitors: &MonitorRegistry) -> Result<Rect, GridError> {
        let layout = self.active_layout().ok_or(GridError::NoActiveLayout)?;
        let cell = layout.cell(cell_id).ok_or_else(|| GridError::UnknownCell(cell_id.to_string()))?;
        Ok(layout.cell_frame(cell, &self.usable_bounds(monitors)))
    }

    #[must_use]
    pub fn occupant(&self, cell_id: &str) -> Option<WindowId> { self.occupancy.get(cell_id).copied() }

    /// The cell a window occupies.
    #[must_use]
    pub fn cell_for_window(&self, window_id: WindowId) -> Option<&str> {
        self.occupancy.iter().find(|(_, id)| **id == window_id).map(|(cell, _)| cell.as_str())
    }

    /// Frees the cell held by a window, returning its id.
    pub fn release_window(&mut self, window_id: WindowId) -> Option<String> {
        let cell = self.cell_for_window(window_id)?.to_string();
        self.occupancy.remove(&cell);
        Some(cell)
    }

    /// Frees a cell, returning the window that held it.
    pub fn release_cell(&mut self, cell_id: &str) -> Option<WindowId> { self.occupancy.remove(cell_id) }

    /// Frees every cell whose window closed, was minimized or maximized, or
    /// no longer sits on the cell frame. Returns the freed cell ids.
    pub fn release_displaced(&mut self, store: &WindowStateStore, monitors: &MonitorRegistry) -> Vec<String> {
        let Some(layout) = self.active_layout() else {
            return Vec::new();
        };
        let usable = self.usable_bounds(monitors);
        let displaced: Vec<String> = self
            .occupancy
            .iter()
            .filter(|(cell_id, window_id)| {
                let frame = layout.cell(cell_id).map(|cell| layout.cell_frame(cell, &usable));
                !matches!(
                    (store.window(**window_id), frame),
                    (Some(window), Some(frame)) if sits_on_cell(window, &frame)
                )
            })
            .map(|(cell_id, _)| cell_id.clone())
            .collect();

        for cell_id in &displaced {
            if let Some(window_id) = self.release_cell(cell_id) {
                tracing::debug!(window_id = %window_id, cell = %cell_id, "desktop: window left its grid cell");
            }
        }
        displaced
    }

    /// Places a window in a cell of the active layout.
    ///
    /// Minimized and maximized windows are restored first. A window already
    /// in another cell moves. Returns the window's resulting geometry, which
    /// keeps its size when the window is not resizable.
    ///
    /// # Errors
    ///
    /// Fails without touching occupancy when there is no active layout, the
    /// cell is unknown or held by another window, the window does not exist,
    /// or the store refuses the placement.
    pub fn assign_window_to_cell(
        &mut self,
        window_id: WindowId,
        cell_id: &str,
        store: &mut WindowStateStore,
        monitors: &MonitorRegistry,
    ) -> Result<Rect, GridError> {
        let frame = self.cell_geometry(cell_id, monitors)?;
        if let Some(occupant) = self.occupant(cell_id)
            && occupant != window_id
        {
            return Err(GridError::CellOccupied { cell: cell_id.to_string(), window: occupant });
        }
        let window = store.window(window_id).ok_or(GridError::WindowNotFound(window_id))?;

        if window.is_minimized() {
            store.focus(window_id);
        }
        if store.window(window_id).is_some_and(super::types::Window::is_maximized) {
            store.unmaximize(window_id, monitors);
        }
        if !store.place_window(window_id, frame, monitors) {
            return Err(GridError::PlacementRejected(window_id));
        }

        self.release_window(window_id);
        self.occupancy.insert(cell_id.to_string(), window_id);
        tracing::debug!(window_id = %window_id, cell = cell_id, "desktop: window assigned to cell");

        store.window(window_id).map(|w| w.geometry).ok_or(GridError::WindowNotFound(window_id))
    }

    /// Assigns windows to free cells in input order.
    ///
    /// Windows beyond the free cells, closed windows, duplicates and windows
    /// the store refuses to place are skipped and reported.
    ///
    /// # Errors
    ///
    /// Returns `GridError::NoActiveLayout` when no layout is selected.
    pub fn auto_arrange_windows(
        &mut self,
        window_ids: &[WindowId],
        store: &mut WindowStateStore,
        monitors: &MonitorRegistry,
    ) -> Result<ArrangeReport, GridError> {
        if self.active_layout().is_none() {
            return Err(GridError::NoActiveLayout);
        }

        let mut report = ArrangeReport::default();
        let mut free = self.get_available_cells().into_iter();

        for (index, &window_id) in window_ids.iter().enumerate() {
            if !store.contains(window_id) || window_ids[..index].contains(&window_id) {
                report.skipped.push(window_id);
                continue;
            }
            let Some(cell) = free.next() else {
                report.skipped.push(window_id);
                continue;
            };
            match self.assign_window_to_cell(window_id, &cell.id, store, monitors) {
                Ok(_) => report.placed.push((window_id, cell.id)),
                Err(err) => {
                    tracing::debug!(error = %err, "desktop: auto-arrange skipped window");
                    report.skipped.push(window_id);
                }
            }
        }

        if !report.skipped.is_empty() {
            tracing::info!(skipped = report.skipped.len(), "desktop: windows left unarranged");
        }
        Ok(report)
    }
}

/// Whether a normal window still has the geometry placement gave it.
///
/// Placement clamps to the window's minimum size and keeps the size of
/// fixed-size windows.
fn sits_on_cell(window: &Window, frame: &Rect) -> bool {
    if window.lifecycle != LifecycleState::Normal {
        return false;
    }
    let expected = if window.capabilities.resizable {
        frame.with_size(frame.size().at_least(window.min_size))
    } else {
        frame.with_size(window.geometry.size())
    };
    window.geometry.approx_eq(&expected, constants::grid::CELL_TOLERANCE)
}
