//! Application registry.
//!
//! Maps a component id to the metadata a window needs when it opens. Lookup
//! of an unknown id is an explicit error rather than a silent default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{Point, Size};
use super::types::{Capabilities, ComponentId};
use crate::constants;

/// Metadata for one application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    pub id: ComponentId,
    pub title: String,
    pub icon: String,

    /// Size of a newly opened window.
    pub default_size: Size,

    /// Position relative to the primary monitor's origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_position: Option<Point>,

    /// Minimum size, raised to the configured minimum if smaller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<Size>,

    #[serde(default)]
    pub capabilities: Capabilities,
}

impl AppDescriptor {
    /// Descriptor with the fallback size and default capabilities.
    #[must_use]
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: ComponentId::from(id),
            title: title.to_string(),
            icon: id.to_string(),
            default_size: Size::new(
                constants::window::FALLBACK_WIDTH,
                constants::window::FALLBACK_HEIGHT,
            ),
            default_position: None,
            min_size: None,
            capabilities: Capabilities::default(),
        }
    }

    #[must_use]
    pub const fn with_size(mut self, width: f64, height: f64) -> Self {
        self.default_size = Size::new(width, height);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, x: f64, y: f64) -> Self {
        self.default_position = Some(Point::new(x, y));
        self
    }

    /// Fixed-size window: not resizable or maximizable.
    #[must_use]
    pub const fn fixed_size(mut self) -> Self {
        self.capabilities.resizable = false;
        self.capabilities.maximizable = false;
        self
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown component '{0}'")]
    UnknownComponent(ComponentId),
}

/// Source of application metadata.
pub trait AppRegistry {
    /// Looks up the descriptor for `id`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownComponent` for ids with no application.
    fn lookup(&self, id: &ComponentId) -> Result<AppDescriptor, RegistryError>;

    /// All registered component ids.
    fn component_ids(&self) -> Vec<ComponentId>;
}

/// In-memory registry.
#[derive(Clone, Debug, Default)]
pub struct StaticAppRegistry {
    apps: BTreeMap<ComponentId, AppDescriptor>,
}

impl StaticAppRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self { Self { apps: BTreeMap::new() } }

    /// The built-in applications of the virtual desktop.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            AppDescriptor::new("notepad", "Notepad").with_size(640.0, 480.0).with_position(120.0, 80.0),
        );
        registry.register(
            AppDescriptor::new("calculator", "Calculator")
                .with_size(320.0, 480.0)
                .with_position(200.0, 120.0)
                .fixed_size(),
        );
        registry.register(
            AppDescriptor::new("files", "Files").with_size(800.0, 560.0).with_position(160.0, 100.0),
        );
        registry.register(
            AppDescriptor::new("ipod", "iPod").with_size(370.0, 600.0).with_position(240.0, 60.0).fixed_size(),
        );
        registry
    }

    /// Adds or replaces a descriptor, returning the previous one.
    pub fn register(&mut self, descriptor: AppDescriptor) -> Option<AppDescriptor> {
        self.apps.insert(descriptor.id.clone(), descriptor)
    }
}

impl AppRegistry for StaticAppRegistry {
    fn lookup(&self, id: &ComponentId) -> Result<AppDescriptor, RegistryError> {
        self.apps.get(id).cloned().ok_or_else(|| RegistryError::UnknownComponent(id.clone()))
    }

    fn component_ids(&self) -> Vec<ComponentId> { self.apps.keys().cloned().collect() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_builtin_apps() {
        let registry = StaticAppRegistry::with_defaults();
        let ids: Vec<String> = registry.component_ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["calculator", "files", "ipod", "notepad"]);
    }

    #[test]
    fn test_lookup_unknown_is_error() {
        let registry = StaticAppRegistry::with_defaults();
        let err = registry.lookup(&ComponentId::from("minesweeper")).unwrap_err();
        assert_eq!(err, RegistryError::UnknownComponent(ComponentId::from("minesweeper")));
        assert!(err.to_string().contains("minesweeper"));
    }

    #[test]
    fn test_calculator_is_fixed_size() {
        let registry = StaticAppRegistry::with_defaults();
        let calculator = registry.lookup(&ComponentId::from("calculator")).unwrap();
        assert!(!calculator.capabilities.resizable);
        assert!(!calculator.capabilities.maximizable);
        assert!(calculator.capabilities.minimizable);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = StaticAppRegistry::new();
        assert!(registry.register(AppDescriptor::new("notes", "Notes")).is_none());
        let previous = registry.register(AppDescriptor::new("notes", "Notes 2"));
        assert_eq!(previous.map(|d| d.title), Some("Notes".to_string()));
    }
}
