//! Deskshell - window and multi-monitor layout engine for a browser desktop.
//!
//! This library provides the layout engine and the CLI built on top of it.
//! The engine is headless: hosts drive a [`desktop::Desktop`] through its
//! methods or serializable [`desktop::DesktopCommand`]s and observe it through
//! change notifications.

pub mod cli;
pub mod config;
pub mod constants;
pub mod desktop;
pub mod error;
pub mod schema;
