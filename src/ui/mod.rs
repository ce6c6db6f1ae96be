//! UI rendering module for Foody
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod filter_sheet;
pub mod help_overlay;
pub mod recipe_list;

pub use filter_sheet::render as render_filter_sheet;
pub use help_overlay::render as render_help_overlay;
pub use recipe_list::{render_loading, render_recipe_list};
