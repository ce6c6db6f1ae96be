//! Foody Library
//!
//! Cache-first recipe retrieval and its collaborators. The terminal
//! interface in `main.rs` is built on top of these modules.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod loader;
pub mod network;
pub mod preferences;
pub mod retrieval;
pub mod subscription;
