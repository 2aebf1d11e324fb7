pub mod cli;
pub mod config;
pub mod core;
pub mod diff;
pub mod engine;
pub mod exit;
pub mod logging;
pub mod plan;
pub mod platform;
pub mod render;
pub mod rules;
pub mod ui;
