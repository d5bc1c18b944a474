// ABOUTME: Command line interface module for taskmill
// ABOUTME: Argument parsing, configuration loading, and command dispatch

pub mod app;
pub mod args;
pub mod commands;
pub mod config;

pub use app::App;
pub use args::{Args, Commands};
pub use config::Config;
