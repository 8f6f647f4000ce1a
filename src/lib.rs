//! linewise - runtime core for interactive line-oriented command shells.
//!
//! Commands are registered in a [`commands::CommandCatalog`] and dispatched
//! by a [`shell::Shell`] loop reading from a [`terminal::Terminal`]. Commands
//! that need several answers from the user can run a [`flow::ComponentFlow`]
//! on the same terminal.

pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod flow;
pub mod headless;
pub mod logging;
pub mod shell;
pub mod terminal;
