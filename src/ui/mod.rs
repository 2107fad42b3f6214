//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, defines input mode and
//!   background export polling
//! - **[`panes`]**: stateless render functions for each visible pane (element tree,
//!   info, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a loaded
//! [`Project`] and call [`App::run`] to start the event loop.
//!
//! [`Project`]: crate::project::Project
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::{App, ExportTarget};
