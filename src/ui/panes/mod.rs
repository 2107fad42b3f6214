//! TUI pane rendering modules
//!
//! - [`tree`]: collapsible element tree with kind colours and emphasis
//! - [`info`]: metadata and summary of the selected element
//! - [`status`]: status bar with keybindings, defines input and export progress
//!
//! Each pane module exports a primary `render_*` function taking the frame,
//! its area and the borrowed state it shows.

pub mod info;
pub mod status;
pub mod tree;

pub use info::render_info_pane;
pub use status::{render_status_bar, StatusState};
pub use tree::{render_tree_pane, TreeRow};
