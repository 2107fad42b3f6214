//! # Introduction
//!
//! sharpdoc reads a directory of C# sources, builds a tree of their
//! declarations and turns the XML documentation comments attached to them into
//! a browsable set of HTML pages. The tree can also be explored in a terminal
//! UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Sources → Preprocessor → Structural scanner → ElementTree → Export / TUI
//! ```
//!
//! 1. [`project`]: finds the source files under a directory and parses each of
//!    them into one shared tree, recording per-file failures.
//! 2. [`parser`]: single-pass scanner that evaluates `#if` branches on the fly
//!    and records namespaces, types and members without parsing bodies.
//! 3. [`export`]: selects nodes by visibility and writes one page per
//!    container, reporting progress through a [`export::ProgressSink`].
//! 4. [`config`]: persisted user settings (export toggles, defines, recent
//!    directories).
//! 5. [`ui`]: ratatui-based browser; not part of the stable library API.
//!
//! ## What the scanner understands
//!
//! Namespaces, classes, interfaces, structs and enums; fields, properties,
//! methods, constructors and delegates; attributes, modifiers, default values,
//! base lists and `///` comments. Method and property bodies are skipped.

pub mod config;
pub mod error;
pub mod export;
pub mod parser;
pub mod project;
pub mod ui;
