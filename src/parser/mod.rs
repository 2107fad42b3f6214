//! C# structural parser
//!
//! This module turns C# source text into an [`tree::ElementTree`] of
//! declarations in a single forward pass:
//! - [`lexer`]: lexical modes, source access and parse errors
//! - [`preprocessor`]: defined-symbol sets and `#if` condition evaluation
//! - [`declarations`]: interpretation of one declaration header
//! - [`parse`]: the scanner that ties them together
//! - [`tree`]: the element tree and its node metadata
//!
//! # What is parsed
//!
//! Only structure: namespaces, classes, interfaces, structs and enums with
//! their members, including attributes, modifiers, declared types, default
//! values, base lists and `///` summaries. Function and property bodies are
//! skipped without being analysed.
//!
//! # Parser Implementation
//!
//! Hand-written character scanner; no tokens, no grammar, no backtracking.
//! Malformed input yields best-effort structure. Only constructs still open at
//! the end of the input (strings, comments, brackets, blocks) are reported as
//! a [`ParseError`].

pub mod declarations;
pub mod lexer;
pub mod parse;
pub mod preprocessor;
pub mod tree;

pub use lexer::{ParseError, ParseErrorKind};
pub use parse::{parse_block, Parser};
pub use preprocessor::DefinedSymbols;
pub use tree::{
    DeclaredType, Element, ElementInfo, ElementTree, Emphasis, NodeId, SourceLocation, Visibility,
};

