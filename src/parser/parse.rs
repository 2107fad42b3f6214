//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct: a single-pass, character-level
//! scanner that grows an [`ElementTree`] while it reads. There is no token
//! stream and no backtracking:
//!
//! - [`lexer`](super::lexer) decides how each character is read (string,
//!   comment, directive, skipped branch or structural text);
//! - structural characters `,` `;` `{` `}` at bracket depth zero cut the text
//!   into declaration headers, which [`declarations`](super::declarations)
//!   interprets;
//! - `#if`/`#elif`/`#else`/`#endif` lines are evaluated on the spot by
//!   [`preprocessor`](super::preprocessor), so excluded branches never reach
//!   the tree.
//!
//! Function and property bodies are opaque: once a header opens one, its text
//! is skipped up to the matching `}`.

use crate::parser::declarations::{interpret_header, Boundary, Declaration, Header, HeaderContext};
use crate::parser::lexer::{LexMode, ParseError, ParseErrorKind, SourceText};
use crate::parser::preprocessor::{evaluate, ConditionStack, DefinedSymbols};
use crate::parser::tree::{ElementInfo, ElementTree, NodeId};
use tracing::{debug, trace};

/// A body whose contents are excluded from structural parsing
#[derive(Debug, Clone, Copy)]
struct RemovableBlock {
    /// Brace nesting right after the body's `{`
    depth: usize,
    /// `= { ... }` after a property; its `}` leaves the insertion point alone
    property_array: bool,
}

/// An open `{` and the insertion point it selected
#[derive(Debug, Clone, Copy)]
struct Scope {
    node: NodeId,
    opened_at: usize,
}

/// Single-pass structural parser
pub struct Parser {
    source: SourceText,
    defines: DefinedSymbols,
    conditions: ConditionStack,
    mode: LexMode,
    position: usize,

    /// Start of the header being accumulated
    span_start: usize,
    /// Comment and directive ranges inside the current header
    excluded: Vec<(usize, usize)>,
    /// Start of the current literal or excluded region
    construct_start: usize,
    directive_start: usize,
    /// Only whitespace seen since the last newline
    line_blank: bool,

    /// Pending `///` text for the next declaration
    summary: String,
    summary_start: usize,

    last_slash: Option<usize>,
    last_equals: Option<usize>,
    /// `(` and `[` depth; boundaries are inert while it is non-zero
    brackets: usize,
    bracket_opened_at: usize,
    /// Between a `<` and the next `>`, `?` or closing bracket, commas do not split
    maybe_generic: bool,

    /// Brace nesting, including braces inside skipped bodies
    nesting: usize,
    body: Option<RemovableBlock>,
    insertion: NodeId,
    scopes: Vec<Scope>,
}

impl Parser {
    pub fn new(source: &str, defines: DefinedSymbols) -> Self {
        Self {
            source: SourceText::new(source),
            defines,
            conditions: ConditionStack::new(),
            mode: LexMode::Normal,
            position: 0,
            span_start: 0,
            excluded: Vec::new(),
            construct_start: 0,
            directive_start: 0,
            line_blank: true,
            summary: String::new(),
            summary_start: 0,
            last_slash: None,
            last_equals: None,
            brackets: 0,
            bracket_opened_at: 0,
            maybe_generic: false,
            nesting: 0,
            body: None,
            insertion: 0,
            scopes: Vec::new(),
        }
    }

    /// Symbols in effect at the current position (seed plus `#define`s so far)
    pub fn defined_symbols(&self) -> &DefinedSymbols {
        &self.defines
    }

    /// Scan the whole source and add its declarations under `node`.
    ///
    /// The tree keeps everything created before an error is detected.
    pub fn parse_into(&mut self, tree: &mut ElementTree, node: NodeId) -> Result<(), ParseError> {
        self.insertion = node;

        while let Some(ch) = self.source.get(self.position) {
            let offset = self.position;
            self.position += 1;

            match self.mode {
                LexMode::Normal => self.scan_normal(tree, offset, ch),
                LexMode::InString { verbatim } => self.scan_string(offset, ch, verbatim),
                LexMode::InChar => self.scan_char(ch)?,
                LexMode::LineComment | LexMode::SummaryComment => self.scan_comment(offset, ch),
                LexMode::BlockComment => self.scan_block_comment(offset, ch),
                LexMode::Preprocessor => {
                    if ch == '\n' {
                        self.finish_directive(offset);
                    }
                }
                LexMode::PreprocessorSkip => {
                    if ch == '#' && self.line_blank {
                        self.mode = LexMode::Preprocessor;
                        self.directive_start = offset;
                    }
                }
            }

            if ch == '\n' {
                self.line_blank = true;
            } else if !ch.is_whitespace() {
                self.line_blank = false;
            }
        }

        self.finish()
    }

    // ===== Lexical modes =====

    fn scan_normal(&mut self, tree: &mut ElementTree, offset: usize, ch: char) {
        let after_slash = self.last_slash.map(|s| s + 1) == Some(offset);

        match ch {
            '"' => {
                let verbatim = self.source.before(offset) == Some('@')
                    || (self.source.before(offset) == Some('$')
                        && self.source.before(offset - 1) == Some('@'));
                self.construct_start = offset;
                self.mode = LexMode::InString { verbatim };
            }
            '\'' => {
                self.construct_start = offset;
                self.mode = LexMode::InChar;
            }
            '/' if after_slash => {
                self.last_slash = None;
                self.begin_excluded(offset - 1, LexMode::LineComment);
            }
            '/' => self.last_slash = Some(offset),
            '*' if after_slash => {
                self.last_slash = None;
                self.begin_excluded(offset - 1, LexMode::BlockComment);
            }
            '#' if self.line_blank => {
                self.directive_start = offset;
                self.begin_excluded(offset, LexMode::Preprocessor);
            }
            ',' | ';' | '{' | '}' => self.boundary(tree, offset, ch),
            '(' | '[' => {
                if self.body.is_none() {
                    if self.brackets == 0 {
                        self.bracket_opened_at = offset;
                    }
                    self.brackets += 1;
                }
            }
            ')' | ']' => {
                // `=)` does not close anything
                let after_equals = self.last_equals.map(|e| e + 1) == Some(offset);
                if !after_equals && self.body.is_none() {
                    self.brackets = self.brackets.saturating_sub(1);
                }
                self.maybe_generic = false;
            }
            '<' => self.maybe_generic = true,
            '>' | '?' => self.maybe_generic = false,
            '=' => self.last_equals = Some(offset),
            _ => {}
        }
    }

    fn scan_string(&mut self, offset: usize, ch: char, verbatim: bool) {
        match ch {
            '\\' if !verbatim => self.position += 1,
            '"' if verbatim && self.source.get(offset + 1) == Some('"') => self.position += 1,
            '"' => self.mode = LexMode::Normal,
            _ => {}
        }
    }

    fn scan_char(&mut self, ch: char) -> Result<(), ParseError> {
        match ch {
            '\\' => self.position += 1,
            '\'' => self.mode = LexMode::Normal,
            '\n' => {
                return Err(self
                    .source
                    .error(ParseErrorKind::UnterminatedChar, self.construct_start));
            }
            _ => {}
        }
        Ok(())
    }

    fn scan_comment(&mut self, offset: usize, ch: char) {
        match ch {
            '/' if self.mode == LexMode::LineComment && offset == self.construct_start + 2 => {
                self.mode = LexMode::SummaryComment;
                self.summary_start = offset + 1;
            }
            '\n' => {
                if self.mode == LexMode::SummaryComment {
                    let line = self.source.slice(self.summary_start, offset);
                    self.summary.push_str(line.trim());
                    self.summary.push('\n');
                }
                self.end_excluded(offset + 1);
            }
            _ => {}
        }
    }

    fn scan_block_comment(&mut self, offset: usize, ch: char) {
        if ch == '/'
            && offset >= self.construct_start + 3
            && self.source.before(offset) == Some('*')
        {
            self.end_excluded(offset + 1);
        }
    }

    fn begin_excluded(&mut self, start: usize, mode: LexMode) {
        self.construct_start = start;
        self.mode = mode;
    }

    fn end_excluded(&mut self, end: usize) {
        self.excluded.push((self.construct_start, end));
        self.mode = LexMode::Normal;
    }

    // ===== Preprocessor =====

    fn finish_directive(&mut self, end: usize) {
        let line = self.source.slice(self.directive_start, end);
        self.apply_directive(&line);

        if self.conditions.is_skipping() {
            self.mode = LexMode::PreprocessorSkip;
        } else {
            self.end_excluded(end + 1);
        }
    }

    fn apply_directive(&mut self, line: &str) {
        let line = line.trim().trim_start_matches('#').trim_start();
        let line = match line.find("//") {
            Some(comment) => line[..comment].trim_end(),
            None => line,
        };
        let (directive, argument) = match line.split_once(char::is_whitespace) {
            Some((directive, argument)) => (directive, argument.trim()),
            None => (line, ""),
        };
        let skipping = self.conditions.is_skipping();

        match directive {
            "define" if !skipping => self.defines.define(argument),
            "undef" if !skipping => self.defines.undefine(argument),
            "if" => {
                let result = !skipping && evaluate(argument, &self.defines);
                self.conditions.push_if(result);
            }
            "elif" => {
                let result = evaluate(argument, &self.defines);
                self.conditions.elif(result);
            }
            "else" => self.conditions.else_branch(),
            "endif" => self.conditions.pop(),
            _ => return,
        }

        debug!(
            directive,
            argument,
            skipping = self.conditions.is_skipping(),
            "preprocessor directive"
        );
    }

    // ===== Structure =====

    fn current(&self) -> NodeId {
        self.scopes.last().map_or(self.insertion, |scope| scope.node)
    }

    fn reset_span(&mut self, start: usize) {
        self.span_start = start;
        self.excluded.clear();
    }

    fn boundary(&mut self, tree: &mut ElementTree, offset: usize, ch: char) {
        if self.brackets > 0 {
            return;
        }
        let Some(boundary) = Boundary::from_char(ch) else {
            return;
        };
        if boundary == Boundary::Comma && self.maybe_generic {
            return;
        }
        self.maybe_generic = false;

        match boundary {
            Boundary::Open => self.nesting += 1,
            Boundary::Close => {
                self.nesting = self.nesting.saturating_sub(1);
                if let Some(body) = self.body {
                    if self.nesting < body.depth {
                        self.body = None;
                        self.scopes.pop();
                        if !body.property_array {
                            self.summary.clear();
                        }
                        self.reset_span(offset + 1);
                        return;
                    }
                }
            }
            Boundary::Comma | Boundary::Semicolon => {}
        }
        if self.body.is_some() {
            return;
        }

        let header = self
            .source
            .slice_excluding(self.span_start, offset, &self.excluded);
        self.reset_span(offset + 1);

        let current = self.current();
        let context = HeaderContext {
            boundary,
            parent_kind: tree.kind(current),
            previous_sibling_kind: tree.last_child(current).and_then(|child| tree.kind(child)),
        };

        let node = match interpret_header(&header, &context) {
            Header::Import => current,
            Header::PropertyArray => {
                self.body = Some(RemovableBlock {
                    depth: self.nesting,
                    property_array: true,
                });
                current
            }
            Header::Empty => {
                self.summary.clear();
                current
            }
            Header::Declaration(declaration) => {
                let opens_body = declaration.opens_body;
                let node = self.declare(tree, current, boundary, declaration);
                if boundary == Boundary::Open && opens_body {
                    self.body = Some(RemovableBlock {
                        depth: self.nesting,
                        property_array: false,
                    });
                }
                node
            }
        };

        match boundary {
            Boundary::Open => self.scopes.push(Scope {
                node,
                opened_at: offset,
            }),
            Boundary::Close => {
                self.scopes.pop();
            }
            Boundary::Comma | Boundary::Semicolon => {}
        }
    }

    /// Merge into a same-named sibling, or create the node
    fn declare(
        &mut self,
        tree: &mut ElementTree,
        parent: NodeId,
        boundary: Boundary,
        declaration: Declaration,
    ) -> NodeId {
        let summary = std::mem::take(&mut self.summary);

        if let Some(existing) = tree.find_child(parent, &declaration.name) {
            tree.append_summary(existing, &summary);
            return existing;
        }

        // `int a, b;` and enum members: a typeless name repeats its predecessor
        let inherited = if declaration.declared_type.is_none() && boundary != Boundary::Open {
            tree.last_child(parent)
                .and_then(|sibling| tree.info(sibling))
                .cloned()
        } else {
            None
        };

        let info = match inherited {
            Some(sibling) => ElementInfo {
                name: declaration.name,
                default_value: declaration.default_value,
                summary,
                exportable: false,
                ..sibling
            },
            None => ElementInfo {
                name: declaration.name,
                kind: declaration.kind,
                visibility: declaration.visibility,
                modifiers: declaration.modifiers,
                declared_type: declaration.declared_type,
                default_value: declaration.default_value,
                attributes: declaration.attributes,
                extends: declaration.extends,
                summary,
                exportable: false,
            },
        };

        trace!(name = %info.name, kind = %info.kind, "declared");
        tree.add_child(parent, info)
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        let kind = match self.mode {
            LexMode::InString { .. } => Some(ParseErrorKind::UnterminatedString),
            LexMode::InChar => Some(ParseErrorKind::UnterminatedChar),
            LexMode::BlockComment => Some(ParseErrorKind::UnterminatedComment),
            LexMode::Preprocessor => {
                self.finish_directive(self.source.len());
                None
            }
            _ => None,
        };
        if let Some(kind) = kind {
            return Err(self.source.error(kind, self.construct_start));
        }

        if self.brackets > 0 {
            return Err(self
                .source
                .error(ParseErrorKind::UnclosedBracket, self.bracket_opened_at));
        }
        if let Some(scope) = self.scopes.last() {
            return Err(self
                .source
                .error(ParseErrorKind::UnclosedBlock, scope.opened_at));
        }
        Ok(())
    }
}

/// Parse `code` into `tree` under `node` with a `;`-separated list of defined symbols
pub fn parse_block(
    code: &str,
    tree: &mut ElementTree,
    node: NodeId,
    defines: &str,
) -> Result<(), ParseError> {
    Parser::new(code, DefinedSymbols::parse(defines)).parse_into(tree, node)
}
