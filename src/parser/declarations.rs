//! Declaration header interpretation
//!
//! The scanner cuts the source into *headers*: the trimmed text between two
//! structural boundary characters (`,` `;` `{` `}`). This module turns one
//! header into the fields of an element, without touching the tree:
//!
//! ```text
//! [Attr] [Attr2] public static Dictionary<int, string> Name : Base = value
//! └─ attributes ┘└ vis ┘└ mods ┘└──────── type ────────┘└name┘└extends┘└default┘
//! ```
//!
//! The interpretation is heuristic. It does not know the grammar of the
//! language; it strips recognisable pieces off the header in a fixed order and
//! whatever remains is the declared name.

use super::tree::{DeclaredType, Element, Visibility};

const MODIFIERS: &[&str] = &[
    "abstract", "async", "const", "event", "extern", "new", "override", "readonly", "sealed",
    "static", "unsafe", "virtual", "volatile",
];
const PARTIAL: &str = "partial";
const DELEGATE: &str = "delegate";
const IMPORT: &str = "using";
const LAMBDA: &str = "=>";
const COMMENT_START: &str = "/*";
const COMMENT_END: &str = "*/";

/// Structural character that ended a header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Comma,
    Semicolon,
    Open,
    Close,
}

impl Boundary {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ',' => Some(Boundary::Comma),
            ';' => Some(Boundary::Semicolon),
            '{' => Some(Boundary::Open),
            '}' => Some(Boundary::Close),
            _ => None,
        }
    }
}

/// What the interpreter needs to know about the insertion point
#[derive(Debug, Clone, Copy)]
pub struct HeaderContext {
    pub boundary: Boundary,
    /// Kind of the node receiving the declaration (`None` for a tree root)
    pub parent_kind: Option<Element>,
    /// Kind of the insertion point's current last child
    pub previous_sibling_kind: Option<Element>,
}

/// Result of interpreting one header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// `using` directive, dropped without touching the pending summary
    Import,
    /// `= { ... }` initializer following a property; its block is opaque
    PropertyArray,
    /// Nothing left to declare once all pieces are stripped
    Empty,
    Declaration(Declaration),
}

/// Fields of a declaration, ready to become a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: Element,
    pub visibility: Visibility,
    pub modifiers: Vec<String>,
    pub declared_type: DeclaredType,
    pub default_value: String,
    pub attributes: String,
    pub extends: String,
    /// The block opened by this header is a body whose contents are skipped
    pub opens_body: bool,
}

/// Interpret a header cut out by the scanner
pub fn interpret_header(span: &str, context: &HeaderContext) -> Header {
    let mut header = strip_block_comments(span);

    if starts_with_keyword(&header, IMPORT) {
        return Header::Import;
    }

    if context.boundary == Boundary::Open
        && header.starts_with('=')
        && !header.starts_with(LAMBDA)
        && context.previous_sibling_kind == Some(Element::Property)
    {
        return Header::PropertyArray;
    }

    if header.ends_with('=') && !header.ends_with("==") {
        header.pop();
        header.truncate(header.trim_end().len());
    }
    let lambda = match header.find(LAMBDA) {
        Some(at) => {
            header.truncate(at);
            header.truncate(header.trim_end().len());
            true
        }
        None => false,
    };

    let (attributes, rest) = take_attributes(&header);
    let (rest, default_value) = split_default_value(rest);
    let header = rest.split_whitespace().collect::<Vec<_>>().join(" ");

    let (visibility, modifiers, rest) = take_keywords(&header);
    let (declared_type, mut rest) = take_type(rest);

    let mut kind = match &declared_type {
        DeclaredType::Named(keyword) => Element::from_type_keyword(keyword),
        _ => None,
    }
    .unwrap_or(if lambda {
        function_or_property(rest)
    } else {
        Element::Variable
    });

    let mut extends = String::new();
    if let Some(colon) = rest.find(':') {
        extends = rest[colon + 1..].trim_start().to_string();
        rest = rest[..colon].trim_end();
    }

    let visibility = visibility.unwrap_or_else(|| default_visibility(kind, context.parent_kind));

    if rest.is_empty() {
        return Header::Empty;
    }

    let mut opens_body = false;
    if context.boundary == Boundary::Open {
        if kind == Element::Variable {
            kind = function_or_property(rest);
            opens_body = true;
        } else if lambda {
            opens_body = true;
        }
    }

    Header::Declaration(Declaration {
        name: rest.to_string(),
        kind,
        visibility,
        modifiers,
        declared_type,
        default_value,
        attributes,
        extends,
        opens_body,
    })
}

/// Remove `/* ... */` comments; an unterminated one swallows the rest
pub fn strip_block_comments(text: &str) -> String {
    let mut text = text.trim().to_string();
    while let Some(start) = text.find(COMMENT_START) {
        match text[start + COMMENT_START.len()..].find(COMMENT_END) {
            Some(end) => {
                let end = start + COMMENT_START.len() + end + COMMENT_END.len();
                text.replace_range(start..end, "");
            }
            None => text.truncate(start),
        }
    }
    text.trim().to_string()
}

/// Visibility applied when the header names none
pub fn default_visibility(kind: Element, parent_kind: Option<Element>) -> Visibility {
    if kind == Element::Namespace {
        Visibility::Unspecified
    } else if matches!(parent_kind, Some(Element::Enum | Element::Interface)) {
        Visibility::Public
    } else if matches!(kind, Element::Class | Element::Interface | Element::Struct) {
        Visibility::Internal
    } else {
        Visibility::Private
    }
}

fn function_or_property(name: &str) -> Element {
    if name.contains('(') {
        Element::Function
    } else {
        Element::Property
    }
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.strip_prefix(keyword)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Leading `[...]` groups, comma-joined
fn take_attributes(header: &str) -> (String, &str) {
    let mut attributes = Vec::new();
    let mut rest = header;
    while rest.starts_with('[') {
        let Some(end) = rest.find(']') else {
            break;
        };
        attributes.push(&rest[1..end]);
        rest = rest[end + 1..].trim_start();
    }
    (attributes.join(", "), rest)
}

/// Split at the first `=` that is not inside a parameter list
fn split_default_value(header: &str) -> (&str, String) {
    for (eq, _) in header.match_indices('=') {
        let in_parameters = header[..eq].contains('(') && header[eq..].contains(')');
        if !in_parameters {
            return (
                header[..eq].trim_end(),
                header[eq + 1..].trim_start().to_string(),
            );
        }
    }
    (header, String::new())
}

/// Leading visibility, `partial` and modifier keywords in any order.
///
/// The first visibility keyword wins; a second one (`protected internal`) is
/// kept as a modifier.
fn take_keywords(header: &str) -> (Option<Visibility>, Vec<String>, &str) {
    let mut visibility = None;
    let mut modifiers = Vec::new();
    let mut rest = header;

    while !rest.is_empty() {
        let (word, tail) = rest.split_once(' ').unwrap_or((rest, ""));
        if let Some(keyword) = Visibility::from_keyword(word) {
            if visibility.is_none() {
                visibility = Some(keyword);
            } else {
                modifiers.push(word.to_string());
            }
        } else if MODIFIERS.contains(&word) {
            modifiers.push(word.to_string());
        } else if word != PARTIAL {
            break;
        }
        rest = tail;
    }

    (visibility, modifiers, rest)
}

/// The text before the first space that is outside `<...>` and not just `delegate`
fn take_type(header: &str) -> (DeclaredType, &str) {
    for (space, _) in header.match_indices(' ') {
        let candidate = &header[..space];
        if candidate == DELEGATE {
            continue;
        }
        if candidate.contains('<') && header[space..].contains('>') {
            continue;
        }
        if candidate.contains('(') {
            return (DeclaredType::Constructor, header);
        }
        return (
            DeclaredType::Named(candidate.to_string()),
            header[space..].trim_start(),
        );
    }
    (DeclaredType::None, header)
}
