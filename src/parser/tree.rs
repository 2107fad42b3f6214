// Element tree definitions for the structural parser

use serde::Serialize;
use std::fmt;

/// Index of a node inside an [`ElementTree`] arena
pub type NodeId = usize;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Kind of a declared code element.
///
/// Variants are ordered so that every container kind sorts before
/// [`Element::Function`]; the export stage relies on that to count pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Element {
    Namespace,
    Class,
    Interface,
    Struct,
    Enum,
    Function,
    Property,
    Variable,
}

impl Element {
    /// Kinds that get their own documentation page
    pub fn is_container(self) -> bool {
        self < Element::Function
    }

    /// Classify a type token such as `class` or `enum`
    pub fn from_type_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(Element::Class),
            "interface" => Some(Element::Interface),
            "namespace" => Some(Element::Namespace),
            "enum" => Some(Element::Enum),
            "struct" => Some(Element::Struct),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Element::Namespace => "namespace",
            Element::Class => "class",
            Element::Interface => "interface",
            Element::Struct => "struct",
            Element::Enum => "enum",
            Element::Function => "function",
            Element::Property => "property",
            Element::Variable => "variable",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declared (or defaulted) accessibility of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    Public,
    Internal,
    Protected,
    Private,
    /// No keyword and no default applies (namespaces)
    Unspecified,
}

impl Visibility {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(Visibility::Public),
            "internal" => Some(Visibility::Internal),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::Unspecified => "default",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The type text in front of a declared name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum DeclaredType {
    /// The header had no separate type token
    #[default]
    None,
    /// `Name(params)` without a return type
    Constructor,
    Named(String),
}

impl DeclaredType {
    pub fn is_none(&self) -> bool {
        matches!(self, DeclaredType::None)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeclaredType::None => "",
            DeclaredType::Constructor => "Constructor",
            DeclaredType::Named(name) => name,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Font hint a front end applies to an element's label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Regular,
    /// abstract members
    Italic,
    /// static members
    Underline,
}

/// Metadata attached to every parsed declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementInfo {
    /// Declared identifier, including the parameter list for functions
    pub name: String,
    pub kind: Element,
    pub visibility: Visibility,
    /// Modifier keywords in source order (`partial` is never recorded)
    pub modifiers: Vec<String>,
    pub declared_type: DeclaredType,
    pub default_value: String,
    /// Comma-joined interiors of the leading `[...]` groups
    pub attributes: String,
    /// Comma-joined base/interface list
    pub extends: String,
    /// Newline-terminated `///` lines collected in front of the declaration
    pub summary: String,
    /// Set by the export stage, never by the parser
    pub exportable: bool,
}

impl ElementInfo {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn modifiers_text(&self) -> String {
        self.modifiers.join(" ")
    }

    pub fn emphasis(&self) -> Emphasis {
        if self.has_modifier("abstract") {
            Emphasis::Italic
        } else if self.has_modifier("static") {
            Emphasis::Underline
        } else {
            Emphasis::Regular
        }
    }

    /// Name with parameter names and default values dropped
    pub fn display_name(&self) -> String {
        remove_param_names(&self.name)
    }
}

/// A single arena slot. The root of a tree carries no [`ElementInfo`].
#[derive(Debug, Clone)]
pub struct Node {
    label: String,
    info: Option<ElementInfo>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn info(&self) -> Option<&ElementInfo> {
        self.info.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Index-addressed tree of declarations.
///
/// Nodes are never removed, so a [`NodeId`] handed out by a tree stays valid for
/// that tree's lifetime. Only [`ElementTree::set_exportable`] is open to
/// consumers for writing; structural fields change through the parser alone.
#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: Vec<Node>,
}

impl ElementTree {
    /// Create a tree holding only a root node with the given label
    pub fn new(root_label: impl Into<String>) -> Self {
        ElementTree {
            nodes: vec![Node {
                label: root_label.into(),
                info: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// Total node count, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn info(&self, id: NodeId) -> Option<&ElementInfo> {
        self.nodes[id].info.as_ref()
    }

    pub fn kind(&self, id: NodeId) -> Option<Element> {
        self.info(id).map(|info| info.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].children.last().copied()
    }

    /// Find a direct child by its declared name
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.info(child).is_some_and(|info| info.name == name))
    }

    /// First node whose dotted path from the root equals `path`
    pub fn find_path(&self, path: &[&str]) -> Option<NodeId> {
        let mut current = self.root();
        for segment in path {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    /// Names from the root's first child down to `id`
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(info) = self.info(node) {
                segments.push(info.name.as_str());
            }
            current = self.parent(node);
        }
        segments.reverse();
        segments
    }

    /// `id` followed by all of its descendants, depth first in source order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            order.push(node);
            pending.extend(self.children(node).iter().rev().copied());
        }
        order
    }

    pub fn set_exportable(&mut self, id: NodeId, exportable: bool) {
        if let Some(info) = self.nodes[id].info.as_mut() {
            info.exportable = exportable;
        }
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, info: ElementInfo) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            label: info.display_name(),
            info: Some(info),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub(crate) fn append_summary(&mut self, id: NodeId, summary: &str) {
        if let Some(info) = self.nodes[id].info.as_mut() {
            info.summary.push_str(summary);
        }
    }

    /// Serializable snapshot of the subtree rooted at `id`
    pub fn outline(&self, id: NodeId) -> OutlineNode {
        let node = &self.nodes[id];
        OutlineNode {
            label: node.label.clone(),
            info: node.info.clone(),
            children: node.children.iter().map(|&c| self.outline(c)).collect(),
        }
    }

    /// Write an indented text outline of the subtree rooted at `id`
    pub fn write_outline<W: fmt::Write>(&self, out: &mut W, id: NodeId) -> fmt::Result {
        self.write_outline_at(out, id, 0)
    }

    fn write_outline_at<W: fmt::Write>(
        &self,
        out: &mut W,
        id: NodeId,
        indent: usize,
    ) -> fmt::Result {
        let node = &self.nodes[id];
        write!(out, "{:width$}", "", width = indent * 2)?;
        match &node.info {
            None => writeln!(out, "{}", node.label)?,
            Some(info) => {
                write!(out, "{} [{} {}", node.label, info.visibility, info.kind)?;
                if !info.declared_type.is_none() {
                    write!(out, ": {}", info.declared_type)?;
                }
                writeln!(out, "]")?;
            }
        }
        for &child in &node.children {
            self.write_outline_at(out, child, indent + 1)?;
        }
        Ok(())
    }
}

/// Owned, serializable copy of a subtree
#[derive(Debug, Clone, Serialize)]
pub struct OutlineNode {
    pub label: String,
    #[serde(flatten)]
    pub info: Option<ElementInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

/// `M(int a, string b = "")` becomes `M(int, string)`
pub fn remove_param_names(name: &str) -> String {
    let (Some(open), Some(close)) = (name.find('('), name.rfind(')')) else {
        return name.to_string();
    };
    if close < open {
        return name.to_string();
    }

    let params: Vec<String> = split_top_level(&name[open + 1..close])
        .into_iter()
        .map(|param| {
            let param = param.split('=').next().unwrap_or_default().trim();
            match param.rfind(char::is_whitespace) {
                Some(space)
                    if param[space + 1..]
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '@') =>
                {
                    param[..space].trim_end().to_string()
                }
                _ => param.to_string(),
            }
        })
        .filter(|param| !param.is_empty())
        .collect();

    format!("{}({}){}", &name[..open], params.join(", "), &name[close + 1..])
}

/// Split on commas that are not nested in `<>`, `()` or `[]`
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, kind: Element) -> ElementInfo {
        ElementInfo {
            name: name.to_string(),
            kind,
            visibility: Visibility::Public,
            modifiers: Vec::new(),
            declared_type: DeclaredType::None,
            default_value: String::new(),
            attributes: String::new(),
            extends: String::new(),
            summary: String::new(),
            exportable: false,
        }
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = ElementTree::new("Project");
        let root = tree.root();
        let a = tree.add_child(root, info("A", Element::Class));
        let b = tree.add_child(root, info("B", Element::Enum));

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(b), Some(root));
        assert_eq!(tree.last_child(root), Some(b));
        assert_eq!(tree.find_child(root, "A"), Some(a));
        assert_eq!(tree.find_child(root, "C"), None);
    }

    #[test]
    fn test_path_and_lookup() {
        let mut tree = ElementTree::new("Project");
        let root = tree.root();
        let ns = tree.add_child(root, info("Demo", Element::Namespace));
        let class = tree.add_child(ns, info("Widget", Element::Class));

        assert_eq!(tree.path(class), vec!["Demo", "Widget"]);
        assert_eq!(tree.find_path(&["Demo", "Widget"]), Some(class));
        assert_eq!(tree.descendants(root), vec![root, ns, class]);
    }

    #[test]
    fn test_exportable_is_the_only_public_write() {
        let mut tree = ElementTree::new("Project");
        let root = tree.root();
        let a = tree.add_child(root, info("A", Element::Class));
        tree.set_exportable(a, true);
        tree.set_exportable(root, true);

        assert!(tree.info(a).unwrap().exportable);
        assert!(tree.info(root).is_none());
    }

    #[test]
    fn test_remove_param_names() {
        assert_eq!(remove_param_names("M(int a, string b = \"\")"), "M(int, string)");
        assert_eq!(
            remove_param_names("Add(Dictionary<int, string> map, params int[] xs)"),
            "Add(Dictionary<int, string>, params int[])"
        );
        assert_eq!(remove_param_names("Run()"), "Run()");
        assert_eq!(remove_param_names("Value"), "Value");
    }

    #[test]
    fn test_emphasis_prefers_abstract() {
        let mut element = info("M()", Element::Function);
        element.modifiers = vec!["static".to_string()];
        assert_eq!(element.emphasis(), Emphasis::Underline);
        element.modifiers.insert(0, "abstract".to_string());
        assert_eq!(element.emphasis(), Emphasis::Italic);
    }

    #[test]
    fn test_element_order_puts_containers_first() {
        assert!(Element::Enum.is_container());
        assert!(Element::Namespace.is_container());
        assert!(!Element::Function.is_container());
        assert!(!Element::Variable.is_container());
    }
}
