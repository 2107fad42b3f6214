// HTML page rendering

use crate::export::doc::{parse_doc, DocComment};
use crate::export::ExportOptions;
use crate::parser::{DeclaredType, Element, ElementInfo, ElementTree, NodeId, Visibility};
use quick_xml::escape::escape;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:1.5em}\
td,th{border:1px solid #ccc;padding:4px 8px;text-align:left;vertical-align:top}\
code{font-family:monospace}.abstract{font-style:italic}.static{text-decoration:underline}";

/// Member groups in page order
const GROUPS: &[(Element, &str)] = &[
    (Element::Namespace, "Namespaces"),
    (Element::Class, "Classes"),
    (Element::Interface, "Interfaces"),
    (Element::Struct, "Structs"),
    (Element::Enum, "Enums"),
    (Element::Function, "Functions"),
    (Element::Property, "Properties"),
    (Element::Variable, "Variables"),
];

/// File name (without extension) of a node's page
pub fn file_stem(tree: &ElementTree, id: NodeId) -> String {
    tree.node(id)
        .label()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `public static int Count = 0` style declaration line
pub fn signature(info: &ElementInfo) -> String {
    let mut parts: Vec<String> = Vec::new();
    if info.visibility != Visibility::Unspecified {
        parts.push(info.visibility.label().to_string());
    }
    parts.extend(info.modifiers.iter().cloned());
    if let DeclaredType::Named(name) = &info.declared_type {
        parts.push(name.clone());
    }
    parts.push(info.display_name());
    if !info.extends.is_empty() {
        parts.push(format!(": {}", info.extends));
    }
    if !info.default_value.is_empty() {
        parts.push(format!("= {}", info.default_value));
    }
    parts.join(" ")
}

/// Render the page of `id`; `links` maps child containers to their page paths
pub fn render_page(
    tree: &ElementTree,
    id: NodeId,
    options: &ExportOptions,
    links: &[(NodeId, String)],
) -> String {
    let node = tree.node(id);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(node.label())));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));

    match node.info() {
        None => html.push_str(&format!("<h1>{}</h1>\n", escape(node.label()))),
        Some(info) => {
            html.push_str(&format!(
                "<h1>{} {}</h1>\n",
                info.kind,
                escape(node.label())
            ));
            render_details(&mut html, info, options);
        }
    }

    for &(kind, heading) in GROUPS {
        let members: Vec<NodeId> = tree
            .children(id)
            .iter()
            .copied()
            .filter(|&child| {
                tree.info(child)
                    .is_some_and(|info| info.exportable && info.kind == kind)
            })
            .collect();
        if members.is_empty() {
            continue;
        }

        html.push_str(&format!("<h2>{}</h2>\n<table>\n", heading));
        html.push_str("<tr><th>Declaration</th><th>Description</th></tr>\n");
        for member in members {
            let link = links
                .iter()
                .find(|(child, _)| *child == member)
                .map(|(_, link)| link.as_str());
            render_member(&mut html, tree, member, link);
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_details(html: &mut String, info: &ElementInfo, options: &ExportOptions) {
    let mut rows: Vec<(&str, String)> = Vec::new();
    if options.export_attributes && !info.attributes.is_empty() {
        rows.push(("Attributes", info.attributes.clone()));
    }
    rows.push(("Visibility", info.visibility.label().to_string()));
    if !info.modifiers.is_empty() {
        rows.push(("Modifiers", info.modifiers_text()));
    }
    if !info.declared_type.is_none() {
        rows.push(("Type", info.declared_type.to_string()));
    }
    if !info.default_value.is_empty() {
        rows.push(("Default value", info.default_value.clone()));
    }
    if !info.extends.is_empty() {
        rows.push(("Extends", info.extends.clone()));
    }

    html.push_str("<table>\n");
    for (name, value) in rows {
        html.push_str(&format!(
            "<tr><th>{}</th><td><code>{}</code></td></tr>\n",
            name,
            escape(&value)
        ));
    }
    html.push_str("</table>\n");

    let doc = parse_doc(&info.summary);
    if !doc.summary.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", escape(&doc.summary)));
    }
    if !doc.remarks.is_empty() {
        html.push_str(&format!("<p><em>{}</em></p>\n", escape(&doc.remarks)));
    }
}

fn render_member(html: &mut String, tree: &ElementTree, member: NodeId, link: Option<&str>) {
    let Some(info) = tree.info(member) else {
        return;
    };
    let signature = escape(&signature(info)).into_owned();
    let signature = match link {
        Some(link) => format!("<a href=\"{}\">{}</a>", escape(link), signature),
        None => signature,
    };
    let class = if info.has_modifier("abstract") {
        " class=\"abstract\""
    } else if info.has_modifier("static") {
        " class=\"static\""
    } else {
        ""
    };

    html.push_str(&format!(
        "<tr><td><code{}>{}</code></td><td>{}</td></tr>\n",
        class,
        signature,
        describe(&parse_doc(&info.summary))
    ));
}

fn describe(doc: &DocComment) -> String {
    let mut text = escape(&doc.summary).into_owned();
    if !doc.params.is_empty() {
        text.push_str("<ul>");
        for (name, description) in &doc.params {
            text.push_str(&format!(
                "<li><code>{}</code>: {}</li>",
                escape(name),
                escape(description)
            ));
        }
        text.push_str("</ul>");
    }
    if !doc.returns.is_empty() {
        text.push_str(&format!("<br>Returns: {}", escape(&doc.returns)));
    }
    text
}

/// Redirect page written as `index.php` into generated directories
pub fn php_filler(target: &str) -> String {
    format!(
        "<?php header('Location: {}'); ?>\n",
        target.replace('\'', "%27")
    )
}
