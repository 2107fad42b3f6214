//! XML documentation comments
//!
//! The parser keeps `///` lines verbatim. This module reads them as XML and
//! splits out the sections a page shows. References render as their target
//! name, and any other markup inside a section contributes its text only.
//! Text that is not well-formed XML is used as a plain summary.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub summary: String,
    pub returns: String,
    pub remarks: String,
    /// `(name, description)` in source order
    pub params: Vec<(String, String)>,
}

impl DocComment {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.returns.is_empty()
            && self.remarks.is_empty()
            && self.params.is_empty()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, text)| text.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Section {
    /// Text outside any known section
    Loose,
    Summary,
    Returns,
    Remarks,
    Param(usize),
}

/// Split a documentation comment into its sections
pub fn parse_doc(text: &str) -> DocComment {
    if text.trim().is_empty() {
        return DocComment::default();
    }
    match read_sections(text) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("Documentation is not XML ({}), using raw text", e);
            DocComment {
                summary: collapse(text),
                ..DocComment::default()
            }
        }
    }
}

/// Single-line preview of the summary
pub fn quick_summary(text: &str) -> String {
    parse_doc(text).summary
}

fn read_sections(text: &str) -> quick_xml::Result<DocComment> {
    let wrapped = format!("<doc>{}</doc>", text);
    let mut reader = Reader::from_str(&wrapped);
    let mut doc = DocComment::default();
    let mut loose = String::new();
    let mut sections: Vec<Section> = Vec::new();

    loop {
        let current = sections.last().copied().unwrap_or(Section::Loose);
        match reader.read_event()? {
            Event::Start(e) => {
                let section = match e.name().as_ref() {
                    b"summary" => Section::Summary,
                    b"returns" => Section::Returns,
                    b"remarks" => Section::Remarks,
                    b"param" => {
                        let name = attribute(&e, "name")?.unwrap_or_default();
                        doc.params.push((name, String::new()));
                        Section::Param(doc.params.len() - 1)
                    }
                    _ => current,
                };
                sections.push(section);
            }
            Event::End(_) => {
                sections.pop();
            }
            Event::Empty(e) => {
                let reference = match e.name().as_ref() {
                    b"see" | b"seealso" => attribute(&e, "cref")?,
                    b"paramref" | b"typeparamref" => attribute(&e, "name")?,
                    _ => None,
                };
                if let Some(reference) = reference {
                    push_text(&mut doc, &mut loose, current, strip_member_prefix(&reference));
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                push_text(&mut doc, &mut loose, current, &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_text(&mut doc, &mut loose, current, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if doc.summary.trim().is_empty() {
        doc.summary = loose;
    }
    doc.summary = collapse(&doc.summary);
    doc.returns = collapse(&doc.returns);
    doc.remarks = collapse(&doc.remarks);
    for (_, text) in doc.params.iter_mut() {
        *text = collapse(text);
    }
    Ok(doc)
}

fn attribute(element: &BytesStart<'_>, name: &str) -> quick_xml::Result<Option<String>> {
    match element.try_get_attribute(name)? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn push_text(doc: &mut DocComment, loose: &mut String, section: Section, text: &str) {
    let target = match section {
        Section::Loose => loose,
        Section::Summary => &mut doc.summary,
        Section::Returns => &mut doc.returns,
        Section::Remarks => &mut doc.remarks,
        Section::Param(index) => &mut doc.params[index].1,
    };
    target.push_str(text);
}

/// `T:System.String` names `System.String`
fn strip_member_prefix(cref: &str) -> &str {
    match cref.split_once(':') {
        Some((prefix, name)) if prefix.len() == 1 => name,
        _ => cref,
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_extracted() {
        let text = "<summary>\nAdds two numbers.\n</summary>\n\
                    <param name=\"a\">First operand</param>\n\
                    <param name=\"b\">Second operand</param>\n\
                    <returns>The sum</returns>\n\
                    <remarks>Never overflows.</remarks>\n";
        let doc = parse_doc(text);
        assert_eq!(doc.summary, "Adds two numbers.");
        assert_eq!(doc.returns, "The sum");
        assert_eq!(doc.remarks, "Never overflows.");
        assert_eq!(doc.param("a"), Some("First operand"));
        assert_eq!(doc.param("b"), Some("Second operand"));
        assert_eq!(doc.param("c"), None);
    }

    #[test]
    fn test_references_render_as_names() {
        let text = "<summary>Wraps <see cref=\"T:System.String\"/> using <paramref name=\"value\"/>.</summary>";
        assert_eq!(parse_doc(text).summary, "Wraps System.String using value.");
    }

    #[test]
    fn test_inline_markup_keeps_its_text() {
        let text = "<summary>Use <c>Run()</c> first.<para>Then stop.</para></summary>";
        assert_eq!(parse_doc(text).summary, "Use Run() first.Then stop.");
    }

    #[test]
    fn test_plain_text_becomes_summary() {
        assert_eq!(parse_doc("Does X\n").summary, "Does X");
        assert_eq!(quick_summary("Does X\nand Y\n"), "Does X and Y");
    }

    #[test]
    fn test_malformed_xml_falls_back_to_raw_text() {
        let doc = parse_doc("<summary>Fish & chips</summary>\n");
        assert_eq!(doc.summary, "<summary>Fish & chips</summary>");
        let doc = parse_doc("<summary>open\n");
        assert_eq!(doc.summary, "<summary>open");
    }

    #[test]
    fn test_empty_comment() {
        assert!(parse_doc("").is_empty());
        assert!(parse_doc(" \n").is_empty());
    }
}
