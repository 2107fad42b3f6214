//! Info pane rendering for the selected element

use crate::export::doc::quick_summary;
use crate::parser::{ElementTree, NodeId};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn field<'a>(name: &'a str, value: String) -> Line<'a> {
    let value = if value.is_empty() {
        Span::styled("-", Style::default().fg(DEFAULT_THEME.comment))
    } else {
        Span::styled(value, Style::default().fg(DEFAULT_THEME.fg))
    };
    Line::from(vec![
        Span::styled(
            format!("{:<14}", name),
            Style::default()
                .fg(DEFAULT_THEME.primary)
                .add_modifier(Modifier::BOLD),
        ),
        value,
    ])
}

/// Render metadata and summary of `node`; the root shows `project_lines`
pub fn render_info_pane(
    frame: &mut Frame,
    area: Rect,
    tree: &ElementTree,
    node: Option<NodeId>,
    project_lines: &[String],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };
    let block = Block::default()
        .title(" Info ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut lines: Vec<Line> = Vec::new();
    match node.and_then(|id| tree.info(id).map(|info| (id, info))) {
        Some((id, info)) => {
            lines.push(Line::from(Span::styled(
                tree.path(id).join("."),
                Style::default()
                    .fg(DEFAULT_THEME.kind_color(info.kind))
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(field("Kind", info.kind.to_string()));
            lines.push(field("Attributes", info.attributes.clone()));
            lines.push(field("Visibility", info.visibility.to_string()));
            lines.push(field("Modifiers", info.modifiers_text()));
            lines.push(field("Type", info.declared_type.to_string()));
            lines.push(field("Default value", info.default_value.clone()));
            lines.push(field("Extends", info.extends.clone()));
            lines.push(Line::from(""));

            let summary = quick_summary(&info.summary);
            if summary.is_empty() {
                lines.push(Line::from(Span::styled(
                    "(no summary)",
                    Style::default().fg(DEFAULT_THEME.comment),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    summary,
                    Style::default().fg(DEFAULT_THEME.fg),
                )));
            }
        }
        None => {
            for line in project_lines {
                lines.push(Line::from(Span::styled(
                    line.clone(),
                    Style::default().fg(DEFAULT_THEME.fg),
                )));
            }
        }
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((*scroll_offset as u16, 0));
    frame.render_widget(paragraph, area);
}
