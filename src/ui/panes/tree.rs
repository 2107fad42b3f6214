//! Element tree pane rendering
//!
//! Shows the visible rows of the collapsible element tree. Labels are coloured
//! by element kind; abstract members are italic and static members underlined.

use crate::parser::{ElementTree, Emphasis, NodeId};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// One visible line of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeRow {
    pub node: NodeId,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

fn row_style(tree: &ElementTree, node: NodeId) -> Style {
    let Some(info) = tree.info(node) else {
        return Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD);
    };
    let style = Style::default().fg(DEFAULT_THEME.kind_color(info.kind));
    match info.emphasis() {
        Emphasis::Italic => style.add_modifier(Modifier::ITALIC),
        Emphasis::Underline => style.add_modifier(Modifier::UNDERLINED),
        Emphasis::Regular => style,
    }
}

/// Render the tree pane, scrolling so that `selected` stays visible
pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    tree: &ElementTree,
    rows: &[TreeRow],
    selected: usize,
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
        .title(format!(" {} ", tree.node(tree.root()).label()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if rows.is_empty() {
        let paragraph = Paragraph::new("(no declarations)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if selected < *scroll_offset {
        *scroll_offset = selected;
    } else if selected >= *scroll_offset + visible_height {
        *scroll_offset = selected + 1 - visible_height;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(index, row)| {
            let marker = match (row.has_children, row.expanded) {
                (false, _) => "  ",
                (true, false) => "▸ ",
                (true, true) => "▾ ",
            };
            let mut style = row_style(tree, row.node);
            if index == selected {
                style = style.bg(DEFAULT_THEME.current_line_bg);
                if is_focused {
                    style = style.add_modifier(Modifier::BOLD);
                }
            }
            ListItem::new(Line::from(vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(marker, Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(tree.node(row.node).label().to_string(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
