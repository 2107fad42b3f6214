//! Status bar rendering with keybindings and state indicators

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar indicates on its left edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusState<'a> {
    Browsing,
    /// Editing the defined constants; carries the text typed so far
    EditingDefines(&'a str),
    /// Background export running, with its last percentage
    Exporting(u8),
}

/// Render the status bar at the bottom
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    element_count: usize,
    state: StatusState<'_>,
) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (badge, badge_bg) = match state {
        StatusState::Browsing => (format!(" {} elements ", element_count), DEFAULT_THEME.primary),
        StatusState::EditingDefines(_) => (" DEFINES ".to_string(), DEFAULT_THEME.secondary),
        StatusState::Exporting(percent) => (format!(" EXPORT {:>3}% ", percent), DEFAULT_THEME.success),
    };
    let text = match state {
        StatusState::EditingDefines(input) => format!(" {}▏", input),
        _ => format!(" {} ", message),
    };

    let left_spans = vec![
        Span::styled(
            badge,
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            text,
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.fg),
        ),
    ];
    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let keys: &[(&str, &str)] = match state {
        StatusState::EditingDefines(_) => &[(" ↵ ", " reload "), (" esc ", " cancel ")],
        _ => &[
            (" ↑/↓ ", " select "),
            (" ←/→ ", " fold "),
            (" d ", " defines "),
            (" g ", " export "),
            (" q ", " quit "),
        ],
    };
    let mut right_spans = Vec::new();
    for (index, (key, description)) in keys.iter().enumerate() {
        if index > 0 {
            right_spans.push(Span::styled("│", sep_style));
            right_spans.push(Span::styled(" ", desc_style));
        }
        right_spans.push(Span::styled(*key, key_style));
        right_spans.push(Span::styled(*description, desc_style));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
