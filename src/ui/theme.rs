use crate::parser::Element;
use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub namespace: Color,
    pub type_name: Color,  // Classes and structs
    pub interface: Color,
    pub enumeration: Color,
    pub function: Color,
    pub property: Color,
    pub variable: Color,
}

impl Theme {
    /// Label colour of an element kind in the tree
    pub fn kind_color(&self, kind: Element) -> Color {
        match kind {
            Element::Namespace => self.namespace,
            Element::Class | Element::Struct => self.type_name,
            Element::Interface => self.interface,
            Element::Enum => self.enumeration,
            Element::Function => self.function,
            Element::Property => self.property,
            Element::Variable => self.variable,
        }
    }
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for the selection
    namespace: Color::Rgb(203, 166, 247),      // Mauve
    type_name: Color::Rgb(148, 226, 213),      // Cyan/teal
    interface: Color::Rgb(137, 220, 235),      // Sky
    enumeration: Color::Rgb(245, 194, 231),    // Pink
    function: Color::Rgb(249, 226, 175),       // Yellow
    property: Color::Rgb(166, 227, 161),       // Green
    variable: Color::Rgb(205, 214, 244),       // Plain text
};
