//! Main TUI application state and logic

use crate::config::Settings;
use crate::export::{spawn_export, ExportHandle, ExportOptions, ProgressEvent};
use crate::parser::NodeId;
use crate::project::Project;
use crate::ui::panes::{self, StatusState, TreeRow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashSet;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Tree,
    Info,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Tree => FocusedPane::Info,
            FocusedPane::Info => FocusedPane::Tree,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Editing the `;`-separated constants
    Defines(String),
}

/// Where and how `g` exports
#[derive(Debug, Clone)]
pub struct ExportTarget {
    pub directory: PathBuf,
    pub force: bool,
}

/// The main application state
pub struct App {
    pub project: Project,
    pub settings: Settings,
    /// Where settings are saved after the constants change
    pub settings_path: Option<PathBuf>,
    pub export_target: ExportTarget,

    pub focused_pane: FocusedPane,
    pub input_mode: InputMode,

    /// Expanded nodes; the root is always expanded
    pub expanded: FxHashSet<NodeId>,
    /// Index into the visible rows
    pub selected: usize,
    pub tree_scroll: usize,
    pub info_scroll: usize,

    export: Option<ExportHandle>,
    export_progress: u8,

    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(
        project: Project,
        settings: Settings,
        settings_path: Option<PathBuf>,
        export_target: ExportTarget,
    ) -> Self {
        let status_message = project.status_line();
        App {
            project,
            settings,
            settings_path,
            export_target,
            focused_pane: FocusedPane::Tree,
            input_mode: InputMode::Normal,
            expanded: FxHashSet::default(),
            selected: 0,
            tree_scroll: 0,
            info_scroll: 0,
            export: None,
            export_progress: 0,
            should_quit: false,
            status_message,
        }
    }

    /// Rows currently shown, depth first
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let tree = self.project.tree();
        let mut rows = Vec::new();
        let mut pending: Vec<(NodeId, usize)> = tree
            .children(tree.root())
            .iter()
            .rev()
            .map(|&child| (child, 0))
            .collect();

        while let Some((node, depth)) = pending.pop() {
            let children = tree.children(node);
            let expanded = self.expanded.contains(&node);
            rows.push(TreeRow {
                node,
                depth,
                has_children: !children.is_empty(),
                expanded,
            });
            if expanded {
                pending.extend(children.iter().rev().map(|&child| (child, depth + 1)));
            }
        }
        rows
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.visible_rows().get(self.selected).map(|row| row.node)
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_some()
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.poll_export();
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Poll with a timeout so export progress keeps updating
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        if let Some(handle) = self.export.take() {
            info!("Waiting for the running export to finish");
            if let Err(e) = handle.join() {
                warn!("Export failed: {}", e);
            }
        }
        Ok(())
    }

    /// Drain progress events and collect a finished export
    pub fn poll_export(&mut self) {
        let Some(handle) = &self.export else {
            return;
        };
        for event in handle.events.try_iter() {
            match event {
                ProgressEvent::Status(message) => self.status_message = message,
                ProgressEvent::Progress(percent) => self.export_progress = percent,
            }
        }
        if !handle.is_finished() {
            return;
        }

        if let Some(handle) = self.export.take() {
            for event in handle.events.try_iter() {
                if let ProgressEvent::Status(message) = event {
                    self.status_message = message;
                }
            }
            match handle.join() {
                Ok(report) => {
                    self.status_message = format!(
                        "Finished! {} pages in {}",
                        report.pages,
                        self.export_target.directory.display()
                    );
                }
                Err(e) => {
                    warn!("Export failed: {}", e);
                    self.status_message = format!("Export failed: {}", e);
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        let rows = self.visible_rows();
        if self.selected >= rows.len() {
            self.selected = rows.len().saturating_sub(1);
        }
        let tree = self.project.tree();

        panes::render_tree_pane(
            frame,
            columns[0],
            tree,
            &rows,
            self.selected,
            self.focused_pane == FocusedPane::Tree,
            &mut self.tree_scroll,
        );

        let mut project_lines = vec![
            self.project.directory().display().to_string(),
            self.project.status_line(),
            format!("{} files parsed", self.project.files().len()),
        ];
        project_lines.extend(self.project.errors().iter().map(|e| e.to_string()));

        panes::render_info_pane(
            frame,
            columns[1],
            tree,
            rows.get(self.selected).map(|row| row.node),
            &project_lines,
            self.focused_pane == FocusedPane::Info,
            &mut self.info_scroll,
        );

        let state = match (&self.input_mode, &self.export) {
            (InputMode::Defines(input), _) => StatusState::EditingDefines(input),
            (InputMode::Normal, Some(_)) => StatusState::Exporting(self.export_progress),
            (InputMode::Normal, None) => StatusState::Browsing,
        };
        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            tree.len() - 1,
            state,
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if let InputMode::Defines(input) = &mut self.input_mode {
            match key.code {
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Enter => {
                    let defines = input.clone();
                    self.input_mode = InputMode::Normal;
                    self.reload(&defines);
                }
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    self.status_message = self.project.status_line();
                }
                _ => {}
            }
            return;
        }

        let row_count = self.visible_rows().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Tree => {
                    self.selected = self.selected.saturating_sub(1);
                    self.info_scroll = 0;
                }
                FocusedPane::Info => {
                    self.info_scroll = self.info_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Tree => {
                    if self.selected + 1 < row_count {
                        self.selected += 1;
                    }
                    self.info_scroll = 0;
                }
                FocusedPane::Info => {
                    self.info_scroll = self.info_scroll.saturating_add(1);
                }
            },
            KeyCode::Right | KeyCode::Enter => {
                if let Some(node) = self.selected_node() {
                    if !self.project.tree().children(node).is_empty() {
                        self.expanded.insert(node);
                    }
                }
            }
            KeyCode::Left => self.collapse_or_select_parent(),
            KeyCode::Char('d') => {
                self.input_mode = InputMode::Defines(self.project.defines().to_string());
            }
            KeyCode::Char('g') => self.start_export(),
            _ => {}
        }
    }

    fn collapse_or_select_parent(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if self.expanded.remove(&node) {
            return;
        }
        let tree = self.project.tree();
        if let Some(parent) = tree.parent(node).filter(|&p| p != tree.root()) {
            if let Some(index) = self.visible_rows().iter().position(|row| row.node == parent) {
                self.selected = index;
            }
        }
    }

    /// Parse the project again with new constants and remember them
    pub fn reload(&mut self, defines: &str) {
        if let Err(e) = self.project.reload(defines) {
            warn!("Reload failed: {}", e);
            self.status_message = format!("Reload failed: {}", e);
            return;
        }
        self.expanded.clear();
        self.selected = 0;
        self.tree_scroll = 0;
        self.info_scroll = 0;
        self.status_message = self.project.status_line();

        self.settings.define_constants = defines.to_string();
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save(path) {
                warn!("Could not save settings: {}", e);
            }
        }
    }

    /// Start a background export unless one is already running
    pub fn start_export(&mut self) {
        if self.export.is_some() {
            self.status_message = "An export is already running".to_string();
            return;
        }
        let options = ExportOptions::from(&self.settings);
        match spawn_export(
            self.project.tree().clone(),
            self.export_target.directory.clone(),
            options,
            self.export_target.force,
        ) {
            Ok(handle) => {
                self.export_progress = 0;
                self.export = Some(handle);
            }
            Err(e) => self.status_message = format!("Export failed: {}", e),
        }
    }

    /// Block until a running export ends
    pub fn wait_for_export(&mut self) {
        while self.export.is_some() {
            self.poll_export();
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::fs;

    const SOURCE: &str = "namespace Demo {\n\
        #if EXTRA\n\
        public class Extra {}\n\
        #endif\n\
        public class Widget { public int Size; public void Draw() {} }\n\
        }\n";

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(dir: &tempfile::TempDir) -> App {
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("Widget.cs"), SOURCE).unwrap();
        let project = Project::load(&source, "cs", "").unwrap();
        App::new(
            project,
            Settings::default(),
            Some(dir.path().join("settings.toml")),
            ExportTarget {
                directory: dir.path().join("docs"),
                force: false,
            },
        )
    }

    fn labels(app: &App) -> Vec<String> {
        app.visible_rows()
            .iter()
            .map(|row| app.project.tree().node(row.node).label().to_string())
            .collect()
    }

    #[test]
    fn test_expand_and_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert_eq!(labels(&app), vec!["Demo"]);

        app.handle_key_event(key(KeyCode::Right));
        assert_eq!(labels(&app), vec!["Demo", "Widget"]);

        app.handle_key_event(key(KeyCode::Down));
        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(labels(&app), vec!["Demo", "Widget", "Size", "Draw()"]);

        app.handle_key_event(key(KeyCode::Down));
        app.handle_key_event(key(KeyCode::Left));
        assert_eq!(app.selected, 1);
        app.handle_key_event(key(KeyCode::Left));
        assert_eq!(labels(&app), vec!["Demo", "Widget"]);
    }

    #[test]
    fn test_defines_input_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.handle_key_event(key(KeyCode::Char('d')));
        assert_eq!(app.input_mode, InputMode::Defines(String::new()));

        for c in "EXTRA".chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
        app.handle_key_event(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.status_message, "Code loaded with: EXTRA");
        app.handle_key_event(key(KeyCode::Right));
        assert_eq!(labels(&app), vec!["Demo", "Extra", "Widget"]);

        let saved = Settings::load(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(saved.define_constants, "EXTRA");
    }

    #[test]
    fn test_escape_leaves_defines_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.handle_key_event(key(KeyCode::Char('d')));
        app.handle_key_event(key(KeyCode::Char('X')));
        app.handle_key_event(key(KeyCode::Esc));
        assert_eq!(app.project.defines(), "");
        assert!(!dir.path().join("settings.toml").exists());
    }

    #[test]
    fn test_background_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.handle_key_event(key(KeyCode::Char('g')));
        assert!(app.is_exporting());

        app.wait_for_export();
        assert!(app.status_message.starts_with("Finished! 3 pages"));
        assert!(dir.path().join("docs").join("index.html").exists());
        assert!(dir.path().join("docs").join("Demo.html").exists());
        assert!(dir.path().join("docs").join("Demo").join("Widget.html").exists());
    }
}
