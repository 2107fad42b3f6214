//! Documentation export
//!
//! Turns a parsed [`ElementTree`] into a directory of HTML pages:
//! - [`set_exportability`] marks which nodes are documented;
//! - [`count_pages`] sizes the job for progress reporting;
//! - [`Exporter`] writes one page per documented container and reports
//!   progress through a [`ProgressSink`];
//! - [`spawn_export`] runs the whole job on a worker thread.
//!
//! Page layout: the root is written to `index.<ext>`. A container's page is
//! `<dir>/<name>.<ext>` and its own container children go below `<dir>/<name>/`.

pub mod doc;
pub mod progress;
pub mod render;

pub use progress::{ChannelSink, ProgressBarSink, ProgressEvent, ProgressSink, RecordingSink};

use crate::config::Settings;
use crate::error::{DocError, Result};
use crate::parser::{Element, ElementTree, NodeId, Visibility};
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Which nodes get documented and how pages are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub public: bool,
    pub internal: bool,
    pub protected: bool,
    pub private: bool,
    pub expand_enums: bool,
    pub expand_structs: bool,
    pub export_attributes: bool,
    /// Page file extension, without the dot
    pub extension: String,
    pub php_fillers: bool,
}

impl ExportOptions {
    /// Namespaces (no visibility) are always exported
    pub fn exports(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Unspecified => true,
            Visibility::Public => self.public,
            Visibility::Internal => self.internal,
            Visibility::Protected => self.protected,
            Visibility::Private => self.private,
        }
    }
}

impl From<&Settings> for ExportOptions {
    fn from(settings: &Settings) -> Self {
        ExportOptions {
            public: settings.export_public,
            internal: settings.export_internal,
            protected: settings.export_protected,
            private: settings.export_private,
            expand_enums: settings.expand_enums,
            expand_structs: settings.expand_structs,
            export_attributes: settings.export_attributes,
            extension: settings.file_extension.trim_start_matches('.').to_string(),
            php_fillers: settings.php_fillers,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions::from(&Settings::default())
    }
}

/// Mark the descendants of `node` that will be documented
pub fn set_exportability(tree: &mut ElementTree, node: NodeId, options: &ExportOptions) {
    for id in tree.descendants(node).into_iter().skip(1) {
        tree.set_exportable(id, false);
    }
    mark(tree, node, options);
}

fn mark(tree: &mut ElementTree, node: NodeId, options: &ExportOptions) {
    for child in tree.children(node).to_vec() {
        let Some(info) = tree.info(child) else {
            continue;
        };
        if !options.exports(info.visibility) {
            continue;
        }
        let expand = match info.kind {
            Element::Enum => options.expand_enums,
            Element::Struct => options.expand_structs,
            _ => true,
        };
        tree.set_exportable(child, true);
        if expand {
            mark(tree, child, options);
        }
    }
}

/// Exportable containers reachable from `node` through exportable containers
pub fn page_children(tree: &ElementTree, node: NodeId) -> Vec<NodeId> {
    tree.children(node)
        .iter()
        .copied()
        .filter(|&child| {
            tree.info(child)
                .is_some_and(|info| info.exportable && info.kind.is_container())
        })
        .collect()
}

/// Pages an export of `node` writes: `node` itself plus every page below it
pub fn count_pages(tree: &ElementTree, node: NodeId) -> usize {
    1 + page_children(tree, node)
        .into_iter()
        .map(|child| count_pages(tree, child))
        .sum::<usize>()
}

/// What an export produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub pages: usize,
    /// Written pages in writing order
    pub files: Vec<PathBuf>,
    pub fillers: usize,
}

pub struct Exporter<'a> {
    options: &'a ExportOptions,
    sink: &'a mut dyn ProgressSink,
    pages: usize,
    exported: usize,
    files: Vec<PathBuf>,
}

impl<'a> Exporter<'a> {
    pub fn new(options: &'a ExportOptions, sink: &'a mut dyn ProgressSink) -> Self {
        Exporter {
            options,
            sink,
            pages: 0,
            exported: 0,
            files: Vec::new(),
        }
    }

    /// Document the whole tree into `out`.
    ///
    /// An existing non-empty `out` is refused unless `force` is set.
    pub fn run(mut self, tree: &mut ElementTree, out: &Path, force: bool) -> Result<ExportReport> {
        prepare_output(out, force)?;
        let root = tree.root();

        self.sink.progress(0);
        self.sink.status("Selecting nodes to export...");
        set_exportability(tree, root, self.options);

        self.sink.status("Preprocessing nodes to export...");
        self.pages = count_pages(tree, root);
        self.exported = 0;
        info!("Exporting {} pages to {}", self.pages, out.display());
        self.sink.status(&format!(
            "Exporting {} ({:.2}%)...",
            tree.node(root).label(),
            0.0
        ));

        let index = out.join(format!("index.{}", self.options.extension));
        self.export_node(tree, root, &index, out)?;

        let mut fillers = 0;
        if self.options.php_fillers {
            self.sink.status("Generating index.php fillers...");
            fillers = write_fillers(out, &self.options.extension)?;
        }

        self.sink.status("Finished!");
        self.sink.progress(100);
        info!("Export finished: {} pages", self.exported);

        Ok(ExportReport {
            pages: self.pages,
            files: self.files,
            fillers,
        })
    }

    fn export_node(&mut self, tree: &ElementTree, id: NodeId, page: &Path, dir: &Path) -> Result<()> {
        let children: Vec<(NodeId, PathBuf, PathBuf)> = page_children(tree, id)
            .into_iter()
            .map(|child| {
                let stem = render::file_stem(tree, child);
                (
                    child,
                    dir.join(format!("{}.{}", stem, self.options.extension)),
                    dir.join(stem),
                )
            })
            .collect();

        let base = page.parent().unwrap_or(dir);
        let links: Vec<(NodeId, String)> = children
            .iter()
            .map(|(child, file, _)| (*child, relative_link(base, file)))
            .collect();

        let html = render::render_page(tree, id, self.options, &links);
        if let Some(parent) = page.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocError::io("create", parent, e))?;
        }
        std::fs::write(page, html).map_err(|e| DocError::io("write", page, e))?;
        debug!(page = %page.display(), "written");
        self.files.push(page.to_path_buf());
        self.ping(tree.node(id).label());

        for (child, file, subdir) in children {
            self.export_node(tree, child, &file, &subdir)?;
        }
        Ok(())
    }

    /// Called after each page
    fn ping(&mut self, name: &str) {
        self.exported += 1;
        let pages = self.pages.max(1);
        self.sink.status(&format!(
            "Exporting {} ({:.2}%)...",
            name,
            self.exported as f64 * 100.0 / pages as f64
        ));
        self.sink.progress((self.exported * 100 / pages).min(100) as u8);
    }
}

/// Run a full export into `out`, reporting to `sink`
pub fn export(
    tree: &mut ElementTree,
    out: &Path,
    options: &ExportOptions,
    force: bool,
    sink: &mut dyn ProgressSink,
) -> Result<ExportReport> {
    Exporter::new(options, sink).run(tree, out, force)
}

/// A running background export
pub struct ExportHandle {
    pub events: Receiver<ProgressEvent>,
    handle: JoinHandle<Result<ExportReport>>,
}

impl ExportHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return its outcome
    pub fn join(self) -> Result<ExportReport> {
        self.handle
            .join()
            .map_err(|_| DocError::Worker("export thread panicked".to_string()))?
    }
}

/// Export on a worker thread that owns `tree`
pub fn spawn_export(
    mut tree: ElementTree,
    out: PathBuf,
    options: ExportOptions,
    force: bool,
) -> Result<ExportHandle> {
    let (sender, events) = crossbeam_channel::unbounded();
    let handle = std::thread::Builder::new()
        .name("export".to_string())
        .spawn(move || {
            let mut sink = ChannelSink::new(sender);
            export(&mut tree, &out, &options, force, &mut sink)
        })
        .map_err(|e| DocError::Worker(e.to_string()))?;
    Ok(ExportHandle { events, handle })
}

fn prepare_output(out: &Path, force: bool) -> Result<()> {
    if out.is_dir() && !force {
        let mut entries = std::fs::read_dir(out).map_err(|e| DocError::io("read", out, e))?;
        if entries.next().is_some() {
            return Err(DocError::OutputNotEmpty(out.to_path_buf()));
        }
    }
    std::fs::create_dir_all(out).map_err(|e| DocError::io("create", out, e))
}

/// `file` relative to `base`, with `/` separators
fn relative_link(base: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(base).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write an `index.php` into every directory below `out` that lacks one
fn write_fillers(out: &Path, extension: &str) -> Result<usize> {
    let mut written = 0;
    for entry in WalkDir::new(out).sort_by_file_name() {
        let entry = entry.map_err(|source| DocError::Walk {
            path: out.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        let filler = dir.join("index.php");
        if filler.exists() {
            continue;
        }

        let target = if entry.depth() == 0 {
            format!("index.{}", extension)
        } else {
            let name = entry.file_name().to_string_lossy();
            format!("../{}.{}", name, extension)
        };
        std::fs::write(&filler, render::php_filler(&target))
            .map_err(|e| DocError::io("write", &filler, e))?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_block;

    const SOURCE: &str = r#"
        namespace Shapes {
            public class Circle {
                public double Radius;
                private double cache;
                protected void Draw() {}
            }
            internal class Helper {}
            public enum Kind { Round, Square }
            public struct Point { public int X; }
        }
    "#;

    fn tree() -> ElementTree {
        let mut tree = ElementTree::new("Docs");
        parse_block(SOURCE, &mut tree, 0, "").unwrap();
        tree
    }

    fn exportable(tree: &ElementTree, path: &[&str]) -> bool {
        tree.info(tree.find_path(path).unwrap()).unwrap().exportable
    }

    #[test]
    fn test_visibility_toggles() {
        let mut tree = tree();
        set_exportability(&mut tree, 0, &ExportOptions::default());

        assert!(exportable(&tree, &["Shapes"]));
        assert!(exportable(&tree, &["Shapes", "Circle"]));
        assert!(exportable(&tree, &["Shapes", "Circle", "Radius"]));
        assert!(!exportable(&tree, &["Shapes", "Circle", "cache"]));
        assert!(!exportable(&tree, &["Shapes", "Circle", "Draw()"]));
        assert!(!exportable(&tree, &["Shapes", "Helper"]));
    }

    #[test]
    fn test_enums_and_structs_expand_on_request() {
        let mut tree = tree();
        let mut options = ExportOptions::default();
        set_exportability(&mut tree, 0, &options);
        assert!(exportable(&tree, &["Shapes", "Kind"]));
        assert!(!exportable(&tree, &["Shapes", "Kind", "Round"]));
        assert!(!exportable(&tree, &["Shapes", "Point", "X"]));

        options.expand_enums = true;
        options.expand_structs = true;
        set_exportability(&mut tree, 0, &options);
        assert!(exportable(&tree, &["Shapes", "Kind", "Round"]));
        assert!(exportable(&tree, &["Shapes", "Point", "X"]));
    }

    #[test]
    fn test_exportability_is_reset() {
        let mut tree = tree();
        let mut options = ExportOptions::default();
        options.private = true;
        set_exportability(&mut tree, 0, &options);
        assert!(exportable(&tree, &["Shapes", "Circle", "cache"]));

        options.private = false;
        set_exportability(&mut tree, 0, &options);
        assert!(!exportable(&tree, &["Shapes", "Circle", "cache"]));
    }

    #[test]
    fn test_page_count() {
        let mut tree = tree();
        set_exportability(&mut tree, 0, &ExportOptions::default());
        // root, Shapes, Circle, Kind, Point
        assert_eq!(count_pages(&tree, 0), 5);
        assert!(page_children(&tree, 0)
            .iter()
            .all(|&c| tree.kind(c) == Some(Element::Namespace)));
    }

    #[test]
    fn test_relative_link() {
        let base = Path::new("/out");
        assert_eq!(relative_link(base, Path::new("/out/A.html")), "A.html");
        assert_eq!(relative_link(base, Path::new("/out/A/B.html")), "A/B.html");
    }
}
